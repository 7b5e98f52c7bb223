/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Main eframe::App implementation
//! Background tasks report through an EventQueue that is drained every frame,
//! so all state changes happen on the UI thread.

use std::sync::Arc;

use eframe::egui;

use crate::config::AppConfig;
use crate::huawei::HuaweiOcrClient;
use crate::model::{AppEvent, CandidateFile, EventQueue, EventSink, Notice, NoticeLevel, Recognition};
use crate::ocr::OcrAdapter;
use crate::preview;
use crate::task;
use crate::transport::{self, HttpUploadTransport, LocalTransport, UploadTransport};
use crate::upload::{Phase, UploadCoordinator};

#[cfg(not(target_arch = "wasm32"))]
use crate::local_file;
#[cfg(target_arch = "wasm32")]
use crate::web_file;

/// Long-lived collaborators, built once at startup and injected into the app
pub struct Services {
    /// `Err` carries the reason OCR is unavailable
    pub ocr: Result<OcrAdapter, String>,
    pub transport: Arc<dyn UploadTransport>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;

        let transport: Arc<dyn UploadTransport> = match &config.upload.action {
            Some(action) => {
                log::info!("uploads go to {}", action);
                Arc::new(HttpUploadTransport::new(
                    http.clone(),
                    action.clone(),
                    config.upload.field_name.clone(),
                ))
            }
            None => Arc::new(LocalTransport),
        };

        let ocr = match &config.ocr {
            Ok(ocr) => HuaweiOcrClient::builder()
                .with_credentials(ocr.credentials.clone())
                .with_endpoint(ocr.endpoint.clone())
                .with_http_client(http)
                .build()
                .map(|client| OcrAdapter::new(Arc::new(client), ocr.options))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match &ocr {
            Ok(_) => log::info!("OCR client ready"),
            Err(e) => log::warn!("OCR disabled: {}", e),
        }

        Ok(Self { ocr, transport })
    }

    /// Notices to show as soon as the window opens
    pub fn startup_notices(&self) -> Vec<Notice> {
        match &self.ocr {
            Ok(_) => Vec::new(),
            Err(e) => vec![Notice::warning(format!("OCR is disabled: {}", e))],
        }
    }
}

pub struct TableOcrApp {
    services: Services,
    coordinator: UploadCoordinator,
    recognition: Recognition,
    notices: Vec<Notice>,
    events: EventQueue,
    preview_texture: Option<egui::TextureHandle>,
    #[cfg(not(target_arch = "wasm32"))]
    path_input: String,
}

impl TableOcrApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, services: Services) -> Self {
        let notices = services.startup_notices();
        Self {
            services,
            coordinator: UploadCoordinator::new(),
            recognition: Recognition::None,
            notices,
            events: EventQueue::default(),
            preview_texture: None,
            #[cfg(not(target_arch = "wasm32"))]
            path_input: String::new(),
        }
    }

    fn sink(&self, ctx: &egui::Context) -> EventSink {
        let ctx = ctx.clone();
        self.events.sink(move || ctx.request_repaint())
    }

    /// Apply queued background events in arrival order
    fn poll_events(&mut self, ctx: &egui::Context) {
        for event in self.events.drain() {
            match event {
                AppEvent::FileSelected(file) => self.start_upload(ctx, file),
                AppEvent::FileReadFailed { name, error } => {
                    log::error!("{}: read failed: {}", name, error);
                    self.notices
                        .push(Notice::error(format!("Could not read {}: {}", name, error)));
                }
                AppEvent::UploadDone(ticket) => {
                    self.coordinator.upload_done(ticket);
                }
                AppEvent::PreviewReady { ticket, data_url } => {
                    if self.coordinator.preview_ready(ticket, data_url) {
                        self.preview_texture = self
                            .coordinator
                            .image_url()
                            .and_then(|url| decode_preview(ctx, url));
                    }
                }
                AppEvent::UploadFailed { ticket, error } => {
                    if let Some(notice) = self.coordinator.fail(ticket, &error) {
                        self.notices.push(notice);
                    }
                }
                AppEvent::RecognitionSucceeded(result) => {
                    self.notices.push(Notice::info("Recognition finished"));
                    self.recognition = Recognition::Done(result);
                }
                AppEvent::RecognitionFailed(error) => {
                    self.notices
                        .push(Notice::error(format!("Recognition failed: {}", error)));
                    self.recognition = Recognition::Failed(error);
                }
            }
        }
    }

    fn start_upload(&mut self, ctx: &egui::Context, file: CandidateFile) {
        match self.coordinator.select(&file) {
            Ok(ticket) => {
                self.preview_texture = None;
                task::spawn(transport::run_upload(
                    Arc::clone(&self.services.transport),
                    ticket,
                    file,
                    self.sink(ctx),
                ));
            }
            Err(validation) => self.notices.extend(validation.notices()),
        }
    }

    fn start_recognition(&mut self, ctx: &egui::Context) {
        let adapter = match &self.services.ocr {
            Ok(adapter) => adapter,
            Err(e) => {
                self.notices
                    .push(Notice::error(format!("OCR is disabled: {}", e)));
                return;
            }
        };
        let Some(image_url) = self.coordinator.image_url() else {
            self.notices.push(Notice::warning("Upload an image first"));
            return;
        };
        if adapter.is_busy() {
            self.notices
                .push(Notice::warning("A recognition is already running"));
            return;
        }

        log::info!("recognize requested");
        let on_success = self.sink(ctx);
        let on_failure = Arc::clone(&on_success);
        let submission = adapter.submit(
            image_url,
            move |result| on_success(AppEvent::RecognitionSucceeded(result)),
            move |error| on_failure(AppEvent::RecognitionFailed(error.to_string())),
        );
        self.recognition = Recognition::Pending;
        task::spawn(submission);
    }

    /// Read a file dropped or typed in on desktop
    #[cfg(not(target_arch = "wasm32"))]
    fn read_path(&self, ctx: &egui::Context, path: std::path::PathBuf, reported_mime: String) {
        let sink = self.sink(ctx);
        task::spawn(async move {
            match local_file::load_candidate(&path, &reported_mime).await {
                Ok(file) => sink(AppEvent::FileSelected(file)),
                Err(e) => sink(AppEvent::FileReadFailed {
                    name: local_file::display_name(&path),
                    error: e.to_string(),
                }),
            }
        });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.first() else {
            return;
        };
        if dropped.len() > 1 {
            self.notices
                .push(Notice::warning("Only one image can be uploaded at a time"));
        }

        if let Some(bytes) = &file.bytes {
            let candidate = CandidateFile::from_bytes(file.name.clone(), &file.mime, bytes.to_vec());
            self.start_upload(ctx, candidate);
            return;
        }

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(path) = &file.path {
            self.read_path(ctx, path.clone(), file.mime.clone());
        }
    }

    fn status_text(&self) -> &'static str {
        if self.recognition == Recognition::Pending {
            return "Recognizing table...";
        }
        match self.coordinator.phase() {
            Phase::Idle => "Select a JPG or PNG image smaller than 2MB",
            Phase::Uploading => "Uploading...",
            Phase::Ready => "Ready to recognize",
        }
    }
}

impl eframe::App for TableOcrApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events(ctx);

        let ocr_busy = self.services.ocr.as_ref().is_ok_and(|a| a.is_busy());
        if self.coordinator.state().loading || ocr_busy {
            ctx.request_repaint();
        }

        self.handle_dropped_files(ctx);

        egui::Panel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Table OCR");
            ui.add_space(2.0);

            ui.horizontal(|ui| {
                #[cfg(target_arch = "wasm32")]
                if ui.button("Upload").clicked() {
                    if let Err(e) = web_file::open_image_picker(self.sink(ctx)) {
                        log::error!("File picker error: {}", e);
                        self.notices.push(Notice::error(e));
                    }
                }

                #[cfg(not(target_arch = "wasm32"))]
                {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.path_input)
                            .hint_text("Path to a JPG/PNG image")
                            .desired_width(280.0),
                    );
                    let path = self.path_input.trim();
                    if ui
                        .add_enabled(!path.is_empty(), egui::Button::new("Open"))
                        .clicked()
                    {
                        self.read_path(ctx, std::path::PathBuf::from(path), String::new());
                    }
                }

                let can_recognize = self.coordinator.image_url().is_some()
                    && self.services.ocr.is_ok()
                    && !ocr_busy;
                if ui
                    .add_enabled(can_recognize, egui::Button::new("Recognize"))
                    .clicked()
                {
                    self.start_recognition(ctx);
                }

                if ui
                    .add_enabled(!self.notices.is_empty(), egui::Button::new("Clear notices"))
                    .clicked()
                {
                    self.notices.clear();
                }
            });

            ui.horizontal(|ui| {
                if self.coordinator.state().loading || self.recognition == Recognition::Pending {
                    ui.spinner();
                }
                ui.label(self.status_text());
            });
            ui.add_space(2.0);
        });

        egui::Panel::right("result_panel")
            .resizable(true)
            .default_size(360.0)
            .min_size(220.0)
            .show(ctx, |ui| {
                ui.strong("Result");
                ui.separator();
                egui::ScrollArea::both().show(ui, |ui| match &self.recognition {
                    Recognition::None => {
                        ui.colored_label(egui::Color32::GRAY, "No recognition yet");
                    }
                    Recognition::Pending => {
                        ui.spinner();
                    }
                    Recognition::Done(result) => {
                        let pretty = serde_json::to_string_pretty(result)
                            .unwrap_or_else(|_| result.to_string());
                        ui.label(egui::RichText::new(pretty).monospace());
                    }
                    Recognition::Failed(error) => {
                        ui.colored_label(egui::Color32::from_rgb(255, 100, 100), error);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.coordinator.state().loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            } else if let Some(texture) = &self.preview_texture {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let available_width = ui.available_width();
                    let [tw, th] = texture.size();
                    let scale = (available_width / tw as f32).min(1.0);
                    ui.image(egui::load::SizedTexture::new(
                        texture.id(),
                        egui::vec2(tw as f32 * scale, th as f32 * scale),
                    ));
                });
            } else if self.coordinator.image_url().is_some() {
                ui.colored_label(egui::Color32::GRAY, "Preview unavailable for this image");
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(
                            "Drop a JPG or PNG image here\nor use the controls above",
                        )
                        .size(18.0)
                        .color(egui::Color32::GRAY),
                    );
                });
            }

            if !self.notices.is_empty() {
                ui.separator();
                ui.collapsing("Notices", |ui| {
                    for notice in &self.notices {
                        let color = match notice.level {
                            NoticeLevel::Info => egui::Color32::GRAY,
                            NoticeLevel::Warning => egui::Color32::from_rgb(230, 180, 60),
                            NoticeLevel::Error => egui::Color32::from_rgb(255, 100, 100),
                        };
                        ui.colored_label(color, &notice.message);
                    }
                });
            }
        });
    }
}

fn decode_preview(ctx: &egui::Context, data_url: &str) -> Option<egui::TextureHandle> {
    let (_, bytes) = preview::decode_data_url(data_url)?;
    let img = image::load_from_memory(&bytes).ok()?;
    // Resize if too large for preview (max 1024px on longest side)
    let img = if img.width() > 1024 || img.height() > 1024 {
        img.resize(1024, 1024, image::imageops::FilterType::Triangle)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &pixels);
    Some(ctx.load_texture("upload_preview", color_image, egui::TextureOptions::LINEAR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ENV_SK, OcrConfig, UploadConfig};
    use crate::ocr::TableOptions;
    use crate::signer::Credentials;

    fn upload() -> UploadConfig {
        UploadConfig {
            action: None,
            field_name: "avatar".into(),
        }
    }

    #[test]
    fn missing_secret_disables_ocr_and_names_it() {
        let config = AppConfig {
            ocr: Err(ConfigError::Missing(ENV_SK)),
            upload: upload(),
        };
        let services = Services::from_config(&config).unwrap();

        let reason = services.ocr.as_ref().err().unwrap();
        assert!(reason.contains("HUAWEICLOUD_SDK_SK"), "{reason}");

        let notices = services.startup_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert!(notices[0].message.contains("HUAWEICLOUD_SDK_SK"));
    }

    #[test]
    fn complete_config_enables_ocr() {
        let config = AppConfig {
            ocr: Ok(OcrConfig {
                credentials: Credentials {
                    ak: "ak".into(),
                    sk: "sk".into(),
                    project_id: "project".into(),
                },
                endpoint: crate::huawei::DEFAULT_ENDPOINT.into(),
                options: TableOptions::default(),
            }),
            upload: upload(),
        };
        let services = Services::from_config(&config).unwrap();

        assert!(services.ocr.is_ok());
        assert!(services.startup_notices().is_empty());
    }

    #[test]
    fn bad_endpoint_disables_ocr() {
        let config = AppConfig {
            ocr: Ok(OcrConfig {
                credentials: Credentials {
                    ak: "ak".into(),
                    sk: "sk".into(),
                    project_id: "project".into(),
                },
                endpoint: "http://[::1".into(),
                options: TableOptions::default(),
            }),
            upload: upload(),
        };
        let services = Services::from_config(&config).unwrap();

        let reason = services.ocr.as_ref().err().unwrap();
        assert!(reason.contains("invalid OCR endpoint"), "{reason}");
    }
}

/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Upload transport and the upload -> preview pipeline

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::model::{AppEvent, CandidateFile, EventSink};
use crate::preview;
use crate::upload::UploadTicket;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("upload endpoint answered {status}")]
    Status { status: u16 },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Request(e.to_string())
    }
}

/// Moves an accepted file to wherever it is hosted
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, file: &CandidateFile) -> Result<(), TransportError>;
}

/// Multipart POST to an upload action URL. Only the status is looked at.
pub struct HttpUploadTransport {
    http: reqwest::Client,
    action: String,
    field_name: String,
}

impl HttpUploadTransport {
    pub fn new(http: reqwest::Client, action: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            http,
            action: action.into(),
            field_name: field_name.into(),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl UploadTransport for HttpUploadTransport {
    async fn upload(&self, file: &CandidateFile) -> Result<(), TransportError> {
        let part = Part::bytes(file.data.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part(self.field_name.clone(), part);

        let response = self.http.post(&self.action).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        log::debug!("{}: uploaded to {} ({})", file.name, self.action, status);
        Ok(())
    }
}

/// No hosting endpoint configured: the transfer completes immediately
pub struct LocalTransport;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl UploadTransport for LocalTransport {
    async fn upload(&self, _file: &CandidateFile) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Transport the file, then encode its preview. Emits `UploadDone` followed by
/// `PreviewReady`, or a single `UploadFailed`.
pub async fn run_upload(
    transport: Arc<dyn UploadTransport>,
    ticket: UploadTicket,
    file: CandidateFile,
    sink: EventSink,
) {
    if let Err(e) = transport.upload(&file).await {
        sink(AppEvent::UploadFailed {
            ticket,
            error: e.to_string(),
        });
        return;
    }
    sink(AppEvent::UploadDone(ticket));

    match preview::encode(file).await {
        Ok(data_url) => sink(AppEvent::PreviewReady { ticket, data_url }),
        Err(e) => sink(AppEvent::UploadFailed {
            ticket,
            error: e.to_string(),
        }),
    }
}

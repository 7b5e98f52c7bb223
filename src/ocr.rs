/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Table recognition front door.
//!
//! [`OcrAdapter`] owns the injected [`TableRecognizer`] and allows a single
//! request in flight. The claim is taken when a call is issued, not when its
//! future is first polled, so two clicks in the same frame cannot both go out.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::preview;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("a recognition request is already in flight")]
    Busy,
    #[error("no image has been uploaded yet")]
    MissingImage,
    #[error("invalid image reference: {0}")]
    InvalidImage(String),
    #[error("invalid OCR endpoint: {0}")]
    Endpoint(String),
    #[error("OCR request failed: {0}")]
    Transport(String),
    #[error("OCR service returned {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },
    #[error("unreadable OCR response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(e: reqwest::Error) -> Self {
        OcrError::Transport(e.to_string())
    }
}

/// Optional flags of the general-table API
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub return_text_location: Option<bool>,
    pub return_confidence: Option<bool>,
    pub return_excel: Option<bool>,
}

/// Body of a general-table recognition call. Exactly one of `image`/`url` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecognitionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_text_location: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_confidence: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_excel: Option<bool>,
}

impl RecognitionRequest {
    /// Remote URLs are passed by reference; base64 data URLs are sent inline
    pub fn from_image_url(image_url: &str, options: TableOptions) -> Result<Self, OcrError> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(OcrError::MissingImage);
        }

        let mut request = RecognitionRequest {
            return_text_location: options.return_text_location,
            return_confidence: options.return_confidence,
            return_excel: options.return_excel,
            ..Default::default()
        };

        if image_url.starts_with("http://") || image_url.starts_with("https://") {
            request.url = Some(image_url.to_string());
        } else if image_url.starts_with("data:") {
            let (_, payload) = preview::split_data_url(image_url)
                .filter(|(_, payload)| !payload.is_empty())
                .ok_or_else(|| OcrError::InvalidImage("malformed data URL".into()))?;
            request.image = Some(payload.to_string());
        } else {
            let shown: String = image_url.chars().take(64).collect();
            return Err(OcrError::InvalidImage(shown));
        }
        Ok(request)
    }
}

/// Vendor seam: anything that can run a general-table recognition
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait TableRecognizer: Send + Sync {
    async fn recognize_general_table(&self, request: RecognitionRequest) -> Result<Value, OcrError>;
}

/// Held while a request is in flight; releases the adapter on drop
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct OcrAdapter {
    recognizer: Arc<dyn TableRecognizer>,
    options: TableOptions,
    busy: Arc<AtomicBool>,
}

impl OcrAdapter {
    pub fn new(recognizer: Arc<dyn TableRecognizer>, options: TableOptions) -> Self {
        Self {
            recognizer,
            options,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn claim(&self) -> Result<InFlight, OcrError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OcrError::Busy)?;
        Ok(InFlight {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Recognize the table in `image_url`. Resolves to the vendor payload unchanged.
    pub fn recognize_table(
        &self,
        image_url: &str,
    ) -> impl Future<Output = Result<Value, OcrError>> + use<> {
        let claim = self.claim();
        let request = RecognitionRequest::from_image_url(image_url, self.options);
        let recognizer = Arc::clone(&self.recognizer);

        async move {
            let _in_flight = claim?;
            let request = request?;
            recognizer.recognize_general_table(request).await
        }
    }

    /// Run a recognition and route the outcome to exactly one of the callbacks
    pub fn submit<S, F>(
        &self,
        image_url: &str,
        on_success: S,
        on_failure: F,
    ) -> impl Future<Output = ()> + use<S, F>
    where
        S: FnOnce(Value),
        F: FnOnce(OcrError),
    {
        let recognition = self.recognize_table(image_url);
        async move {
            match recognition.await {
                Ok(result) => {
                    log::info!("recognition result: {}", result);
                    on_success(result);
                }
                Err(e) => {
                    log::error!("recognition failed: {}", e);
                    on_failure(e);
                }
            }
        }
    }
}

/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::upload::UploadTicket;

/// A user-selected image that has not been validated yet
#[derive(Clone, Debug)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub data: Vec<u8>,
}

impl CandidateFile {
    /// Build a candidate from raw bytes. An empty `reported_mime` falls back to
    /// content sniffing, since native drag-and-drop usually reports none.
    pub fn from_bytes(name: impl Into<String>, reported_mime: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: resolve_mime(reported_mime, &data),
            size_bytes: data.len() as u64,
            data,
        }
    }

    /// Candidate known only by its size and leading bytes. Used for files
    /// that fail the size rule, so their contents are never loaded.
    pub fn unread(name: impl Into<String>, reported_mime: &str, size_bytes: u64, head: &[u8]) -> Self {
        Self {
            name: name.into(),
            mime_type: resolve_mime(reported_mime, head),
            size_bytes,
            data: Vec::new(),
        }
    }
}

fn resolve_mime(reported_mime: &str, head: &[u8]) -> String {
    if reported_mime.is_empty() {
        infer::get(head)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string())
    } else {
        reported_mime.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-visible notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Last recognition shown in the result panel
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Recognition {
    #[default]
    None,
    Pending,
    Done(Value),
    Failed(String),
}

/// Reports from background tasks, applied on the UI thread in arrival order
#[derive(Clone, Debug)]
pub enum AppEvent {
    FileSelected(CandidateFile),
    FileReadFailed { name: String, error: String },
    UploadDone(UploadTicket),
    PreviewReady { ticket: UploadTicket, data_url: String },
    UploadFailed { ticket: UploadTicket, error: String },
    RecognitionSucceeded(Value),
    RecognitionFailed(String),
}

/// Callback used by background tasks to hand events back to the UI
pub type EventSink = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Queue of events drained once per frame
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<Vec<AppEvent>>>,
}

impl EventQueue {
    pub fn push(&self, event: AppEvent) {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn drain(&self) -> Vec<AppEvent> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect()
    }

    /// Sink that queues the event and then runs `wake` (usually a repaint request)
    pub fn sink(&self, wake: impl Fn() + Send + Sync + 'static) -> EventSink {
        let queue = self.clone();
        Arc::new(move |event| {
            queue.push(event);
            wake();
        })
    }
}

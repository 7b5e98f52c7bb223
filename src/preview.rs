/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Data URL conversion for the local preview

use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use thiserror::Error;

use crate::model::CandidateFile;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("{0}: no image data to preview")]
    Empty(String),
    #[error("{0}: unknown content type")]
    MissingMime(String),
    #[error("preview encoding was interrupted: {0}")]
    Interrupted(String),
}

/// `data:<mime>;base64,<payload>`
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 data URL back into its MIME type and raw bytes
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let (mime, payload) = split_data_url(url)?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

/// Borrow the MIME type and the still-encoded payload of a base64 data URL
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    static DATA_URL: OnceLock<Regex> = OnceLock::new();
    let re = DATA_URL.get_or_init(|| {
        Regex::new(r"^data:([\w.+-]+/[\w.+-]+)?(?:;[\w-]+=[^;,]*)*;base64,(.*)$")
            .expect("data URL pattern is valid")
    });
    let caps = re.captures(url)?;
    let mime = caps.get(1).map_or("", |m| m.as_str());
    let payload = caps.get(2)?.as_str();
    Some((mime, payload))
}

/// Encode an accepted file into a data URL. Resolves once, with the whole URL.
pub async fn encode(file: CandidateFile) -> Result<String, PreviewError> {
    if file.data.is_empty() {
        return Err(PreviewError::Empty(file.name));
    }
    if file.mime_type.is_empty() {
        return Err(PreviewError::MissingMime(file.name));
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::task::spawn_blocking(move || to_data_url(&file.mime_type, &file.data))
            .await
            .map_err(|e| PreviewError::Interrupted(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    {
        Ok(to_data_url(&file.mime_type, &file.data))
    }
}

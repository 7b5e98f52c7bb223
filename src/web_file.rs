/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Browser file picker for WASM.
//! A detached `<input type="file">` is clicked; the chosen file is read into
//! memory and handed back as a candidate.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::model::{AppEvent, CandidateFile, EventSink};
use crate::validator::MAX_FILE_SIZE;

/// Enough leading bytes for content sniffing
const SNIFF_LEN: f64 = 64.0;

/// Open the picker. The selection arrives later through `sink`.
pub fn open_image_picker(sink: EventSink) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object available")?;
    let document = window.document().ok_or("No document available")?;

    let input: web_sys::HtmlInputElement = document
        .create_element("input")
        .map_err(|e| format!("Failed to create input element: {:?}", e))?
        .dyn_into()
        .map_err(|_| "Created element is not an input".to_string())?;
    input.set_type("file");
    input.set_multiple(false);

    let picked = input.clone();
    let on_change = Closure::once(move || {
        let Some(file) = picked.files().and_then(|files| files.get(0)) else {
            return;
        };
        spawn_local(async move {
            let name = file.name();
            match load_candidate(&file).await {
                Ok(candidate) => sink(AppEvent::FileSelected(candidate)),
                Err(error) => sink(AppEvent::FileReadFailed { name, error }),
            }
        });
    });
    input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
    on_change.forget();

    input.click();
    Ok(())
}

/// Files at or over the size limit are described from `File.size` and a short
/// header only; their contents are never read.
async fn load_candidate(file: &web_sys::File) -> Result<CandidateFile, String> {
    let name = file.name();
    let reported_mime = file.type_();
    let size = file.size() as u64;

    if size >= MAX_FILE_SIZE {
        let head = if reported_mime.is_empty() {
            let slice = file
                .slice_with_f64_and_f64(0.0, SNIFF_LEN)
                .map_err(|e| format!("Failed to slice file: {:?}", e))?;
            read_blob(&slice).await?
        } else {
            Vec::new()
        };
        log::debug!("{}: {} bytes, skipping read", name, size);
        return Ok(CandidateFile::unread(name, &reported_mime, size, &head));
    }

    let data = read_blob(file).await?;
    Ok(CandidateFile::from_bytes(name, &reported_mime, data))
}

async fn read_blob(blob: &web_sys::Blob) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(blob.array_buffer())
        .await
        .map_err(|e| format!("Failed to read file: {:?}", e))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

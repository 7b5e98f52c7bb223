/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Desktop file loading for dropped or typed-in paths

use std::io;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::model::CandidateFile;
use crate::validator::MAX_FILE_SIZE;

/// Enough leading bytes for content sniffing
const SNIFF_LEN: u64 = 64;

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load `path` as a candidate. Files at or over the size limit are described
/// from metadata and a short header only; their contents are never read.
pub async fn load_candidate(path: &Path, reported_mime: &str) -> io::Result<CandidateFile> {
    let name = display_name(path);
    let size = tokio::fs::metadata(path).await?.len();

    if size >= MAX_FILE_SIZE {
        let mut head = Vec::new();
        if reported_mime.is_empty() {
            tokio::fs::File::open(path)
                .await?
                .take(SNIFF_LEN)
                .read_to_end(&mut head)
                .await?;
        }
        log::debug!("{}: {} bytes, skipping read", name, size);
        return Ok(CandidateFile::unread(name, reported_mime, size, &head));
    }

    let data = tokio::fs::read(path).await?;
    Ok(CandidateFile::from_bytes(name, reported_mime, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{self, Rejection};
    use std::io::Write;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_file(len: u64) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&PNG_MAGIC).unwrap();
        file.as_file().set_len(len).unwrap();
        file
    }

    #[tokio::test]
    async fn small_file_is_read_fully() {
        let file = png_file(4096);
        let candidate = load_candidate(file.path(), "").await.unwrap();

        assert_eq!(candidate.mime_type, "image/png");
        assert_eq!(candidate.size_bytes, 4096);
        assert_eq!(candidate.data.len(), 4096);
        assert!(validator::validate(&candidate).accepted);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_without_reading() {
        let file = png_file(5 * 1024 * 1024);
        let candidate = load_candidate(file.path(), "").await.unwrap();

        assert!(candidate.data.is_empty());
        assert_eq!(candidate.size_bytes, 5 * 1024 * 1024);
        assert_eq!(candidate.mime_type, "image/png");

        let validation = validator::validate(&candidate);
        assert!(!validation.accepted);
        assert_eq!(validation.reasons, vec![Rejection::TooLarge]);
    }

    #[tokio::test]
    async fn reported_mime_skips_sniffing_for_oversized_file() {
        let file = png_file(MAX_FILE_SIZE);
        let candidate = load_candidate(file.path(), "image/gif").await.unwrap();

        assert!(candidate.data.is_empty());
        assert_eq!(
            validator::validate(&candidate).reasons,
            vec![Rejection::UnsupportedType, Rejection::TooLarge]
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_candidate(&dir.path().join("gone.png"), "").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}

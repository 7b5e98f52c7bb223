/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Client-side gate for selected images: JPG/PNG only, under 2MB.

use crate::model::{CandidateFile, Notice};

pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Files must be strictly smaller than this
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedType,
    TooLarge,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::UnsupportedType => {
                write!(f, "unsupported type: only JPG/PNG files can be uploaded")
            }
            Rejection::TooLarge => write!(f, "file too large: image must be smaller than 2MB"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub accepted: bool,
    pub reasons: Vec<Rejection>,
}

impl Validation {
    /// One error notice per violated rule
    pub fn notices(&self) -> Vec<Notice> {
        self.reasons
            .iter()
            .map(|reason| Notice::error(reason.to_string()))
            .collect()
    }
}

/// Check type and size. Both rules always run so every violation is reported.
pub fn validate(file: &CandidateFile) -> Validation {
    let mut reasons = Vec::new();

    if !ACCEPTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        log::warn!("{}: rejected type {}", file.name, file.mime_type);
        reasons.push(Rejection::UnsupportedType);
    }
    if file.size_bytes >= MAX_FILE_SIZE {
        log::warn!("{}: rejected size {} bytes", file.name, file.size_bytes);
        reasons.push(Rejection::TooLarge);
    }

    Validation {
        accepted: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mime: &str, size: u64) -> CandidateFile {
        CandidateFile {
            name: "test".into(),
            mime_type: mime.into(),
            size_bytes: size,
            data: Vec::new(),
        }
    }

    #[test]
    fn accepts_small_jpeg_and_png() {
        for mime in ACCEPTED_MIME_TYPES {
            let result = validate(&candidate(mime, 500 * 1024));
            assert!(result.accepted, "{mime} should be accepted");
            assert!(result.reasons.is_empty());
            assert!(result.notices().is_empty());
        }
    }

    #[test]
    fn rejects_other_types() {
        for mime in ["image/gif", "image/webp", "application/pdf", ""] {
            let result = validate(&candidate(mime, 10));
            assert!(!result.accepted);
            assert_eq!(result.reasons, vec![Rejection::UnsupportedType]);
            assert!(result.notices()[0].message.contains("unsupported type"));
        }
    }

    #[test]
    fn size_limit_is_exclusive() {
        assert!(validate(&candidate("image/png", MAX_FILE_SIZE - 1)).accepted);

        let at_limit = validate(&candidate("image/png", MAX_FILE_SIZE));
        assert!(!at_limit.accepted);
        assert_eq!(at_limit.reasons, vec![Rejection::TooLarge]);
        assert!(at_limit.notices()[0].message.contains("file too large"));
    }

    #[test]
    fn reports_both_violations() {
        let result = validate(&candidate("image/bmp", 5 * 1024 * 1024));
        assert!(!result.accepted);
        assert_eq!(
            result.reasons,
            vec![Rejection::UnsupportedType, Rejection::TooLarge]
        );

        let notices = result.notices();
        assert_eq!(notices.len(), 2);
        assert!(notices[0].message.contains("unsupported type"));
        assert!(notices[1].message.contains("file too large"));
    }
}

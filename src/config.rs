/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Startup configuration.
//! Native builds read the environment (after `.env`), web builds bake the
//! same variables in at compile time.

use thiserror::Error;

use crate::huawei;
use crate::ocr::TableOptions;
use crate::signer::Credentials;

pub const ENV_AK: &str = "HUAWEICLOUD_SDK_AK";
pub const ENV_SK: &str = "HUAWEICLOUD_SDK_SK";
pub const ENV_PROJECT_ID: &str = "HUAWEICLOUD_SDK_PROJECT_ID";
pub const ENV_ENDPOINT: &str = "HUAWEICLOUD_OCR_ENDPOINT";
pub const ENV_REGION: &str = "HUAWEICLOUD_OCR_REGION";
pub const ENV_UPLOAD_URL: &str = "TABLE_OCR_UPLOAD_URL";
pub const ENV_UPLOAD_FIELD: &str = "TABLE_OCR_UPLOAD_FIELD";
pub const ENV_RETURN_TEXT_LOCATION: &str = "TABLE_OCR_RETURN_TEXT_LOCATION";
pub const ENV_RETURN_CONFIDENCE: &str = "TABLE_OCR_RETURN_CONFIDENCE";
pub const ENV_RETURN_EXCEL: &str = "TABLE_OCR_RETURN_EXCEL";

pub const DEFAULT_UPLOAD_FIELD: &str = "avatar";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} must be true or false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub credentials: Credentials,
    pub endpoint: String,
    pub options: TableOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    /// `None` keeps uploads local
    pub action: Option<String>,
    pub field_name: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub ocr: Result<OcrConfig, ConfigError>,
    pub upload: UploadConfig,
}

impl AppConfig {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::from_lookup(compiled_env)
    }

    /// Build from any key -> value source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let upload = UploadConfig {
            action: get(ENV_UPLOAD_URL),
            field_name: get(ENV_UPLOAD_FIELD).unwrap_or_else(|| DEFAULT_UPLOAD_FIELD.to_string()),
        };

        Self {
            ocr: ocr_config(&get),
            upload,
        }
    }
}

fn ocr_config(get: &impl Fn(&str) -> Option<String>) -> Result<OcrConfig, ConfigError> {
    let credentials = Credentials {
        ak: get(ENV_AK).ok_or(ConfigError::Missing(ENV_AK))?,
        sk: get(ENV_SK).ok_or(ConfigError::Missing(ENV_SK))?,
        project_id: get(ENV_PROJECT_ID).ok_or(ConfigError::Missing(ENV_PROJECT_ID))?,
    };

    let endpoint = get(ENV_ENDPOINT)
        .or_else(|| get(ENV_REGION).map(|region| huawei::regional_endpoint(&region)))
        .unwrap_or_else(|| huawei::DEFAULT_ENDPOINT.to_string());

    let options = TableOptions {
        return_text_location: flag(get, ENV_RETURN_TEXT_LOCATION)?,
        return_confidence: flag(get, ENV_RETURN_CONFIDENCE)?,
        return_excel: flag(get, ENV_RETURN_EXCEL)?,
    };

    Ok(OcrConfig {
        credentials,
        endpoint,
        options,
    })
}

fn flag(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<bool>, ConfigError> {
    match get(name) {
        None => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidFlag { name, value }),
        },
    }
}

#[cfg(target_arch = "wasm32")]
fn compiled_env(key: &str) -> Option<String> {
    let value = match key {
        ENV_AK => option_env!("HUAWEICLOUD_SDK_AK"),
        ENV_SK => option_env!("HUAWEICLOUD_SDK_SK"),
        ENV_PROJECT_ID => option_env!("HUAWEICLOUD_SDK_PROJECT_ID"),
        ENV_ENDPOINT => option_env!("HUAWEICLOUD_OCR_ENDPOINT"),
        ENV_REGION => option_env!("HUAWEICLOUD_OCR_REGION"),
        ENV_UPLOAD_URL => option_env!("TABLE_OCR_UPLOAD_URL"),
        ENV_UPLOAD_FIELD => option_env!("TABLE_OCR_UPLOAD_FIELD"),
        ENV_RETURN_TEXT_LOCATION => option_env!("TABLE_OCR_RETURN_TEXT_LOCATION"),
        ENV_RETURN_CONFIDENCE => option_env!("TABLE_OCR_RETURN_CONFIDENCE"),
        ENV_RETURN_EXCEL => option_env!("TABLE_OCR_RETURN_EXCEL"),
        _ => None,
    };
    value.map(str::to_string)
}

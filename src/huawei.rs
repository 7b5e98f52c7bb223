/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Huawei Cloud OCR client for the general-table API (RecognizeGeneralTable)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::ocr::{OcrError, RecognitionRequest, TableRecognizer};
use crate::signer::{self, Credentials, SignableRequest};

pub const DEFAULT_ENDPOINT: &str = "ocr.cn-north-4.myhuaweicloud.com";

/// `ocr.<region>.myhuaweicloud.com`
pub fn regional_endpoint(region: &str) -> String {
    format!("ocr.{}.myhuaweicloud.com", region)
}

#[derive(Deserialize)]
struct ServiceError {
    error_code: Option<String>,
    error_msg: Option<String>,
}

pub struct HuaweiOcrClient {
    http: reqwest::Client,
    credentials: Credentials,
    base: Url,
}

#[derive(Default)]
pub struct HuaweiOcrClientBuilder {
    http: Option<reqwest::Client>,
    credentials: Option<Credentials>,
    endpoint: Option<String>,
}

impl HuaweiOcrClientBuilder {
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Host name (`https` is implied) or a full base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<HuaweiOcrClient, OcrError> {
        let credentials = self
            .credentials
            .ok_or_else(|| OcrError::Endpoint("credentials are required".into()))?;
        let endpoint = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let base = parse_endpoint(&endpoint)?;

        Ok(HuaweiOcrClient {
            http: self.http.unwrap_or_default(),
            credentials,
            base,
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, OcrError> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };
    let url = Url::parse(&with_scheme).map_err(|e| OcrError::Endpoint(format!("{endpoint}: {e}")))?;
    if url.host_str().is_none() {
        return Err(OcrError::Endpoint(format!("{endpoint}: missing host")));
    }
    Ok(url)
}

/// `host[:port]` as sent in the Host header
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

impl HuaweiOcrClient {
    pub fn builder() -> HuaweiOcrClientBuilder {
        HuaweiOcrClientBuilder::default()
    }

    pub fn table_url(&self) -> Url {
        let base_path = self.base.path().trim_end_matches('/');
        let mut url = self.base.clone();
        url.set_path(&format!(
            "{}/v2/{}/ocr/general-table",
            base_path, self.credentials.project_id
        ));
        url
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl TableRecognizer for HuaweiOcrClient {
    async fn recognize_general_table(&self, request: RecognitionRequest) -> Result<Value, OcrError> {
        let url = self.table_url();
        let body = serde_json::to_vec(&request).map_err(|e| OcrError::Decode(e.to_string()))?;
        let sdk_date = signer::format_date(chrono::Utc::now());
        let host = host_header(&url);

        let headers = [
            ("Content-Type", "application/json"),
            ("Host", host.as_str()),
            ("X-Project-Id", self.credentials.project_id.as_str()),
            (signer::DATE_HEADER, sdk_date.as_str()),
        ];
        let authorization = signer::authorization(
            &self.credentials,
            &SignableRequest {
                method: "POST",
                path: url.path(),
                query: url.query().unwrap_or(""),
                headers: &headers,
                body: &body,
            },
            &sdk_date,
        );

        log::debug!("POST {}", url);
        let mut builder = self.http.post(url.clone());
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let response = builder
            .header("Authorization", authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ServiceError>(&text) {
                Ok(err) => (
                    err.error_code.unwrap_or_default(),
                    err.error_msg.unwrap_or_else(|| text.clone()),
                ),
                Err(_) => (String::new(), text),
            };
            return Err(OcrError::Service {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| OcrError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::TableOptions;
    use crate::test_util::closed_port_url;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            ak: "AKEXAMPLE".into(),
            sk: "secret".into(),
            project_id: "0123abcd".into(),
        }
    }

    fn client(endpoint: &str) -> HuaweiOcrClient {
        HuaweiOcrClient::builder()
            .with_credentials(credentials())
            .with_endpoint(endpoint)
            .build()
            .unwrap()
    }

    fn url_request() -> RecognitionRequest {
        RecognitionRequest::from_image_url("https://example.com/img.png", TableOptions::default())
            .unwrap()
    }

    #[test]
    fn endpoint_defaults_to_https() {
        let client = client(DEFAULT_ENDPOINT);
        assert_eq!(
            client.table_url().as_str(),
            "https://ocr.cn-north-4.myhuaweicloud.com/v2/0123abcd/ocr/general-table"
        );
        assert_eq!(regional_endpoint("ap-southeast-1"), "ocr.ap-southeast-1.myhuaweicloud.com");
    }

    #[test]
    fn build_requires_credentials() {
        assert!(matches!(
            HuaweiOcrClient::builder().build(),
            Err(OcrError::Endpoint(_))
        ));
        assert!(matches!(
            HuaweiOcrClient::builder()
                .with_credentials(credentials())
                .with_endpoint("http://[::1")
                .build(),
            Err(OcrError::Endpoint(_))
        ));
    }

    #[test]
    fn host_header_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:8080/v2").unwrap();
        assert_eq!(host_header(&url), "127.0.0.1:8080");
        let url = Url::parse("https://ocr.cn-north-4.myhuaweicloud.com/").unwrap();
        assert_eq!(host_header(&url), "ocr.cn-north-4.myhuaweicloud.com");
    }

    #[tokio::test]
    async fn sends_signed_request_and_returns_body() {
        let server = MockServer::start().await;
        let payload = json!({
            "result": {
                "words_region_count": 1,
                "words_region_list": [{ "type": "table", "words_block_count": 2 }]
            }
        });
        Mock::given(method("POST"))
            .and(path("/v2/0123abcd/ocr/general-table"))
            .and(header("content-type", "application/json"))
            .and(header("x-project-id", "0123abcd"))
            .and(header_regex("x-sdk-date", r"^\d{8}T\d{6}Z$"))
            .and(header_regex(
                "authorization",
                r"^SDK-HMAC-SHA256 Access=AKEXAMPLE, SignedHeaders=content-type;host;x-project-id;x-sdk-date, Signature=[0-9a-f]{64}$",
            ))
            .and(header_exists("host"))
            .and(body_json(json!({ "url": "https://example.com/img.png" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server.uri())
            .recognize_general_table(url_request())
            .await
            .unwrap();
        assert_eq!(result, payload);
    }

    #[tokio::test]
    async fn service_error_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_code": "AIS.0101",
                "error_msg": "The input parameter is invalid."
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .recognize_general_table(url_request())
            .await
            .unwrap_err();
        match err {
            OcrError::Service {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "AIS.0101");
                assert_eq!(message, "The input parameter is invalid.");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .recognize_general_table(url_request())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let err = client(&closed_port_url())
            .recognize_general_table(url_request())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Transport(_)));
    }
}

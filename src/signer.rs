/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! AK/SK request signing (SDK-HMAC-SHA256) for Huawei Cloud APIs

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

pub const ALGORITHM: &str = "SDK-HMAC-SHA256";
pub const DATE_HEADER: &str = "X-Sdk-Date";
const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Clone)]
pub struct Credentials {
    pub ak: String,
    pub sk: String,
    pub project_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ak", &self.ak)
            .field("sk", &"***")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Request parts covered by the signature
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    /// Header names in any case; values are trimmed when signed
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn canonical_uri(path: &str) -> String {
    let mut uri = if path.is_empty() { "/".to_string() } else { path.to_string() };
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}

fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_unstable();
    pairs.join("&")
}

/// Lower-cased, sorted header names and the `name:value\n` block
fn canonical_headers(headers: &[(&str, &str)]) -> (String, String) {
    let mut normalized: Vec<(String, &str)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
        .collect();
    normalized.sort_by(|a, b| a.0.cmp(&b.0));

    let block: String = normalized
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed = normalized
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (block, signed)
}

pub fn canonical_request(req: &SignableRequest<'_>) -> (String, String) {
    let (headers, signed_headers) = canonical_headers(req.headers);
    let canonical = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        req.method.to_ascii_uppercase(),
        canonical_uri(req.path),
        canonical_query(req.query),
        headers,
        signed_headers,
        sha256_hex(req.body),
    );
    (canonical, signed_headers)
}

pub fn string_to_sign(canonical_request: &str, sdk_date: &str) -> String {
    format!(
        "{}\n{}\n{}",
        ALGORITHM,
        sdk_date,
        sha256_hex(canonical_request.as_bytes())
    )
}

/// `Authorization` header value. `req.headers` must already contain the
/// `X-Sdk-Date` header with `sdk_date`.
pub fn authorization(credentials: &Credentials, req: &SignableRequest<'_>, sdk_date: &str) -> String {
    let (canonical, signed_headers) = canonical_request(req);
    let to_sign = string_to_sign(&canonical, sdk_date);

    let mut mac = Hmac::<Sha256>::new_from_slice(credentials.sk.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!(
        "{} Access={}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.ak, signed_headers, signature
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn credentials(sk: &str) -> Credentials {
        Credentials {
            ak: "AKEXAMPLE".into(),
            sk: sk.into(),
            project_id: "proj".into(),
        }
    }

    fn request<'a>(headers: &'a [(&'a str, &'a str)], body: &'a [u8]) -> SignableRequest<'a> {
        SignableRequest {
            method: "post",
            path: "/v2/proj/ocr/general-table",
            query: "",
            headers,
            body,
        }
    }

    #[test]
    fn date_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_date(at), "20240309T070501Z");
    }

    #[test]
    fn canonical_request_layout() {
        let headers = [
            ("X-Sdk-Date", "20240309T070501Z"),
            ("Host", " ocr.cn-north-4.myhuaweicloud.com "),
            ("Content-Type", "application/json"),
        ];
        let (canonical, signed) = canonical_request(&request(&headers, b""));

        assert_eq!(signed, "content-type;host;x-sdk-date");
        let expected = format!(
            "POST\n/v2/proj/ocr/general-table/\n\n\
             content-type:application/json\n\
             host:ocr.cn-north-4.myhuaweicloud.com\n\
             x-sdk-date:20240309T070501Z\n\n\
             content-type;host;x-sdk-date\n{}",
            // SHA-256 of the empty body
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(canonical, expected);
    }

    #[test]
    fn query_is_sorted() {
        assert_eq!(canonical_query("b=2&a=1&&c=3"), "a=1&b=2&c=3");
        assert_eq!(canonical_uri(""), "/");
        assert_eq!(canonical_uri("/already/"), "/already/");
    }

    #[test]
    fn string_to_sign_layout() {
        let to_sign = string_to_sign("", "20240309T070501Z");
        assert_eq!(
            to_sign,
            "SDK-HMAC-SHA256\n20240309T070501Z\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn authorization_header_shape() {
        let headers = [("Host", "example.com"), ("X-Sdk-Date", "20240309T070501Z")];
        let auth = authorization(&credentials("secret"), &request(&headers, b"{}"), "20240309T070501Z");

        let prefix = "SDK-HMAC-SHA256 Access=AKEXAMPLE, SignedHeaders=host;x-sdk-date, Signature=";
        assert!(auth.starts_with(prefix), "{auth}");
        let signature = &auth[prefix.len()..];
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret_and_body() {
        let headers = [("Host", "example.com"), ("X-Sdk-Date", "20240309T070501Z")];
        let date = "20240309T070501Z";
        let a = authorization(&credentials("one"), &request(&headers, b"{}"), date);
        let b = authorization(&credentials("two"), &request(&headers, b"{}"), date);
        let c = authorization(&credentials("one"), &request(&headers, b"{\"url\":1}"), date);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, authorization(&credentials("one"), &request(&headers, b"{}"), date));
    }

    #[test]
    fn debug_hides_secret() {
        let shown = format!("{:?}", credentials("topsecret"));
        assert!(!shown.contains("topsecret"));
        assert!(shown.contains("AKEXAMPLE"));
    }
}

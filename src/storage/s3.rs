//! S3-compatible object store client.
//!
//! Speaks plain HTTP to a MinIO/S3 endpoint with AWS Signature V4 request
//! signing, path-style addressing, and TLS on by default. Only the two
//! operations the blog needs are implemented: put object and get object.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{ObjectStore, StorageError};
use crate::config::ObjectStoreConfig;

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "s3";

pub struct S3ObjectStore {
    client: reqwest::Client,
    endpoint: String,
    scheme: &'static str,
    bucket: String,
    region: String,
    access_key: String,
    secret_key: String,
}

impl S3ObjectStore {
    pub fn new(config: &ObjectStoreConfig) -> Result<Self, StorageError> {
        if config.endpoint.is_empty() {
            return Err(StorageError::Config("endpoint must not be empty".to_string()));
        }
        if config.endpoint.contains("://") {
            return Err(StorageError::Config(
                "endpoint must be host[:port] without a scheme".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            scheme: if config.secure { "https" } else { "http" },
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Path-style canonical URI: `/{bucket}/{key}`, key segments URI-encoded.
    fn canonical_path(&self, key: &str) -> String {
        let mut path = String::from("/");
        path.push_str(&uri_encode(&self.bucket));
        for segment in key.split('/') {
            path.push('/');
            path.push_str(&uri_encode(segment));
        }
        path
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}://{}{}", self.scheme, self.endpoint, self.canonical_path(key))
    }

    /// Build the SigV4 `Authorization` header for a request with an empty
    /// query string.
    fn authorization(
        &self,
        method: &str,
        key: &str,
        payload_hash: &str,
        amz_date: &str,
        date: &str,
        content_type: Option<&str>,
    ) -> String {
        let mut headers: Vec<(&str, String)> = vec![
            ("host", self.endpoint.clone()),
            ("x-amz-content-sha256", payload_hash.to_string()),
            ("x-amz-date", amz_date.to_string()),
        ];
        if let Some(ct) = content_type {
            headers.push(("content-type", ct.to_string()));
        }
        headers.sort_by(|a, b| a.0.cmp(b.0));

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{method}\n{path}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            path = self.canonical_path(key),
        );

        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let date_key = hmac_sha256(format!("AWS4{}", self.secret_key).as_bytes(), date.as_bytes());
        let region_key = hmac_sha256(&date_key, self.region.as_bytes());
        let service_key = hmac_sha256(&region_key, SERVICE.as_bytes());
        let signing_key = hmac_sha256(&service_key, b"aws4_request");
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key
        )
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(data));

        let authorization =
            self.authorization("PUT", key, &payload_hash, &amz_date, &date, Some(content_type));

        let response = self
            .client
            .put(self.object_url(key))
            .header("authorization", authorization)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("content-type", content_type)
            .body(data.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UnexpectedStatus { status, body });
        }

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(b""));

        let authorization = self.authorization("GET", key, &payload_hash, &amz_date, &date, None);

        let response = self
            .client
            .get(self.object_url(key))
            .header("authorization", authorization)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                key: key.to_string(),
            });
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UnexpectedStatus { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// AWS-style URI encoding: unreserved characters pass through, everything
/// else becomes uppercase percent escapes.
fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

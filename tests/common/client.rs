//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides one method per server endpoint.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    pub async fn get_albums(&self) -> Response {
        self.client
            .get(format!("{}/v1/albums", self.base_url))
            .send()
            .await
            .expect("Albums request failed")
    }

    /// Uploads the reference catalog as a multipart file.
    pub async fn reconcile_file(&self, csv: &str) -> Response {
        let part = Part::bytes(csv.as_bytes().to_vec())
            .file_name("export.csv")
            .mime_str("text/csv")
            .expect("Invalid mime type");
        let form = Form::new().part("csvfile", part);
        self.post_multipart(form).await
    }

    /// Sends both multipart fields, the way a browser form with an empty
    /// file input does.
    pub async fn reconcile_multipart(&self, file: &str, text: &str) -> Response {
        let part = Part::bytes(file.as_bytes().to_vec()).file_name("export.csv");
        let form = Form::new()
            .part("csvfile", part)
            .text("csvtext", text.to_string());
        self.post_multipart(form).await
    }

    async fn post_multipart(&self, form: Form) -> Response {
        self.client
            .post(format!("{}/v1/reconcile", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Reconcile request failed")
    }

    /// Sends the reference catalog as the raw request body.
    pub async fn reconcile_text(&self, csv: &str) -> Response {
        self.client
            .post(format!("{}/v1/reconcile", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(csv.to_string())
            .send()
            .await
            .expect("Reconcile request failed")
    }

    pub async fn refresh_catalog(&self) -> Response {
        self.client
            .post(format!("{}/v1/catalog/refresh", self.base_url))
            .send()
            .await
            .expect("Refresh request failed")
    }
}

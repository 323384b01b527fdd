//! HTTP client for the sacco-server REST API
//!
//! The session travels in an HttpOnly cookie, so the underlying reqwest client
//! keeps a cookie store and every request is sent with credentials.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, header, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{ErrorBody, ErrorCode};

use crate::{ClientConfig, ClientError, ClientResult};

/// A spreadsheet picked for bulk upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A file returned as an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// `filename="..."` from a Content-Disposition value
pub fn attachment_filename(disposition: &str) -> Option<String> {
    disposition.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    })
}

/// HTTP client for making requests to sacco-server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request failed before a response arrived");
            ClientError::from(e)
        })?;
        Self::check_status(response).await
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::read_json(response).await
    }

    /// Make a GET request with query parameters
    pub async fn get_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Self::read_json(response).await
    }

    /// Make a request with a JSON body
    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.send(self.request(method, path).json(body)).await?;
        Self::read_json(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send_json(Method::POST, path, body).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::POST, path)).await?;
        Self::read_json(response).await
    }

    /// Make a DELETE request, ignoring any body
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    /// POST a spreadsheet as the multipart field `file`
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, upload: Upload) -> ClientResult<T> {
        let part = multipart::Part::bytes(upload.bytes).file_name(upload.filename);
        let form = multipart::Form::new().part("file", part);
        let response = self
            .send(self.request(Method::POST, path).multipart(form))
            .await?;
        Self::read_json(response).await
    }

    /// GET an attachment, falling back to `default_name` when unnamed
    pub async fn download<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        default_name: &str,
    ) -> ClientResult<Download> {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;

        let headers = response.headers();
        let filename = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| default_name.to_string());
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response.bytes().await?.to_vec();
        Ok(Download {
            filename,
            content_type,
            bytes,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        response.json().await.map_err(Into::into)
    }

    /// Map a non-2xx response onto the client error taxonomy
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(Self::error_from_body(status, &text))
    }

    fn error_from_body(status: StatusCode, text: &str) -> ClientError {
        let body = serde_json::from_str::<ErrorBody>(text).ok();
        let message = body
            .as_ref()
            .map(|b| b.error.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        tracing::debug!(status = status.as_u16(), %message, "Server returned an error");

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                code: body
                    .and_then(|b| b.code)
                    .and_then(|c| ErrorCode::try_from(c).ok()),
                message,
            },
        }
    }
}

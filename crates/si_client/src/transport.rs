//! Request/response transport.
//!
//! The client builds [`ApiRequest`]s with workspace-relative paths; a
//! [`Transport`] turns them into HTTP round trips. Keeping this seam narrow
//! lets tests swap in [`crate::mock::MockTransport`].

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use si_protocol::ClientConfig;
use std::fmt;

use crate::error::{ClientError, Result};

/// HTTP verb used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single API call: verb, path below the base URL, optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Status code and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body, labelling failures with the operation name.
    pub fn decode<T: DeserializeOwned>(&self, operation: &'static str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

/// Something that can execute an [`ApiRequest`].
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; status interpretation belongs to the client.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking reqwest transport that authenticates every call with the
/// configured bearer token.
pub struct HttpTransport {
    config: ClientConfig,
    http_client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("si/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.config.url_for(&request.path);
        let builder = match request.method {
            Method::Get => self.http_client.get(&url),
            Method::Post => self.http_client.post(&url),
            Method::Put => self.http_client.put(&url),
            Method::Delete => self.http_client.delete(&url),
        };
        let builder = builder
            .header(AUTHORIZATION, self.config.bearer())
            .header(ACCEPT, "application/json");
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ApiResponse { status, body })
    }
}

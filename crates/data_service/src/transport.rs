use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    pub fn collection(collection: &str) -> Self {
        Self {
            segments: vec!["api".to_string(), collection.to_string()],
        }
    }

    pub fn resource(collection: &str, id: &str) -> Self {
        let mut path = Self::collection(collection);
        path.segments.push(id.to_string());
        path
    }

    pub fn sub_resource(collection: &str, id: &str, sub: &str) -> Self {
        let mut path = Self::resource(collection, id);
        path.segments.push(sub.to_string());
        path
    }

    pub fn to_url(&self, base: &Url) -> Result<Url, FetchError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::InvalidUrl {
                path: self.to_string(),
                reason: format!("base url '{base}' cannot carry a path"),
            })?;
            segments.pop_if_empty();
            segments.extend(&self.segments);
            segments.push("");
        }
        Ok(url)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        f.write_str("/")
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &ApiPath) -> Result<Value, FetchError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            path: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| FetchError::Transport {
            path: base_url.to_string(),
            source,
        })?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &ApiPath) -> Result<Value, FetchError> {
        let url = path.to_url(&self.base_url)?;
        debug!(%url, "http: GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(path.to_string(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                path: path.to_string(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;

//! Pinboard v1 API client: list every bookmark, delete one by URL
//!
//! Any service speaking the same `posts/all` / `posts/delete` protocol can be
//! targeted by pointing the client at a different base URL.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.pinboard.in/v1";

const USER_AGENT: &str = concat!("stale/", env!("CARGO_PKG_VERSION"));
const API_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authorization failure")]
    Auth,
    #[error("Failed to retrieve posts: {0}")]
    Retrieval(String),
    #[error("Failed to delete post: {0}")]
    Deletion(String),
}

/// A saved URL plus whatever else the service returned for it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bookmark {
    #[serde(rename = "href")]
    pub url: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Bookmark {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: Map::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    /// `user:HEX` API token
    Token(String),
    Basic { username: String, password: String },
}

impl Credentials {
    /// Account name, for progress messages
    pub fn user(&self) -> &str {
        match self {
            Credentials::Token(token) => token.split(':').next().unwrap_or(token),
            Credentials::Basic { username, .. } => username,
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Token(token) => request.query(&[("auth_token", token.as_str())]),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

/// Listing responses come either as a bare array or wrapped in `posts`
#[derive(Deserialize)]
#[serde(untagged)]
enum PostsPayload {
    List(Vec<Bookmark>),
    Wrapped { posts: Vec<Bookmark> },
}

#[derive(Deserialize)]
struct ResultCode {
    result_code: String,
}

#[async_trait]
pub trait BookmarkSource: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Bookmark>, ApiError>;
}

#[async_trait]
pub trait BookmarkSink: Send + Sync {
    async fn delete(&self, url: &str) -> Result<(), ApiError>;
}

/// Authenticated client, passed explicitly to whoever needs the API
#[derive(Debug, Clone)]
pub struct PinboardClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl PinboardClient {
    pub fn new(base_url: &str, credentials: Credentials) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(API_TIMEOUT)
            .build()
            .context("Failed to build API client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("API request: {}", url);
        let request = self.client.get(url).query(&[("format", "json")]);
        self.credentials.apply(request)
    }
}

#[async_trait]
impl BookmarkSource for PinboardClient {
    async fn list_all(&self) -> Result<Vec<Bookmark>, ApiError> {
        let response = self
            .get("posts/all")
            .send()
            .await
            .map_err(|e| ApiError::Retrieval(redacted(e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(ApiError::Auth),
            status if !status.is_success() => {
                return Err(ApiError::Retrieval(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Retrieval(redacted(e)))?;
        parse_posts(&body)
    }
}

#[async_trait]
impl BookmarkSink for PinboardClient {
    async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let response = self
            .get("posts/delete")
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| ApiError::Deletion(redacted(e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Deletion("authorization failure".to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Deletion(format!("HTTP {}", status)));
        }

        let result: ResultCode = response
            .json()
            .await
            .map_err(|e| ApiError::Deletion(format!("malformed response: {}", redacted(e))))?;
        check_result_code(&result.result_code)
    }
}

/// Request URLs carry the auth token; keep them out of error text
fn redacted(err: reqwest::Error) -> String {
    err.without_url().to_string()
}

fn parse_posts(body: &str) -> Result<Vec<Bookmark>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::Retrieval("empty response".to_string()));
    }
    let payload: Option<PostsPayload> = serde_json::from_str(body)
        .map_err(|e| ApiError::Retrieval(format!("malformed response: {}", e)))?;
    match payload {
        Some(PostsPayload::List(posts)) | Some(PostsPayload::Wrapped { posts }) => Ok(posts),
        None => Err(ApiError::Retrieval("no posts in response".to_string())),
    }
}

/// Deleting a bookmark that is already gone is not a failure
fn check_result_code(code: &str) -> Result<(), ApiError> {
    match code {
        "done" => Ok(()),
        "item not found" => {
            log::debug!("bookmark already absent");
            Ok(())
        }
        other => Err(ApiError::Deletion(other.to_string())),
    }
}

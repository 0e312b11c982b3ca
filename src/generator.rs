//! Client side of the generative image service.
//!
//! The service is a collaborator outside this crate's control: it receives a
//! prompt and a size and answers with either a URL or base64 image bytes. The
//! [`ImageGenerator`] trait is the seam; [`HttpGenerator`] talks to an
//! OpenAI-compatible images endpoint, and tests substitute a recording mock.
//!
//! Failures are reported as [`GenerationError`] and never retried here. Retry
//! policy, if any, belongs to whoever calls the pipeline.

use crate::config::{GenerationConfig, SUBJECT_PLACEHOLDER};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key not set: environment variable {0} is empty or missing")]
    MissingApiKey(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// What to ask the service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

/// What the service handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    /// A link the image must be downloaded from.
    Url(String),
    /// Image file bytes, already decoded from base64.
    Bytes(Vec<u8>),
}

/// A source of generated images.
pub trait ImageGenerator: Sync {
    /// Ask the service for one image.
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GenerationError>;

    /// Download an image the service referenced by URL.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, GenerationError>;
}

/// Fill a style template's `{subject}` placeholder.
pub fn build_prompt(template: &str, subject: &str) -> String {
    template.replace(SUBJECT_PLACEHOLDER, subject.trim())
}

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: String,
}

impl<'a> ImagesRequest<'a> {
    fn new(model: &'a str, request: &'a GenerationRequest) -> Self {
        Self {
            model,
            prompt: &request.prompt,
            n: 1,
            size: format!("{}x{}", request.width, request.height),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the first image out of a successful images response body.
pub fn parse_images_response(body: &str) -> Result<GeneratedImage, GenerationError> {
    let response: ImagesResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let datum = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("response has no images".into()))?;

    match (datum.b64_json, datum.url) {
        (Some(b64), _) => BASE64
            .decode(b64.trim())
            .map(GeneratedImage::Bytes)
            .map_err(|e| GenerationError::MalformedResponse(format!("invalid base64: {e}"))),
        (None, Some(url)) if !url.trim().is_empty() => Ok(GeneratedImage::Url(url)),
        _ => Err(GenerationError::MalformedResponse(
            "image has neither url nor b64_json".into(),
        )),
    }
}

/// Turn an images endpoint reply into a result.
///
/// Non-2xx replies become [`GenerationError::Status`] carrying the service's
/// own error message when it sent one.
fn interpret_images_reply(status: u16, body: &str) -> Result<GeneratedImage, GenerationError> {
    if !(200..300).contains(&status) {
        return Err(GenerationError::Status {
            status,
            message: error_message(body),
        });
    }
    parse_images_response(body)
}

/// Best-effort human message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.trim().chars().take(200).collect())
}

/// Blocking HTTP client for an OpenAI-compatible images endpoint.
pub struct HttpGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey(config.api_key_env.clone()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Build a client with the key read from `config.api_key_env`.
    pub fn from_env(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }
}

impl ImageGenerator for HttpGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GenerationError> {
        log::info!(
            "requesting {}x{} image from {}",
            request.width,
            request.height,
            self.endpoint
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ImagesRequest::new(&self.model, request))
            .send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        interpret_images_reply(status, &text)
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        log::debug!("downloading generated image");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message: format!("image download failed ({status})"),
            });
        }
        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(GenerationError::MalformedResponse(
                "downloaded image is empty".into(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

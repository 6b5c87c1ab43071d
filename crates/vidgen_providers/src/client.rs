//! HTTP client for the generation service.

use crate::{
    AudioGenerator, AudioRequest, GeneratedMedia, ImageGenerator, ImageRequest, TextGenerator,
    TextRequest, VideoGenerator, VideoRequest, uses_multipart_image,
};
use async_trait::async_trait;
use derive_getters::Getters;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::instrument;
use vidgen_error::{ProviderError, ProviderErrorKind, VidgenResult};

/// JSON body shared by the text, image and audio routes.
#[derive(Debug, Serialize)]
struct GenerateBody<'a, I: Serialize> {
    model: &'a str,
    inputs: I,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PromptInputs<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct TextInputs<'a> {
    text: &'a str,
}

/// Client for the `/api/generate/*` routes of the generation service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone, Getters)]
pub struct GenerationClient {
    /// Service root, without trailing slash
    base_url: String,
    #[getter(skip)]
    client: Client,
}

impl GenerationClient {
    /// Create a client for the service at `base_url`.
    #[instrument(skip_all)]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!(base_url = %base_url, "Creating generation client");
        Self { base_url, client }
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/api/generate/{}", self.base_url, route)
    }

    /// Send a request and turn non-success statuses into API errors.
    async fn send(request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Request failed");
            ProviderError::new(ProviderErrorKind::Transport(format!("Request failed: {}", e)))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = if text.trim().is_empty() {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown status")
            )
        } else {
            text
        };
        tracing::error!(status = status.as_u16(), message = %message, "Generation service returned error");
        Err(ProviderError::new(ProviderErrorKind::Api {
            status: status.as_u16(),
            message,
        }))
    }

    /// Read a binary body, rejecting empty results.
    async fn read_media(response: Response, stage: &str) -> Result<GeneratedMedia, ProviderError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::Transport(format!(
                "Failed to read response body: {}",
                e
            )))
        })?;

        if bytes.is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::EmptyResult(
                stage.to_string(),
            )));
        }

        tracing::debug!(size = bytes.len(), content_type = ?content_type, "Received media");
        Ok(GeneratedMedia::new(bytes.to_vec(), content_type))
    }

    fn file_part(
        bytes: Vec<u8>,
        file_name: &'static str,
        mime: &str,
    ) -> Result<Part, ProviderError> {
        Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ProviderError::new(ProviderErrorKind::Malformed(e.to_string())))
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    #[instrument(skip(self, request), fields(model = %request.model, prompt_len = request.prompt.len()))]
    async fn generate_text(&self, request: &TextRequest) -> VidgenResult<String> {
        let body = GenerateBody {
            model: &request.model,
            inputs: PromptInputs {
                prompt: &request.prompt,
            },
            key: request.key.as_deref(),
        };
        let response = Self::send(self.client.post(self.endpoint("text")).json(&body)).await?;

        // Body arrives as a plain-text stream; accumulate it all before decoding
        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                ProviderError::new(ProviderErrorKind::Transport(format!("Stream error: {}", e)))
            })?;
            buffer.extend_from_slice(&chunk);
        }

        let text = String::from_utf8(buffer).map_err(|e| {
            ProviderError::new(ProviderErrorKind::Malformed(format!(
                "Script is not valid UTF-8: {}",
                e
            )))
        })?;
        if text.trim().is_empty() {
            let kind = ProviderErrorKind::EmptyResult("text".to_string());
            return Err(ProviderError::new(kind).into());
        }

        tracing::debug!(chars = text.chars().count(), "Generated text");
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "generation-service"
    }
}

#[async_trait]
impl ImageGenerator for GenerationClient {
    #[instrument(skip(self, request), fields(model = %request.model, has_input_image = request.input_image.is_some()))]
    async fn generate_image(&self, request: &ImageRequest) -> VidgenResult<GeneratedMedia> {
        let builder = self.client.post(self.endpoint("image"));
        let builder = if uses_multipart_image(&request.model) {
            let mut form = Form::new()
                .text("model", request.model.clone())
                .text("prompt", request.prompt.clone());
            if let Some(image) = &request.input_image {
                form = form.part(
                    "input_image",
                    Self::file_part(image.clone(), "input.png", "image/png")?,
                );
            }
            if let Some(key) = &request.key {
                form = form.text("key", key.clone());
            }
            builder.multipart(form)
        } else {
            builder.json(&GenerateBody {
                model: &request.model,
                inputs: PromptInputs {
                    prompt: &request.prompt,
                },
                key: request.key.as_deref(),
            })
        };

        let response = Self::send(builder).await?;
        Ok(Self::read_media(response, "image").await?)
    }

    fn provider_name(&self) -> &'static str {
        "generation-service"
    }
}

#[async_trait]
impl AudioGenerator for GenerationClient {
    #[instrument(skip(self, request), fields(model = %request.model, text_len = request.text.len()))]
    async fn generate_audio(&self, request: &AudioRequest) -> VidgenResult<GeneratedMedia> {
        let body = GenerateBody {
            model: &request.model,
            inputs: TextInputs {
                text: &request.text,
            },
            key: request.key.as_deref(),
        };
        let response = Self::send(self.client.post(self.endpoint("audio")).json(&body)).await?;
        Ok(Self::read_media(response, "audio").await?)
    }

    fn provider_name(&self) -> &'static str {
        "generation-service"
    }
}

#[async_trait]
impl VideoGenerator for GenerationClient {
    #[instrument(skip(self, request), fields(model = %request.model, image_size = request.image.len(), audio_size = request.audio.len()))]
    async fn generate_video(&self, request: &VideoRequest) -> VidgenResult<GeneratedMedia> {
        let mut form = Form::new()
            .part(
                "image",
                Self::file_part(request.image.clone(), "image.png", "image/png")?,
            )
            .part(
                "audio",
                Self::file_part(request.audio.clone(), "audio.mp3", "audio/mpeg")?,
            )
            .text("model", request.model.clone());
        if let Some(key) = &request.key {
            form = form.text("key", key.clone());
        }

        let response =
            Self::send(self.client.post(self.endpoint("video")).multipart(form)).await?;
        Ok(Self::read_media(response, "video").await?)
    }

    fn provider_name(&self) -> &'static str {
        "generation-service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_omits_missing_key() {
        let body = GenerateBody {
            model: "gpt-4o",
            inputs: PromptInputs { prompt: "Hi" },
            key: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "gpt-4o", "inputs": {"prompt": "Hi"}})
        );
    }

    #[test]
    fn test_audio_body_uses_text_input() {
        let body = GenerateBody {
            model: "eleven_multilingual_v2",
            inputs: TextInputs { text: "Hello" },
            key: Some("sk-user"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"]["text"], "Hello");
        assert_eq!(json["key"], "sk-user");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GenerationClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.endpoint("video"),
            "http://localhost:3000/api/generate/video"
        );
    }
}

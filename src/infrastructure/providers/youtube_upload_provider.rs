use super::synthesis_provider::ProviderError;
use super::upload_provider::{ChunkAck, UploadProvider, UploadSessionHandle};
use crate::domain::upload::UploadMetadata;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LOCATION, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
const RESUME_INCOMPLETE: u16 = 308;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet<'a> {
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_audio_language: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus<'a> {
    privacy_status: &'a str,
}

#[derive(Debug, Serialize)]
struct VideoResource<'a> {
    snippet: VideoSnippet<'a>,
    status: VideoStatus<'a>,
}

#[derive(Debug, Deserialize)]
struct UploadedVideo {
    id: Option<String>,
}

/// Resumable upload against the YouTube Data API upload protocol.
///
/// The bearer token is supplied by configuration; acquiring it is someone else's job.
pub struct YouTubeUploadProvider {
    access_token: String,
    api_base: String,
    http_client: reqwest::Client,
}

impl YouTubeUploadProvider {
    pub fn new(access_token: String) -> Self {
        Self::with_api_base(access_token, DEFAULT_API_BASE.to_string())
    }

    pub fn with_api_base(access_token: String, api_base: String) -> Self {
        Self {
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ProviderError::from_status(status, body, retry_after)
    }
}

/// `Content-Range` for a chunk, or the status-query form for an empty body.
fn content_range(offset: u64, len: usize, total_size: u64) -> String {
    if len == 0 {
        format!("bytes */{}", total_size)
    } else {
        format!("bytes {}-{}/{}", offset, offset + len as u64 - 1, total_size)
    }
}

/// A 308 carries `Range: bytes=0-N`; the host has N+1 bytes. No header means nothing stored.
fn parse_accepted_offset(headers: &HeaderMap) -> Result<u64, ProviderError> {
    let Some(range) = headers.get("range") else {
        return Ok(0);
    };
    let range = range
        .to_str()
        .map_err(|_| ProviderError::fatal("Range header is not valid ASCII"))?;
    let last = range
        .trim()
        .strip_prefix("bytes=")
        .and_then(|r| r.split('-').nth(1))
        .and_then(|end| end.trim().parse::<u64>().ok())
        .ok_or_else(|| ProviderError::fatal(format!("Malformed Range header: {}", range)))?;
    Ok(last + 1)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn image_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl UploadProvider for YouTubeUploadProvider {
    async fn create_session(
        &self,
        metadata: &UploadMetadata,
        file_size: u64,
    ) -> Result<UploadSessionHandle, ProviderError> {
        if metadata.title.trim().is_empty() {
            return Err(ProviderError::fatal("Upload metadata requires a title"));
        }

        let resource = VideoResource {
            snippet: VideoSnippet {
                title: &metadata.title,
                description: &metadata.description,
                tags: &metadata.tags,
                category_id: metadata.category_id.as_deref(),
                default_audio_language: metadata.language.as_deref(),
            },
            status: VideoStatus {
                privacy_status: &metadata.privacy_status,
            },
        };

        let url = format!(
            "{}/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status",
            self.api_base
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Length", file_size.to_string())
            .header("X-Upload-Content-Type", metadata.content_type.as_str())
            .json(&resource)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or_else(|| ProviderError::retryable("Session created without an upload location"))?;

        let session_token = reqwest::Url::parse(&location)
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(k, _)| k == "upload_id")
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or_else(|| location.clone());

        tracing::debug!(file_size = file_size, "Resumable upload session created");

        Ok(UploadSessionHandle {
            session_token,
            upload_endpoint: location,
        })
    }

    async fn send_chunk(
        &self,
        session: &UploadSessionHandle,
        offset: u64,
        bytes: &[u8],
        total_size: u64,
    ) -> Result<ChunkAck, ProviderError> {
        let response = self
            .http_client
            .put(&session.upload_endpoint)
            .bearer_auth(&self.access_token)
            .header(CONTENT_LENGTH, bytes.len().to_string())
            .header(CONTENT_RANGE, content_range(offset, bytes.len(), total_size))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        let status = response.status().as_u16();

        if status == RESUME_INCOMPLETE {
            let accepted_offset = parse_accepted_offset(response.headers())?;
            return Ok(ChunkAck {
                accepted_offset,
                resource_id: None,
            });
        }

        if response.status().is_success() {
            let video: UploadedVideo = response.json().await.map_err(|e| {
                ProviderError::retryable(format!("Failed to parse upload response: {}", e))
            })?;
            return Ok(ChunkAck {
                accepted_offset: total_size,
                resource_id: video.id,
            });
        }

        Err(Self::error_from_response(response).await)
    }

    async fn attach_artifact(&self, resource_id: &str, artifact: &Path) -> Result<(), ProviderError> {
        let image = tokio::fs::read(artifact).await.map_err(|e| {
            ProviderError::fatal(format!("Cannot read {}: {}", artifact.display(), e))
        })?;

        let url = format!(
            "{}/upload/youtube/v3/thumbnails/set?videoId={}",
            self.api_base,
            urlencoding::encode(resource_id)
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, image_content_type(artifact))
            .body(image)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(())
    }
}

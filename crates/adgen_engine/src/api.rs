use std::time::Duration;

use adgen_core::{AdResult, Characteristic, TaskId};
use adgen_logging::adgen_debug;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{JOB_FAILED_FALLBACK, MISSING_TASK_ID_MESSAGE};
use crate::{ImageUpload, LifecycleError, PollStatus};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Bounds one HTTP exchange, not the lifetime of a task.
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// The two endpoints of the generation backend.
#[async_trait::async_trait]
pub trait GenerationApi: Send + Sync {
    /// `POST /generate-ad`; yields the server-assigned task id.
    async fn submit(&self, upload: &ImageUpload) -> Result<TaskId, LifecycleError>;

    /// `GET /results/{task_id}`.
    async fn poll(&self, task_id: &str) -> Result<PollStatus, LifecycleError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    characteristics: serde_json::Map<String, Value>,
    ad_text: String,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| format!("Invalid server address {}: {err}", self.settings.base_url))?;
        url.path_segments_mut()
            .map_err(|()| format!("Invalid server address {}", self.settings.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl GenerationApi for ReqwestApi {
    async fn submit(&self, upload: &ImageUpload) -> Result<TaskId, LifecycleError> {
        let url = self.endpoint(&["generate-ad"]).map_err(LifecycleError::Submission)?;
        let image = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.media_type)
            .map_err(|err| LifecycleError::Submission(err.to_string()))?;
        let form = Form::new()
            .part("image", image)
            .text("style", upload.style.as_str());

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| LifecycleError::Submission(transport_message(&err)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = read_detail(response).await;
            return Err(LifecycleError::Submission(
                detail.unwrap_or_else(|| format!("Server error: {}", status.as_u16())),
            ));
        }

        let body: SubmitBody = response.json().await.map_err(|err| {
            LifecycleError::Submission(format!("Could not read the submission response: {err}"))
        })?;
        match body.task_id {
            Some(task_id) if !task_id.trim().is_empty() => Ok(task_id),
            _ => Err(LifecycleError::Submission(MISSING_TASK_ID_MESSAGE.to_string())),
        }
    }

    async fn poll(&self, task_id: &str) -> Result<PollStatus, LifecycleError> {
        let url = self
            .endpoint(&["results", task_id])
            .map_err(LifecycleError::PollTransport)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| LifecycleError::PollTransport(transport_message(&err)))?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(PollStatus::Pending),
            StatusCode::OK => {
                let body = response.bytes().await.map_err(|err| {
                    LifecycleError::PollTransport(format!("Could not read the result: {err}"))
                })?;
                parse_result(&body).map(PollStatus::Ready)
            }
            status => {
                let message = read_detail(response)
                    .await
                    .unwrap_or_else(|| JOB_FAILED_FALLBACK.to_string());
                Err(LifecycleError::JobFailed {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Parses a success body, keeping characteristics in the order they were sent.
pub(crate) fn parse_result(body: &[u8]) -> Result<AdResult, LifecycleError> {
    let parsed: ResultBody = serde_json::from_slice(body).map_err(|err| {
        LifecycleError::PollTransport(format!("The server sent a malformed result: {err}"))
    })?;
    let characteristics = parsed
        .characteristics
        .into_iter()
        .map(|(name, value)| Characteristic {
            name,
            value: match value {
                Value::String(text) => text,
                other => other.to_string(),
            },
        })
        .collect();
    Ok(AdResult {
        characteristics,
        ad_text: parsed.ad_text,
    })
}

/// The `detail` message of an error body, when it is a non-empty string.
async fn read_detail(response: reqwest::Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    match serde_json::from_slice::<ErrorBody>(&bytes) {
        Ok(ErrorBody {
            detail: Some(Value::String(detail)),
        }) if !detail.trim().is_empty() => Some(detail),
        Ok(_) => None,
        Err(err) => {
            adgen_debug!("Ignoring unreadable error body: {}", err);
            None
        }
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return format!("The server did not answer in time: {err}");
    }
    format!("Could not reach the server: {err}")
}

use std::time::Duration;

use board_logging::board_debug;
use serde::de::DeserializeOwned;

use crate::{FailureKind, FetchError, JobLogs, JobRecord, JobStatuses};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            max_bytes: 4 * 1024 * 1024,
        }
    }
}

/// The three backend URLs the board reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub jobs_url: String,
    pub statuses_url: String,
    pub logs_url: String,
}

impl Endpoints {
    /// First endpoint that is not an absolute URL, as `(field, value)`.
    pub fn invalid_field(&self) -> Option<(&'static str, &str)> {
        [
            ("jobs_url", self.jobs_url.as_str()),
            ("statuses_url", self.statuses_url.as_str()),
            ("logs_url", self.logs_url.as_str()),
        ]
        .into_iter()
        .find(|(_, url)| reqwest::Url::parse(url).is_err())
    }
}

#[async_trait::async_trait]
pub trait JobsApi: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<JobRecord>, FetchError>;

    async fn fetch_statuses(&self, job_ids: &[String]) -> Result<JobStatuses, FetchError>;

    async fn fetch_logs(&self, job_ids: &[String]) -> Result<JobLogs, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobsApi {
    client: reqwest::Client,
    endpoints: Endpoints,
    settings: FetchSettings,
}

impl ReqwestJobsApi {
    pub fn new(endpoints: Endpoints, settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            endpoints,
            settings,
        })
    }

    /// GETs `url`, optionally with `?job_ids=<comma-joined ids>`, and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        job_ids: Option<&[String]>,
    ) -> Result<T, FetchError> {
        let mut parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if let Some(job_ids) = job_ids {
            parsed
                .query_pairs_mut()
                .append_pair("job_ids", &job_ids.join(","));
        }
        board_debug!("GET {}", parsed);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if body.len() as u64 > self.settings.max_bytes {
            return Err(self.too_large(body.len() as u64));
        }

        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl JobsApi for ReqwestJobsApi {
    async fn list_jobs(&self) -> Result<Vec<JobRecord>, FetchError> {
        self.get_json(&self.endpoints.jobs_url, None).await
    }

    async fn fetch_statuses(&self, job_ids: &[String]) -> Result<JobStatuses, FetchError> {
        self.get_json(&self.endpoints.statuses_url, Some(job_ids))
            .await
    }

    async fn fetch_logs(&self, job_ids: &[String]) -> Result<JobLogs, FetchError> {
        self.get_json(&self.endpoints.logs_url, Some(job_ids)).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::{ApiError, DownloadRequest, FailureKind, StatusResponse};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Origin the `api/...` paths are resolved against.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The four backend endpoints plus login.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Returns the backend's `login_status`; zero means accepted.
    async fn login(&self, username: &str, password: &str) -> Result<i64, ApiError>;

    async fn projects(&self) -> Result<Vec<String>, ApiError>;

    async fn subjects(&self, project_id: &str) -> Result<Vec<String>, ApiError>;

    /// Starts a job. The acknowledgment body is opaque.
    async fn submit_download(
        &self,
        request: &DownloadRequest,
    ) -> Result<serde_json::Value, ApiError>;

    async fn download_status(&self, job_id: Uuid) -> Result<StatusResponse, ApiError>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    login_status: i64,
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot be used as a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(response).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::MalformedResponse, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<i64, ApiError> {
        let url = self.endpoint(&["api", "login"])?;
        let response = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(response).await?;
        let parsed: LoginResponse = serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::MalformedResponse, err.to_string()))?;
        Ok(parsed.login_status)
    }

    async fn projects(&self) -> Result<Vec<String>, ApiError> {
        self.get_json(self.endpoint(&["api", "projects"])?).await
    }

    async fn subjects(&self, project_id: &str) -> Result<Vec<String>, ApiError> {
        self.get_json(self.endpoint(&["api", "projects", project_id])?)
            .await
    }

    async fn submit_download(
        &self,
        request: &DownloadRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["api", "download"])?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(response).await?;
        // Not part of the contract; keep whatever came back for the log.
        Ok(serde_json::from_slice(&body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
        }))
    }

    async fn download_status(&self, job_id: Uuid) -> Result<StatusResponse, ApiError> {
        let job = job_id.hyphenated().to_string();
        self.get_json(self.endpoint(&["api", "download", "status", &job])?)
            .await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::MalformedResponse, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

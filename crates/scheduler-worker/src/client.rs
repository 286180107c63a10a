//! HTTP client for the dispatch protocol, grounded on
//! `sem_os_client::http::HttpClient`: one shared `reqwest::Client`, JSON
//! request/response bodies, status-code-based error mapping.

use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

pub struct SchedulerClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    worker_id: &'a str,
    cores: u32,
}

#[derive(Debug, Serialize)]
struct HeartbeatRequest<'a> {
    worker_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct NextRequest<'a> {
    pub worker_id: &'a str,
    pub core_id: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextResponse {
    Ok {
        job_id: String,
        execution_ms: Option<u64>,
        slice_ms: Option<u64>,
        remaining_before_ms: Option<u64>,
        #[allow(dead_code)]
        priority: Option<i64>,
        #[allow(dead_code)]
        arrival_ms: Option<u64>,
    },
    Wait,
    NoRun,
    Done,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DoneResponse {
    Ok,
    NoRun,
    Done,
}

#[derive(Debug, Serialize)]
pub struct DoneRequest<'a> {
    pub worker_id: &'a str,
    pub core_id: u32,
    pub job_id: &'a str,
    pub started_wall_ms: i64,
    pub finished_wall_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ran_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_after_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<f64>,
}

impl SchedulerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &Req,
    ) -> Result<Resp, WorkerError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|source| WorkerError::Transport { endpoint, source })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(WorkerError::Rejected {
                endpoint,
                status,
                body,
            });
        }

        resp.json::<Resp>()
            .await
            .map_err(|source| WorkerError::Decode { endpoint, source })
    }

    pub async fn register(&self, worker_id: &str, cores: u32) -> Result<OkResponse, WorkerError> {
        self.post_json("/register", "/register", &RegisterRequest { worker_id, cores })
            .await
    }

    pub async fn heartbeat(&self, worker_id: &str) -> Result<OkResponse, WorkerError> {
        self.post_json("/heartbeat", "/heartbeat", &HeartbeatRequest { worker_id })
            .await
    }

    pub async fn next(
        &self,
        worker_id: &str,
        core_id: u32,
        timeout_ms: u64,
    ) -> Result<NextResponse, WorkerError> {
        self.post_json(
            "/next",
            "/next",
            &NextRequest {
                worker_id,
                core_id,
                timeout_ms,
            },
        )
        .await
    }

    pub async fn done(&self, report: DoneRequest<'_>) -> Result<DoneResponse, WorkerError> {
        self.post_json("/done", "/done", &report).await
    }
}

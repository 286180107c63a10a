//! Transport-facing error type for the worker's HTTP client, mirrored on
//! `sem_os_client::http::HttpClient`'s status-code-to-error mapping.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("scheduler rejected {endpoint} with HTTP {status}: {body}")]
    Rejected {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

//! Dispatch-internal error taxonomy with an HTTP status mapping.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("bad parameter: {0}")]
    BadParameter(String),

    #[error("no healthy workers available")]
    NoWorker,

    #[error("selected worker's pending queue is full")]
    Overloaded,

    #[error("worker unreachable: {0}")]
    WorkerUnreachable(String),

    #[error("worker did not respond within the read deadline")]
    WorkerTimeout,

    #[error("worker protocol error: {0}")]
    WorkerProtocolError(String),
}

impl DispatchError {
    /// Status code a handler should translate this error into.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) => 400,
            Self::BadParameter(_) => 400,
            Self::NoWorker => 503,
            Self::Overloaded => 503,
            Self::WorkerUnreachable(_) => 502,
            Self::WorkerTimeout => 504,
            Self::WorkerProtocolError(_) => 502,
        }
    }
}

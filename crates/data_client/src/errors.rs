use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Page {page} failed with status {status}")]
    Page { page: u32, status: u16 },

    #[error("Record source error: {0}")]
    Source(#[from] SharedError),

    #[error("Queue task failed: {0}")]
    TaskFailed(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

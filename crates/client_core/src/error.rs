use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("api base url is not configured")]
    MissingBaseUrl,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(err) if err.is_timeout())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only PDF files are allowed.")]
    InvalidType { mime_type: String },
    #[error("File size exceeds 10MB.")]
    TooLarge { size_bytes: u64 },
    #[error("{0}")]
    Rejected(String),
    #[error("Upload failed: {0}")]
    Client(#[from] ClientError),
}

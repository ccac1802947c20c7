use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Server returned error status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("No API key configured; set {var}")]
    MissingApiKey { var: &'static str },

    #[error("Model reply contained no text")]
    EmptyResponse,
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Invalid matrix configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("No {0} available to export")]
    EmptyExport(&'static str),
    #[error("Failed to copy: {0}")]
    Clipboard(String),
    #[error("Failed to download: {0}")]
    Download(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("document parse failed: {0}")]
    Document(String),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("row width does not match column count: {0}")]
    RowWidth(String),

    #[error("no rows to process for {0}")]
    EmptyResult(&'static str),
}

pub type Result<T> = std::result::Result<T, EtlError>;

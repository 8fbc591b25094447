use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid hero key: {key}")]
    InvalidHero { key: String },

    #[error("Unknown map: {0} (use --list-maps to see valid map keys)")]
    UnknownMap(String),

    #[error("No heroes given. Pass a comma-separated list such as \"ana, mercy\"")]
    NoHeroes,

    #[error("Hero catalog could not be loaded: {0}")]
    CatalogLoadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid colour {0:?}, expected #RGB or #RRGGBB")]
    Color(String),

    #[error("could not install log subscriber: {0}")]
    Logging(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrokeMatchError {
    #[error("Malformed Input: {0}")]
    MalformedInput(String),

    #[error("Corrupt Model: {0}")]
    CorruptModel(String),

    #[error("Empty Input: the writing has no strokes")]
    EmptyInput,

    #[error("No Samples: nothing to train on")]
    NoSamples,

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),
}

pub type SmResult<T> = Result<T, StrokeMatchError>;

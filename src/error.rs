use crate::quiz::Category;

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("failed to read the question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse the question bank: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid question record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("no question found for {category} / {topic}")]
    NotFound { category: Category, topic: String },
}

pub type Result<T> = std::result::Result<T, CoachError>;

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("{0}")]
    ChatGPT(#[from] chatgpt::err::Error),

    #[error("{0}")]
    Unavailable(String),
}

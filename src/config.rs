use std::env;
use std::path::PathBuf;

pub const QUESTION_BANK_VAR: &str = "QUESTION_BANK";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_QUESTION_BANK: &str = "questions.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub question_bank: PathBuf,
}

impl Settings {
    /// Reads start-up settings. Call after `dotenv()` so a `.env` file is honoured.
    pub fn from_env() -> Self {
        let question_bank = env::var(QUESTION_BANK_VAR)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_QUESTION_BANK.to_string());

        Self {
            question_bank: PathBuf::from(question_bank),
        }
    }
}

/// The remote feedback credential. Read on every request, never cached.
pub fn openai_api_key() -> Option<String> {
    non_empty(env::var(OPENAI_API_KEY_VAR).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

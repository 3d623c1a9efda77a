pub mod heuristic;
pub mod remote;
pub mod templates;

use async_trait::async_trait;
use std::fmt;

use crate::config;
use crate::error::Result;
use crate::quiz::QuestionRecord;

pub use heuristic::HeuristicCoach;
pub use remote::{CompletionClient, RemoteCoach};

/// A way of turning a student's answer into feedback text.
#[async_trait]
pub trait Coach: Send + Sync {
    async fn feedback(&self, answer: &str, question: &QuestionRecord) -> String;
}

/// Structured feedback for one submission. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackResult {
    pub covered: Vec<String>,
    pub missing: Vec<String>,
    pub coaching: Vec<String>,
    pub numeric_check: Option<String>,
    pub model_answer: String,
    pub next_steps: Vec<String>,
    pub checklist: Vec<String>,
}

impl fmt::Display for FeedbackResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.covered.len() + self.missing.len();
        writeln!(f, "Criteria met: {}/{}", self.covered.len(), total)?;

        writeln!(f, "\n✅ Strengths")?;
        if self.covered.is_empty() {
            writeln!(f, "- No marking criteria were clearly addressed yet.")?;
        }
        for criterion in &self.covered {
            writeln!(f, "- {}", criterion)?;
        }

        writeln!(f, "\n⚠️ Marks Lost (mapped to criteria)")?;
        if self.missing.is_empty() {
            writeln!(f, "- Nothing obvious. Every criterion has supporting keywords.")?;
        }
        for criterion in &self.missing {
            writeln!(f, "- {}", criterion)?;
        }

        writeln!(f, "\n🧱 Build It Up")?;
        for (i, step) in self.coaching.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, step)?;
        }
        if let Some(check) = &self.numeric_check {
            writeln!(f, "- {}", check)?;
        }

        writeln!(f, "\n🧠 Exemplar Response")?;
        writeln!(f, "{}", self.model_answer)?;

        writeln!(f, "\n🔧 Next Steps")?;
        for step in &self.next_steps {
            writeln!(f, "- {}", step)?;
        }

        writeln!(f, "\n☑️ Final Checklist")?;
        for item in &self.checklist {
            writeln!(f, "- [ ] {}", item)?;
        }
        Ok(())
    }
}

/// Feedback for one submission. The remote coach is used when a credential is
/// configured at call time, the local heuristic otherwise.
pub async fn respond(answer: &str, question: &QuestionRecord) -> String {
    respond_with(config::openai_api_key, remote::chat_client, answer, question).await
}

/// `api_key` is consulted once per call; `connect` builds the remote client from it.
pub async fn respond_with<K, F, C>(
    api_key: K,
    connect: F,
    answer: &str,
    question: &QuestionRecord,
) -> String
where
    K: FnOnce() -> Option<String>,
    F: FnOnce(String) -> Result<C>,
    C: CompletionClient,
{
    let Some(api_key) = api_key() else {
        log::debug!("No {} set, using heuristic feedback", config::OPENAI_API_KEY_VAR);
        return HeuristicCoach.feedback(answer, question).await;
    };

    match connect(api_key) {
        Ok(client) => {
            log::debug!("Using remote feedback");
            RemoteCoach::new(client).feedback(answer, question).await
        }
        Err(err) => {
            log::warn!("Could not build the completion client: {}", err);
            remote::with_diagnostic(&err.to_string(), answer, question)
        }
    }
}

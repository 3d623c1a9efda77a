use async_trait::async_trait;
use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::{ChatMessage, CompletionResponse, Role};

use crate::coach::{Coach, HeuristicCoach};
use crate::error::{CoachError, Result};
use crate::quiz::QuestionRecord;

const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.2;

/// Anything that can turn a system directive and a user message into one completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[async_trait]
impl CompletionClient for ChatGPT {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let history = vec![
            ChatMessage {
                role: Role::System,
                content: system.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: user.to_string(),
            },
        ];

        let response: CompletionResponse = self.send_history(&history).await?;
        let content = response.message().clone().content;
        log::debug!("Completion: {:?}", content);

        if content.trim().is_empty() {
            return Err(CoachError::Unavailable("the completion was empty".to_string()));
        }
        Ok(content)
    }
}

pub fn chat_client(api_key: String) -> Result<ChatGPT> {
    let mut gpt = ChatGPT::new(api_key)?;
    gpt.config.engine = ChatGPTEngine::Custom(MODEL);
    gpt.config.temperature = TEMPERATURE;
    Ok(gpt)
}

pub fn system_prompt(question: &QuestionRecord) -> String {
    format!(
        "You are an experienced NSW HSC Chemistry marker.
Tone: warm, specific, encouraging, and student-friendly.
Always return sections with these EXACT headings in this order:
1) ✅ Strengths
2) ⚠️ Marks Lost (mapped to criteria)
3) 🧱 Build It Up (step-by-step coaching using simple language in this sequence: identify → describe → explain → conclude; do not use any rubric jargon)
4) 🧠 Exemplar Response
5) 🔧 Next Steps (3 bullet points)
6) ☑️ Final Checklist

Target group: {}. Topic: {}. {}
Focus on units/sig figs and explicit links back to the question where relevant.
Keep it concise but not superficial; make it feel like feedback from a real teacher.",
        question.category, question.topic, question.target_note
    )
}

pub fn user_prompt(question: &QuestionRecord, answer: &str) -> String {
    let criteria = question
        .criteria
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "QUESTION:\n{}\n\nCRITERIA:\n{}\n\nSTUDENT ANSWER:\n{}",
        question.prompt, criteria, answer
    )
}

/// Heuristic feedback behind a one-line note explaining why the remote coach was skipped.
pub fn with_diagnostic(error: &str, answer: &str, question: &QuestionRecord) -> String {
    format!(
        "⚠️ LLM error: {}\n\n{}",
        error,
        HeuristicCoach.assess(answer, question)
    )
}

pub struct RemoteCoach<C> {
    client: C,
}

impl<C: CompletionClient> RemoteCoach<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: CompletionClient> Coach for RemoteCoach<C> {
    async fn feedback(&self, answer: &str, question: &QuestionRecord) -> String {
        log::info!("Requesting remote feedback for {:?}", question.topic);

        let system = system_prompt(question);
        let user = user_prompt(question, answer);

        match self.client.complete(&system, &user).await {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Remote feedback failed, falling back to heuristic: {}", err);
                with_diagnostic(&err.to_string(), answer, question)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Category;
    use std::sync::Mutex;

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _: &str, _: &str) -> Result<String> {
            Err(CoachError::Unavailable("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok("✅ Strengths\n- Great start!".to_string())
        }
    }

    fn haber() -> QuestionRecord {
        QuestionRecord::new(
            Category::Top,
            "Equilibrium / Haber",
            "Explain how increasing temperature affects the yield of ammonia. (6 marks)",
            vec![
                "Identifies the forward reaction as exothermic.".to_string(),
                "Links the shift to ammonia yield.".to_string(),
            ],
            "Aim: Secure high Band 5 / push to Band 6.",
        )
    }

    #[tokio::test]
    async fn completion_is_returned_verbatim() {
        let coach = RemoteCoach::new(RecordingClient::default());
        let text = coach.feedback("It is exothermic.", &haber()).await;
        assert_eq!(text, "✅ Strengths\n- Great start!");
    }

    #[tokio::test]
    async fn prompts_embed_question_criteria_and_answer() {
        let coach = RemoteCoach::new(RecordingClient::default());
        coach.feedback("It is exothermic.", &haber()).await;

        let seen = coach.client.seen.lock().unwrap();
        let (system, user) = &seen[0];
        assert!(system.contains("Target group: Top (Band 5/6). Topic: Equilibrium / Haber."));
        assert!(system.contains("6) ☑️ Final Checklist"));
        assert!(user.contains("QUESTION:\nExplain how increasing temperature"));
        assert!(user.contains("- Identifies the forward reaction as exothermic.\n- Links the shift"));
        assert!(user.ends_with("STUDENT ANSWER:\nIt is exothermic."));
    }

    #[tokio::test]
    async fn failure_falls_back_to_heuristic_with_a_diagnostic_line() {
        let question = haber();
        let answer = "The forward reaction is exothermic.";

        let text = RemoteCoach::new(FailingClient).feedback(answer, &question).await;
        let direct = HeuristicCoach.feedback(answer, &question).await;

        assert_eq!(text, format!("⚠️ LLM error: connection refused\n\n{}", direct));
    }
}

pub mod bank;

use std::fmt;

pub use bank::QuestionBank;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Category {
    #[serde(rename = "Top (Band 5/6)")]
    Top,
    #[serde(rename = "Middle (Band 4 security)")]
    Middle,
    #[serde(rename = "Lower (limit Band 2)")]
    Lower,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Top, Category::Middle, Category::Lower];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Top => "Top (Band 5/6)",
            Category::Middle => "Middle (Band 4 security)",
            Category::Lower => "Lower (limit Band 2)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label.trim())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuestionRecord {
    pub category: Category,
    pub topic: String,
    pub prompt: String,
    pub criteria: Vec<String>,
    #[serde(rename = "band_target")]
    pub target_note: String,
}

impl QuestionRecord {
    pub fn new(
        category: Category,
        topic: impl Into<String>,
        prompt: impl Into<String>,
        criteria: Vec<String>,
        target_note: impl Into<String>,
    ) -> Self {
        Self {
            category,
            topic: topic.into(),
            prompt: prompt.into(),
            criteria,
            target_note: target_note.into(),
        }
    }

    /// Text shown to the student when the question is handed out.
    pub fn card(&self) -> String {
        format!(
            "{} · {}\n\n{}\n\n{}",
            self.category, self.topic, self.prompt, self.target_note
        )
    }
}

/// The question currently on screen for one chat, plus the student's latest draft.
/// Replaced whole whenever a new question is fetched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub question: QuestionRecord,
    pub answer: Option<String>,
}

impl Session {
    pub fn new(question: QuestionRecord) -> Self {
        Self {
            question,
            answer: None,
        }
    }

    pub fn with_answer(mut self, answer: &str) -> Self {
        let answer = answer.trim();
        self.answer = (!answer.is_empty()).then(|| answer.to_string());
        self
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }
}

//! Local feedback: keyword overlap between the answer and each rubric criterion.
//!
//! A criterion counts as covered when any of its significant words (letter runs
//! longer than four characters) occurs anywhere in the lower-cased answer. There is
//! no stemming, synonym or negation handling, so mentioning a keyword out of context
//! still counts.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use crate::coach::{templates, Coach, FeedbackResult};
use crate::quiz::QuestionRecord;

const MIN_SIGNIFICANT_LEN: usize = 5;

const TITRATION_MARKERS: [&str; 2] = ["titrat", "neutralis"];
// 0.100 mol/L × 0.0300 L = 0.00300 mol NaOH = n(HCl); 0.00300 mol ÷ 0.0250 L
const TITRATION_EXPECTED: f64 = 0.120;
const TITRATION_TOLERANCE: f64 = 0.02;

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("word pattern is valid"))
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)").expect("number pattern is valid"))
}

pub fn significant_tokens(criterion: &str) -> Vec<String> {
    word_regex()
        .find_iter(criterion)
        .map(|m| m.as_str())
        .filter(|word| word.len() >= MIN_SIGNIFICANT_LEN)
        .map(|word| word.to_lowercase())
        .collect()
}

/// `answer_lower` must already be lower-cased.
fn is_covered(criterion: &str, answer_lower: &str) -> bool {
    significant_tokens(criterion)
        .iter()
        .any(|token| answer_lower.contains(token.as_str()))
}

fn is_titration(prompt: &str) -> bool {
    let prompt = prompt.to_lowercase();
    TITRATION_MARKERS.iter().any(|marker| prompt.contains(marker))
}

pub fn titration_check(answer: &str) -> String {
    let value = number_regex()
        .find(answer)
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match value {
        Some(value) if (value - TITRATION_EXPECTED).abs() <= TITRATION_TOLERANCE => format!(
            "Numeric check: {} is close to the expected 0.120 mol/L. Make sure you show units and 3 significant figures.",
            value
        ),
        Some(value) => format!(
            "Numeric check: {} is not close to the expected concentration. Recheck n = C × V (convert mL to L) and the 1:1 mole ratio.",
            value
        ),
        None => "Numeric check: no number found. Give a numeric final answer with units (e.g. in mol/L)."
            .to_string(),
    }
}

fn coaching_steps(question: &QuestionRecord, missing: &[String]) -> Vec<String> {
    let explain = match missing.first() {
        Some(criterion) => format!("Explain: say why it happens, and make sure you cover: {}", criterion),
        None => "Explain: keep every claim tied to a reason, using 'because' and 'therefore'.".to_string(),
    };

    vec![
        format!("Identify: name the key chemistry idea the question is about ({}).", question.topic),
        "Describe: state what happens, using the correct scientific terms.".to_string(),
        explain,
        "Conclude: finish with one sentence that directly answers the question.".to_string(),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCoach;

impl HeuristicCoach {
    pub fn assess(&self, answer: &str, question: &QuestionRecord) -> FeedbackResult {
        let answer_lower = answer.to_lowercase();

        let (covered, missing): (Vec<String>, Vec<String>) = question
            .criteria
            .iter()
            .cloned()
            .partition(|criterion| is_covered(criterion, &answer_lower));

        let numeric_check = is_titration(&question.prompt).then(|| titration_check(answer));

        FeedbackResult {
            coaching: coaching_steps(question, &missing),
            covered,
            missing,
            numeric_check,
            model_answer: templates::model_answer(&question.topic).to_string(),
            next_steps: templates::next_steps(&question.target_note)
                .iter()
                .map(|s| s.to_string())
                .collect(),
            checklist: templates::checklist().iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Coach for HeuristicCoach {
    async fn feedback(&self, answer: &str, question: &QuestionRecord) -> String {
        self.assess(answer, question).to_string()
    }
}

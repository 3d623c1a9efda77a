use rand::seq::SliceRandom;
use rand::thread_rng;
use rand::Rng;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};

use crate::error::BankError;
use crate::quiz::{Category, QuestionRecord};

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pub questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn new(file: File) -> Result<Self, BankError> {
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BankError> {
        let questions: Vec<QuestionRecord> = serde_json::from_reader(reader)?;
        Self::from_records(questions)
    }

    #[cfg(test)]
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<QuestionRecord> = serde_json::from_str(json)?;
        Self::from_records(questions)
    }

    pub fn from_records(questions: Vec<QuestionRecord>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::InvalidRecord {
                index: 0,
                reason: "the bank has no questions".to_string(),
            });
        }

        for (index, question) in questions.iter().enumerate() {
            let reason = if question.prompt.trim().is_empty() {
                "prompt is empty"
            } else if question.criteria.is_empty() {
                "criteria list is empty"
            } else if question.topic.trim().is_empty() {
                "topic is empty"
            } else {
                continue;
            };
            return Err(BankError::InvalidRecord {
                index,
                reason: reason.to_string(),
            });
        }

        Ok(Self { questions })
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        self.questions.iter().map(|q| q.category).collect()
    }

    /// Topics filed under `category`. Empty when the category has no questions.
    pub fn topics(&self, category: Category) -> BTreeSet<&str> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .map(|q| q.topic.as_str())
            .collect()
    }

    pub fn pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        category: Category,
        topic: &str,
    ) -> Result<&QuestionRecord, BankError> {
        let candidates = self
            .questions
            .iter()
            .filter(|q| q.category == category && q.topic == topic)
            .collect::<Vec<_>>();

        candidates
            .choose(rng)
            .copied()
            .ok_or_else(|| BankError::NotFound {
                category,
                topic: topic.to_string(),
            })
    }

    pub fn pick_random(&self, category: Category, topic: &str) -> Result<&QuestionRecord, BankError> {
        let question = self.pick(&mut thread_rng(), category, topic)?;
        log::debug!("Picked question for {} / {}", category, topic);
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shipped_bank() -> QuestionBank {
        QuestionBank::from_json(include_str!("../../questions.json")).unwrap()
    }

    fn record(category: Category, topic: &str, prompt: &str) -> QuestionRecord {
        QuestionRecord::new(
            category,
            topic,
            prompt,
            vec!["States the answer clearly.".to_string()],
            "Goal: Maximise chance of Band 4.",
        )
    }

    #[test]
    fn shipped_bank_covers_every_band() {
        let bank = shipped_bank();
        assert_eq!(bank.questions.len(), 6);
        assert_eq!(
            bank.categories().into_iter().collect::<Vec<_>>(),
            vec![Category::Top, Category::Middle, Category::Lower]
        );
    }

    #[test]
    fn topics_are_scoped_to_their_category() {
        let bank = shipped_bank();
        let middle = bank.topics(Category::Middle);
        assert_eq!(middle.len(), 2);
        assert!(middle.contains("Acid–Base Titration"));
        assert!(middle.contains("pH Basics"));
        assert!(!middle.contains("Isotopes"));
    }

    #[test]
    fn topics_of_an_unused_category_is_empty() {
        let bank = QuestionBank::from_records(vec![record(Category::Top, "Catalysis", "Assess catalysts.")])
            .unwrap();
        assert!(bank.topics(Category::Lower).is_empty());
    }

    #[test]
    fn pick_only_returns_matching_records() {
        let bank = QuestionBank::from_records(vec![
            record(Category::Top, "Catalysis", "First catalysis question"),
            record(Category::Top, "Catalysis", "Second catalysis question"),
            record(Category::Top, "Equilibrium", "Equilibrium question"),
            record(Category::Lower, "Catalysis", "Lower band catalysis"),
        ])
        .unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = BTreeSet::new();
        for _ in 0..50 {
            let q = bank.pick(&mut rng, Category::Top, "Catalysis").unwrap();
            assert_eq!(q.category, Category::Top);
            assert_eq!(q.topic, "Catalysis");
            seen.insert(q.prompt.clone());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn pick_of_an_absent_pair_is_not_found() {
        let bank = shipped_bank();
        let err = bank.pick_random(Category::Lower, "Catalysis").unwrap_err();
        assert!(matches!(
            err,
            BankError::NotFound { category: Category::Lower, ref topic } if topic == "Catalysis"
        ));
    }

    #[test]
    fn record_without_criteria_is_rejected() {
        let mut broken = record(Category::Middle, "pH Basics", "Outline the pH scale.");
        broken.criteria.clear();
        let err = QuestionBank::from_records(vec![record(Category::Top, "Catalysis", "Ok"), broken])
            .unwrap_err();
        assert!(matches!(err, BankError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn record_with_blank_prompt_is_rejected() {
        let err = QuestionBank::from_records(vec![record(Category::Top, "Catalysis", "  ")]).unwrap_err();
        assert!(matches!(err, BankError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = QuestionBank::from_json("[{\"category\": \"Band 9\"}]").unwrap_err();
        assert!(matches!(err, BankError::Json(_)));
    }
}

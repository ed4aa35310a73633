use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;

use rand::seq::SliceRandom;
use rand::Rng;

/// The two editions of the civics test. They number the shared questions
/// differently, so a bank is always tied to one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TestVersion {
    V2008,
    V2025,
}

impl TestVersion {
    /// Parses a version tag. An unrecognized tag falls back to the current
    /// (2025) test so a stale tag stored in dialogue state can't strand a
    /// user, but it gets logged since it usually means a caller bug.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "2008" => TestVersion::V2008,
            "2025" => TestVersion::V2025,
            other => {
                log::warn!("Unrecognized test version tag {:?}, assuming 2025", other);
                TestVersion::V2025
            }
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TestVersion::V2008 => "2008",
            TestVersion::V2025 => "2025",
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub category: String,
    /// Every entry is independently acceptable; the real exam takes any one.
    pub answers: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("failed to read bank file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse bank file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question bank is empty")]
    Empty,
    #[error("duplicate question id {0}")]
    DuplicateId(u32),
    #[error("question {0} has no answers")]
    NoAnswers(u32),
    #[error("question {0} lists answer {1:?} more than once")]
    DuplicateAnswer(u32, String),
}

/// The question list and curated wrong answers for one test version, loaded
/// once at startup and passed around by reference.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub version: TestVersion,
    questions: Vec<Question>,
    // Keyed by question id as a string, matching the JSON object keys.
    distractors: HashMap<String, Vec<String>>,
}

impl QuestionBank {
    pub fn load(
        version: TestVersion,
        mut questions_file: File,
        mut distractors_file: File,
    ) -> Result<Self, BankError> {
        let mut questions_json = String::new();
        questions_file.read_to_string(&mut questions_json)?;
        let mut distractors_json = String::new();
        distractors_file.read_to_string(&mut distractors_json)?;
        Self::from_json(version, &questions_json, &distractors_json)
    }

    pub fn from_json(
        version: TestVersion,
        questions_json: &str,
        distractors_json: &str,
    ) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_str(questions_json)?;
        let distractors: HashMap<String, Vec<String>> = serde_json::from_str(distractors_json)?;
        Self::new(version, questions, distractors)
    }

    pub fn new(
        version: TestVersion,
        questions: Vec<Question>,
        distractors: HashMap<String, Vec<String>>,
    ) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }

        let mut seen_ids = HashSet::new();
        for question in &questions {
            if !seen_ids.insert(question.id) {
                return Err(BankError::DuplicateId(question.id));
            }
            if question.answers.is_empty() {
                return Err(BankError::NoAnswers(question.id));
            }
            let mut seen_answers = HashSet::new();
            for answer in &question.answers {
                if !seen_answers.insert(answer.as_str()) {
                    return Err(BankError::DuplicateAnswer(question.id, answer.clone()));
                }
            }
        }

        Ok(Self {
            version,
            questions,
            distractors,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_by_id(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Curated wrong answers for a question, if any were curated.
    pub fn distractors_for(&self, id: u32) -> Option<&[String]> {
        self.distractors
            .get(&id.to_string())
            .map(|list| list.as_slice())
    }

    /// Picks `amount` distinct questions at random (all of them if the bank
    /// is smaller than `amount`).
    pub fn sample_questions<R: Rng + ?Sized>(&self, amount: usize, rng: &mut R) -> Vec<&Question> {
        self.questions.choose_multiple(rng, amount).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const QUESTIONS: &str = r#"[
        {"id": 1, "question": "What is the supreme law of the land?", "category": "Principles of American Democracy", "answers": ["The Constitution"]},
        {"id": 2, "question": "Name one branch or part of the government.", "category": "System of Government", "answers": ["Congress", "The President", "The courts"]}
    ]"#;
    const DISTRACTORS: &str = r#"{
        "1": ["The Declaration of Independence", "The Articles of Confederation", "The Bill of Rights"]
    }"#;

    #[test]
    fn loads_and_validates() {
        let bank = QuestionBank::from_json(TestVersion::V2008, QUESTIONS, DISTRACTORS).unwrap();
        assert_eq!(bank.questions().len(), 2);
        assert_eq!(bank.question_by_id(2).unwrap().answers.len(), 3);
        assert_eq!(
            bank.distractors_for(1).unwrap(),
            &[
                "The Declaration of Independence".to_string(),
                "The Articles of Confederation".to_string(),
                "The Bill of Rights".to_string(),
            ]
        );
        assert!(bank.distractors_for(2).is_none());
    }

    #[test]
    fn rejects_empty_bank() {
        let result = QuestionBank::from_json(TestVersion::V2008, "[]", "{}");
        assert!(matches!(result, Err(BankError::Empty)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let questions = r#"[
            {"id": 1, "question": "a", "category": "c", "answers": ["x"]},
            {"id": 1, "question": "b", "category": "c", "answers": ["y"]}
        ]"#;
        let result = QuestionBank::from_json(TestVersion::V2008, questions, "{}");
        assert!(matches!(result, Err(BankError::DuplicateId(1))));
    }

    #[test]
    fn rejects_question_without_answers() {
        let questions = r#"[{"id": 7, "question": "a", "category": "c", "answers": []}]"#;
        let result = QuestionBank::from_json(TestVersion::V2008, questions, "{}");
        assert!(matches!(result, Err(BankError::NoAnswers(7))));
    }

    #[test]
    fn rejects_duplicate_answers() {
        let questions = r#"[{"id": 3, "question": "a", "category": "c", "answers": ["x", "x"]}]"#;
        let result = QuestionBank::from_json(TestVersion::V2008, questions, "{}");
        assert!(matches!(result, Err(BankError::DuplicateAnswer(3, _))));
    }

    #[test]
    fn unrecognized_tag_falls_back_to_current_version() {
        assert_eq!(TestVersion::from_tag("2008"), TestVersion::V2008);
        assert_eq!(TestVersion::from_tag("2025"), TestVersion::V2025);
        assert_eq!(TestVersion::from_tag("1986"), TestVersion::V2025);
        assert_eq!(TestVersion::from_tag(""), TestVersion::V2025);
    }

    #[test]
    fn samples_distinct_questions() {
        let bank = QuestionBank::from_json(TestVersion::V2008, QUESTIONS, DISTRACTORS).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = bank.sample_questions(2, &mut rng);
        assert_eq!(sample.len(), 2);
        assert_ne!(sample[0].id, sample[1].id);

        // Asking for more than the bank holds returns the whole bank.
        let sample = bank.sample_questions(10, &mut rng);
        assert_eq!(sample.len(), 2);
    }

    #[test]
    fn shipped_banks_load() {
        let bank = QuestionBank::load(
            TestVersion::V2008,
            File::open("data/questions_2008.json").unwrap(),
            File::open("data/distractors_2008.json").unwrap(),
        )
        .unwrap();
        assert_eq!(bank.questions().len(), 100);

        let bank = QuestionBank::load(
            TestVersion::V2025,
            File::open("data/questions_2025.json").unwrap(),
            File::open("data/distractors_2025.json").unwrap(),
        )
        .unwrap();
        assert_eq!(bank.questions().len(), 128);
    }
}

pub mod bank;
pub mod explain;
pub mod personalize;
pub mod prepare;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub questions: Vec<PreparedQuestion>,
    pub current_question: usize,
    pub score: u32,
}

impl Quiz {
    pub fn new(questions: Vec<PreparedQuestion>) -> Self {
        Self {
            questions,
            current_question: 0,
            score: 0,
        }
    }
}

/// A question ready to be put in front of the user: the prompt plus four
/// shuffled options, exactly one of which is an acceptable answer.
///
/// `all_correct_answers` keeps the full acceptable set (after any
/// personalization) so the explanation can mention the alternatives the user
/// didn't see.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PreparedQuestion {
    pub id: u32,
    pub question: String,
    pub display_options: Vec<String>,
    pub correct_answer: String,
    pub all_correct_answers: Vec<String>,
    pub wrong_answers: Vec<String>,
}

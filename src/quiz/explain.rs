use crate::quiz::PreparedQuestion;

/// Builds the reply shown after the user answers. Mentions the full
/// acceptable set when there is more than one, since the real exam takes any
/// one of them.
pub fn explain(prepared: &PreparedQuestion, user_answer: &str) -> String {
    let alternates: Vec<&str> = prepared
        .all_correct_answers
        .iter()
        .map(String::as_str)
        .filter(|a| *a != prepared.correct_answer)
        .collect();

    if user_answer == prepared.correct_answer {
        if alternates.is_empty() {
            return "Correct!".to_string();
        }
        return format!(
            "Correct! These would also have been accepted: {}.",
            alternates.join("; ")
        );
    }

    if alternates.is_empty() {
        return format!(
            "Not quite. The correct answer is \"{}\".",
            prepared.correct_answer
        );
    }
    format!(
        "Not quite. The answer we were looking for is \"{}\". Any one of these is accepted on the actual test, so you only need to memorize one: {}.",
        prepared.correct_answer,
        prepared
            .all_correct_answers
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(answers: &[&str]) -> PreparedQuestion {
        PreparedQuestion {
            id: 13,
            question: "Name one branch or part of the government.".to_string(),
            display_options: vec![
                answers[0].to_string(),
                "The states".to_string(),
                "The military".to_string(),
                "The political parties".to_string(),
            ],
            correct_answer: answers[0].to_string(),
            all_correct_answers: answers.iter().map(|a| a.to_string()).collect(),
            wrong_answers: vec![
                "The states".to_string(),
                "The military".to_string(),
                "The political parties".to_string(),
            ],
        }
    }

    #[test]
    fn correct_single_answer() {
        let prepared = prepared(&["Congress"]);
        assert_eq!(explain(&prepared, "Congress"), "Correct!");
    }

    #[test]
    fn correct_with_alternates_lists_the_others() {
        let prepared = prepared(&["Congress", "The President", "The courts"]);
        let reply = explain(&prepared, "Congress");
        assert!(reply.starts_with("Correct!"));
        assert!(reply.contains("The President"));
        assert!(reply.contains("The courts"));
        assert!(!reply.contains("Congress;"));
    }

    #[test]
    fn wrong_single_answer_names_the_correct_one() {
        let prepared = prepared(&["Congress"]);
        let reply = explain(&prepared, "The military");
        assert!(reply.contains("Not quite"));
        assert!(reply.contains("\"Congress\""));
        assert!(!reply.contains("memorize"));
    }

    #[test]
    fn wrong_with_alternates_enumerates_the_full_set() {
        let prepared = prepared(&["Congress", "The President", "The courts"]);
        let reply = explain(&prepared, "The states");
        assert!(reply.contains("\"Congress\""));
        assert!(reply.contains("Congress; The President; The courts"));
        assert!(reply.contains("memorize one"));
    }
}

use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::bank::{Question, QuestionBank};
use crate::quiz::personalize::{personal_kind, PersonalizationContext};
use crate::quiz::PreparedQuestion;

/// Generic pool used when a question has no (or not enough) curated wrong
/// answers. Deliberately broad answers that are wrong for almost any question
/// in either bank.
const FALLBACK_DISTRACTORS: [&str; 8] = [
    "The Declaration of Independence",
    "George Washington",
    "The Supreme Court",
    "Thomas Jefferson",
    "The Senate",
    "Abraham Lincoln",
    "The Bill of Rights",
    "Benjamin Franklin",
];

/// Turns a bank question into a four-option multiple-choice question.
///
/// Pure over its inputs; all randomness (which acceptable answer gets shown,
/// option order) comes from the caller's `rng`, so a fixed seed makes the
/// outcome reproducible.
pub fn prepare<R: Rng + ?Sized>(
    bank: &QuestionBank,
    question: &Question,
    context: Option<&PersonalizationContext>,
    rng: &mut R,
) -> PreparedQuestion {
    let candidates = personalized_answers(bank, question, context);
    let wrong_answers = pick_distractors(bank, question, &candidates);

    // Any candidate is acceptable; one of them gets shown as "the" correct
    // option this time around.
    let correct_answer = candidates
        .choose(rng)
        .cloned()
        .expect("bank questions are validated to have answers");

    let mut display_options = Vec::with_capacity(wrong_answers.len() + 1);
    display_options.push(correct_answer.clone());
    display_options.extend(wrong_answers.iter().cloned());
    display_options.shuffle(rng);

    PreparedQuestion {
        id: question.id,
        question: question.question.clone(),
        display_options,
        correct_answer,
        all_correct_answers: candidates,
        wrong_answers,
    }
}

/// The acceptable answers for this presentation: the user's own officials for
/// the handful of personalizable questions, the bank's generic answers for
/// everything else (and whenever the context doesn't actually know the value).
fn personalized_answers(
    bank: &QuestionBank,
    question: &Question,
    context: Option<&PersonalizationContext>,
) -> Vec<String> {
    if let Some(context) = context {
        if let Some(kind) = personal_kind(bank.version, question.id) {
            if let Some(answers) = context.answers_for(kind) {
                return answers;
            }
        }
    }
    question.answers.clone()
}

/// Picks 3 wrong answers: curated ones first (in curation order, so a given
/// question keeps showing the same distractors), then the generic pool.
/// Anything that collides with an acceptable answer is skipped, which matters
/// once personalization has swapped the candidate set. A residual shortfall
/// means the data needs fixing, so it gets logged rather than hidden.
fn pick_distractors(bank: &QuestionBank, question: &Question, candidates: &[String]) -> Vec<String> {
    let curated = bank.distractors_for(question.id).unwrap_or(&[]);

    let mut picked: Vec<String> = Vec::with_capacity(3);
    for option in curated
        .iter()
        .map(String::as_str)
        .chain(FALLBACK_DISTRACTORS)
    {
        if picked.len() == 3 {
            break;
        }
        if candidates.iter().any(|c| c.as_str() == option) {
            continue;
        }
        if picked.iter().any(|p| p.as_str() == option) {
            continue;
        }
        picked.push(option.to_string());
    }

    if picked.len() < 3 {
        log::warn!(
            "Only {} usable distractors for question {} (version {})",
            picked.len(),
            question.id,
            bank.version.tag()
        );
    }

    picked
}

mod quiz;

use std::{fs::File, sync::Arc};

use dotenv::dotenv;
use quiz::bank::{QuestionBank, TestVersion};
use quiz::explain::explain;
use quiz::personalize::{PersonalizationContext, Representative};
use quiz::prepare::prepare;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ReceiveVersionChoice,
    ReceivePersonalizationChoice {
        version: String,
    },
    ReceiveSenators {
        version: String,
        context: PersonalizationContext,
    },
    ReceiveRepresentative {
        version: String,
        context: PersonalizationContext,
    },
    ReceiveGovernor {
        version: String,
        context: PersonalizationContext,
    },
    ReceiveCapital {
        version: String,
        context: PersonalizationContext,
    },
    ReceiveAmountOfQuestions {
        version: String,
        context: Option<PersonalizationContext>,
    },
    CivicsQuiz {
        quiz: quiz::Quiz,
    },
}

type UserInfoStorage = std::sync::Arc<ErasedStorage<State>>;

struct Banks {
    v2008: QuestionBank,
    v2025: QuestionBank,
}

impl Banks {
    fn for_version(&self, version: TestVersion) -> &QuestionBank {
        match version {
            TestVersion::V2008 => &self.v2008,
            TestVersion::V2025 => &self.v2025,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().expect("Failed to load .env file");

    pretty_env_logger::init();
    log::info!("Starting civics quiz bot...");

    let bot = Bot::from_env();

    println!("Establishing connection to the database...");
    let storage: UserInfoStorage = SqliteStorage::open("db.sqlite", Json)
        .await
        .unwrap()
        .erase();
    println!("Connection established");

    // Load both question banks up front; every quiz borrows from these.
    println!("Loading question banks");
    let banks = Arc::new(Banks {
        v2008: load_bank(
            TestVersion::V2008,
            "data/questions_2008.json",
            "data/distractors_2008.json",
        ),
        v2025: load_bank(
            TestVersion::V2025,
            "data/questions_2025.json",
            "data/distractors_2025.json",
        ),
    });
    println!("Question banks loaded");

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(receive_full_name))
            .branch(dptree::case![State::ReceiveVersionChoice].endpoint(receive_version_choice))
            .branch(
                dptree::case![State::ReceivePersonalizationChoice { version }]
                    .endpoint(receive_personalization_choice),
            )
            .branch(
                dptree::case![State::ReceiveSenators { version, context }]
                    .endpoint(receive_senators),
            )
            .branch(
                dptree::case![State::ReceiveRepresentative { version, context }]
                    .endpoint(receive_representative),
            )
            .branch(
                dptree::case![State::ReceiveGovernor { version, context }]
                    .endpoint(receive_governor),
            )
            .branch(
                dptree::case![State::ReceiveCapital { version, context }]
                    .endpoint(receive_capital),
            )
            .branch(
                dptree::case![State::ReceiveAmountOfQuestions { version, context }].endpoint(
                    move |bot: Bot,
                          dialogue: QuizDialogue,
                          (version, context): (String, Option<PersonalizationContext>),
                          msg: Message| {
                        receive_amount_of_questions(
                            banks.clone(),
                            bot,
                            dialogue,
                            (version, context),
                            msg,
                        )
                    },
                ),
            )
            .branch(dptree::case![State::CivicsQuiz { quiz }].endpoint(civics_quiz)),
    )
    .dependencies(dptree::deps![storage])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

fn load_bank(version: TestVersion, questions_path: &str, distractors_path: &str) -> QuestionBank {
    let questions = File::open(questions_path).expect("Failed to open questions file");
    let distractors = File::open(distractors_path).expect("Failed to open distractors file");
    QuestionBank::load(version, questions, distractors).expect("Failed to load question bank")
}

const GREETING_TEXT: &str = "Hi! I'm a civics test trainer. I'll help you prepare for the US naturalization interview. Let's get to know each other! What's your name?";
async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

const VERSION_2008_GAME: &str = "2008 test (100 questions)";
const VERSION_2025_GAME: &str = "2025 test (128 questions)";
async fn receive_full_name(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    match msg.text() {
        Some(full_name) => {
            bot.send_message(msg.chat.id, format!("Nice to meet you, {}!", full_name))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send your name as text")
                .await?;
            return Ok(());
        }
    }

    bot.send_message(
        msg.chat.id,
        "Which version of the test are you preparing for?",
    )
    .reply_markup(version_keyboard())
    .await?;

    dialogue.update(State::ReceiveVersionChoice).await?;
    Ok(())
}

fn version_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(VERSION_2008_GAME),
        KeyboardButton::new(VERSION_2025_GAME),
    ]])
}

const PERSONALIZE_YES: &str = "Yes, personalize my answers";
const PERSONALIZE_NO: &str = "No, use the generic answers";
async fn receive_version_choice(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    let version = match msg.text() {
        Some(VERSION_2008_GAME) => TestVersion::V2008,
        Some(VERSION_2025_GAME) => TestVersion::V2025,
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the two versions")
                .reply_markup(version_keyboard())
                .await?;
            return Ok(());
        }
    };

    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(PERSONALIZE_YES)],
        vec![KeyboardButton::new(PERSONALIZE_NO)],
    ]);
    bot.send_message(
        msg.chat.id,
        "A few questions are about your own state officials. Do you want to answer with your actual senators, representative, governor and state capital?",
    )
    .reply_markup(keyboard)
    .await?;

    dialogue
        .update(State::ReceivePersonalizationChoice {
            version: version.tag().to_string(),
        })
        .await?;
    Ok(())
}

async fn receive_personalization_choice(
    bot: Bot,
    dialogue: QuizDialogue,
    version: String,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(PERSONALIZE_YES) => {
            bot.send_message(
                msg.chat.id,
                "Who are your two U.S. Senators? Separate them with a comma, or send 'skip'.",
            )
            .await?;
            dialogue
                .update(State::ReceiveSenators {
                    version,
                    context: PersonalizationContext::default(),
                })
                .await?;
            Ok(())
        }
        Some(PERSONALIZE_NO) => {
            ask_amount_of_questions(&bot, &msg).await?;
            dialogue
                .update(State::ReceiveAmountOfQuestions {
                    version,
                    context: None,
                })
                .await?;
            Ok(())
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the options")
                .await?;
            Ok(())
        }
    }
}

async fn receive_senators(
    bot: Bot,
    dialogue: QuizDialogue,
    (version, context): (String, PersonalizationContext),
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please answer as text, or send 'skip'")
            .await?;
        return Ok(());
    };

    let mut context = context;
    if !is_skip(text) {
        context.senators = text
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    bot.send_message(
        msg.chat.id,
        "Who is your U.S. Representative? Send 'skip' if you're not sure.",
    )
    .await?;
    dialogue
        .update(State::ReceiveRepresentative { version, context })
        .await?;
    Ok(())
}

async fn receive_representative(
    bot: Bot,
    dialogue: QuizDialogue,
    (version, context): (String, PersonalizationContext),
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please answer as text, or send 'skip'")
            .await?;
        return Ok(());
    };

    let mut context = context;
    if !is_skip(text) {
        // People paste lookup results here; from_lookup turns the "visit
        // house.gov" placeholder into Unresolved instead of a fake name.
        context.representative = Some(Representative::from_lookup(text));
    }

    bot.send_message(
        msg.chat.id,
        "Who is the Governor of your state? Send 'skip' if you're not sure.",
    )
    .await?;
    dialogue
        .update(State::ReceiveGovernor { version, context })
        .await?;
    Ok(())
}

async fn receive_governor(
    bot: Bot,
    dialogue: QuizDialogue,
    (version, context): (String, PersonalizationContext),
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please answer as text, or send 'skip'")
            .await?;
        return Ok(());
    };

    let mut context = context;
    if !is_skip(text) {
        context.governor = Some(text.trim().to_string());
    }

    bot.send_message(
        msg.chat.id,
        "And what is the capital of your state? Send 'skip' if you're not sure.",
    )
    .await?;
    dialogue
        .update(State::ReceiveCapital { version, context })
        .await?;
    Ok(())
}

async fn receive_capital(
    bot: Bot,
    dialogue: QuizDialogue,
    (version, context): (String, PersonalizationContext),
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please answer as text, or send 'skip'")
            .await?;
        return Ok(());
    };

    let mut context = context;
    if !is_skip(text) {
        context.capital = Some(text.trim().to_string());
    }

    ask_amount_of_questions(&bot, &msg).await?;
    dialogue
        .update(State::ReceiveAmountOfQuestions {
            version,
            context: Some(context),
        })
        .await?;
    Ok(())
}

fn is_skip(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("skip")
}

async fn ask_amount_of_questions(bot: &Bot, msg: &Message) -> HandlerResult {
    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new("5")],
        vec![KeyboardButton::new("10")],
        vec![KeyboardButton::new("15")],
    ]);
    bot.send_message(msg.chat.id, "How many questions?")
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn receive_amount_of_questions(
    banks: Arc<Banks>,
    bot: Bot,
    dialogue: QuizDialogue,
    (version, context): (String, Option<PersonalizationContext>),
    msg: Message,
) -> HandlerResult {
    if let None = msg.text() {
        bot.send_message(msg.chat.id, "Please send a number").await?;
        return Ok(());
    }
    if let Err(_) = msg.text().unwrap().parse::<usize>() {
        bot.send_message(msg.chat.id, "Please send a number").await?;
        return Ok(());
    }

    // It is safe to unwrap here because we've already checked that the input is a number
    let amount: usize = msg.text().unwrap().parse().unwrap();
    if amount == 0 {
        bot.send_message(msg.chat.id, "The amount of questions can't be 0")
            .await?;
        return Ok(());
    }

    let bank = banks.for_version(TestVersion::from_tag(&version));
    let quiz = build_quiz(bank, amount, context.as_ref());

    bot.send_message(msg.chat.id, "Great! Let's start the quiz!")
        .reply_markup(KeyboardMarkup::new(vec![vec![KeyboardButton::new("Go!")]]))
        .await?;

    dialogue.update(State::CivicsQuiz { quiz }).await?;
    Ok(())
}

// The thread-local rng is not Send, so it has to live and die here, outside
// the handler's future; the dispatcher requires handler futures to be Send.
fn build_quiz(
    bank: &QuestionBank,
    amount: usize,
    context: Option<&PersonalizationContext>,
) -> quiz::Quiz {
    let mut rng = rand::thread_rng();
    let questions = bank
        .sample_questions(amount, &mut rng)
        .into_iter()
        .map(|question| prepare(bank, question, context, &mut rng))
        .collect();
    quiz::Quiz::new(questions)
}

async fn civics_quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    quiz: quiz::Quiz,
    msg: Message,
) -> HandlerResult {
    let mut quiz = quiz;

    if quiz.current_question != 0 {
        let Some(answer) = msg.text() else {
            bot.send_message(msg.chat.id, "Please use the answer buttons")
                .await?;
            return Ok(());
        };
        let prepared = &quiz.questions[quiz.current_question - 1];
        if answer == prepared.correct_answer {
            quiz.score += 1;
        }
        bot.send_message(msg.chat.id, explain(prepared, answer))
            .await?;
    }

    if quiz.current_question >= quiz.questions.len() {
        let quiz_score = format!(
            "That's the end! You answered {} of {} questions correctly.\nWhat would you like to do next?",
            quiz.score,
            quiz.questions.len()
        );
        bot.send_message(msg.chat.id, quiz_score.as_str())
            .reply_markup(version_keyboard())
            .await?;

        dialogue.update(State::ReceiveVersionChoice).await?;
        return Ok(());
    }

    let prepared = &quiz.questions[quiz.current_question];
    let question_text = format!(
        "Question #{}: \n{}",
        quiz.current_question + 1,
        prepared.question
    );
    let keyboard = KeyboardMarkup::new(
        prepared
            .display_options
            .iter()
            .map(|option| vec![KeyboardButton::new(option.clone())])
            .collect::<Vec<_>>(),
    );
    bot.send_message(msg.chat.id, question_text)
        .reply_markup(keyboard)
        .await?;

    quiz.current_question += 1;
    dialogue.update(State::CivicsQuiz { quiz }).await?;
    Ok(())
}

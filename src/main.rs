mod coach;
mod config;
mod error;
mod quiz;

use std::{fs::File, sync::Arc};

use dotenv::dotenv;
use quiz::{Category, QuestionBank, Session};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup},
};

type CoachDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveCategory,
    ReceiveTopic {
        category: Category,
    },
    AwaitQuestion {
        category: Category,
        topic: String,
    },
    ReceiveAnswer {
        session: Session,
    },
}

#[tokio::main]
async fn main() -> HandlerResult {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting chem coach bot...");

    let settings = config::Settings::from_env();

    log::info!("Loading question bank from {}", settings.question_bank.display());
    let bank = File::open(&settings.question_bank)
        .map_err(error::BankError::from)
        .and_then(QuestionBank::new)
        .map_err(|err| {
            log::error!("Failed to load {}: {}", settings.question_bank.display(), err);
            err
        })?;
    log::info!(
        "Loaded {} questions across {} categories",
        bank.questions.len(),
        bank.categories().len()
    );
    let bank = Arc::new(bank);

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveCategory].endpoint(receive_category))
            .branch(dptree::case![State::ReceiveTopic { category }].endpoint(receive_topic))
            .branch(
                dptree::case![State::AwaitQuestion { category, topic }].endpoint(await_question),
            )
            .branch(dptree::case![State::ReceiveAnswer { session }].endpoint(receive_answer)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), bank])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

const GREETING_TEXT: &str = "🧪 Chem Bot — HSC Exam Coach\n\nTargeted past-paper style questions with marker-style feedback, an exemplar, and step-by-step coaching to build stronger answers.";
// Telegram measures message length in UTF-16 code units
const TELEGRAM_MESSAGE_LIMIT: usize = 4096;
const EMPTY_FEEDBACK: &str = "No feedback came back this time, please try again.";
const GET_QUESTION: &str = "🎲 Get question";
const GET_FEEDBACK: &str = "📝 Get feedback";
const CHANGE_TOPIC: &str = "🔁 Change topic";

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Pieces of `text` no longer than `limit`, cut at paragraph breaks where possible,
/// then at line breaks, then mid-line.
fn message_pieces(text: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    for paragraph in text.split_inclusive("\n\n") {
        if utf16_len(paragraph) <= limit {
            pieces.push(paragraph);
            continue;
        }
        for line in paragraph.split_inclusive('\n') {
            if utf16_len(line) <= limit {
                pieces.push(line);
                continue;
            }
            let (mut start, mut units) = (0, 0);
            for (i, c) in line.char_indices() {
                if units + c.len_utf16() > limit {
                    pieces.push(&line[start..i]);
                    start = i;
                    units = 0;
                }
                units += c.len_utf16();
            }
            pieces.push(&line[start..]);
        }
    }
    pieces
}

/// Splits feedback into messages Telegram will accept. Never returns an empty list.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for piece in message_pieces(text, limit) {
        if !current.is_empty() && utf16_len(&current) + utf16_len(piece) > limit {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(piece);
    }
    chunks.push(current);

    let chunks = chunks
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>();
    if chunks.is_empty() {
        return vec![EMPTY_FEEDBACK.to_string()];
    }
    chunks
}

fn category_keyboard(bank: &QuestionBank) -> KeyboardMarkup {
    KeyboardMarkup::new(
        bank.categories()
            .into_iter()
            .map(|c| vec![KeyboardButton::new(c.label())])
            .collect::<Vec<_>>(),
    )
}

fn question_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(GET_FEEDBACK)],
        vec![
            KeyboardButton::new(GET_QUESTION),
            KeyboardButton::new(CHANGE_TOPIC),
        ],
    ])
}

async fn ask_for_category(
    bank: &QuestionBank,
    bot: &Bot,
    dialogue: &CoachDialogue,
    msg: &Message,
) -> HandlerResult {
    bot.send_message(msg.chat.id, "Choose your target group")
        .reply_markup(category_keyboard(bank))
        .await?;
    dialogue.update(State::ReceiveCategory).await?;
    Ok(())
}

async fn start(
    bank: Arc<QuestionBank>,
    bot: Bot,
    dialogue: CoachDialogue,
    msg: Message,
) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    ask_for_category(&bank, &bot, &dialogue, &msg).await
}

async fn receive_category(
    bank: Arc<QuestionBank>,
    bot: Bot,
    dialogue: CoachDialogue,
    msg: Message,
) -> HandlerResult {
    let Some(category) = msg.text().and_then(Category::from_label) else {
        bot.send_message(msg.chat.id, "Please choose one of the groups on the keyboard")
            .reply_markup(category_keyboard(&bank))
            .await?;
        return Ok(());
    };

    let topics = bank.topics(category);
    if topics.is_empty() {
        bot.send_message(msg.chat.id, "There are no questions in this group yet")
            .await?;
        return Ok(());
    }

    let keyboard = KeyboardMarkup::new(
        topics
            .into_iter()
            .map(|t| vec![KeyboardButton::new(t)])
            .collect::<Vec<_>>(),
    );
    bot.send_message(msg.chat.id, "Choose a topic")
        .reply_markup(keyboard)
        .await?;

    dialogue.update(State::ReceiveTopic { category }).await?;
    Ok(())
}

async fn receive_topic(
    bank: Arc<QuestionBank>,
    bot: Bot,
    dialogue: CoachDialogue,
    category: Category,
    msg: Message,
) -> HandlerResult {
    let topics = bank.topics(category);
    let Some(topic) = msg.text().filter(|t| topics.contains(t)) else {
        bot.send_message(msg.chat.id, "Please choose one of the topics on the keyboard")
            .await?;
        return Ok(());
    };

    let keyboard = KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(GET_QUESTION),
        KeyboardButton::new(CHANGE_TOPIC),
    ]]);
    bot.send_message(msg.chat.id, format!("{} · {}", category, topic))
        .reply_markup(keyboard)
        .await?;

    dialogue
        .update(State::AwaitQuestion {
            category,
            topic: topic.to_string(),
        })
        .await?;
    Ok(())
}

async fn send_question(
    bank: &QuestionBank,
    bot: &Bot,
    dialogue: &CoachDialogue,
    (category, topic): (Category, &str),
    msg: &Message,
) -> HandlerResult {
    let question = match bank.pick_random(category, topic) {
        Ok(question) => question.clone(),
        Err(err) => {
            log::warn!("{}", err);
            bot.send_message(msg.chat.id, "No question matches that topic, please choose again")
                .await?;
            return ask_for_category(bank, bot, dialogue, msg).await;
        }
    };

    bot.send_message(
        msg.chat.id,
        format!("{}\n\nType your answer, then press \"{}\".", question.card(), GET_FEEDBACK),
    )
    .reply_markup(question_keyboard())
    .await?;

    dialogue
        .update(State::ReceiveAnswer {
            session: Session::new(question),
        })
        .await?;
    Ok(())
}

async fn await_question(
    bank: Arc<QuestionBank>,
    bot: Bot,
    dialogue: CoachDialogue,
    (category, topic): (Category, String),
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(GET_QUESTION) => send_question(&bank, &bot, &dialogue, (category, &topic), &msg).await,
        Some(CHANGE_TOPIC) => ask_for_category(&bank, &bot, &dialogue, &msg).await,
        _ => {
            bot.send_message(msg.chat.id, "Please use the keyboard buttons")
                .await?;
            Ok(())
        }
    }
}

async fn receive_answer(
    bank: Arc<QuestionBank>,
    bot: Bot,
    dialogue: CoachDialogue,
    session: Session,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(GET_FEEDBACK) => {
            let Some(answer) = session.answer() else {
                bot.send_message(msg.chat.id, "Please type your answer first")
                    .await?;
                return Ok(());
            };

            // Only a nicety, so a failed chat action isn't worth aborting over
            let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

            let feedback = coach::respond(answer, &session.question).await;
            for chunk in split_message(&feedback, TELEGRAM_MESSAGE_LIMIT) {
                bot.send_message(msg.chat.id, chunk)
                    .reply_markup(question_keyboard())
                    .await?;
            }
            Ok(())
        }
        Some(GET_QUESTION) => {
            let question = &session.question;
            send_question(
                &bank,
                &bot,
                &dialogue,
                (question.category, &question.topic),
                &msg,
            )
            .await
        }
        Some(CHANGE_TOPIC) => ask_for_category(&bank, &bot, &dialogue, &msg).await,
        Some(text) if !text.trim().is_empty() => {
            dialogue
                .update(State::ReceiveAnswer {
                    session: session.with_answer(text),
                })
                .await?;
            bot.send_message(
                msg.chat.id,
                format!("Answer saved. Press \"{}\" when you're ready.", GET_FEEDBACK),
            )
            .await?;
            Ok(())
        }
        _ => {
            bot.send_message(msg.chat.id, "Please type your answer as text")
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_feedback_is_one_message() {
        let chunks = split_message("✅ Strengths\n- Good\n\n🔧 Next Steps\n- More", TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(chunks, vec!["✅ Strengths\n- Good\n\n🔧 Next Steps\n- More".to_string()]);
    }

    #[test]
    fn long_feedback_splits_at_paragraph_breaks() {
        let first = "a".repeat(3000);
        let second = "b".repeat(3000);
        let text = format!("{}\n\n{}", first, second);

        let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(chunks, vec![first, second]);
    }

    #[test]
    fn every_chunk_fits_the_limit() {
        let section = format!("🧠 Exemplar Response\n{}\n", "The equilibrium shifts left. ".repeat(60));
        let text = section.repeat(6);
        assert!(utf16_len(&text) > TELEGRAM_MESSAGE_LIMIT);

        let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| utf16_len(c) <= TELEGRAM_MESSAGE_LIMIT));
        assert_eq!(chunks.concat().matches("🧠 Exemplar Response").count(), 6);
    }

    #[test]
    fn unbroken_line_is_cut_mid_line() {
        let chunks = split_message(&"x".repeat(9000), TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![4096, 4096, 808]
        );
    }

    #[test]
    fn astral_characters_count_double() {
        let chunks = split_message(&"🧪".repeat(3000), TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(
            chunks.iter().map(|c| c.chars().count()).collect::<Vec<_>>(),
            vec![2048, 952]
        );
    }

    #[test]
    fn blank_feedback_still_sends_something() {
        assert_eq!(split_message("  \n\n ", TELEGRAM_MESSAGE_LIMIT), vec![EMPTY_FEEDBACK.to_string()]);
    }
}

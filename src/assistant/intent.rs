//! Maps a free-text message to the topic the user is asking about.

/// What a message is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Expenses,
    Limit,
    Rewards,
    Analysis,
    Advice,
    Help,
    Greeting,
    Fallback,
}

/// Keywords for each intent, checked in order. The first intent with a
/// keyword contained in the message wins.
const INTENT_KEYWORDS: [(Intent, &[&str]); 7] = [
    (Intent::Expenses, &["expense", "spent", "spend"]),
    (Intent::Limit, &["limit", "budget"]),
    (Intent::Rewards, &["reward", "points", "achievement"]),
    (Intent::Analysis, &["analysis", "analyse", "analyze", "statistic", "summary"]),
    (Intent::Advice, &["advice", "tip", "saving", "recommend"]),
    (Intent::Help, &["help", "commands", "what can you"]),
    (
        Intent::Greeting,
        &["hello", "hey", "good morning", "good afternoon", "good evening"],
    ),
];

/// Greetings that are too short to match inside other words, so they must
/// appear as a whole word.
const GREETING_WORDS: [&str; 2] = ["hi", "hiya"];

/// Classify `message`, ignoring case.
pub fn classify(message: &str) -> Intent {
    let message = message.to_lowercase();

    if let Some((intent, _)) = INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| message.contains(keyword)))
    {
        return *intent;
    }

    if message
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETING_WORDS.contains(&word))
    {
        return Intent::Greeting;
    }

    Intent::Fallback
}

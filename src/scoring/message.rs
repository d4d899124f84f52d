use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::keywords::{self, count_matches};

/// Penalty labels attached to degenerate agent utterances. Distinct labels
/// (not occurrences) drive the session-level score deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    TooShort,
    RudeLanguage,
    Dismissive,
    Gibberish,
    TooBrief,
}

impl Penalty {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TooShort => "too short",
            Self::RudeLanguage => "rude language",
            Self::Dismissive => "dismissive response",
            Self::Gibberish => "gibberish",
            Self::TooBrief => "too brief",
        }
    }
}

/// Five-dimension score for a single agent utterance. Ephemeral: consumed by
/// session aggregation, never stored on the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageScore {
    pub empathy: u32,
    pub clarity: u32,
    pub accuracy: u32,
    pub solution: u32,
    pub professionalism: u32,
    pub penalties: Vec<Penalty>,
}

impl MessageScore {
    fn uniform(value: u32, penalty: Penalty) -> Self {
        Self {
            empathy: value,
            clarity: value,
            accuracy: value,
            solution: value,
            professionalism: value,
            penalties: vec![penalty],
        }
    }
}

static RUDE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(stupid|idiot|dumb|moron|shut\s+up|damn|wtf|screw\s+(you|off|this))\b|滚|闭嘴|笨蛋|白痴",
    )
    .expect("rude pattern must compile")
});

const DISMISSIVE_TOKENS: &[&str] = &[
    "ok", "okay", "fine", "whatever", "sure", "k", "哦", "随便", "行吧",
];

/// Maximum run of identical consecutive characters before text is treated
/// as keyboard mashing.
const MAX_CHAR_RUN: usize = 4;

/// Average whitespace-token length above this reads as spam.
const MAX_AVG_TOKEN_LEN: f64 = 15.0;

/// Score one agent utterance. Deterministic; lengths are character counts.
/// Degenerate inputs short-circuit with fixed scores and a penalty label;
/// everything else gets additive keyword/structural signals per dimension,
/// each clamped to [0, 100].
pub fn score_message(text: &str) -> MessageScore {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    let len = trimmed.chars().count();

    if len < 5 {
        return MessageScore::uniform(5, Penalty::TooShort);
    }

    if RUDE_PATTERN.is_match(&lower) {
        return MessageScore {
            empathy: 0,
            clarity: 10,
            accuracy: 10,
            solution: 0,
            professionalism: 0,
            penalties: vec![Penalty::RudeLanguage],
        };
    }

    if is_dismissive(trimmed, &lower) {
        return MessageScore {
            empathy: 10,
            clarity: 15,
            accuracy: 15,
            solution: 10,
            professionalism: 10,
            penalties: vec![Penalty::Dismissive],
        };
    }

    if looks_like_gibberish(trimmed) {
        return MessageScore::uniform(5, Penalty::Gibberish);
    }

    let mut penalties = Vec::new();

    let mut empathy = 25 * count_matches(&lower, keywords::EMPATHY);
    if len > 50 {
        empathy += 15;
    }
    let mut empathy = empathy.min(100);

    let mut clarity = length_base(len);
    let sentence_count = trimmed
        .chars()
        .filter(|c| keywords::SENTENCE_ENDINGS.contains(c))
        .count() as u32;
    clarity += (sentence_count * 10).min(30);
    if trimmed
        .chars()
        .last()
        .is_some_and(|c| keywords::SENTENCE_ENDINGS.contains(&c))
    {
        clarity += 15;
    }
    if keywords::contains_any(&lower, keywords::CONNECTIVES) {
        clarity += 15;
    }
    let mut clarity = clarity.min(100);

    let accuracy = (20 + 15 * count_matches(&lower, keywords::DOMAIN)).min(100);

    let mut solution = 20 * count_matches(&lower, keywords::SOLUTION);
    if trimmed.contains('?') || trimmed.contains('？') {
        solution += 10;
    }
    let mut solution = solution.min(100);

    let mut professionalism = 50;
    if keywords::contains_any(&lower, keywords::POLITE) {
        professionalism += 25;
    }
    if keywords::contains_any(&lower, keywords::GREETING) {
        professionalism += 15;
    }
    if keywords::contains_any(&lower, keywords::SECOND_PERSON) {
        professionalism += 10;
    }
    let professionalism = professionalism.min(100);

    // Length penalty: terse replies cannot score as engaged ones.
    if len < 20 {
        empathy = empathy.min(30);
        solution = solution.min(25);
        clarity = clarity.min(35);
        penalties.push(Penalty::TooBrief);
    }

    MessageScore {
        empathy,
        clarity,
        accuracy,
        solution,
        professionalism,
        penalties,
    }
}

fn length_base(len: usize) -> u32 {
    if len >= 100 {
        40
    } else if len >= 50 {
        25
    } else if len >= 20 {
        15
    } else {
        5
    }
}

fn is_dismissive(trimmed: &str, lower: &str) -> bool {
    let stripped = lower.trim_end_matches(['.', '!', '。', '！']);
    DISMISSIVE_TOKENS.contains(&stripped) || is_punctuation_only(trimmed)
}

fn is_punctuation_only(trimmed: &str) -> bool {
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_punctuation() || "。，！？…～、".contains(c))
}

fn looks_like_gibberish(trimmed: &str) -> bool {
    if has_char_run(trimmed, MAX_CHAR_RUN + 1) {
        return true;
    }
    let mut tokens = 0usize;
    let mut chars = 0usize;
    for token in trimmed.split_whitespace() {
        tokens += 1;
        chars += token.chars().count();
    }
    tokens > 0 && (chars as f64 / tokens as f64) > MAX_AVG_TOKEN_LEN
}

fn has_char_run(text: &str, run: usize) -> bool {
    let mut last = None;
    let mut count = 0usize;
    for c in text.chars() {
        if Some(c) == last {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            last = Some(c);
            count = 1;
        }
    }
    false
}

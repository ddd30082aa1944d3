use leitner_core::{AnswerDifficulty, BucketNumber, BucketRange, Day, Flashcard, PracticeRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize)]
pub struct PracticeOut {
    pub cards: Vec<Flashcard>,
    pub day: Day,
}

#[derive(Deserialize)]
pub struct PracticeQuery {
    pub tag: Option<String>,
    /// Free-text filter over front, back, hint and tags.
    pub q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIn {
    #[serde(default)]
    pub card_front: String,
    #[serde(default)]
    pub card_back: String,
    // Kept loose so an out-of-range value is a 400, not a JSON rejection.
    #[serde(default)]
    pub difficulty: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateOut {
    pub message: String,
    pub record: PracticeRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintQuery {
    pub card_front: Option<String>,
    pub card_back: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct HintOut {
    pub hint: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOut {
    pub message: String,
    pub current_day: Day,
}

#[derive(Deserialize)]
pub struct CardIn {
    pub front: Option<String>,
    pub back: Option<String>,
    pub hint: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
pub struct CardOut {
    pub message: String,
    pub card: Flashcard,
}

#[derive(Serialize, Deserialize)]
pub struct BucketsOut {
    pub range: Option<BucketRange>,
    pub buckets: BTreeMap<BucketNumber, Vec<Flashcard>>,
}

#[derive(Serialize, Deserialize)]
pub struct MessageOut {
    pub message: String,
}

/// Wire difficulty: the integers `0|1|2` only.
pub fn difficulty_from_json(v: &serde_json::Value) -> Option<AnswerDifficulty> {
    let n = u8::try_from(v.as_u64()?).ok()?;
    AnswerDifficulty::try_from(n).ok()
}

/// Terminal input for a difficulty.
pub fn parse_difficulty(s: &str) -> Option<AnswerDifficulty> {
    match s.trim().to_lowercase().as_str() {
        "0" | "w" | "wrong" => Some(AnswerDifficulty::Wrong),
        "1" | "h" | "hard" => Some(AnswerDifficulty::Hard),
        "2" | "e" | "easy" => Some(AnswerDifficulty::Easy),
        _ => None,
    }
}

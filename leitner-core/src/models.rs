use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use crate::CoreError;

pub type Day = u64;
pub type BucketNumber = u32;

/// A question/answer pair. Identity is `(front, back)`; hint and tags are
/// carried along but never compared.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            hint: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, front: &str, back: &str) -> bool {
        self.front == front && self.back == back
    }
}

impl PartialEq for Flashcard {
    fn eq(&self, other: &Self) -> bool {
        self.front == other.front && self.back == other.back
    }
}

impl Eq for Flashcard {}

impl Hash for Flashcard {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.front.hash(state);
        self.back.hash(state);
    }
}

impl PartialOrd for Flashcard {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Flashcard {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.front, &self.back).cmp(&(&other.front, &other.back))
    }
}

/// Composite content key of a card.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey {
    pub front: String,
    pub back: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnswerDifficulty {
    Wrong = 0,
    Hard = 1,
    Easy = 2,
}

impl TryFrom<u8> for AnswerDifficulty {
    type Error = CoreError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(AnswerDifficulty::Wrong),
            1 => Ok(AnswerDifficulty::Hard),
            2 => Ok(AnswerDifficulty::Easy),
            _ => Err(CoreError::Invalid("difficulty")),
        }
    }
}

impl From<AnswerDifficulty> for u8 {
    fn from(d: AnswerDifficulty) -> u8 {
        d as u8
    }
}

impl AnswerDifficulty {
    pub fn is_correct(&self) -> bool {
        !matches!(self, AnswerDifficulty::Wrong)
    }
}

/// Sparse mapping from bucket number to the cards it holds. The highest
/// bucket number present is the retired bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BucketAssignment {
    buckets: BTreeMap<BucketNumber, BTreeSet<Flashcard>>,
}

impl BucketAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty bucket 0 and empty retired bucket. Intermediate buckets appear
    /// as cards reach them.
    pub fn with_retired(retired: BucketNumber) -> Self {
        let buckets = [0, retired].into_iter().map(|b| (b, BTreeSet::new())).collect();
        Self { buckets }
    }

    pub fn insert(&mut self, bucket: BucketNumber, card: Flashcard) -> bool {
        self.buckets.entry(bucket).or_default().insert(card)
    }

    /// Makes `bucket` present, leaving existing contents alone.
    pub fn ensure_bucket(&mut self, bucket: BucketNumber) {
        self.buckets.entry(bucket).or_default();
    }

    pub fn get(&self, bucket: BucketNumber) -> Option<&BTreeSet<Flashcard>> {
        self.buckets.get(&bucket)
    }

    pub fn contains_bucket(&self, bucket: BucketNumber) -> bool {
        self.buckets.contains_key(&bucket)
    }

    pub fn bucket_numbers(&self) -> impl Iterator<Item = BucketNumber> + '_ {
        self.buckets.keys().copied()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn retired_bucket(&self) -> Option<BucketNumber> {
        self.buckets.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BucketNumber, &BTreeSet<Flashcard>)> {
        self.buckets.iter().map(|(b, cards)| (*b, cards))
    }

    pub fn bucket_of(&self, card: &Flashcard) -> Option<BucketNumber> {
        self.iter()
            .find(|(_, cards)| cards.contains(card))
            .map(|(b, _)| b)
    }

    pub fn find(&self, front: &str, back: &str) -> Option<&Flashcard> {
        self.cards().find(|c| c.matches(front, back))
    }

    /// All cards in ascending bucket order.
    pub fn cards(&self) -> impl Iterator<Item = &Flashcard> {
        self.buckets.values().flat_map(|cards| cards.iter())
    }

    pub fn card_count(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    pub(crate) fn take(&mut self, bucket: BucketNumber, card: &Flashcard) -> Option<Flashcard> {
        self.buckets.get_mut(&bucket)?.take(card)
    }

    pub(crate) fn is_bucket_empty(&self, bucket: BucketNumber) -> bool {
        self.buckets.get(&bucket).map(BTreeSet::is_empty).unwrap_or(true)
    }

    pub(crate) fn remove_bucket(&mut self, bucket: BucketNumber) {
        self.buckets.remove(&bucket);
    }
}

impl FromIterator<(BucketNumber, BTreeSet<Flashcard>)> for BucketAssignment {
    fn from_iter<T: IntoIterator<Item = (BucketNumber, BTreeSet<Flashcard>)>>(iter: T) -> Self {
        Self {
            buckets: iter.into_iter().collect(),
        }
    }
}

/// Dense view of a [`BucketAssignment`]: index `i` holds bucket `i`, the last
/// index is the retired bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BucketSequence(Vec<BTreeSet<Flashcard>>);

impl BucketSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BTreeSet<Flashcard>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BTreeSet<Flashcard>> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BTreeSet<Flashcard>] {
        &self.0
    }
}

impl From<Vec<BTreeSet<Flashcard>>> for BucketSequence {
    fn from(v: Vec<BTreeSet<Flashcard>>) -> Self {
        Self(v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRange {
    pub min_bucket: BucketNumber,
    pub max_bucket: BucketNumber,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub card_front: String,
    pub card_back: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub difficulty: AnswerDifficulty,
    pub previous_bucket: BucketNumber,
    pub new_bucket: BucketNumber,
}

impl PracticeRecord {
    pub fn new(
        card: &Flashcard,
        difficulty: AnswerDifficulty,
        previous_bucket: BucketNumber,
        new_bucket: BucketNumber,
    ) -> Self {
        Self {
            card_front: card.front.clone(),
            card_back: card.back.clone(),
            timestamp: Utc::now(),
            difficulty,
            previous_bucket,
            new_bucket,
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey {
            front: self.card_front.clone(),
            back: self.card_back.clone(),
        }
    }

    /// A record must name the card it belongs to.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.card_front.is_empty() || self.card_back.is_empty() {
            return Err(CoreError::Invalid("practice record is missing card information"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_cards: usize,
    pub cards_by_bucket: BTreeMap<BucketNumber, usize>,
    pub retired_cards: usize,
    pub success_rate: f64,
    pub hardest_cards: Vec<Flashcard>,
    pub average_moves_per_card: f64,
    pub total_practice_events: usize,
}

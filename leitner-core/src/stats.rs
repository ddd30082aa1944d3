use crate::scheduler::validate_buckets;
use crate::{
    AnswerDifficulty, BucketAssignment, CardKey, CoreError, Flashcard, PracticeRecord,
    ProgressStats,
};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const HARDEST_CARDS_LIMIT: usize = 3;

#[derive(Clone, Debug, Default)]
pub struct Totals {
    pub total: usize,
    pub correct: usize,
}

impl Totals {
    pub fn record(&mut self, d: AnswerDifficulty) {
        self.total += 1;
        if d.is_correct() {
            self.correct += 1;
        }
    }

    /// Percentage of non-`Wrong` answers, `0` with no answers.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }
}

/// Up to `limit` cards with the most `Wrong` answers. Equal counts keep the
/// order in which the cards were first answered wrong.
pub fn hardest_cards(
    assignment: &BucketAssignment,
    history: &[PracticeRecord],
    limit: usize,
) -> Vec<Flashcard> {
    let mut order: Vec<CardKey> = Vec::new();
    let mut wrong: HashMap<CardKey, usize> = HashMap::new();
    for r in history.iter().filter(|r| r.difficulty == AnswerDifficulty::Wrong) {
        let key = r.key();
        let count = wrong.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    // sort_by_key is stable, so first-seen order survives among ties
    order.sort_by_key(|k| std::cmp::Reverse(wrong.get(k).copied().unwrap_or(0)));
    order
        .into_iter()
        .take(limit)
        .map(|k| {
            assignment
                .find(&k.front, &k.back)
                .cloned()
                .unwrap_or_else(|| Flashcard::new(k.front, k.back))
        })
        .collect()
}

pub fn compute_progress(
    assignment: &BucketAssignment,
    history: &[PracticeRecord],
) -> Result<ProgressStats, CoreError> {
    validate_buckets(assignment)?;
    let retired = match assignment.retired_bucket() {
        Some(r) if r > 0 => r,
        _ => {
            return Err(CoreError::InvalidState(
                "retired bucket number must be positive",
            ))
        }
    };

    let cards_by_bucket: BTreeMap<_, _> = (0..=retired)
        .map(|b| (b, assignment.get(b).map(|cards| cards.len()).unwrap_or(0)))
        .collect();
    let total_cards: usize = cards_by_bucket.values().sum();
    let retired_cards = cards_by_bucket.get(&retired).copied().unwrap_or(0);

    let mut totals = Totals::default();
    for r in history {
        totals.record(r.difficulty);
    }

    let practiced: HashSet<CardKey> = history.iter().map(PracticeRecord::key).collect();
    let average_moves_per_card = if practiced.is_empty() {
        0.0
    } else {
        history.len() as f64 / practiced.len() as f64
    };

    Ok(ProgressStats {
        total_cards,
        cards_by_bucket,
        retired_cards,
        success_rate: totals.success_rate(),
        hardest_cards: hardest_cards(assignment, history, HARDEST_CARDS_LIMIT),
        average_moves_per_card,
        total_practice_events: history.len(),
    })
}

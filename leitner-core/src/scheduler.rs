//! Modified-Leitner bucket scheduling.
//!
//! Bucket `i` is practiced every `2^i` days; the highest bucket is retired
//! and never practiced.

use crate::{
    AnswerDifficulty, BucketAssignment, BucketNumber, BucketRange, BucketSequence, CoreError, Day,
    Flashcard,
};
use std::collections::BTreeSet;

pub(crate) fn validate_buckets(assignment: &BucketAssignment) -> Result<(), CoreError> {
    if assignment.bucket_count() < 2 || !assignment.contains_bucket(0) {
        return Err(CoreError::InvalidState(
            "buckets must include bucket 0 and a retired bucket",
        ));
    }
    Ok(())
}

/// Dense view of `assignment`, with empty sets for missing bucket numbers.
/// An assignment without any buckets maps to an empty sequence.
pub fn to_bucket_sequence(assignment: &BucketAssignment) -> Result<BucketSequence, CoreError> {
    if assignment.is_empty() {
        return Ok(BucketSequence::default());
    }
    validate_buckets(assignment)?;

    let retired = assignment
        .retired_bucket()
        .ok_or(CoreError::InvalidState("no retired bucket"))?;
    let mut sequence = vec![BTreeSet::new(); retired as usize + 1];
    for (bucket, cards) in assignment.iter() {
        sequence[bucket as usize] = cards.clone();
    }
    Ok(sequence.into())
}

pub fn bucket_range(sequence: &BucketSequence) -> Option<BucketRange> {
    let mut occupied = sequence
        .iter()
        .enumerate()
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(i, _)| i as BucketNumber);
    let min_bucket = occupied.next()?;
    let max_bucket = occupied.last().unwrap_or(min_bucket);
    Some(BucketRange {
        min_bucket,
        max_bucket,
    })
}

/// Whether bucket `bucket` is practiced on `day` (0-indexed).
pub fn is_due_on(bucket: BucketNumber, day: Day) -> bool {
    let effective_day = u128::from(day) + 1;
    match 1u128.checked_shl(bucket) {
        Some(period) => effective_day % period == 0,
        None => false,
    }
}

/// Cards to practice on `day`: the union of every non-retired bucket whose
/// period divides `day + 1`.
pub fn select_due(sequence: &BucketSequence, day: Day) -> BTreeSet<Flashcard> {
    let practicable = sequence.len().saturating_sub(1);
    sequence
        .iter()
        .take(practicable)
        .enumerate()
        .filter(|(i, _)| is_due_on(*i as BucketNumber, day))
        .flat_map(|(_, cards)| cards.iter().cloned())
        .collect()
}

fn next_bucket(
    current: BucketNumber,
    retired: BucketNumber,
    difficulty: AnswerDifficulty,
) -> BucketNumber {
    debug_assert!(current <= retired, "card above the retired bucket");
    match difficulty {
        AnswerDifficulty::Easy if current < retired => current + 1,
        AnswerDifficulty::Easy => retired,
        AnswerDifficulty::Hard => current.saturating_sub(1),
        AnswerDifficulty::Wrong => 0,
    }
}

/// Moves `card` after one practice trial and returns the new assignment.
/// The input is left untouched; an unknown card yields an unchanged copy.
///
/// Emptied intermediate buckets are dropped. Bucket 0 and the retired bucket
/// always stay.
pub fn apply_trial(
    assignment: &BucketAssignment,
    card: &Flashcard,
    difficulty: AnswerDifficulty,
) -> BucketAssignment {
    let mut next = assignment.clone();
    let (Some(current), Some(retired)) = (assignment.bucket_of(card), assignment.retired_bucket())
    else {
        return next;
    };
    let Some(moved) = next.take(current, card) else {
        return next;
    };

    if next.is_bucket_empty(current) && current != 0 && current != retired {
        next.remove_bucket(current);
    }

    next.insert(next_bucket(current, retired, difficulty), moved);
    next
}

pub fn derive_hint(card: &Flashcard) -> &str {
    &card.hint
}

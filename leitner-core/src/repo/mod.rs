use crate::{AnswerDifficulty, BucketAssignment, CoreError, Day, Flashcard, PracticeRecord};
use async_trait::async_trait;

pub mod memory;

/// Consistent copy of the whole trainer state.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub assignment: BucketAssignment,
    pub history: Vec<PracticeRecord>,
    pub day: Day,
}

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, CoreError>;

    // Day counter
    async fn current_day(&self) -> Result<Day, CoreError>;
    async fn advance_day(&self) -> Result<Day, CoreError>;

    // Cards
    async fn find_card(&self, front: &str, back: &str) -> Result<Flashcard, CoreError>;
    async fn add_card(&self, card: Flashcard) -> Result<Flashcard, CoreError>;

    /// Moves the card and appends the resulting record in one step. The
    /// record is checked before the move is committed.
    async fn submit_trial(
        &self,
        front: &str,
        back: &str,
        difficulty: AnswerDifficulty,
    ) -> Result<PracticeRecord, CoreError>;
}

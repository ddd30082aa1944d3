use crate::{
    apply_trial, AnswerDifficulty, BucketAssignment, BucketNumber, CoreError, Day, Flashcard,
    PracticeRecord, Snapshot,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_RETIRED_BUCKET: BucketNumber = 1;

struct State {
    assignment: BucketAssignment,
    history: Vec<PracticeRecord>,
    day: Day,
}

impl State {
    fn push_record(&mut self, record: PracticeRecord) -> Result<(), CoreError> {
        record.validate()?;
        self.history.push(record);
        Ok(())
    }
}

/// Process-local state. Every operation takes the single lock once, so each
/// trial is an atomic read-modify-write.
pub struct MemoryStore {
    state: RwLock<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETIRED_BUCKET)
    }
}

impl MemoryStore {
    pub fn new(retired_bucket: BucketNumber) -> Self {
        Self {
            state: RwLock::new(State {
                assignment: BucketAssignment::with_retired(retired_bucket.max(1)),
                history: Vec::new(),
                day: 0,
            }),
        }
    }

    /// New store with `cards` in bucket 0. Repeated cards are skipped.
    pub fn seeded(
        retired_bucket: BucketNumber,
        cards: impl IntoIterator<Item = Flashcard>,
    ) -> Self {
        let store = Self::new(retired_bucket);
        {
            let mut s = store.state.write();
            for card in cards {
                if card.front.is_empty() || card.back.is_empty() {
                    warn!("skipping seed card without front or back");
                    continue;
                }
                if s.assignment.find(&card.front, &card.back).is_some() {
                    warn!(front = %card.front, "skipping duplicate seed card");
                    continue;
                }
                s.assignment.insert(0, card);
            }
            info!(
                cards = s.assignment.card_count(),
                retired_bucket = ?s.assignment.retired_bucket(),
                "state store initialized"
            );
        }
        store
    }
}

#[async_trait]
impl crate::repo::StateStore for MemoryStore {
    async fn snapshot(&self) -> Result<Snapshot, CoreError> {
        let s = self.state.read();
        Ok(Snapshot {
            assignment: s.assignment.clone(),
            history: s.history.clone(),
            day: s.day,
        })
    }

    async fn current_day(&self) -> Result<Day, CoreError> {
        Ok(self.state.read().day)
    }

    async fn advance_day(&self) -> Result<Day, CoreError> {
        let mut s = self.state.write();
        s.day += 1;
        info!(day = s.day, "advanced day");
        Ok(s.day)
    }

    async fn find_card(&self, front: &str, back: &str) -> Result<Flashcard, CoreError> {
        if front.is_empty() || back.is_empty() {
            return Err(CoreError::NotFound("card"));
        }
        self.state
            .read()
            .assignment
            .find(front, back)
            .cloned()
            .ok_or(CoreError::NotFound("card"))
    }

    async fn add_card(&self, card: Flashcard) -> Result<Flashcard, CoreError> {
        if card.front.is_empty() || card.back.is_empty() {
            return Err(CoreError::Invalid("front and back text are required"));
        }
        let mut s = self.state.write();
        if s.assignment.find(&card.front, &card.back).is_some() {
            return Err(CoreError::Conflict("card already exists"));
        }
        s.assignment.insert(0, card.clone());
        info!(front = %card.front, "added card to bucket 0");
        Ok(card)
    }

    async fn submit_trial(
        &self,
        front: &str,
        back: &str,
        difficulty: AnswerDifficulty,
    ) -> Result<PracticeRecord, CoreError> {
        let mut s = self.state.write();
        let card = s
            .assignment
            .find(front, back)
            .cloned()
            .ok_or(CoreError::NotFound("card"))?;
        let previous = s
            .assignment
            .bucket_of(&card)
            .ok_or(CoreError::NotFound("card"))?;

        let next = apply_trial(&s.assignment, &card, difficulty);
        let new_bucket = next
            .bucket_of(&card)
            .ok_or(CoreError::InvalidState("card lost during update"))?;

        let record = PracticeRecord::new(&card, difficulty, previous, new_bucket);
        s.push_record(record.clone())?;
        s.assignment = next;
        debug!(front = %card.front, ?difficulty, previous, new_bucket, "card moved");
        Ok(record)
    }
}

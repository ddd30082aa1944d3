use leitner_core::repo::memory::MemoryStore;
use leitner_core::{
    compute_progress, AnswerDifficulty, CoreError, Flashcard, PracticeRecord, Snapshot,
    StateStore,
};
use std::sync::Arc;

fn deck() -> Vec<Flashcard> {
    vec![
        Flashcard::new("Capital of Italy?", "Rome").with_hint("The pope of ..."),
        Flashcard::new("Cane", "Dog").with_tags(["noun", "italian"]),
    ]
}

#[tokio::test]
async fn seeded_store_starts_in_bucket_zero() {
    let store = MemoryStore::seeded(1, deck());
    let snap = store.snapshot().await.unwrap();
    assert_eq!(snap.day, 0);
    assert!(snap.history.is_empty());
    assert_eq!(snap.assignment.get(0).unwrap().len(), 2);
    assert_eq!(snap.assignment.retired_bucket(), Some(1));
}

#[tokio::test]
async fn seeded_store_skips_duplicates() {
    let mut cards = deck();
    cards.push(Flashcard::new("Cane", "Dog").with_hint("other"));
    cards.push(Flashcard::new("", "nothing"));
    let store = MemoryStore::seeded(2, cards);
    let snap = store.snapshot().await.unwrap();
    assert_eq!(snap.assignment.card_count(), 2);
    // only bucket 0 and the retired bucket exist up front
    assert_eq!(snap.assignment.bucket_numbers().collect::<Vec<_>>(), vec![0, 2]);
}

#[tokio::test]
async fn advance_day_increments() {
    let store = MemoryStore::default();
    assert_eq!(store.current_day().await.unwrap(), 0);
    assert_eq!(store.advance_day().await.unwrap(), 1);
    assert_eq!(store.advance_day().await.unwrap(), 2);
    assert_eq!(store.current_day().await.unwrap(), 2);
}

#[tokio::test]
async fn add_card_validates_and_rejects_duplicates() {
    let store = MemoryStore::default();
    let added = store
        .add_card(Flashcard::new("q", "a").with_hint("h"))
        .await
        .unwrap();
    assert_eq!(added.hint, "h");
    assert_eq!(
        store.find_card("q", "a").await.unwrap().hint,
        "h".to_string()
    );

    assert_eq!(
        store.add_card(Flashcard::new("q", "a")).await.unwrap_err(),
        CoreError::Conflict("card already exists")
    );
    assert!(matches!(
        store.add_card(Flashcard::new("", "a")).await,
        Err(CoreError::Invalid(_))
    ));
}

#[tokio::test]
async fn find_card_requires_both_sides() {
    let store = MemoryStore::seeded(1, deck());
    assert!(store.find_card("Cane", "Dog").await.is_ok());
    assert_eq!(
        store.find_card("Cane", "").await.unwrap_err(),
        CoreError::NotFound("card")
    );
    assert_eq!(
        store.find_card("Cane", "Cat").await.unwrap_err(),
        CoreError::NotFound("card")
    );
}

#[tokio::test]
async fn submit_trial_moves_card_and_records_history() {
    let store = MemoryStore::seeded(3, deck());
    let r = store
        .submit_trial("Cane", "Dog", AnswerDifficulty::Easy)
        .await
        .unwrap();
    assert_eq!((r.previous_bucket, r.new_bucket), (0, 1));

    let r = store
        .submit_trial("Cane", "Dog", AnswerDifficulty::Hard)
        .await
        .unwrap();
    assert_eq!((r.previous_bucket, r.new_bucket), (1, 0));

    let snap = store.snapshot().await.unwrap();
    assert_eq!(snap.history.len(), 2);
    // bucket 1 emptied by the Hard answer and pruned
    assert!(!snap.assignment.contains_bucket(1));
    assert!(snap.assignment.contains_bucket(3));

    let stats = compute_progress(&snap.assignment, &snap.history).unwrap();
    assert_eq!(stats.total_cards, 2);
    assert_eq!(stats.success_rate, 100.0);
}

#[tokio::test]
async fn submit_trial_unknown_card() {
    let store = MemoryStore::seeded(1, deck());
    assert_eq!(
        store
            .submit_trial("nope", "nope", AnswerDifficulty::Wrong)
            .await
            .unwrap_err(),
        CoreError::NotFound("card")
    );
    assert!(store.snapshot().await.unwrap().history.is_empty());
}

#[test]
fn record_without_card_identity_is_invalid() {
    let mut r = PracticeRecord::new(&Flashcard::new("q", "a"), AnswerDifficulty::Easy, 0, 1);
    assert!(r.validate().is_ok());
    r.card_back.clear();
    assert!(matches!(r.validate(), Err(CoreError::Invalid(_))));
}

fn empty_intermediate_buckets(snap: &Snapshot) -> Vec<u32> {
    let a = &snap.assignment;
    let retired = a.retired_bucket().unwrap();
    a.iter()
        .filter(|(b, cards)| *b != 0 && *b != retired && cards.is_empty())
        .map(|(b, _)| b)
        .collect()
}

#[tokio::test]
async fn trials_never_leave_empty_intermediate_buckets() {
    let store = MemoryStore::seeded(3, vec![Flashcard::new("q", "a")]);
    assert!(empty_intermediate_buckets(&store.snapshot().await.unwrap()).is_empty());

    let steps = [
        (AnswerDifficulty::Easy, 1),
        (AnswerDifficulty::Easy, 2),
        (AnswerDifficulty::Hard, 1),
        (AnswerDifficulty::Easy, 2),
        (AnswerDifficulty::Easy, 3),
        (AnswerDifficulty::Hard, 2),
        (AnswerDifficulty::Wrong, 0),
    ];
    for (difficulty, expected) in steps {
        let r = store.submit_trial("q", "a", difficulty).await.unwrap();
        assert_eq!(r.new_bucket, expected);

        let snap = store.snapshot().await.unwrap();
        assert_eq!(empty_intermediate_buckets(&snap), Vec::<u32>::new());
        assert_eq!(snap.assignment.retired_bucket(), Some(3));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_trials_on_different_cards_both_land() {
    let cards: Vec<Flashcard> = (0..32)
        .map(|i| Flashcard::new(format!("q{i}"), format!("a{i}")))
        .collect();
    let store = Arc::new(MemoryStore::seeded(2, cards.clone()));

    let mut handles = Vec::new();
    for c in cards {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .submit_trial(&c.front, &c.back, AnswerDifficulty::Easy)
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let snap = store.snapshot().await.unwrap();
    assert_eq!(snap.history.len(), 32);
    assert!(snap.assignment.get(0).unwrap().is_empty());
    assert_eq!(snap.assignment.get(1).unwrap().len(), 32);
}

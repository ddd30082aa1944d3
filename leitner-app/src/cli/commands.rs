use crate::api::dto::parse_difficulty;
use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::seed;

use anyhow::Result;
use leitner_core::repo::memory::MemoryStore;
use leitner_core::{
    bucket_range, compute_progress, derive_hint, filter_by_tag, filter_by_text, select_due,
    to_bucket_sequence, StateStore,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

pub async fn run_cli(args: Cli) -> Result<()> {
    let cards = match &args.cards {
        Some(path) => seed::load_cards(path)?,
        None => seed::sample_cards(),
    };
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::seeded(args.retired_bucket, cards));

    match args.cmd {
        Command::Serve(cmd) => {
            let addr: std::net::SocketAddr = cmd.addr.parse()?;
            api_server::run(store, addr).await
        }
        Command::Practice(cmd) => {
            let stdin = std::io::stdin();
            practice_session(&*store, &cmd, &mut stdin.lock(), &mut std::io::stdout()).await
        }
    }
}

enum Answer {
    Graded(leitner_core::AnswerDifficulty),
    Skip,
    Quit,
}

pub async fn practice_session<S, R, W>(
    store: &S,
    cmd: &PracticeCmd,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: StateStore + ?Sized,
    R: BufRead,
    W: Write,
{
    'days: for _ in 0..cmd.days {
        let snap = store.snapshot().await?;
        let due = select_due(&to_bucket_sequence(&snap.assignment)?, snap.day);
        let mut pool: Vec<_> = match &cmd.tag {
            Some(tag) => filter_by_tag(&due, tag),
            None => due.into_iter().collect(),
        };
        if let Some(text) = &cmd.query {
            pool = filter_by_text(&pool, text);
        }
        writeln!(out, "\n== day {} ({} due) ==", snap.day, pool.len())?;

        let total = pool.len();
        for (i, card) in pool.into_iter().enumerate() {
            writeln!(out, "\n[{}/{}] Q: {}", i + 1, total, card.front)?;
            loop {
                let line = read_line(input, out, "[enter=show, ?=hint] ")?;
                match line.as_deref().map(str::trim) {
                    Some("?") => {
                        let h = derive_hint(&card);
                        writeln!(out, "hint: {}", if h.is_empty() { "(none)" } else { h })?;
                    }
                    Some(_) => break,
                    None => break 'days,
                }
            }
            writeln!(out, "A: {}", card.back)?;
            writeln!(out, "[0=Wrong, 1=Hard, 2=Easy, s=skip, q=quit]")?;

            let answer = loop {
                let Some(line) = read_line(input, out, "difficulty> ")? else {
                    break Answer::Quit;
                };
                match line.trim().to_lowercase().as_str() {
                    "s" | "skip" => break Answer::Skip,
                    "q" | "quit" => break Answer::Quit,
                    other => match parse_difficulty(other) {
                        Some(d) => break Answer::Graded(d),
                        None => writeln!(out, "enter 0/1/2, s, or q")?,
                    },
                }
            };

            match answer {
                Answer::Graded(d) => {
                    let r = store.submit_trial(&card.front, &card.back, d).await?;
                    writeln!(out, "→ bucket {} → {}", r.previous_bucket, r.new_bucket)?;
                }
                Answer::Skip => debug!(front = %card.front, "skipped"),
                Answer::Quit => break 'days,
            }
        }

        store.advance_day().await?;
    }

    print_progress(store, out).await
}

async fn print_progress<S, W>(store: &S, out: &mut W) -> Result<()>
where
    S: StateStore + ?Sized,
    W: Write,
{
    let snap = store.snapshot().await?;
    let stats = compute_progress(&snap.assignment, &snap.history)?;

    writeln!(out, "\n== progress (day {}) ==", snap.day)?;
    writeln!(out, "cards: {} ({} retired)", stats.total_cards, stats.retired_cards)?;
    for (bucket, count) in &stats.cards_by_bucket {
        writeln!(out, "  bucket {bucket}: {count}")?;
    }
    if let Some(range) = bucket_range(&to_bucket_sequence(&snap.assignment)?) {
        writeln!(out, "occupied buckets: {}..={}", range.min_bucket, range.max_bucket)?;
    }
    writeln!(
        out,
        "answers: {}  success: {:.1}%  moves/card: {:.2}",
        stats.total_practice_events, stats.success_rate, stats.average_moves_per_card
    )?;
    if !stats.hardest_cards.is_empty() {
        let fronts: Vec<&str> = stats.hardest_cards.iter().map(|c| c.front.as_str()).collect();
        writeln!(out, "hardest: {}", fronts.join(" | "))?;
    }
    Ok(())
}

// ===== Helpers =====
/// `None` at end of input.
fn read_line<R, W>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{prompt}")?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leitner_core::Flashcard;
    use std::io::Cursor;

    fn store() -> MemoryStore {
        MemoryStore::seeded(
            2,
            vec![
                Flashcard::new("Cane", "Dog").with_hint("a loyal friend").with_tags(["italian"]),
                Flashcard::new("3**3?", "27").with_tags(["math"]),
            ],
        )
    }

    fn days(days: u64) -> PracticeCmd {
        PracticeCmd {
            days,
            tag: None,
            query: None,
        }
    }

    async fn run(store: &MemoryStore, cmd: PracticeCmd, input: &str) -> String {
        let mut out = Vec::new();
        practice_session(store, &cmd, &mut Cursor::new(input.to_string()), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn grades_cards_and_advances_days() {
        let store = store();
        // day 0: "3**3?" sorts before "Cane"; both answered Easy
        let out = run(&store, days(1), "\n2\n\ne\n").await;

        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.day, 1);
        assert_eq!(snap.history.len(), 2);
        assert_eq!(snap.assignment.get(1).unwrap().len(), 2);
        assert!(out.contains("== day 0 (2 due) =="));
        assert!(out.contains("success: 100.0%"));
    }

    #[tokio::test]
    async fn hint_skip_and_tag_filter() {
        let store = store();
        let cmd = PracticeCmd {
            tag: Some("italian".into()),
            ..days(1)
        };
        let out = run(&store, cmd, "?\n\nx\ns\n").await;

        assert!(out.contains("hint: a loyal friend"));
        assert!(out.contains("enter 0/1/2, s, or q"));
        assert!(store.snapshot().await.unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn text_query_narrows_the_due_cards() {
        let store = store();
        let cmd = PracticeCmd {
            query: Some("LOYAL".into()),
            ..days(1)
        };
        let out = run(&store, cmd, "\n0\n").await;

        assert!(out.contains("== day 0 (1 due) =="));
        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.history.len(), 1);
        assert_eq!(snap.history[0].card_front, "Cane");
    }

    #[tokio::test]
    async fn quit_stops_without_advancing() {
        let store = store();
        let out = run(&store, days(5), "\nq\n").await;
        assert_eq!(store.current_day().await.unwrap(), 0);
        assert!(out.contains("== progress (day 0) =="));
    }

    #[tokio::test]
    async fn end_of_input_ends_session() {
        let store = store();
        let out = run(&store, days(3), "").await;
        assert_eq!(store.current_day().await.unwrap(), 0);
        assert!(out.contains("cards: 2 (0 retired)"));
    }
}

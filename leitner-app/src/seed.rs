use anyhow::{bail, Context, Result};
use leitner_core::Flashcard;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Deck used when no `--cards` file is given.
pub fn sample_cards() -> Vec<Flashcard> {
    vec![
        Flashcard::new("Capital of Georgia?", "Tbilisi")
            .with_hint("Starts with 'T'")
            .with_tags(["geography", "capitals"]),
        Flashcard::new("Capital of Italy?", "Rome")
            .with_hint("The pope lives there")
            .with_tags(["geography", "capitals"]),
        Flashcard::new("4**4 + 16?", "272")
            .with_hint("256 plus sixteen")
            .with_tags(["math"]),
        Flashcard::new("3**3?", "27")
            .with_hint("three times three times three")
            .with_tags(["math"]),
        Flashcard::new("Who wrote 'Romeo and Juliet'?", "William Shakespeare")
            .with_hint("Many of his plays inspired operas.")
            .with_tags(["literature"]),
        Flashcard::new("Who wrote 'Frankenstein'?", "Mary Wollstonecraft Shelley")
            .with_hint("Her first name is Mary")
            .with_tags(["literature"]),
        Flashcard::new("Dottore", "Doctor")
            .with_hint("who you see at the hospital")
            .with_tags(["noun", "italian"]),
        Flashcard::new("Cane", "Dog")
            .with_hint("a loyal friend")
            .with_tags(["noun", "italian"]),
    ]
}

#[derive(Deserialize)]
struct CsvCard {
    front: String,
    back: String,
    #[serde(default)]
    hint: String,
    #[serde(default)]
    tags: String,
}

impl From<CsvCard> for Flashcard {
    fn from(c: CsvCard) -> Self {
        Flashcard::new(c.front.trim(), c.back.trim())
            .with_hint(c.hint)
            .with_tags(c.tags.split(';').map(str::trim).filter(|t| !t.is_empty()))
    }
}

/// Reads a deck from `.csv` (header `front,back,hint,tags`, tags split on
/// `;`) or from a JSON array of cards.
pub fn load_cards(path: &Path) -> Result<Vec<Flashcard>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let cards: Vec<Flashcard> = if is_csv {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let mut cards: Vec<Flashcard> = Vec::new();
        for rec in rdr.deserialize::<CsvCard>() {
            cards.push(rec.with_context(|| format!("reading {}", path.display()))?.into());
        }
        cards
    } else {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?
    };

    if let Some(bad) = cards.iter().find(|c| c.front.is_empty() || c.back.is_empty()) {
        bail!("card without front or back in {}: {:?}", path.display(), bad);
    }
    info!(path = %path.display(), count = cards.len(), "loaded seed cards");
    Ok(cards)
}

use crate::Flashcard;

pub fn filter_by_text<'a, I>(cards: I, query: &str) -> Vec<Flashcard>
where
    I: IntoIterator<Item = &'a Flashcard>,
{
    let q = query.trim().to_lowercase();
    cards
        .into_iter()
        .filter(|c| {
            q.is_empty()
                || c.front.to_lowercase().contains(&q)
                || c.back.to_lowercase().contains(&q)
                || c.hint.to_lowercase().contains(&q)
                || c.tags.iter().any(|t| t.to_lowercase().contains(&q))
        })
        .cloned()
        .collect()
}

pub fn filter_by_tag<'a, I>(cards: I, tag: &str) -> Vec<Flashcard>
where
    I: IntoIterator<Item = &'a Flashcard>,
{
    let q = tag.trim().to_lowercase();
    cards
        .into_iter()
        .filter(|c| q.is_empty() || c.tags.iter().any(|t| t.to_lowercase() == q))
        .cloned()
        .collect()
}

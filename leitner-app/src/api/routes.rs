use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use leitner_core::{
    bucket_range, compute_progress, derive_hint, filter_by_tag, filter_by_text, select_due,
    to_bucket_sequence, CoreError, Flashcard, ProgressStats, StateStore,
};

use crate::api::dto::{
    difficulty_from_json, BucketsOut, CardIn, CardOut, DayOut, HintOut, HintQuery, MessageOut,
    PracticeOut, PracticeQuery, UpdateIn, UpdateOut,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StateStore>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Maps a core error; `context` is the message shown for broken state.
    pub fn core(err: CoreError, context: &'static str) -> Self {
        let (status, message) = match &err {
            CoreError::NotFound("card") => (StatusCode::NOT_FOUND, "Card not found".to_string()),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            CoreError::Invalid(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            CoreError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
            CoreError::InvalidState(_) => {
                error!(error = %err, "{context}");
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            warn!(status = %self.status, message = %self.message, "request rejected");
        }
        (self.status, Json(MessageOut { message: self.message })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[instrument(level = "info", skip(st, q), fields(tag = ?q.tag, q = ?q.q))]
pub async fn practice(
    State(st): State<Arc<AppState>>,
    Query(q): Query<PracticeQuery>,
) -> ApiResult<Json<PracticeOut>> {
    const CTX: &str = "Error fetching practice cards";
    let snap = st.store.snapshot().await.map_err(|e| ApiError::core(e, CTX))?;
    let seq = to_bucket_sequence(&snap.assignment).map_err(|e| ApiError::core(e, CTX))?;
    let due = select_due(&seq, snap.day);
    let mut cards: Vec<Flashcard> = match q.tag.as_deref() {
        Some(tag) => filter_by_tag(&due, tag),
        None => due.into_iter().collect(),
    };
    if let Some(text) = q.q.as_deref() {
        cards = filter_by_text(&cards, text);
    }

    info!(day = snap.day, count = cards.len(), "practice cards served");
    Ok(Json(PracticeOut {
        cards,
        day: snap.day,
    }))
}

#[instrument(level = "info", skip(st, body), fields(front = %body.card_front))]
pub async fn update(
    State(st): State<Arc<AppState>>,
    Json(body): Json<UpdateIn>,
) -> ApiResult<Json<UpdateOut>> {
    let difficulty = difficulty_from_json(&body.difficulty)
        .ok_or_else(|| ApiError::bad_request("Invalid difficulty level"))?;

    let record = st
        .store
        .submit_trial(&body.card_front, &body.card_back, difficulty)
        .await
        .map_err(|e| ApiError::core(e, "Error updating card"))?;

    info!(
        previous = record.previous_bucket,
        new = record.new_bucket,
        "card updated"
    );
    Ok(Json(UpdateOut {
        message: "Card updated successfully".into(),
        record,
    }))
}

#[instrument(level = "info", skip(st, q))]
pub async fn hint(
    State(st): State<Arc<AppState>>,
    Query(q): Query<HintQuery>,
) -> ApiResult<Json<HintOut>> {
    let (Some(front), Some(back)) = (q.card_front, q.card_back) else {
        return Err(ApiError::bad_request("Invalid query parameters"));
    };
    let card = st
        .store
        .find_card(&front, &back)
        .await
        .map_err(|e| ApiError::core(e, "Error getting hint"))?;

    Ok(Json(HintOut {
        hint: derive_hint(&card).to_string(),
    }))
}

#[instrument(level = "info", skip(st))]
pub async fn progress(State(st): State<Arc<AppState>>) -> ApiResult<Json<ProgressStats>> {
    const CTX: &str = "Error computing progress";
    let snap = st.store.snapshot().await.map_err(|e| ApiError::core(e, CTX))?;
    compute_progress(&snap.assignment, &snap.history)
        .map(Json)
        .map_err(|e| ApiError::core(e, CTX))
}

#[instrument(level = "info", skip(st))]
pub async fn buckets(State(st): State<Arc<AppState>>) -> ApiResult<Json<BucketsOut>> {
    const CTX: &str = "Error reading buckets";
    let snap = st.store.snapshot().await.map_err(|e| ApiError::core(e, CTX))?;
    let seq = to_bucket_sequence(&snap.assignment).map_err(|e| ApiError::core(e, CTX))?;

    let buckets: BTreeMap<u32, Vec<Flashcard>> = seq
        .iter()
        .enumerate()
        .map(|(i, cards)| (i as u32, cards.iter().cloned().collect()))
        .collect();
    Ok(Json(BucketsOut {
        range: bucket_range(&seq),
        buckets,
    }))
}

#[instrument(level = "info", skip(st))]
pub async fn next_day(State(st): State<Arc<AppState>>) -> ApiResult<Json<DayOut>> {
    let day = st
        .store
        .advance_day()
        .await
        .map_err(|e| ApiError::core(e, "Error advancing day"))?;
    Ok(Json(DayOut {
        message: format!("Advanced to day {day}"),
        current_day: day,
    }))
}

#[instrument(level = "info", skip(st, body))]
pub async fn add_card(
    State(st): State<Arc<AppState>>,
    Json(body): Json<CardIn>,
) -> ApiResult<(StatusCode, Json<CardOut>)> {
    let (Some(front), Some(back)) = (body.front, body.back) else {
        return Err(ApiError::bad_request("Front and back text are required"));
    };
    if front.is_empty() || back.is_empty() {
        return Err(ApiError::bad_request("Front and back text are required"));
    }

    let card = Flashcard::new(front, back)
        .with_hint(body.hint.unwrap_or_default())
        .with_tags(body.tags.unwrap_or_default());
    let card = st
        .store
        .add_card(card)
        .await
        .map_err(|e| ApiError::core(e, "Error adding card"))?;

    Ok((
        StatusCode::CREATED,
        Json(CardOut {
            message: "Card added successfully".into(),
            card,
        }),
    ))
}

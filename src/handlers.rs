// handlers.rs
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Redirect,
};
use chrono::SecondsFormat;
use http::header::AUTHORIZATION;
use tracing::warn;

use crate::{
    error::AppError,
    models::{LookupStatus, StatusQuery, StatusView, VoteRequest},
    state::AppState,
    tally::{Summary, summarize},
    window::VotePhase,
};

/// Participant-facing message for a phase and an optional code lookup.
pub fn status_message(phase: VotePhase, lookup: Option<&LookupStatus>) -> Option<String> {
    let phase_message = match phase {
        VotePhase::BeforeStart => {
            Some("Pemilihan belum dimulai — tunggu sampai waktu pembukaan.".to_string())
        }
        VotePhase::AfterEnd => Some("Pemilihan ditutup.".to_string()),
        VotePhase::Open => None,
    };

    match lookup {
        None => phase_message,
        Some(LookupStatus::NotFound) => Some("Kode tidak ditemukan!".to_string()),
        Some(LookupStatus::Used(_)) => Some("Terima kasih telah memilih.".to_string()),
        Some(LookupStatus::Unused(name)) => match phase {
            VotePhase::Open => Some(format!("Selamat, {name}! Silakan pilih.")),
            _ => phase_message,
        },
    }
}

/// Current phase plus, when `?code=` is given, the status of that code.
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusView>, AppError> {
    let now = state.clock.now();
    let window = state.engine.window();
    let phase = state.engine.phase(now);
    let code = query.code.unwrap_or_default().trim().to_string();

    let lookup = if code.is_empty() {
        None
    } else {
        Some(state.engine.lookup(&code).await?)
    };

    Ok(Json(StatusView {
        name: lookup.as_ref().and_then(|l| l.name()).map(str::to_string),
        already_used: matches!(lookup, Some(LookupStatus::Used(_))),
        success: query.success.as_deref() == Some("1"),
        message: status_message(phase, lookup.as_ref()),
        phase,
        start: window.start().to_rfc3339_opts(SecondsFormat::Secs, true),
        end: window.end().to_rfc3339_opts(SecondsFormat::Secs, true),
        code,
    }))
}

/// `/{code}` is a shareable link; it lands on `/?code={code}`, keeping the
/// `success` flag set by a completed vote.
pub async fn code_link_handler(
    Path(code): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Redirect {
    let code = code.trim();

    if code.is_empty() || code == "index.html" {
        return Redirect::to("/");
    }

    let mut target = format!("/?code={}", urlencoding::encode(code));
    if query.success.as_deref() == Some("1") {
        target.push_str("&success=1");
    }

    Redirect::to(&target)
}

pub async fn vote_handler(
    State(state): State<Arc<AppState>>,
    Form(request): Form<VoteRequest>,
) -> Result<Redirect, AppError> {
    let now = state.clock.now();

    state
        .engine
        .submit(&request.code, &request.choice, now)
        .await?;

    Ok(Redirect::to(&format!(
        "/{}?success=1",
        urlencoding::encode(request.code.trim())
    )))
}

pub async fn admin_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Summary>, AppError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    if !state.admin.authorize_header(header) {
        if header.is_some() {
            warn!("Rejected admin credentials");
        }
        return Err(AppError::Unauthorized);
    }

    let summary = summarize(state.engine.store().as_ref()).await?;

    Ok(Json(summary))
}

pub async fn health_handler() -> &'static str {
    "ok"
}

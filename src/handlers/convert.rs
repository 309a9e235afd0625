use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::AppState;
use crate::models::conversion::{ConversionOutcome, ConversionRequest};
use crate::services::conversion_service::{convert, conversion_request};
use crate::utils::error::ApiError;
use crate::utils::page::{self, Notice, FETCH_FAILED};

/// Raw form fields; all optional so a missing field becomes a 400 page, not a rejection.
#[derive(Deserialize)]
pub struct ConvertForm {
    pub base_currency: Option<String>,
    pub target_currency: Option<String>,
    pub amount: Option<String>,
}

pub enum Gate {
    Open,
    User(String),
}

impl Gate {
    pub fn user(&self) -> Option<&str> {
        match self {
            Gate::Open => None,
            Gate::User(u) => Some(u.as_str()),
        }
    }
}

/// `Ok(None)` means the login gate is on and the request carries no session for a
/// known account. A validly signed cookie for a user the store has never seen (or
/// lost on restart) counts as logged out.
pub async fn check_gate(state: &AppState, headers: &HeaderMap) -> Result<Option<Gate>, ApiError> {
    let Some(signer) = &state.session else {
        return Ok(Some(Gate::Open));
    };
    let Some(user) = signer.current_user(headers) else {
        return Ok(None);
    };
    let known = state
        .users
        .exists(&user)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !known {
        warn!("session cookie for unknown user {}", user);
        return Ok(None);
    }
    Ok(Some(Gate::User(user)))
}

const OUT_OF_RANGE: &str = "amount is too large to convert";

fn form_action(state: &AppState) -> &'static str {
    if state.session.is_some() { "/convert" } else { "/" }
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let gate = match check_gate(&state, &headers).await {
        Ok(Some(gate)) => gate,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(e) => return e.into_response(),
    };
    Html(page::converter(gate.user(), form_action(&state), Notice::None)).into_response()
}

pub async fn convert_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<ConvertForm>, FormRejection>,
) -> Response {
    // the gate goes first so anonymous clients get the redirect whatever they sent
    let gate = match check_gate(&state, &headers).await {
        Ok(Some(gate)) => gate,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(e) => return e.into_response(),
    };
    let action = form_action(&state);
    let bad_input = |msg: &str| {
        let msg = format!("Invalid input: {}", msg);
        let html = page::converter(gate.user(), action, Notice::Error(&msg));
        (StatusCode::BAD_REQUEST, Html(html)).into_response()
    };

    let Form(form) = match form {
        Ok(f) => f,
        Err(rejection) => return bad_input(&rejection.body_text()),
    };
    let req = match conversion_request(form.base_currency, form.target_currency, form.amount) {
        Ok(r) => r,
        Err(ApiError::Validation(m)) => return bad_input(&m),
        Err(other) => return bad_input(&other.to_string()),
    };

    let html = match convert(state.rates.as_ref(), &state.symbols, req).await {
        ConversionOutcome::Converted(c) => {
            info!(
                "converted {} {} -> {} {}",
                c.amount, c.base_currency, c.converted_amount, c.target_currency
            );
            page::converter(gate.user(), action, Notice::Converted(&c))
        }
        ConversionOutcome::InvalidTarget(code) => {
            let msg = format!("Invalid target currency: {}", code);
            page::converter(gate.user(), action, Notice::Error(&msg))
        }
        ConversionOutcome::Unavailable => {
            page::converter(gate.user(), action, Notice::Error(FETCH_FAILED))
        }
        ConversionOutcome::OutOfRange => return bad_input(OUT_OF_RANGE),
    };
    Html(html).into_response()
}

pub async fn convert_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ConversionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    check_gate(&state, &headers).await?.ok_or(ApiError::Unauthorized)?;
    let Json(req) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    if req.base_currency.trim().is_empty() || req.target_currency.trim().is_empty() {
        return Err(ApiError::Validation("currency codes must not be empty".into()));
    }
    if !req.amount.is_finite() {
        return Err(ApiError::Validation("amount must be a finite number".into()));
    }

    match convert(state.rates.as_ref(), &state.symbols, req).await {
        ConversionOutcome::Converted(c) => Ok((StatusCode::OK, Json(c))),
        ConversionOutcome::InvalidTarget(code) => Err(ApiError::InvalidTarget(code)),
        ConversionOutcome::Unavailable => Err(ApiError::External("rate fetch failed".into())),
        ConversionOutcome::OutOfRange => Err(ApiError::Validation(OUT_OF_RANGE.into())),
    }
}

// --- Health endpoint: touches the user store so a dead database shows up ---
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.users.exists("healthz").await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "ok": false, "store": e.to_string() })),
        ),
    }
}

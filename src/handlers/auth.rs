use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::config::AppState;
use crate::services::auth_service::{self, AuthError};
use crate::utils::error::ApiError;
use crate::utils::page;
use crate::utils::session::clear_cookie;

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page() -> Html<String> {
    Html(page::login(None))
}

pub async fn register_page() -> Html<String> {
    Html(page::register(None))
}

pub async fn login(State(state): State<AppState>, Form(c): Form<Credentials>) -> Response {
    let Some(signer) = state.session.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match auth_service::login(state.users.as_ref(), &c.username, &c.password).await {
        Ok(account) => (
            [(header::SET_COOKIE, signer.set_cookie(&account.username))],
            Redirect::to("/"),
        )
            .into_response(),
        Err(AuthError::Internal(msg)) => ApiError::Internal(msg).into_response(),
        Err(e) => Html(page::login(Some(&e.to_string()))).into_response(),
    }
}

pub async fn register(State(state): State<AppState>, Form(c): Form<Credentials>) -> Response {
    if state.session.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    match auth_service::register(state.users.as_ref(), &c.username, &c.password).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(AuthError::Internal(msg)) => ApiError::Internal(msg).into_response(),
        Err(e @ AuthError::Invalid(_)) => {
            (StatusCode::BAD_REQUEST, Html(page::register(Some(&e.to_string())))).into_response()
        }
        Err(e) => Html(page::register(Some(&e.to_string()))).into_response(),
    }
}

pub async fn logout() -> impl IntoResponse {
    ([(header::SET_COOKIE, clear_cookie())], Redirect::to("/login"))
}

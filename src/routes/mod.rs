use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;

use crate::config::AppState;
use crate::handlers::auth::{login, login_page, logout, register, register_page};
use crate::handlers::convert::{convert_form, convert_json, health, index};

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index).post(convert_form))
        .route("/convert", post(convert_form))
        .route("/api/convert", post(convert_json))
        .route("/healthz", get(health));

    // session routes only exist behind the login gate
    if state.session.is_some() {
        app = app
            .route("/login", get(login_page).post(login))
            .route("/register", get(register_page).post(register))
            .route("/logout", get(logout));
    }

    app.with_state(state).layer(TraceLayer::new_for_http())
}

//! Sign-in, signup and sign-out.
//!
//! Each handler runs the session flow against the backend and answers with
//! a `303 See Other` to wherever the session navigated, carrying the token
//! cookie changes the flow made.

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use csapp_session::guards::LOGIN_PATH;
use csapp_types::{LoginRequest, SignupRequest};
use serde::Deserialize;

use crate::cookies::CookieTokenStore;
use crate::error::Result;
use crate::state::AppState;

/// Query parameters accepted by `POST /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    /// Page to return to; honored only inside the user's own area.
    pub redirect: Option<String>,
}

fn see_other(target: &str, cookies: &CookieTokenStore) -> Response {
    let mut response = Redirect::to(target).into_response();
    cookies.apply(response.headers_mut());
    response
}

/// `POST /login`
pub async fn login_handler(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
    headers: HeaderMap,
    Json(credentials): Json<LoginRequest>,
) -> Result<Response> {
    let request = state.request_session(&headers);
    let destination = request
        .session
        .login(&credentials, params.redirect.as_deref())
        .await?;
    Ok(see_other(&destination, &request.cookies))
}

/// `POST /signup`
pub async fn signup_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(signup): Json<SignupRequest>,
) -> Result<Response> {
    let request = state.request_session(&headers);
    let destination = request.session.signup(&signup).await?;
    Ok(see_other(&destination, &request.cookies))
}

/// `POST /logout`. Always succeeds and always clears the cookies.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let request = state.request_session(&headers);
    request.session.logout().await;

    let target = request
        .navigator
        .take_last()
        .unwrap_or_else(|| LOGIN_PATH.to_string());
    see_other(&target, &request.cookies)
}

//! Page navigation: root dispatch, public pages and guarded areas.
//!
//! Page bodies are rendered elsewhere; these handlers only decide whether a
//! page may be shown and hand back the shell it is rendered into.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use csapp_session::guards::LOGIN_PATH;
use csapp_session::{Area, LayoutDecision, RootDecision, dispatch_root, layout_guard};
use csapp_types::Me;
use serde::Serialize;

use crate::cookies::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, get_cookie};
use crate::state::AppState;

/// Shell a guarded page renders into.
#[derive(Debug, Serialize)]
pub struct PageShell {
    pub area: &'static str,
    pub path: String,
    pub user: Me,
}

/// Shell for pages reachable without a session.
#[derive(Debug, Serialize)]
pub struct PublicPage {
    pub page: &'static str,
}

fn has_any_token(headers: &HeaderMap) -> bool {
    [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME]
        .into_iter()
        .any(|name| get_cookie(headers, name).is_some_and(|v| !v.is_empty()))
}

/// `GET /`
pub async fn root_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    // Nothing to resolve without cookies.
    if !has_any_token(&headers) {
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    let request = state.request_session(&headers);
    let resolved = request.session.initialize().await;

    let mut response = match dispatch_root(&resolved) {
        RootDecision::Redirect(target) => Redirect::temporary(&target).into_response(),
        RootDecision::Loading => StatusCode::NO_CONTENT.into_response(),
    };
    request.cookies.apply(response.headers_mut());
    response
}

/// `GET /login`
pub async fn login_page() -> Json<PublicPage> {
    Json(PublicPage { page: "login" })
}

/// `GET /signup`
pub async fn signup_page() -> Json<PublicPage> {
    Json(PublicPage { page: "signup" })
}

/// `GET /admin` and everything under it.
pub async fn admin_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    guarded_page(Area::Admin, &state, &headers, &uri).await
}

/// `GET /portal` and everything under it.
pub async fn portal_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    guarded_page(Area::Portal, &state, &headers, &uri).await
}

async fn guarded_page(area: Area, state: &AppState, headers: &HeaderMap, uri: &Uri) -> Response {
    let request = state.request_session(headers);
    let resolved = request.session.initialize().await;

    let mut response = match layout_guard(area, &resolved) {
        LayoutDecision::Render(user) => Json(PageShell {
            area: area.as_str(),
            path: uri.path().to_string(),
            user,
        })
        .into_response(),
        LayoutDecision::Redirect(target) => {
            tracing::debug!(area = area.as_str(), target = %target, "Layout redirect");
            Redirect::temporary(&target).into_response()
        }
        LayoutDecision::Loading => StatusCode::NO_CONTENT.into_response(),
    };
    request.cookies.apply(response.headers_mut());
    response
}

//! Sign-up, sign-in, token refresh and sign-out endpoints
//!
//! Under the session strategy sign-in sets the `recipes_api` cookie; every
//! other strategy hands out a signed token.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::middleware::GateStrategy;
use crate::api::recipes::MessageResponse;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::auth::{strip_bearer, IssuedToken, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub message: String,
    #[serde(rename = "insertedID")]
    pub inserted_id: String,
}

/// POST /signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> Result<Json<RegisteredResponse>, ApiError> {
    let user = state
        .user_service
        .register(&request.username, &request.password)
        .await?;

    Ok(Json(RegisteredResponse {
        message: "register OK".to_string(),
        inserted_id: user.id().as_str().to_string(),
    }))
}

/// POST /signin
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<Credentials>,
) -> Result<Response, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    if state.gate.strategy() == GateStrategy::Session {
        let token = state.sessions.create(user.username()).await?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(state.cookie_secure)
            .same_site(SameSite::Lax);

        info!(username = %user.username(), "Session started");
        return Ok((
            jar.add(cookie),
            Json(MessageResponse::new("User signed in")),
        )
            .into_response());
    }

    let issued: IssuedToken = state.tokens.issue(user.username())?;
    info!(username = %user.username(), expires = %issued.expires, "Token issued");
    Ok(Json(issued).into_response())
}

/// POST /refresh
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IssuedToken>, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(strip_bearer)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?;

    let issued = state.tokens.refresh(token)?;
    debug!(expires = %issued.expires, "Token refreshed");
    Ok(Json(issued))
}

/// POST /signout
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let mut jar = jar;

    if state.gate.strategy() == GateStrategy::Session {
        if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
            let existed = state.sessions.destroy(&token).await?;
            debug!(existed, "Session destroyed");
        }
        jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    }

    Ok((jar, Json(MessageResponse::new("Signed out..."))))
}

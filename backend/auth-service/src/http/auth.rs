/// Authentication endpoint handlers.
use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use validator::Validate;

use super::cookies::{
    self, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};
use super::AppState;
use crate::error::{AuthError, Result};
use crate::models::user::{
    IdentityClaim, LoginRequest, PublicUser, RefreshTokenRequest, RegisterRequest,
    UpdateProfileRequest,
};
use crate::services::AuthSession;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response> {
    req.validate()?;
    let session = state.sessions.register(req).await?;
    session_response(
        StatusCode::CREATED,
        "User successfully registered",
        &session,
        &state,
    )
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response> {
    let session = state.sessions.login(req).await?;
    session_response(StatusCode::OK, "Login successful", &session, &state)
}

/// Kick off the Google consent flow.
pub async fn google_start(State(state): State<AppState>) -> Result<Redirect> {
    let url = state.oauth.authorization_url()?;
    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Google redirects here after consent. On success the browser is sent to
/// the frontend success page with the access token; any failure lands on the
/// failure page rather than a JSON error.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    match complete_google_login(&state, query).await {
        Ok((headers, access_token)) => {
            let url = format!(
                "{}/auth/success?token={}",
                state.server.client_url, access_token
            );
            (headers, Redirect::temporary(&url)).into_response()
        }
        Err(err) => {
            warn!(error = %err, "Google login failed");
            let url = format!("{}/auth/failure", state.server.client_url);
            Redirect::temporary(&url).into_response()
        }
    }
}

async fn complete_google_login(
    state: &AppState,
    query: OAuthCallbackQuery,
) -> Result<(HeaderMap, String)> {
    let code = query
        .code
        .ok_or_else(|| AuthError::Validation("Missing authorization code".to_string()))?;
    let oauth_state = query.state.ok_or(AuthError::InvalidOAuthState)?;

    let profile = state.oauth.exchange_code(&oauth_state, &code).await?;
    let (session, _outcome) = state.sessions.federated_login(profile).await?;

    let headers = session_cookies(&session, state)?;
    Ok((headers, session.tokens.access_token))
}

/// Mint a new access token from the refresh token (cookie or body).
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<Response> {
    let refresh = cookies::read_cookie(&headers, REFRESH_COOKIE_NAME)
        .or_else(|| body.and_then(|Json(req)| req.refresh_token))
        .ok_or(AuthError::MissingToken)?;

    let access_token = state.sessions.refresh_access(&refresh).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        SET_COOKIE,
        cookies::auth_cookie(
            ACCESS_COOKIE_NAME,
            &access_token,
            state.sessions.codec().access_lifetime_secs(),
            state.server.cookie_secure,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?,
    );

    Ok((
        StatusCode::OK,
        response_headers,
        Json(json!({ "success": true, "access_token": access_token })),
    )
        .into_response())
}

pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let claim = authenticate(&state, &headers).await?;
    let user = state.sessions.get_profile(claim.id).await?;

    Ok(Json(json!({ "success": true, "user": PublicUser::from(&user) })).into_response())
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Response> {
    let claim = authenticate(&state, &headers).await?;
    let (user, updated_fields) = state.sessions.update_profile(claim.id, req).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "updated_fields": updated_fields,
        "user": PublicUser::from(&user),
    }))
    .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let claim = authenticate(&state, &headers).await?;
    state.sessions.logout(claim.id).await?;

    Ok((
        clear_session_cookies(&state)?,
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response())
}

pub async fn delete_account(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let claim = authenticate(&state, &headers).await?;
    state.sessions.delete_account(claim.id).await?;

    Ok((
        clear_session_cookies(&state)?,
        Json(json!({ "success": true, "message": "Account successfully deleted" })),
    )
        .into_response())
}

/// Resolve the request's access token to an identity claim.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<IdentityClaim> {
    let token = cookies::extract_access_token(headers).ok_or(AuthError::MissingToken)?;
    state.sessions.authenticate(&token).await
}

/// 200/201 body with the sanitized user and access token, plus both session
/// cookies.
fn session_response(
    status: StatusCode,
    message: &str,
    session: &AuthSession,
    state: &AppState,
) -> Result<Response> {
    let headers = session_cookies(session, state)?;
    let body = Json(json!({
        "success": true,
        "message": message,
        "user": PublicUser::from(&session.user),
        "access_token": session.tokens.access_token,
    }));

    Ok((status, headers, body).into_response())
}

fn session_cookies(session: &AuthSession, state: &AppState) -> Result<HeaderMap> {
    let secure = state.server.cookie_secure;
    let codec = state.sessions.codec();

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        cookies::auth_cookie(
            ACCESS_COOKIE_NAME,
            &session.tokens.access_token,
            codec.access_lifetime_secs(),
            secure,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?,
    );
    headers.append(
        SET_COOKIE,
        cookies::auth_cookie(
            REFRESH_COOKIE_NAME,
            &session.tokens.refresh_token,
            codec.refresh_lifetime_secs(),
            secure,
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?,
    );
    Ok(headers)
}

fn clear_session_cookies(state: &AppState) -> Result<HeaderMap> {
    let secure = state.server.cookie_secure;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        cookies::clear_cookie(ACCESS_COOKIE_NAME, secure)
            .map_err(|e| AuthError::Internal(e.to_string()))?,
    );
    headers.append(
        SET_COOKIE,
        cookies::clear_cookie(REFRESH_COOKIE_NAME, secure)
            .map_err(|e| AuthError::Internal(e.to_string()))?,
    );
    Ok(headers)
}

//! JSON API route handlers.
//!
//! Field names are camelCase; error bodies are plain text.

use axum::{
    Json,
    extract::{FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use threewords_core::{CloudEntry, build_word_cloud};

use crate::error::{AppError, Result};
use crate::middleware::ClientIp;
use crate::models::{Profile, WordSubmission};
use crate::services::profiles::{Availability, ProfileService};
use crate::services::submissions::{SubmissionService, WordPayload};
use crate::state::AppState;

/// JSON body extractor whose rejections become plain-text 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Body of `POST /api/profiles`.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    pub username: String,
}

fn submission_service(state: &AppState) -> SubmissionService<'_> {
    SubmissionService::new(state.profiles(), state.submissions(), state.limiter())
}

/// Check whether a username can be claimed.
///
/// # Route
///
/// `GET /api/check-username/{username}`
#[instrument(skip(state))]
pub async fn check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    match ProfileService::new(state.profiles())
        .check_username_availability(&username)
        .await
    {
        Ok(availability) => Json(availability).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Error checking username availability");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Availability {
                    available: false,
                    message: "Error checking username availability".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Claim a username.
///
/// # Route
///
/// `POST /api/profiles`
#[instrument(skip(state, body))]
pub async fn create_profile(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ClaimRequest>,
) -> Result<Json<Profile>> {
    let profile = ProfileService::new(state.profiles())
        .claim_profile(&body.username)
        .await?;
    Ok(Json(profile))
}

/// Fetch a profile.
///
/// # Route
///
/// `GET /api/users/{username}`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Profile>> {
    let profile = ProfileService::new(state.profiles())
        .get_profile(&username)
        .await?;
    Ok(Json(profile))
}

/// Submit three words about a profile.
///
/// # Route
///
/// `POST /api/users/{username}/words`
pub async fn submit_words(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ClientIp(origin): ClientIp,
    ApiJson(payload): ApiJson<WordPayload>,
) -> Result<Json<WordSubmission>> {
    let submission = submission_service(&state)
        .submit_words(&username, payload, origin)
        .await?;
    Ok(Json(submission))
}

/// List a profile's submissions, newest first.
///
/// # Route
///
/// `GET /api/users/{username}/words`
pub async fn list_words(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<WordSubmission>>> {
    let words = submission_service(&state).list_words(&username).await?;
    Ok(Json(words))
}

/// The ranked word cloud for a profile.
///
/// # Route
///
/// `GET /api/users/{username}/cloud`
pub async fn word_cloud(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<CloudEntry>>> {
    let words = submission_service(&state).list_words(&username).await?;
    Ok(Json(build_word_cloud(&words)))
}

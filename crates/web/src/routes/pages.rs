//! Server-rendered page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{ClientIp, OptionalAccount};
use crate::models::CurrentAccount;
use crate::services::profiles::{Availability, ClaimError, ProfileService};
use crate::services::submissions::{SubmissionService, SubmitError, WordPayload};
use crate::state::AppState;
use crate::views::{CloudWordView, ProfileView, SubmissionView, cloud_words};

// =============================================================================
// Templates
// =============================================================================

/// Home page with the claim form.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub account: Option<CurrentAccount>,
    /// Candidate as last typed.
    pub username: String,
    pub availability: Option<Availability>,
    pub error: Option<String>,
}

/// Public profile page.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub account: Option<CurrentAccount>,
    pub profile: ProfileView,
    pub cloud: Vec<CloudWordView>,
    pub words: Vec<SubmissionView>,
    pub form: WordForm,
    pub error: Option<String>,
}

/// Not-found page.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub account: Option<CurrentAccount>,
    pub message: String,
}

// =============================================================================
// Forms
// =============================================================================

/// Claim form body and availability query.
#[derive(Debug, Default, Deserialize)]
pub struct ClaimForm {
    #[serde(default)]
    pub username: String,
}

/// Three-words form body. Checkbox fields are present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordForm {
    #[serde(default)]
    pub word1: String,
    #[serde(default)]
    pub word2: String,
    #[serde(default)]
    pub word3: String,
    #[serde(default)]
    pub submitter_name: String,
    #[serde(default)]
    pub anonymous: Option<String>,
}

impl WordForm {
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous.is_some()
    }
}

impl From<WordForm> for WordPayload {
    fn from(form: WordForm) -> Self {
        Self {
            anonymous: form.is_anonymous(),
            submitter_name: Some(form.submitter_name),
            word1: form.word1,
            word2: form.word2,
            word3: form.word3,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
///
/// # Route
///
/// `GET /`
pub async fn home(OptionalAccount(account): OptionalAccount) -> impl IntoResponse {
    HomeTemplate {
        account,
        username: String::new(),
        availability: None,
        error: None,
    }
}

/// Check availability and show the result on the home page.
///
/// # Route
///
/// `GET /claim/check?username=`
pub async fn check_availability(
    State(state): State<AppState>,
    OptionalAccount(account): OptionalAccount,
    Query(query): Query<ClaimForm>,
) -> Response {
    match ProfileService::new(state.profiles())
        .check_username_availability(&query.username)
        .await
    {
        Ok(availability) => HomeTemplate {
            account,
            username: query.username,
            availability: Some(availability),
            error: None,
        }
        .into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Claim a username, then go to the new profile.
///
/// # Route
///
/// `POST /claim`
#[instrument(skip(state, account, form))]
pub async fn claim(
    State(state): State<AppState>,
    OptionalAccount(account): OptionalAccount,
    Form(form): Form<ClaimForm>,
) -> Response {
    match ProfileService::new(state.profiles())
        .claim_profile(&form.username)
        .await
    {
        Ok(profile) => Redirect::to(&format!("/u/{}", profile.username)).into_response(),
        Err(ClaimError::Repository(e)) => AppError::from(e).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            HomeTemplate {
                account,
                username: form.username,
                availability: None,
                error: Some(e.to_string()),
            },
        )
            .into_response(),
    }
}

/// Display a profile with its word cloud and recent submissions.
///
/// # Route
///
/// `GET /u/{username}`
pub async fn profile(
    State(state): State<AppState>,
    OptionalAccount(account): OptionalAccount,
    Path(username): Path<String>,
) -> Response {
    render_profile(&state, account, &username, WordForm::default(), None).await
}

/// Submit three words from the profile page form.
///
/// # Route
///
/// `POST /u/{username}/words`
pub async fn submit_words(
    State(state): State<AppState>,
    OptionalAccount(account): OptionalAccount,
    Path(username): Path<String>,
    ClientIp(origin): ClientIp,
    Form(form): Form<WordForm>,
) -> Response {
    let service = SubmissionService::new(state.profiles(), state.submissions(), state.limiter());

    match service
        .submit_words(&username, form.clone().into(), origin)
        .await
    {
        Ok(_) => Redirect::to(&format!("/u/{}", username.to_ascii_lowercase())).into_response(),
        Err(SubmitError::Repository(e)) => AppError::from(e).into_response(),
        Err(SubmitError::ProfileNotFound) => not_found(account, "Profile not found"),
        Err(e) => {
            let status = match e {
                SubmitError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_REQUEST,
            };
            let mut response =
                render_profile(&state, account, &username, form, Some(e.to_string())).await;
            if response.status().is_success() {
                *response.status_mut() = status;
            }
            response
        }
    }
}

/// Fallback for unknown paths.
pub async fn fallback(OptionalAccount(account): OptionalAccount) -> Response {
    not_found(account, "Page not found")
}

fn not_found(account: Option<CurrentAccount>, message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            account,
            message: message.to_string(),
        },
    )
        .into_response()
}

async fn render_profile(
    state: &AppState,
    account: Option<CurrentAccount>,
    username: &str,
    form: WordForm,
    error: Option<String>,
) -> Response {
    let service = SubmissionService::new(state.profiles(), state.submissions(), state.limiter());

    let (profile, submissions) = match service.profile_with_words(username).await {
        Ok(found) => found,
        Err(SubmitError::ProfileNotFound) => return not_found(account, "Profile not found"),
        Err(e) => return AppError::from(e).into_response(),
    };

    let now = Utc::now();
    let profile_url = state.config().profile_url(profile.username.as_str());

    ProfileTemplate {
        account,
        profile: ProfileView::new(&profile, profile_url),
        cloud: cloud_words(&submissions),
        words: submissions
            .iter()
            .map(|s| SubmissionView::new(s, now))
            .collect(),
        form,
        error,
    }
    .into_response()
}

//! API endpoint handlers
//!
//! Each handler unpacks the request, calls one service operation and maps
//! the result. Failures become [`ServerError`] responses.

use super::extractors::{AuthUser, JsonExtractor};
use super::types::*;
use crate::error::ServerError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use skillswap_core::{
    Booking, ClassNote, Community, CommunityId, CommunityMembership, Credential, CreditPackage,
    KnowledgeArea, NewCreditPackage, NewKnowledgeArea, NewQuiz, NewSession, NewSkill,
    PersonRoleSkill, Quiz, QuizResult, QuizView, SessionId, Skill,
};
use skillswap_service::{
    AccountStatus, CreateCommunity, DeclareSkill, IssuedToken, NewAccount, PurchaseReceipt,
    QuizSubmission, SessionView, SuggestedSession, VerificationOutcome, VerificationStatus,
};
use tracing::{info, warn};

type ApiResult<T> = Result<T, ServerError>;
type Created<T> = (StatusCode, Json<T>);

fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Unknown routes
pub(super) async fn not_found() -> ServerError {
    ServerError::NotFound("no such endpoint".to_string())
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub(super) async fn register(
    State(state): State<AppState>,
    JsonExtractor(account): JsonExtractor<NewAccount>,
) -> ApiResult<Created<AccountStatus>> {
    info!("Registration request for {}", account.email);
    let status = state.app.accounts().register(account).await?;
    Ok(created(status))
}

pub(super) async fn login(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<LoginRequest>,
) -> ApiResult<Json<IssuedToken>> {
    let token = state
        .app
        .accounts()
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(token))
}

pub(super) async fn auth_status(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<AccountStatus>> {
    Ok(Json(state.app.accounts().status(&identity).await?))
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

pub(super) fn verification_status_code(status: VerificationStatus) -> StatusCode {
    match status {
        VerificationStatus::Verified | VerificationStatus::TokenSent => StatusCode::OK,
        VerificationStatus::AlreadyVerified => StatusCode::CONFLICT,
        VerificationStatus::ExpiredToken | VerificationStatus::TokenUsed => StatusCode::GONE,
        VerificationStatus::InvalidToken => StatusCode::NOT_FOUND,
    }
}

fn verification_response(outcome: VerificationOutcome) -> (StatusCode, Json<VerificationOutcome>) {
    (verification_status_code(outcome.status), Json(outcome))
}

pub(super) async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> ApiResult<(StatusCode, Json<VerificationOutcome>)> {
    let outcome = state.app.verification().verify_token(&query.token).await?;
    if !outcome.success {
        warn!("Verification request rejected: {:?}", outcome.status);
    }
    Ok(verification_response(outcome))
}

pub(super) async fn resend_verification(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ResendRequest>,
) -> ApiResult<(StatusCode, Json<VerificationOutcome>)> {
    let outcome = state
        .app
        .verification()
        .resend_verification_token(&request.email)
        .await?;
    Ok(verification_response(outcome))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub(super) async fn list_knowledge_areas(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<KnowledgeArea>>> {
    Ok(Json(state.app.catalog().list_knowledge_areas().await?))
}

pub(super) async fn create_knowledge_area(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(area): JsonExtractor<NewKnowledgeArea>,
) -> ApiResult<Created<KnowledgeArea>> {
    let area = state.app.catalog().create_knowledge_area(&identity, area).await?;
    Ok(created(area))
}

pub(super) async fn list_skills(State(state): State<AppState>) -> ApiResult<Json<Vec<Skill>>> {
    Ok(Json(state.app.catalog().list_skills().await?))
}

pub(super) async fn create_skill(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(skill): JsonExtractor<NewSkill>,
) -> ApiResult<Created<Skill>> {
    let skill = state.app.catalog().create_skill(&identity, skill).await?;
    Ok(created(skill))
}

pub(super) async fn list_my_skills(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<Vec<PersonRoleSkill>>> {
    Ok(Json(state.app.catalog().list_my_skills(&identity).await?))
}

pub(super) async fn declare_skill(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(request): JsonExtractor<DeclareSkill>,
) -> ApiResult<Created<PersonRoleSkill>> {
    let link = state.app.catalog().declare_skill(&identity, request).await?;
    Ok(created(link))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub(super) async fn list_sessions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SessionView>>> {
    Ok(Json(state.app.sessions().list_open_sessions().await?))
}

pub(super) async fn create_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(session): JsonExtractor<NewSession>,
) -> ApiResult<Created<SessionView>> {
    let view = state.app.sessions().create_session(&identity, session).await?;
    info!("Session {} created by {}", view.id, identity.email);
    Ok(created(view))
}

pub(super) async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(state.app.sessions().get_session(id).await?))
}

pub(super) async fn delete_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<StatusCode> {
    state.app.sessions().delete_session(id, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn open_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(state.app.sessions().open_session(id, &identity).await?))
}

pub(super) async fn close_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(state.app.sessions().close_session(id, &identity).await?))
}

pub(super) async fn complete_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(state.app.sessions().complete_session(id, &identity).await?))
}

pub(super) async fn cancel_session(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    Ok(Json(state.app.sessions().cancel_session(id, &identity).await?))
}

pub(super) async fn list_notes(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<Vec<ClassNote>>> {
    Ok(Json(state.app.sessions().list_notes(id, &identity).await?))
}

pub(super) async fn add_note(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
    JsonExtractor(request): JsonExtractor<NoteRequest>,
) -> ApiResult<Created<ClassNote>> {
    let note = state
        .app
        .sessions()
        .add_note(id, &identity, request.content)
        .await?;
    Ok(created(note))
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

pub(super) async fn list_quizzes(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<Vec<QuizView>>> {
    Ok(Json(state.app.quizzes().list_quizzes(id, &identity).await?))
}

pub(super) async fn create_quiz(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<SessionId>,
    JsonExtractor(quiz): JsonExtractor<NewQuiz>,
) -> ApiResult<Created<Quiz>> {
    let quiz = state.app.quizzes().create_quiz(id, &identity, quiz).await?;
    Ok(created(quiz))
}

pub(super) async fn submit_quiz(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(quiz_id): Path<i64>,
    JsonExtractor(submission): JsonExtractor<QuizSubmission>,
) -> ApiResult<Json<QuizResult>> {
    let result = state
        .app
        .quizzes()
        .submit(quiz_id, &identity, submission)
        .await?;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

pub(super) async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.app.bookings().list_bookings(&identity).await?))
}

pub(super) async fn create_booking(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(request): JsonExtractor<BookingRequest>,
) -> ApiResult<Created<Booking>> {
    info!(
        "Booking request from {} for session {}",
        identity.email, request.session_id
    );
    let booking = state
        .app
        .bookings()
        .create_individual_booking(request.session_id, &identity)
        .await?;
    Ok(created(booking))
}

pub(super) async fn cancel_booking(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Booking>> {
    Ok(Json(state.app.bookings().cancel_booking(id, &identity).await?))
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

pub(super) async fn list_suggestions(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<Vec<SuggestedSession>>> {
    Ok(Json(state.app.suggestions().suggest_sessions(&identity).await?))
}

pub(super) async fn mark_suggestion_viewed(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.app.suggestions().mark_viewed(id, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

pub(super) async fn list_packages(
    State(state): State<AppState>,
    AuthUser(_identity): AuthUser,
) -> ApiResult<Json<Vec<CreditPackage>>> {
    Ok(Json(state.app.credits().list_packages().await?))
}

pub(super) async fn create_package(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(package): JsonExtractor<NewCreditPackage>,
) -> ApiResult<Created<CreditPackage>> {
    let package = state.app.credits().create_package(&identity, package).await?;
    Ok(created(package))
}

pub(super) async fn purchase_package(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<PurchaseReceipt>> {
    Ok(Json(state.app.credits().purchase(id, &identity).await?))
}

// ---------------------------------------------------------------------------
// Communities
// ---------------------------------------------------------------------------

pub(super) async fn create_community(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(request): JsonExtractor<CreateCommunity>,
) -> ApiResult<Created<Community>> {
    let community = state
        .app
        .communities()
        .create_community(&identity, request)
        .await?;
    Ok(created(community))
}

pub(super) async fn join_community(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<CommunityId>,
) -> ApiResult<Created<CommunityMembership>> {
    let membership = state.app.communities().join_community(id, &identity).await?;
    Ok(created(membership))
}

pub(super) async fn my_communities(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<Vec<Community>>> {
    Ok(Json(state.app.communities().my_communities(&identity).await?))
}

pub(super) async fn community_credentials(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<CommunityId>,
) -> ApiResult<Json<Vec<Credential>>> {
    Ok(Json(state.app.communities().credentials(id, &identity).await?))
}

// ---------------------------------------------------------------------------
// Development
// ---------------------------------------------------------------------------

pub(super) async fn send_test_mail(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    JsonExtractor(request): JsonExtractor<MailTestRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.app.dev().send_test_mail(&identity, &request.to).await?;
    Ok(Json(MessageResponse::new(format!("Test mail sent to {}", request.to))))
}

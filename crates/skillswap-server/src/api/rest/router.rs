//! Router creation and configuration
//!
//! Creates the Axum router for every REST endpoint.

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use skillswap_service::SkillSwap;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(app: SkillSwap) -> Router {
    let state = AppState { app };

    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/status", get(auth_status))
        .route("/verification/verify", get(verify_email))
        .route("/verification/resend", post(resend_verification))
        .route(
            "/knowledge-areas",
            get(list_knowledge_areas).post(create_knowledge_area),
        )
        .route("/skills", get(list_skills).post(create_skill))
        .route("/communities/:id/credentials", get(community_credentials));

    let api = Router::new()
        .route("/me/skills", get(list_my_skills).post(declare_skill))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/open", post(open_session))
        .route("/sessions/:id/close", post(close_session))
        .route("/sessions/:id/complete", post(complete_session))
        .route("/sessions/:id/cancel", post(cancel_session))
        .route("/sessions/:id/notes", get(list_notes).post(add_note))
        .route("/sessions/:id/quizzes", get(list_quizzes).post(create_quiz))
        .route("/quizzes/:id/submit", post(submit_quiz))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", axum::routing::delete(cancel_booking))
        .route("/suggestions", get(list_suggestions))
        .route("/suggestions/:id/viewed", post(mark_suggestion_viewed))
        .route("/credit-packages", get(list_packages).post(create_package))
        .route("/credit-packages/:id/purchase", post(purchase_package))
        .route("/communities", post(create_community))
        .route("/communities/my-communities", get(my_communities))
        .route("/communities/:id/join", post(join_community))
        .route("/dev/mail/test", post(send_test_mail));

    public
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

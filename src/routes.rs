use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{
    delete_form, export_audit, export_document, get_form, get_submission, health_check,
    list_forms, list_submissions, publish_form, render_form, submit_form, AppState,
};

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    // Public fill submits live on the same path as the management
    // submission listing, so the method router is built per environment
    let submissions_route = if is_production {
        post(submit_form)
    } else {
        post(submit_form).get(list_submissions)
    };

    // Health check and the public fill endpoints are always available
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/forms/:form_id/render", get(render_form))
        .route("/forms/:form_id/submissions", submissions_route);

    // Only add management routes if not in production mode
    if !is_production {
        router = router
            .route("/forms", post(publish_form).get(list_forms))
            .route("/forms/:form_id", get(get_form).delete(delete_form))
            .route(
                "/forms/:form_id/submissions/:submission_id",
                get(get_submission),
            )
            .route(
                "/forms/:form_id/submissions/:submission_id/export/document",
                get(export_document),
            )
            .route(
                "/forms/:form_id/submissions/:submission_id/export/audit",
                get(export_audit),
            );

        info!("Management routes enabled - server running in development mode");
    } else {
        info!("Running in production mode - only fill and health endpoints exposed");
    }

    router.with_state(app_state)
}

//! Audit routes (e.g., /api/v1/audit/*)

use axum::{routing::{get, post}, Router};
use crate::api::controller::audit::AuditController;
use crate::app_state::AppState;

pub fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/events/daily", get(AuditController::get_daily_event_counts))
        .route("/events/hourly", post(AuditController::insert_hourly_event_counts))
        .route("/purge", post(AuditController::purge))
}

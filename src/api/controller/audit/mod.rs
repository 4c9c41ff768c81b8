//! Audit controller: connects routes to audit usecases

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use validator::Validate;

use crate::api::dto::audit_dto::{DailyEventsQuery, InsertedResponse, PurgedResponse};
use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::audit::dto::audit_purge_request::AuditPurgeRequest;
use crate::domain::audit::dto::hourly_event_count_insert_request::HourlyEventCountInsertRequest;
use crate::domain::audit::error::AuditError;
use crate::domain::audit::model::weekly_event_counts::WeeklyEventCounts;
use crate::errors::AppError;

pub struct AuditController;

impl AuditController {
    pub async fn get_daily_event_counts(
        State(state): State<AppState>,
        query: Result<Query<DailyEventsQuery>, QueryRejection>,
    ) -> Result<Json<ApiResponse<Vec<WeeklyEventCounts>>>, AppError> {
        let Query(query) = query?;
        query.validate()?;
        to_json(state.audit_service.count_daily_events(query.into()).await)
    }

    pub async fn insert_hourly_event_counts(
        State(state): State<AppState>,
        payload: Result<Json<Vec<HourlyEventCountInsertRequest>>, JsonRejection>,
    ) -> Result<Json<ApiResponse<InsertedResponse>>, AppError> {
        let Json(payload) = payload?;
        for row in &payload {
            row.validate()?;
        }

        let rows = payload
            .into_iter()
            .map(HourlyEventCountInsertRequest::into_hourly_event_count)
            .collect::<Result<Vec<_>, AuditError>>()?;

        to_json(
            state
                .audit_service
                .record_hourly_event_counts(rows)
                .await
                .map(|inserted| InsertedResponse { inserted }),
        )
    }

    pub async fn purge(
        State(state): State<AppState>,
        payload: Result<Json<AuditPurgeRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<PurgedResponse>>, AppError> {
        let Json(payload) = payload?;
        payload.validate()?;
        let retention_days = payload.retention_days.unwrap_or(state.retention_days);

        to_json(
            state
                .audit_service
                .purge_older_than(retention_days, Utc::now())
                .await
                .map(|purged| PurgedResponse {
                    purged,
                    retention_days,
                }),
        )
    }
}

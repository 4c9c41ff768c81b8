use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::persistence::audit::audit_event_count_repository::AuditEventCountRepository;
use crate::domain::audit::service::audit_service::AuditService;

#[derive(Clone)]
pub struct AppState {
    pub audit_service: Arc<AuditService<AuditEventCountRepository>>,
    pub retention_days: u32,
}

pub fn build_app_state(config: &AppConfig) -> AppState {
    AppState {
        audit_service: Arc::new(AuditService::new(AuditEventCountRepository::new(
            config.data_dir.clone(),
        ))),
        retention_days: config.retention_days,
    }
}

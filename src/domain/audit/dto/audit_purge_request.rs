use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::audit::service::audit_service::MAX_RETENTION_DAYS;

/// Manual purge of hourly event counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AuditPurgeRequest {
    /// Days of hourly counts to keep; falls back to the configured retention.
    #[validate(range(max = MAX_RETENTION_DAYS))]
    pub retention_days: Option<u32>,
}

use thiserror::Error;

/// Failures surfaced by the audit domain.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Malformed date, unknown timezone, non-UTC instant, bad connection code.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Anything the persistence collaborator returned, untouched.
    #[error(transparent)]
    CollaboratorFailure(anyhow::Error),
}

pub fn invalid_input<S: Into<String>>(msg: S) -> AuditError {
    AuditError::InvalidInput(msg.into())
}

use thiserror::Error;

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, ValidationKind};
use crate::errors::ErrorCode;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Sampling exhausted: {detail}")]
    SamplingExhausted { detail: String },
    #[error("Export error: {detail}")]
    Export {
        detail: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Messaging error: {detail}")]
    Messaging { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Error code for logs and operator-facing messages
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Conflict { code, .. } => *code,
            AppError::SamplingExhausted { .. } => ErrorCode::SamplingExhausted,
            AppError::Export { .. } => ErrorCode::ExportFailed,
            AppError::Messaging { .. } => ErrorCode::MessagingFailed,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Error detail without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            AppError::Validation { detail, .. }
            | AppError::Config { detail }
            | AppError::Conflict { detail, .. }
            | AppError::SamplingExhausted { detail }
            | AppError::Export { detail, .. }
            | AppError::Messaging { detail }
            | AppError::Internal { detail } => detail,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn messaging(detail: impl Into<String>) -> Self {
        Self::Messaging {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// True for failures an operator fixes by changing configuration or seed,
    /// as opposed to transient collaborator failures.
    pub fn is_operator_fixable(&self) -> bool {
        matches!(
            self,
            AppError::Config { .. } | AppError::Validation { .. } | AppError::SamplingExhausted { .. }
        )
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidNeighborSize => ErrorCode::InvalidNeighborSize,
                    ValidationKind::InvalidPlayerCount => ErrorCode::InvalidPlayerCount,
                    ValidationKind::InvalidTrialCount => ErrorCode::InvalidTrialCount,
                    _ => ErrorCode::ValidationError,
                };
                AppError::Validation { code, detail }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::SessionActive => ErrorCode::SessionActive,
                    _ => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::Infra(InfraErrorKind::SamplingExhausted, detail) => {
                AppError::SamplingExhausted { detail }
            }
            DomainError::Infra(kind, detail) => AppError::Internal {
                detail: format!("{kind:?}: {detail}"),
            },
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Export {
            detail: format!("io error: {e}"),
            source: Box::new(e),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export {
            detail: format!("csv error: {e}"),
            source: Box::new(e),
        }
    }
}

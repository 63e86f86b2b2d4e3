//! Error codes for the hashtag game backend.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in logs and operator-facing messages.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Configuration
    /// Operator-supplied constant is missing or malformed
    ConfigError,
    /// Neighbor size is zero or not smaller than the player count
    InvalidNeighborSize,
    /// Player count cannot be perfectly matched
    InvalidPlayerCount,
    /// Trial count is zero
    InvalidTrialCount,
    /// General validation error
    ValidationError,

    // Session lifecycle
    /// A session with open rounds is already running
    SessionActive,
    /// General conflict
    Conflict,

    // Operational
    /// Pairing sampler could not find a matching with this seed
    SamplingExhausted,
    /// Round record export failed
    ExportFailed,
    /// Messaging collaborator failed
    MessagingFailed,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::InvalidNeighborSize => "INVALID_NEIGHBOR_SIZE",
            Self::InvalidPlayerCount => "INVALID_PLAYER_COUNT",
            Self::InvalidTrialCount => "INVALID_TRIAL_COUNT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::SessionActive => "SESSION_ACTIVE",
            Self::Conflict => "CONFLICT",
            Self::SamplingExhausted => "SAMPLING_EXHAUSTED",
            Self::ExportFailed => "EXPORT_FAILED",
            Self::MessagingFailed => "MESSAGING_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Every code, for uniqueness checks.
    pub const ALL: [ErrorCode; 11] = [
        Self::ConfigError,
        Self::InvalidNeighborSize,
        Self::InvalidPlayerCount,
        Self::InvalidTrialCount,
        Self::ValidationError,
        Self::SessionActive,
        Self::Conflict,
        Self::SamplingExhausted,
        Self::ExportFailed,
        Self::MessagingFailed,
        Self::InternalError,
    ];
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

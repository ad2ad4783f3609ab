use std::fmt;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors raised by the repository-facing providers and configuration.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Repository error: {message}")]
    Repository { message: String },

    #[error("Invalid input: {input} - {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("Configuration error: {setting} - {reason}")]
    Configuration { setting: String, reason: String },

    #[error("Git internal error: {0}")]
    Git2(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify_debouncer_mini::notify::Error),
}

impl GitError {
    pub fn repository(message: impl Into<String>) -> Self {
        let message = message.into();
        error!("Repository error: {}", message);
        GitError::Repository { message }
    }

    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        let input = input.into();
        let reason = reason.into();
        warn!("Invalid input '{}': {}", input, reason);
        GitError::InvalidInput { input, reason }
    }

    pub fn configuration(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        let setting = setting.into();
        let reason = reason.into();
        warn!("Invalid configuration '{}': {}", setting, reason);
        GitError::Configuration { setting, reason }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GitError::Repository { .. } => ErrorSeverity::Medium,
            GitError::InvalidInput { .. } => ErrorSeverity::Medium,
            GitError::Configuration { .. } => ErrorSeverity::Medium,
            GitError::Git2(_) => ErrorSeverity::Medium,
            GitError::Io(_) => ErrorSeverity::High,
            GitError::Serialization(_) => ErrorSeverity::Low,
            GitError::Watch(_) => ErrorSeverity::Low,
        }
    }

    /// Message suitable for the error dialog.
    pub fn user_friendly_message(&self) -> String {
        match self {
            GitError::Repository { message } => {
                format!("Repository error: {}", message)
            }
            GitError::InvalidInput { input, reason } => {
                format!("'{}' is not valid: {}", input, reason)
            }
            GitError::Configuration { setting, .. } => {
                format!("Configuration error in '{}'. Default settings are in use.", setting)
            }
            GitError::Git2(e) => format!("Git error: {}", e.message()),
            GitError::Io(e) => format!("File operation failed: {}", e),
            GitError::Serialization(_) => {
                "Settings file is corrupted and could not be read.".to_string()
            }
            GitError::Watch(e) => {
                format!("Cannot watch the repository for changes: {}. Use Refresh instead.", e)
            }
        }
    }

    /// Log with a level matching the severity.
    pub fn log(&self, context: &str) {
        match self.severity() {
            ErrorSeverity::High => {
                error!("[{}] {}: {}", self.severity(), context, self);
            }
            ErrorSeverity::Medium => {
                warn!("[{}] {}: {}", self.severity(), context, self);
            }
            ErrorSeverity::Low => {
                debug!("[{}] {}: {}", self.severity(), context, self);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_properties() {
        let config_error = GitError::configuration("graph.row_height", "must be positive");
        assert_eq!(config_error.severity(), ErrorSeverity::Medium);
        assert!(config_error
            .user_friendly_message()
            .contains("graph.row_height"));

        let repo_error = GitError::repository("no commits");
        assert_eq!(repo_error.severity(), ErrorSeverity::Medium);
        assert_eq!(repo_error.to_string(), "Repository error: no commits");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::High > ErrorSeverity::Medium);
        assert!(ErrorSeverity::Medium > ErrorSeverity::Low);
        assert_eq!(ErrorSeverity::High.to_string(), "HIGH");
    }
}

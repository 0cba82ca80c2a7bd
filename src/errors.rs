use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the plan, simulation, storage and export layers.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfiguration(Vec<String>),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Invalid share code: {0}")]
    ShareCode(String),
    #[error("Export failed: {0}")]
    Export(String),
}

impl PlanError {
    /// Individual validation messages, empty for non-validation errors.
    pub fn issues(&self) -> &[String] {
        match self {
            PlanError::InvalidConfiguration(issues) => issues,
            _ => &[],
        }
    }
}

pub type Result<T> = StdResult<T, PlanError>;

impl From<std::io::Error> for PlanError {
    fn from(err: std::io::Error) -> Self {
        PlanError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Storage(err.to_string())
    }
}

impl From<csv::Error> for PlanError {
    fn from(err: csv::Error) -> Self {
        PlanError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = PlanError::InvalidConfiguration(vec![
            "income must be positive".into(),
            "debt `nu` is listed twice".into(),
        ]);
        let message = err.to_string();
        assert!(message.contains("income must be positive"));
        assert!(message.contains("debt `nu` is listed twice"));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn io_errors_map_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = PlanError::from(io);
        assert!(matches!(err, PlanError::Storage(ref msg) if msg.contains("missing file")));
        assert!(err.issues().is_empty());
    }
}

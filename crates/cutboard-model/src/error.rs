//! Error types for model parsing

/// Errors raised when parsing model values from user input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Stage id is not one of the configured stages
    #[error("unknown stage: '{0}'")]
    UnknownStage(String),

    /// Priority is not LOW, MEDIUM or HIGH
    #[error("unknown priority: '{0}'")]
    UnknownPriority(String),

    /// Card color is not in the palette
    #[error("unknown card color: '{0}'")]
    UnknownColor(String),
}

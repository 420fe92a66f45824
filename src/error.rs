use thiserror::Error;

use crate::domain::EntityKind;

pub type Result<T> = std::result::Result<T, DeskError>;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("Please select a pharmacy or company")]
    MissingEntitySelection,

    #[error("Please fill in all required fields")]
    MissingRequiredField,

    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: String },

    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Entity selection is locked for a preselected draft")]
    SelectionLocked,

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Pharmacy {pharmacy} references unknown company {company}")]
    DanglingReference { pharmacy: String, company: String },

    #[error("Invalid ticket ID format: {0}")]
    InvalidTicketId(String),

    #[error("Invalid ticket status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid time window '{0}'. Valid: daily, weekly, monthly, 3month, 6month, 1year")]
    InvalidTimeWindow(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DeskError {
    /// True for errors the operator can fix by correcting their input
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::MissingEntitySelection
                | Self::MissingRequiredField
                | Self::EntityNotFound { .. }
                | Self::SelectionLocked
        )
    }
}

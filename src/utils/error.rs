use crate::core::checkout::CheckoutError;
use crate::domain::model::ItemId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Inventory error: {0}")]
    InventoryError(#[from] InventoryError),

    #[error("Checkout failed: {0}")]
    CheckoutError(#[from] CheckoutError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// Outcome of the remote `purchase`/`restock` procedures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("insufficient stock for item {0}")]
    InsufficientStock(ItemId),

    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error("transient inventory failure: {0}")]
    Transient(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StoreError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StoreError::CheckoutError(CheckoutError::Empty) => ErrorSeverity::Low,
            StoreError::HttpError(_)
            | StoreError::InventoryError(InventoryError::Transient(_)) => ErrorSeverity::Medium,
            StoreError::CheckoutError(_)
            | StoreError::InventoryError(_)
            | StoreError::ValidationError { .. } => ErrorSeverity::High,
            StoreError::IoError(_)
            | StoreError::SerializationError(_)
            | StoreError::ConfigError { .. }
            | StoreError::ConfigValidationError { .. }
            | StoreError::InvalidConfigValueError { .. }
            | StoreError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StoreError::HttpError(_) | StoreError::InventoryError(InventoryError::Transient(_)) => {
                "Check the store endpoint and network connectivity, then retry"
            }
            StoreError::InventoryError(InventoryError::InsufficientStock(_)) => {
                "Reduce the requested quantity and refresh the catalog"
            }
            StoreError::InventoryError(InventoryError::NotFound(_)) => {
                "Refresh the catalog; the item may have been removed"
            }
            StoreError::CheckoutError(CheckoutError::Empty) => "Add items to the cart first",
            StoreError::CheckoutError(CheckoutError::Unauthenticated) => {
                "Sign in before checking out"
            }
            StoreError::CheckoutError(CheckoutError::Rejected(_)) => {
                "Remove the already purchased lines from the cart before retrying"
            }
            StoreError::IoError(_) => "Check file paths and permissions",
            StoreError::SerializationError(_) => "The store returned an unexpected payload",
            StoreError::ConfigError { .. }
            | StoreError::ConfigValidationError { .. }
            | StoreError::InvalidConfigValueError { .. }
            | StoreError::MissingConfigError { .. } => "Fix the configuration file and rerun",
            StoreError::ValidationError { .. } => "Check the supplied values",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StoreError::CheckoutError(e) => e.to_string(),
            StoreError::InventoryError(e) => format!("Inventory update failed: {}", e),
            StoreError::HttpError(_) => "Could not reach the store".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub type InventoryResult = std::result::Result<(), InventoryError>;

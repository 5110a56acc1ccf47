use thiserror::Error;

/// Input rejected before any backend call was made.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{field}` is required")]
    EmptyField { field: &'static str },
    #[error("`{field}` must be a number, got `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("no product with id `{0}` is loaded")]
    UnknownProduct(String),
    #[error("unknown sort field `{0}`")]
    UnknownSortField(String),
    #[error("unknown sort direction `{0}` (expected asc|desc)")]
    UnknownDirection(String),
    #[error("no row is selected")]
    NoSelection,
}

/// Backend or network failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to `{path}` failed: {message}")]
    Request { path: String, message: String },
    #[error("request to `{path}` timed out")]
    Timeout { path: String },
    #[error("backend answered `{path}` with status {status}")]
    Status { path: String, status: u16 },
    #[error("could not decode response from `{path}`: {message}")]
    Decode { path: String, message: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CatalogError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::EmptyField { .. }) => {
                "Fill in every required field and try again."
            }
            Self::Validation(ValidationError::InvalidNumber { .. }) => {
                "Enter a valid number (use `,` or `.` as the decimal separator)."
            }
            Self::Validation(ValidationError::UnknownProduct(_)) => {
                "The selected product is no longer in the catalog. Reload and try again."
            }
            Self::Validation(ValidationError::NoSelection) => {
                "Select a product before registering a price."
            }
            Self::Validation(
                ValidationError::UnknownSortField(_) | ValidationError::UnknownDirection(_),
            ) => "The requested ordering is not supported.",
            Self::Transport(_) => {
                "The catalog service could not be reached. Nothing was changed; please retry."
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

use f1_admin_client::{ApiError, StatusCode};
use f1_admin_model::ValidationError;
use thiserror::Error;

use crate::notification::NotificationKind;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Failed to fetch participations: {}", .0.as_u16())]
    Status(StatusCode),
    #[error("{0}")]
    Api(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum AssignmentError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("This driver is already assigned to this Grand Prix")]
    Conflict,
    #[error("The selected driver or Grand Prix no longer exists. Please select again.")]
    InvalidSelection { detail: String },
    #[error("Failed to assign driver: {0}")]
    Failed(ApiError),
    /// The backend accepted the request but neither its answer nor the
    /// refreshed list shows the new participation.
    #[error("The assignment could not be confirmed: {0}")]
    Unconfirmed(ApiError),
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network(ApiError),
}

impl AssignmentError {
    /// Sorts a failed `POST /participation` into the outcome shown to the user.
    #[must_use]
    pub fn classify(error: ApiError) -> Self {
        if error.is_transport() {
            return Self::Network(error);
        }
        if let Some(body) = error.body() {
            if body.to_ascii_lowercase().contains("foreign key") {
                return Self::InvalidSelection {
                    detail: body.to_owned(),
                };
            }
        }
        if error.status() == Some(StatusCode::CONFLICT) {
            return Self::Conflict;
        }
        Self::Failed(error)
    }

    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::Validation(_) => NotificationKind::Validation,
            Self::Conflict => NotificationKind::Conflict,
            Self::InvalidSelection { .. } => NotificationKind::InvalidSelection,
            Self::Failed(_) | Self::Unconfirmed(_) | Self::Network(_) => {
                NotificationKind::Failure
            }
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Incomplete selection",
            Self::Conflict => "Already assigned",
            Self::InvalidSelection { .. } => "Invalid selection",
            Self::Failed(_) => "Assignment failed",
            Self::Unconfirmed(_) => "Assignment unconfirmed",
            Self::Network(_) => "Network error",
        }
    }
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load dashboard data: {}", .failures.join("; "))]
    AllSectionsFailed { failures: Vec<String> },
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl WorkflowError {
    /// The text a form shows for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) if error.is_transport() => NETWORK_ERROR_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }
}

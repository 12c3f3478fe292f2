use thiserror::Error;

use crate::models::RefId;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("response is not valid json {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to decode element {index} of $values {source}")]
    Element {
        index: usize,
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    #[error("failed to decode response {0}")]
    Entity(serde_path_to_error::Error<serde_json::Error>),
    #[error("$values must be an array but got {0}")]
    ValuesNotAnArray(&'static str),
    #[error("element {index} of $values points at unknown $ref {reference}")]
    DanglingReference { index: usize, reference: RefId },
}

pub type Result<T> = core::result::Result<T, ModelError>;

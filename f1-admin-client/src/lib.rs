//! Typed access to the F1 admin REST backend.
//!
//! [`Backend`] is the seam the application layer is written against;
//! [`HttpBackend`] implements it with a plain hyper HTTP/1 client.

pub mod backend;
pub mod error;
pub mod http_backend;

pub use backend::{Backend, ListMethod};
pub use error::ApiError;
pub use http_backend::{HttpBackend, RawResponse};

pub use ::http::StatusCode;

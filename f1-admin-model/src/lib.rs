pub mod envelope;
pub mod error;
pub mod models;
pub mod validation;

pub use envelope::{Document, Envelope, ReferenceIndex};
pub use error::ModelError;
pub use models::{
    Collection, Driver, DriverId, GrandPrix, GrandPrixId, Nested, Participation,
    ParticipationId, RefId,
};
pub use validation::{
    DriverForm, DriverUpdate, Field, GrandPrixForm, NewDriver, NewGrandPrix, NewParticipation,
    ValidationError,
};

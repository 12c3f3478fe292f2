use f1_admin_model::{
    Document, Driver, DriverId, DriverUpdate, Envelope, GrandPrix, NewDriver, NewGrandPrix,
    NewParticipation, Participation,
};

use crate::error::Result;

/// How the participation collection is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListMethod {
    /// `GET /participation`
    Get,
    /// `POST /participation` with an empty json object. Some deployments of
    /// the backend only answer the listing on this route, so it is kept as a
    /// compatibility shim for when the `GET` fails.
    PostFallback,
}

/// The REST surface of the backend.
///
/// Implemented over http by [`crate::HttpBackend`]; tests substitute an in
/// memory implementation.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn list_drivers(&self) -> Result<Envelope<Driver>>;

    async fn get_driver(&self, id: DriverId) -> Result<Document<Driver>>;

    async fn create_driver(&self, driver: &NewDriver) -> Result<Driver>;

    /// Returns the updated driver if the backend sends one back.
    async fn update_driver(&self, update: &DriverUpdate) -> Result<Option<Driver>>;

    async fn delete_driver(&self, id: DriverId) -> Result<()>;

    async fn list_grand_prix(&self) -> Result<Envelope<GrandPrix>>;

    async fn create_grand_prix(&self, grand_prix: &NewGrandPrix) -> Result<GrandPrix>;

    async fn list_participations(&self, method: ListMethod) -> Result<Envelope<Participation>>;

    async fn create_participation(
        &self,
        participation: NewParticipation,
    ) -> Result<Document<Participation>>;
}

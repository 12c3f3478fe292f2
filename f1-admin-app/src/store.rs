//! Session wide snapshot of the participations.

use std::cell::Cell;

use f1_admin_client::{Backend, ListMethod};
use f1_admin_model::{DriverId, Envelope, GrandPrixId, Participation};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::RefreshError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// In the order the backend returned them, appended records last.
    pub participations: Vec<Participation>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl StoreState {
    #[must_use]
    pub fn len(&self) -> usize {
        self.participations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participations.is_empty()
    }

    #[must_use]
    pub fn contains_pair(&self, driver: DriverId, grand_prix: GrandPrixId) -> bool {
        self.participations
            .iter()
            .any(|participation| participation.pair() == (driver, grand_prix))
    }

    pub fn for_driver(&self, driver: DriverId) -> impl Iterator<Item = &Participation> {
        self.participations
            .iter()
            .filter(move |participation| participation.driver_id == driver)
    }

    pub fn for_grand_prix(&self, grand_prix: GrandPrixId) -> impl Iterator<Item = &Participation> {
        self.participations
            .iter()
            .filter(move |participation| participation.grand_prix_id == grand_prix)
    }
}

/// Lists the participations, retrying with `POST` when the `GET` is answered
/// with an error status. Nested `$ref`s are resolved where the document
/// allows it.
pub async fn fetch_participations<B: Backend>(
    backend: &B,
) -> Result<Vec<Participation>, RefreshError> {
    let envelope = match backend.list_participations(ListMethod::Get).await {
        Ok(envelope) => envelope,
        Err(error) if error.status().is_some() => {
            warn!(%error, "participation listing failed, retrying with POST");
            backend
                .list_participations(ListMethod::PostFallback)
                .await
                .map_err(|error| match error.status() {
                    Some(status) => RefreshError::Status(status),
                    None => RefreshError::Api(error),
                })?
        }
        Err(error) => return Err(error.into()),
    };

    let Envelope { values, index } = envelope;
    Ok(values
        .into_iter()
        .map(|mut participation| {
            participation.hydrate(&index);
            participation
        })
        .collect())
}

struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a Cell<usize>) -> (Self, usize) {
        let overlapping = counter.get();
        counter.set(overlapping + 1);
        (Self(counter), overlapping)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Owns the participation snapshot of a session.
///
/// Every state transition is a single [`watch::Sender::send_modify`], so
/// subscribers never observe a half applied update.
pub struct ParticipationStore<B> {
    backend: B,
    state: watch::Sender<StoreState>,
    in_flight: Cell<usize>,
}

impl<B: Backend> ParticipationStore<B> {
    /// Creates an empty store without talking to the backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            backend,
            state,
            in_flight: Cell::new(0),
        }
    }

    /// Creates the store and loads the initial snapshot. A failed initial
    /// load is recorded in the state, the store is usable regardless.
    pub async fn open(backend: B) -> Self {
        let store = Self::new(backend);
        if let Err(error) = store.refresh().await {
            warn!(%error, "initial participation load failed");
        }
        store
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Replaces the snapshot with the backend's current participations. On
    /// failure the previous snapshot stays and the error is recorded.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let (in_flight, overlapping) = InFlight::enter(&self.in_flight);
        if overlapping > 0 {
            debug!(overlapping, "refresh started while another one is in flight");
        }
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = fetch_participations(&self.backend).await;
        drop(in_flight);
        let still_loading = self.in_flight.get() > 0;

        match result {
            Ok(participations) => {
                info!(count = participations.len(), "participations refreshed");
                self.state.send_modify(|state| {
                    state.participations = participations;
                    state.is_loading = still_loading;
                    state.error = None;
                });
                Ok(())
            }
            Err(refresh_error) => {
                error!(error = %refresh_error, "participation refresh failed");
                let message = refresh_error.to_string();
                self.state.send_modify(|state| {
                    state.is_loading = still_loading;
                    state.error = Some(message);
                });
                Err(refresh_error)
            }
        }
    }

    /// Adds an already persisted record to the snapshot without a round trip.
    pub fn append(&self, participation: Participation) {
        self.state
            .send_modify(|state| state.participations.push(participation));
    }
}

#[cfg(test)]
mod tests {
    use f1_admin_client::StatusCode;

    use super::*;
    use crate::fake::{participation, FakeBackend, Fault, Route};

    fn backend() -> FakeBackend {
        FakeBackend::new().with_participations(vec![
            participation(1, 44, 7),
            participation(2, 1, 7),
            participation(3, 44, 8),
        ])
    }

    #[tokio::test]
    async fn open_loads_initial_snapshot() {
        let store = ParticipationStore::open(backend()).await;

        let state = store.snapshot();
        assert_eq!(state.len(), 3);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        assert!(state.contains_pair(DriverId(44), GrandPrixId(8)));
        assert!(!state.contains_pair(DriverId(1), GrandPrixId(8)));
        assert_eq!(state.for_driver(DriverId(44)).count(), 2);
        assert_eq!(state.for_grand_prix(GrandPrixId(7)).count(), 2);
        assert_eq!(
            store.backend().calls_to(Route::ListParticipations(ListMethod::Get)),
            1
        );
    }

    #[tokio::test]
    async fn failing_get_falls_back_to_post() {
        let backend = backend();
        backend.fail(
            Route::ListParticipations(ListMethod::Get),
            Fault::Status(StatusCode::METHOD_NOT_ALLOWED, String::new()),
        );
        let store = ParticipationStore::new(backend);

        store.refresh().await.unwrap();

        assert_eq!(store.snapshot().len(), 3);
        assert_eq!(
            *store.backend().calls.borrow(),
            vec![
                Route::ListParticipations(ListMethod::Get),
                Route::ListParticipations(ListMethod::PostFallback),
            ]
        );
    }

    #[tokio::test]
    async fn failed_fallback_keeps_previous_snapshot() {
        let store = ParticipationStore::open(backend()).await;
        let before = store.snapshot().participations;
        store.backend().participations.borrow_mut().clear();
        store.backend().fail(
            Route::ListParticipations(ListMethod::Get),
            Fault::Status(StatusCode::NOT_FOUND, String::new()),
        );
        store.backend().fail(
            Route::ListParticipations(ListMethod::PostFallback),
            Fault::Status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_owned()),
        );

        let error = store.refresh().await.unwrap_err();

        let state = store.snapshot();
        assert!(matches!(
            error,
            RefreshError::Status(status) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(state.participations, before);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch participations: 500")
        );
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn transport_error_skips_fallback() {
        let backend = backend();
        backend.fail(Route::ListParticipations(ListMethod::Get), Fault::Offline);
        let store = ParticipationStore::open(backend).await;

        let state = store.snapshot();
        assert!(state.is_empty());
        assert!(state.error.is_some());
        assert_eq!(
            store
                .backend()
                .calls_to(Route::ListParticipations(ListMethod::PostFallback)),
            0
        );
    }

    #[tokio::test]
    async fn successful_refresh_clears_error() {
        let backend = backend();
        backend.fail(Route::ListParticipations(ListMethod::Get), Fault::Offline);
        let store = ParticipationStore::open(backend).await;
        assert!(store.snapshot().error.is_some());

        store
            .backend()
            .heal(Route::ListParticipations(ListMethod::Get));
        store.refresh().await.unwrap();

        assert_eq!(store.snapshot().error, None);
        assert_eq!(store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn subscribers_see_appends() {
        let store = ParticipationStore::open(backend()).await;
        let mut receiver = store.subscribe();
        assert!(!receiver.has_changed().unwrap());

        store.append(participation(4, 16, 9));

        assert!(receiver.has_changed().unwrap());
        let state = receiver.borrow_and_update();
        assert_eq!(state.len(), 4);
        assert_eq!(state.participations[3].id.0, 4);
    }

    #[tokio::test]
    async fn overlapping_refreshes_both_apply() {
        let store = ParticipationStore::new(backend());

        let (first, second) = tokio::join!(store.refresh(), store.refresh());

        first.unwrap();
        second.unwrap();
        assert_eq!(store.snapshot().len(), 3);
        assert!(!store.snapshot().is_loading);
        assert_eq!(
            store.backend().calls_to(Route::ListParticipations(ListMethod::Get)),
            2
        );
    }
}

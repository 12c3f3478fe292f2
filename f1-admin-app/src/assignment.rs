use f1_admin_client::{ApiError, Backend};
use f1_admin_model::{DriverId, GrandPrixId, NewParticipation, Participation};
use tracing::{info, instrument, warn};

use crate::error::AssignmentError;
use crate::notification::{NotificationCenter, NotificationKind};
use crate::store::ParticipationStore;

/// Assigns a driver to a Grand Prix.
///
/// Missing selections are rejected before anything is sent. Only a successful
/// assignment refreshes the store, exactly once. An accepted request whose
/// answer can't be decoded also refreshes once and counts as successful if the
/// new list contains the pair. Every outcome is reported to
/// `notifications`.
#[instrument(skip(store, notifications))]
pub async fn assign_participation<B: Backend>(
    store: &ParticipationStore<B>,
    notifications: &mut NotificationCenter,
    driver_id: Option<DriverId>,
    grand_prix_id: Option<GrandPrixId>,
) -> Result<Participation, AssignmentError> {
    let result = submit(store, driver_id, grand_prix_id).await;
    match &result {
        Ok(participation) => {
            notifications.push(
                NotificationKind::Success,
                "Driver assigned",
                format!(
                    "{} will race at {}",
                    participation.driver_label(),
                    participation.grand_prix_label()
                ),
            );
        }
        Err(error) => {
            notifications.push(error.kind(), error.title(), error.to_string());
        }
    }
    result
}

async fn submit<B: Backend>(
    store: &ParticipationStore<B>,
    driver_id: Option<DriverId>,
    grand_prix_id: Option<GrandPrixId>,
) -> Result<Participation, AssignmentError> {
    let request = NewParticipation::from_selection(driver_id, grand_prix_id)?;
    let pair = (request.driver_id, request.grand_prix_id);

    let document = match store.backend().create_participation(request).await {
        Ok(document) => document,
        // 2xx with a body that doesn't decode
        Err(error @ ApiError::Decode(_)) => return confirm(store, pair, error).await,
        Err(error) => {
            let error = AssignmentError::classify(error);
            if let AssignmentError::InvalidSelection { detail } = &error {
                warn!(%detail, "backend rejected the selection");
            } else {
                warn!(%error, "assignment rejected");
            }
            return Err(error);
        }
    };

    let mut participation = document.value;
    participation.hydrate(&document.index);
    info!(
        id = %participation.id,
        driver = %participation.driver_id,
        grand_prix = %participation.grand_prix_id,
        "participation created"
    );

    // The assignment itself succeeded, a failed refresh only shows in the
    // store state.
    if let Err(error) = store.refresh().await {
        warn!(%error, "refresh after assignment failed");
    }
    Ok(participation)
}

/// Refreshes once and looks for `pair` in the new list.
async fn confirm<B: Backend>(
    store: &ParticipationStore<B>,
    pair: (DriverId, GrandPrixId),
    error: ApiError,
) -> Result<Participation, AssignmentError> {
    warn!(%error, "unreadable answer to the assignment, checking the list");
    if let Err(error) = store.refresh().await {
        warn!(%error, "refresh after assignment failed");
    }
    let found = store
        .snapshot()
        .participations
        .into_iter()
        .find(|participation| participation.pair() == pair);
    match found {
        Some(participation) => {
            info!(id = %participation.id, "participation created");
            Ok(participation)
        }
        None => Err(AssignmentError::Unconfirmed(error)),
    }
}

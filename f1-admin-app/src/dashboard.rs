use std::collections::BTreeMap;

use f1_admin_client::Backend;
use f1_admin_model::{Driver, GrandPrix, Participation, ParticipationId};
use tracing::{instrument, warn};

use crate::error::DashboardError;
use crate::store::fetch_participations;

pub const RECENT_PARTICIPATIONS: usize = 5;
pub const UNASSIGNED_TEAM: &str = "Unassigned";

/// One independently fetched part of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> Section<T> {
    fn from_result<E: ToString>(name: &str, result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(items) => Self::Loaded(items),
            Err(error) => {
                let message = error.to_string();
                warn!(section = name, error = %message, "dashboard section failed");
                Self::Failed(message)
            }
        }
    }

    /// Loaded items, empty for a failed section.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Loaded(items) => items,
            Self::Failed(_) => &[],
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items().len()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed(error) => Some(error),
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCount {
    pub team: String,
    pub drivers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentParticipation {
    pub id: ParticipationId,
    pub driver: String,
    pub grand_prix: String,
}

impl From<&Participation> for RecentParticipation {
    fn from(participation: &Participation) -> Self {
        Self {
            id: participation.id,
            driver: participation.driver_label(),
            grand_prix: participation.grand_prix_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub drivers: Section<Driver>,
    pub grand_prix: Section<GrandPrix>,
    pub participations: Section<Participation>,
}

impl Dashboard {
    /// Fetches the three collections concurrently. Fails only if no section
    /// has anything to show and at least one of them failed.
    #[instrument(skip(backend))]
    pub async fn load<B: Backend>(backend: &B) -> Result<Self, DashboardError> {
        let (drivers, grand_prix, participations) = tokio::join!(
            backend.list_drivers(),
            backend.list_grand_prix(),
            fetch_participations(backend),
        );
        let dashboard = Self {
            drivers: Section::from_result(
                "drivers",
                drivers.map(f1_admin_model::Envelope::into_values),
            ),
            grand_prix: Section::from_result(
                "grand prix",
                grand_prix.map(f1_admin_model::Envelope::into_values),
            ),
            participations: Section::from_result("participations", participations),
        };

        let nothing_to_show = dashboard.driver_count() == 0
            && dashboard.grand_prix_count() == 0
            && dashboard.participation_count() == 0;
        if nothing_to_show && dashboard.failures().next().is_some() {
            return Err(DashboardError::AllSectionsFailed {
                failures: dashboard.failures().map(str::to_owned).collect(),
            });
        }
        Ok(dashboard)
    }

    fn failures(&self) -> impl Iterator<Item = &str> {
        [
            self.drivers.error(),
            self.grand_prix.error(),
            self.participations.error(),
        ]
        .into_iter()
        .flatten()
    }

    #[must_use]
    pub fn driver_count(&self) -> usize {
        self.drivers.count()
    }

    #[must_use]
    pub fn grand_prix_count(&self) -> usize {
        self.grand_prix.count()
    }

    #[must_use]
    pub fn participation_count(&self) -> usize {
        self.participations.count()
    }

    /// At least one section failed but the dashboard still has data.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Drivers per team, largest team first. Drivers without a team are
    /// counted under [`UNASSIGNED_TEAM`].
    #[must_use]
    pub fn teams(&self) -> Vec<TeamCount> {
        let mut teams = BTreeMap::<&str, usize>::new();
        for driver in self.drivers.items() {
            *teams.entry(driver.team().unwrap_or(UNASSIGNED_TEAM)).or_default() += 1;
        }
        let mut teams: Vec<_> = teams
            .into_iter()
            .map(|(team, drivers)| TeamCount {
                team: team.to_owned(),
                drivers,
            })
            .collect();
        teams.sort_by(|a, b| b.drivers.cmp(&a.drivers));
        teams
    }

    /// The last [`RECENT_PARTICIPATIONS`] participations, newest first.
    #[must_use]
    pub fn recent_participations(&self) -> Vec<RecentParticipation> {
        self.participations
            .items()
            .iter()
            .rev()
            .take(RECENT_PARTICIPATIONS)
            .map(RecentParticipation::from)
            .collect()
    }
}

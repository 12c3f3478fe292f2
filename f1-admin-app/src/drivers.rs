use f1_admin_client::Backend;
use f1_admin_model::{
    Driver, DriverForm, DriverId, DriverUpdate, Envelope, Participation, ReferenceIndex,
};
use tracing::{info, instrument};

use crate::error::WorkflowError;

pub const RECENT_RACES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentRace {
    pub grand_prix: String,
    pub location: String,
}

/// The first [`RECENT_RACES`] races embedded in `driver`, with `$ref`s
/// resolved against `index` where possible.
#[must_use]
pub fn recent_races(driver: &Driver, index: &ReferenceIndex) -> Vec<RecentRace> {
    driver
        .participations
        .iter()
        .take(RECENT_RACES)
        .map(|nested| {
            let mut participation = index.resolve(nested)?.into_owned();
            participation.hydrate(index);
            Some(participation)
        })
        .map(|participation| RecentRace {
            grand_prix: participation
                .as_ref()
                .map_or_else(|| "Unknown GP".to_owned(), Participation::grand_prix_label),
            location: participation
                .as_ref()
                .map_or_else(
                    || "Unknown Location".to_owned(),
                    Participation::location_label,
                ),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverDetails {
    pub driver: Driver,
    pub race_count: usize,
    pub recent_races: Vec<RecentRace>,
}

/// The driver list and its create, edit and delete workflows. Every
/// successful mutation reloads the list.
#[derive(Debug)]
pub struct DriverRoster<'a, B> {
    backend: &'a B,
    drivers: Vec<Driver>,
    index: ReferenceIndex,
}

impl<'a, B: Backend> DriverRoster<'a, B> {
    pub async fn load(backend: &'a B) -> Result<Self, WorkflowError> {
        let mut roster = Self {
            backend,
            drivers: Vec::new(),
            index: ReferenceIndex::default(),
        };
        roster.reload().await?;
        Ok(roster)
    }

    #[instrument(skip(self))]
    pub async fn reload(&mut self) -> Result<(), WorkflowError> {
        let Envelope { mut values, index } = self.backend.list_drivers().await?;
        values.sort_by_key(|driver| (driver.driver_number, driver.id));
        self.drivers = values;
        self.index = index;
        Ok(())
    }

    /// Sorted by driver number.
    #[must_use]
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    #[must_use]
    pub fn get(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.iter().find(|driver| driver.id == id)
    }

    #[must_use]
    pub fn recent_races(&self, id: DriverId) -> Vec<RecentRace> {
        self.get(id)
            .map(|driver| recent_races(driver, &self.index))
            .unwrap_or_default()
    }

    /// Fetches a single driver with its embedded races.
    pub async fn details(&self, id: DriverId) -> Result<DriverDetails, WorkflowError> {
        let document = self.backend.get_driver(id).await?;
        let recent_races = recent_races(&document.value, &document.index);
        Ok(DriverDetails {
            race_count: document.value.race_count(),
            recent_races,
            driver: document.value,
        })
    }

    #[instrument(skip(self))]
    pub async fn create(&mut self, form: &DriverForm) -> Result<Driver, WorkflowError> {
        let new_driver = form.validate_for_roster(&self.drivers, None)?;
        let created = self.backend.create_driver(&new_driver).await?;
        info!(id = %created.id, number = created.driver_number, "driver created");
        self.reload().await?;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(&mut self, id: DriverId, form: &DriverForm) -> Result<(), WorkflowError> {
        let driver = form.validate_for_roster(&self.drivers, Some(id))?;
        self.backend
            .update_driver(&DriverUpdate { id, driver })
            .await?;
        info!(%id, "driver updated");
        self.reload().await
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: DriverId) -> Result<(), WorkflowError> {
        self.backend.delete_driver(id).await?;
        info!(%id, "driver deleted");
        self.reload().await
    }
}

use f1_admin_client::Backend;
use f1_admin_model::{GrandPrix, GrandPrixForm, GrandPrixId};
use tracing::{info, instrument};

use crate::error::WorkflowError;

/// The Grand Prix list.
#[derive(Debug)]
pub struct Calendar<'a, B> {
    backend: &'a B,
    events: Vec<GrandPrix>,
}

impl<'a, B: Backend> Calendar<'a, B> {
    pub async fn load(backend: &'a B) -> Result<Self, WorkflowError> {
        let mut calendar = Self {
            backend,
            events: Vec::new(),
        };
        calendar.reload().await?;
        Ok(calendar)
    }

    #[instrument(skip(self))]
    pub async fn reload(&mut self) -> Result<(), WorkflowError> {
        self.events = self.backend.list_grand_prix().await?.into_values();
        Ok(())
    }

    #[must_use]
    pub fn events(&self) -> &[GrandPrix] {
        &self.events
    }

    #[must_use]
    pub fn get(&self, id: GrandPrixId) -> Option<&GrandPrix> {
        self.events.iter().find(|grand_prix| grand_prix.id == id)
    }

    /// `None` for an unknown Grand Prix.
    #[must_use]
    pub fn participant_count(&self, id: GrandPrixId) -> Option<usize> {
        self.get(id).map(GrandPrix::participant_count)
    }

    #[instrument(skip(self))]
    pub async fn create(&mut self, form: &GrandPrixForm) -> Result<GrandPrix, WorkflowError> {
        let new_grand_prix = form.validate()?;
        let created = self.backend.create_grand_prix(&new_grand_prix).await?;
        info!(id = %created.id, name = %created.name, "grand prix created");
        self.reload().await?;
        Ok(created)
    }
}

//! In memory [`Backend`] for tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use f1_admin_client::{ApiError, Backend, ListMethod, StatusCode};
use f1_admin_model::{
    Collection, Document, ModelError, Driver, DriverId, DriverUpdate, Envelope, GrandPrix, GrandPrixId,
    Nested, NewDriver, NewGrandPrix, NewParticipation, Participation, ParticipationId,
    ReferenceIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ListDrivers,
    GetDriver,
    CreateDriver,
    UpdateDriver,
    DeleteDriver,
    ListGrandPrix,
    CreateGrandPrix,
    ListParticipations(ListMethod),
    CreateParticipation,
}

#[derive(Debug, Clone)]
pub enum Fault {
    Status(StatusCode, String),
    Offline,
    /// The call takes effect but its answer doesn't decode.
    Unreadable,
}

impl Fault {
    fn into_error(self) -> ApiError {
        match self {
            Self::Status(status, body) => ApiError::Status { status, body },
            Self::Offline => ApiError::Io(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            )),
            Self::Unreadable => ApiError::Decode(ModelError::Json(
                serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            )),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub drivers: RefCell<Vec<Driver>>,
    pub grand_prix: RefCell<Vec<GrandPrix>>,
    pub participations: RefCell<Vec<Participation>>,
    pub faults: RefCell<HashMap<Route, Fault>>,
    pub calls: RefCell<Vec<Route>>,
    next_id: Cell<i64>,
}

pub fn driver(
    id: i64,
    number: i32,
    first_name: &str,
    last_name: &str,
    team: Option<&str>,
) -> Driver {
    Driver {
        reference_id: None,
        id: DriverId(id),
        driver_number: number,
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        acronym: last_name.chars().take(3).collect::<String>().to_uppercase(),
        team_name: team.map(str::to_owned),
        participations: Collection::default(),
    }
}

pub fn grand_prix(id: i64, name: &str, location: &str) -> GrandPrix {
    GrandPrix {
        reference_id: None,
        id: GrandPrixId(id),
        name: name.to_owned(),
        location: location.to_owned(),
        laps: 52,
        length: 5.891,
        participations: Collection::default(),
    }
}

pub fn participation(id: i64, driver_id: i64, grand_prix_id: i64) -> Participation {
    Participation {
        reference_id: None,
        id: ParticipationId(id),
        driver_id: DriverId(driver_id),
        grand_prix_id: GrandPrixId(grand_prix_id),
        driver: Nested::Absent,
        grand_prix: Nested::Absent,
    }
}

fn envelope<T>(values: Vec<T>) -> Envelope<T> {
    Envelope {
        values,
        index: ReferenceIndex::default(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1000),
            ..Self::default()
        }
    }

    pub fn with_drivers(self, drivers: Vec<Driver>) -> Self {
        *self.drivers.borrow_mut() = drivers;
        self
    }

    pub fn with_grand_prix(self, grand_prix: Vec<GrandPrix>) -> Self {
        *self.grand_prix.borrow_mut() = grand_prix;
        self
    }

    pub fn with_participations(self, participations: Vec<Participation>) -> Self {
        *self.participations.borrow_mut() = participations;
        self
    }

    pub fn fail(&self, route: Route, fault: Fault) {
        self.faults.borrow_mut().insert(route, fault);
    }

    pub fn heal(&self, route: Route) {
        self.faults.borrow_mut().remove(&route);
    }

    pub fn calls_to(&self, route: Route) -> usize {
        self.calls.borrow().iter().filter(|call| **call == route).count()
    }

    fn enter(&self, route: Route) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(route);
        match self.faults.borrow().get(&route) {
            Some(Fault::Unreadable) | None => Ok(()),
            Some(fault) => Err(fault.clone().into_error()),
        }
    }

    fn answer<T>(&self, route: Route, value: T) -> Result<T, ApiError> {
        match self.faults.borrow().get(&route) {
            Some(Fault::Unreadable) => Err(Fault::Unreadable.into_error()),
            _ => Ok(value),
        }
    }

    fn next_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: format!("{what} not found"),
        }
    }
}

impl Backend for FakeBackend {
    async fn list_drivers(&self) -> Result<Envelope<Driver>, ApiError> {
        self.enter(Route::ListDrivers)?;
        Ok(envelope(self.drivers.borrow().clone()))
    }

    async fn get_driver(&self, id: DriverId) -> Result<Document<Driver>, ApiError> {
        self.enter(Route::GetDriver)?;
        let driver = self
            .drivers
            .borrow()
            .iter()
            .find(|driver| driver.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("driver"))?;
        Ok(Document {
            value: driver,
            index: ReferenceIndex::default(),
        })
    }

    async fn create_driver(&self, new: &NewDriver) -> Result<Driver, ApiError> {
        self.enter(Route::CreateDriver)?;
        let mut created = driver(
            self.next_id(),
            new.driver_number,
            &new.first_name,
            &new.last_name,
            Some(&new.team_name),
        );
        created.acronym.clone_from(&new.acronym);
        self.drivers.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn update_driver(&self, update: &DriverUpdate) -> Result<Option<Driver>, ApiError> {
        self.enter(Route::UpdateDriver)?;
        let mut drivers = self.drivers.borrow_mut();
        let existing = drivers
            .iter_mut()
            .find(|driver| driver.id == update.id)
            .ok_or_else(|| Self::not_found("driver"))?;
        existing.driver_number = update.driver.driver_number;
        existing.first_name.clone_from(&update.driver.first_name);
        existing.last_name.clone_from(&update.driver.last_name);
        existing.acronym.clone_from(&update.driver.acronym);
        existing.team_name = Some(update.driver.team_name.clone());
        Ok(None)
    }

    async fn delete_driver(&self, id: DriverId) -> Result<(), ApiError> {
        self.enter(Route::DeleteDriver)?;
        let mut drivers = self.drivers.borrow_mut();
        let before = drivers.len();
        drivers.retain(|driver| driver.id != id);
        if drivers.len() == before {
            return Err(Self::not_found("driver"));
        }
        Ok(())
    }

    async fn list_grand_prix(&self) -> Result<Envelope<GrandPrix>, ApiError> {
        self.enter(Route::ListGrandPrix)?;
        Ok(envelope(self.grand_prix.borrow().clone()))
    }

    async fn create_grand_prix(&self, new: &NewGrandPrix) -> Result<GrandPrix, ApiError> {
        self.enter(Route::CreateGrandPrix)?;
        let mut created = grand_prix(self.next_id(), &new.name, &new.location);
        created.laps = new.laps;
        created.length = new.length;
        self.grand_prix.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn list_participations(
        &self,
        method: ListMethod,
    ) -> Result<Envelope<Participation>, ApiError> {
        self.enter(Route::ListParticipations(method))?;
        Ok(envelope(self.participations.borrow().clone()))
    }

    async fn create_participation(
        &self,
        new: NewParticipation,
    ) -> Result<Document<Participation>, ApiError> {
        self.enter(Route::CreateParticipation)?;
        let driver = self
            .drivers
            .borrow()
            .iter()
            .find(|driver| driver.id == new.driver_id)
            .cloned();
        let grand_prix = self
            .grand_prix
            .borrow()
            .iter()
            .find(|grand_prix| grand_prix.id == new.grand_prix_id)
            .cloned();
        let (Some(driver), Some(grand_prix)) = (driver, grand_prix) else {
            return Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "An error occurred while saving the entity changes. The INSERT statement \
                       conflicted with the FOREIGN KEY constraint \"FK_Participations_Drivers\"."
                    .to_owned(),
            });
        };
        if self
            .participations
            .borrow()
            .iter()
            .any(|existing| existing.pair() == (new.driver_id, new.grand_prix_id))
        {
            return Err(ApiError::Status {
                status: StatusCode::CONFLICT,
                body: "Driver is already participating in this Grand Prix".to_owned(),
            });
        }

        let mut created = participation(self.next_id(), new.driver_id.0, new.grand_prix_id.0);
        created.driver = Nested::Present(Box::new(driver));
        created.grand_prix = Nested::Present(Box::new(grand_prix));
        self.participations.borrow_mut().push(created.clone());
        self.answer(
            Route::CreateParticipation,
            Document {
                value: created,
                index: ReferenceIndex::default(),
            },
        )
    }
}

use serde::Serialize;
use thiserror::Error;

use crate::models::{Driver, DriverId, GrandPrixId};

/// Which input a [`ValidationError`] belongs to, so a form can focus it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DriverNumber,
    FirstName,
    LastName,
    Acronym,
    TeamName,
    GrandPrix,
    Driver,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Driver number is required")]
    DriverNumberRequired,
    #[error("First name is required")]
    FirstNameRequired,
    #[error("Last name is required")]
    LastNameRequired,
    #[error("Acronym is required")]
    AcronymRequired,
    #[error("Team name is required")]
    TeamNameRequired,
    #[error("Driver number must be a valid number")]
    DriverNumberNotANumber,
    #[error("Driver number must be between 1 and 99")]
    DriverNumberOutOfRange,
    #[error("Acronym must be exactly 3 characters")]
    AcronymLength,
    #[error("Acronym must contain only letters")]
    AcronymNotAlphabetic,
    #[error("Driver number {number} is already used by {holder}")]
    DriverNumberTaken { number: i32, holder: String },
    #[error("Please complete all fields")]
    GrandPrixIncomplete,
    #[error("Please select a driver and a Grand Prix")]
    SelectionIncomplete(Field),
}

impl ValidationError {
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::DriverNumberRequired
            | Self::DriverNumberNotANumber
            | Self::DriverNumberOutOfRange
            | Self::DriverNumberTaken { .. } => Field::DriverNumber,
            Self::FirstNameRequired => Field::FirstName,
            Self::LastNameRequired => Field::LastName,
            Self::AcronymRequired | Self::AcronymLength | Self::AcronymNotAlphabetic => {
                Field::Acronym
            }
            Self::TeamNameRequired => Field::TeamName,
            Self::GrandPrixIncomplete => Field::GrandPrix,
            Self::SelectionIncomplete(field) => *field,
        }
    }
}

/// Raw driver form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverForm {
    pub driver_number: String,
    pub first_name: String,
    pub last_name: String,
    pub acronym: String,
    pub team_name: String,
}

/// Request body of `POST /drivers` and, with [`DriverUpdate`], `PUT /drivers/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDriver {
    pub driver_number: i32,
    pub first_name: String,
    pub last_name: String,
    pub acronym: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverUpdate {
    pub id: DriverId,
    #[serde(flatten)]
    pub driver: NewDriver,
}

impl From<&Driver> for DriverForm {
    fn from(driver: &Driver) -> Self {
        Self {
            driver_number: driver.driver_number.to_string(),
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            acronym: driver.acronym.clone(),
            team_name: driver.team_name.clone().unwrap_or_default(),
        }
    }
}

// Accepts any decimal spelling of a whole number, like "44", "44.0" or
// "4.4e1". Fractions are not driver numbers.
#[allow(clippy::cast_possible_truncation)]
fn parse_whole_number(input: &str) -> Result<i64, ValidationError> {
    if let Ok(number) = input.parse::<i64>() {
        return Ok(number);
    }
    let number: f64 = input
        .parse()
        .map_err(|_| ValidationError::DriverNumberNotANumber)?;
    if !number.is_finite() || number.fract().abs() > 0.0 {
        return Err(ValidationError::DriverNumberNotANumber);
    }
    if number.abs() > 1e15 {
        return Err(ValidationError::DriverNumberOutOfRange);
    }
    Ok(number as i64)
}

impl DriverForm {
    pub fn validate(&self) -> Result<NewDriver, ValidationError> {
        let driver_number = self.driver_number.trim();
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let acronym = self.acronym.trim();
        let team_name = self.team_name.trim();

        if driver_number.is_empty() {
            return Err(ValidationError::DriverNumberRequired);
        }
        if first_name.is_empty() {
            return Err(ValidationError::FirstNameRequired);
        }
        if last_name.is_empty() {
            return Err(ValidationError::LastNameRequired);
        }
        if acronym.is_empty() {
            return Err(ValidationError::AcronymRequired);
        }
        if team_name.is_empty() {
            return Err(ValidationError::TeamNameRequired);
        }

        let number = parse_whole_number(driver_number)?;
        if !(1..=99).contains(&number) {
            return Err(ValidationError::DriverNumberOutOfRange);
        }
        if acronym.chars().count() != 3 {
            return Err(ValidationError::AcronymLength);
        }
        if !acronym.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::AcronymNotAlphabetic);
        }

        Ok(NewDriver {
            driver_number: i32::try_from(number)
                .map_err(|_| ValidationError::DriverNumberOutOfRange)?,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            acronym: acronym.to_ascii_uppercase(),
            team_name: team_name.to_owned(),
        })
    }

    /// Like [`Self::validate`] but also rejects numbers already held by
    /// another driver of `roster`. `editing` is excluded from the check.
    pub fn validate_for_roster(
        &self,
        roster: &[Driver],
        editing: Option<DriverId>,
    ) -> Result<NewDriver, ValidationError> {
        let driver = self.validate()?;
        if let Some(holder) = roster
            .iter()
            .filter(|other| Some(other.id) != editing)
            .find(|other| other.driver_number == driver.driver_number)
        {
            return Err(ValidationError::DriverNumberTaken {
                number: driver.driver_number,
                holder: holder.full_name(),
            });
        }
        Ok(driver)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrandPrixForm {
    pub name: String,
    pub location: String,
    pub laps: Option<i32>,
    pub length: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGrandPrix {
    pub name: String,
    pub location: String,
    pub laps: i32,
    pub length: f64,
}

impl GrandPrixForm {
    pub fn validate(&self) -> Result<NewGrandPrix, ValidationError> {
        let name = self.name.trim();
        let location = self.location.trim();
        match (self.laps, self.length) {
            (Some(laps), Some(length))
                if !name.is_empty() && !location.is_empty() && laps > 0 && length > 0.0 =>
            {
                Ok(NewGrandPrix {
                    name: name.to_owned(),
                    location: location.to_owned(),
                    laps,
                    length,
                })
            }
            _ => Err(ValidationError::GrandPrixIncomplete),
        }
    }
}

/// Request body of `POST /participation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipation {
    pub driver_id: DriverId,
    pub grand_prix_id: GrandPrixId,
}

impl NewParticipation {
    /// Both selections are required. Whether the ids exist is up to the backend.
    pub fn from_selection(
        driver_id: Option<DriverId>,
        grand_prix_id: Option<GrandPrixId>,
    ) -> Result<Self, ValidationError> {
        match (driver_id, grand_prix_id) {
            (Some(driver_id), Some(grand_prix_id)) => Ok(Self {
                driver_id,
                grand_prix_id,
            }),
            (None, _) => Err(ValidationError::SelectionIncomplete(Field::Driver)),
            (Some(_), None) => Err(ValidationError::SelectionIncomplete(Field::GrandPrix)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form() -> DriverForm {
        DriverForm {
            driver_number: " 44 ".to_owned(),
            first_name: " Lewis".to_owned(),
            last_name: "Hamilton ".to_owned(),
            acronym: "ham".to_owned(),
            team_name: "Ferrari".to_owned(),
        }
    }

    #[test]
    fn valid_driver_is_normalized() {
        let driver = form().validate().unwrap();
        assert_eq!(driver.driver_number, 44);
        assert_eq!(driver.first_name, "Lewis");
        assert_eq!(driver.last_name, "Hamilton");
        assert_eq!(driver.acronym, "HAM");
        assert_eq!(
            serde_json::to_value(&driver).unwrap(),
            json!({
                "driverNumber": 44,
                "firstName": "Lewis",
                "lastName": "Hamilton",
                "acronym": "HAM",
                "teamName": "Ferrari"
            })
        );
    }

    #[test]
    fn required_fields_are_checked_first() {
        let mut input = form();
        input.first_name = "  ".to_owned();
        input.acronym = "TOOLONG".to_owned();
        let error = input.validate().unwrap_err();
        assert_eq!(error, ValidationError::FirstNameRequired);
        assert_eq!(error.field(), Field::FirstName);
    }

    #[test]
    fn number_and_acronym_format() {
        let cases = [
            ("x1", "HAM", ValidationError::DriverNumberNotANumber),
            ("0", "HAM", ValidationError::DriverNumberOutOfRange),
            ("100", "HAM", ValidationError::DriverNumberOutOfRange),
            ("44", "HA", ValidationError::AcronymLength),
            ("44", "H4M", ValidationError::AcronymNotAlphabetic),
        ];
        for (number, acronym, expected) in cases {
            let mut input = form();
            input.driver_number = number.to_owned();
            input.acronym = acronym.to_owned();
            assert_eq!(input.validate().unwrap_err(), expected, "{number} {acronym}");
        }
    }

    #[test]
    fn whole_numbers_in_any_decimal_spelling() {
        for (number, expected) in [("44.0", Ok(44)), ("4.4e1", Ok(44)), ("+7", Ok(7))] {
            let mut input = form();
            input.driver_number = number.to_owned();
            assert_eq!(input.validate().map(|driver| driver.driver_number), expected);
        }
        for (number, expected) in [
            ("44.5", ValidationError::DriverNumberNotANumber),
            ("NaN", ValidationError::DriverNumberNotANumber),
            ("inf", ValidationError::DriverNumberNotANumber),
            ("1e300", ValidationError::DriverNumberOutOfRange),
            ("-3.0", ValidationError::DriverNumberOutOfRange),
        ] {
            let mut input = form();
            input.driver_number = number.to_owned();
            assert_eq!(input.validate().unwrap_err(), expected, "{number}");
        }
    }

    #[test]
    fn roster_numbers_are_unique_except_for_the_edited_driver() {
        let holder: Driver = serde_json::from_value(json!({
            "id": 1, "driverNumber": 44, "firstName": "Lewis", "lastName": "Hamilton"
        }))
        .unwrap();
        let roster = [holder];

        assert_eq!(
            form().validate_for_roster(&roster, None).unwrap_err().to_string(),
            "Driver number 44 is already used by Lewis Hamilton"
        );
        assert!(form().validate_for_roster(&roster, Some(DriverId(1))).is_ok());
    }

    #[test]
    fn update_body_includes_id() {
        let update = DriverUpdate {
            id: DriverId(3),
            driver: form().validate().unwrap(),
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["id"], 3);
        assert_eq!(body["acronym"], "HAM");
    }

    #[test]
    fn grand_prix_requires_every_field() {
        let complete = GrandPrixForm {
            name: "Italian Grand Prix".to_owned(),
            location: "Monza".to_owned(),
            laps: Some(53),
            length: Some(5.793),
        };
        assert_eq!(complete.validate().unwrap().laps, 53);

        let mut missing = complete.clone();
        missing.laps = Some(0);
        assert_eq!(
            missing.validate().unwrap_err(),
            ValidationError::GrandPrixIncomplete
        );
        let mut blank = complete;
        blank.location = " ".to_owned();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn selection_requires_both_ids() {
        assert_eq!(
            NewParticipation::from_selection(None, Some(GrandPrixId(7)))
                .unwrap_err()
                .field(),
            Field::Driver
        );
        assert_eq!(
            NewParticipation::from_selection(Some(DriverId(44)), None)
                .unwrap_err()
                .field(),
            Field::GrandPrix
        );
        let body = NewParticipation::from_selection(Some(DriverId(44)), Some(GrandPrixId(7)))
            .unwrap();
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "driverId": 44, "grandPrixId": 7 })
        );
    }
}

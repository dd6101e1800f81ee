use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FlightError;

pub const MAX_PASSENGERS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passengers {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl Passengers {
    pub fn adults(adults: u32) -> Self {
        Self {
            adults,
            ..Self::default()
        }
    }

    /// Seats to fill, one passenger record each.
    pub fn total(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.to_lowercase().as_str() {
            "economy" => Ok(Self::Economy),
            "premium-economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(FlightError::Validation(format!("invalid cabin class: {s}"))),
        }
    }

    pub fn api_code(&self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s {
            "one-way" => Ok(Self::OneWay),
            "round-trip" => Ok(Self::RoundTrip),
            _ => Err(FlightError::Validation(format!("invalid trip type: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Origin,
    Destination,
    DepartureDate,
    ReturnDate,
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::DepartureDate => "departure date",
            Self::ReturnDate => "return date",
        };
        f.write_str(s)
    }
}

/// A required search field left empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormError {
    pub field: FormField,
    pub message: String,
}

impl FormError {
    pub fn missing(field: FormField) -> Self {
        let message = match field {
            FormField::ReturnDate => "Please select a return date for round trip".to_string(),
            other => format!("Please fill in all required fields ({other} is empty)"),
        };
        Self { field, message }
    }
}

/// Validated trip parameters, carried from the search form to booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub trip: TripType,
    pub passengers: Passengers,
    pub cabin: CabinClass,
}

impl SearchParams {
    pub fn is_round_trip(&self) -> bool {
        self.trip == TripType::RoundTrip && self.return_date.is_some()
    }

    pub fn outbound(&self) -> LegQuery {
        self.leg(&self.origin, &self.destination, self.departure_date)
    }

    /// The return leg as its own one-way search, airports swapped.
    pub fn inbound(&self) -> Option<LegQuery> {
        if !self.is_round_trip() {
            return None;
        }
        self.return_date
            .map(|date| self.leg(&self.destination, &self.origin, date))
    }

    fn leg(&self, from: &str, to: &str, date: NaiveDate) -> LegQuery {
        LegQuery {
            origin: from.to_string(),
            destination: to.to_string(),
            departure_date: date,
            return_date: None,
            passengers: self.passengers,
            cabin: self.cabin,
        }
    }
}

/// One request to the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LegQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: Passengers,
    pub cabin: CabinClass,
}

impl LegQuery {
    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("origin".to_string(), self.origin.clone()),
            ("destination".to_string(), self.destination.clone()),
            (
                "departure_date".to_string(),
                self.departure_date.format("%Y-%m-%d").to_string(),
            ),
            ("adults".to_string(), self.passengers.adults.to_string()),
        ];

        if let Some(ret) = self.return_date {
            params.push(("return_date".to_string(), ret.format("%Y-%m-%d").to_string()));
        }
        if self.passengers.children > 0 {
            params.push(("children".to_string(), self.passengers.children.to_string()));
        }
        if self.passengers.infants > 0 {
            params.push(("infants".to_string(), self.passengers.infants.to_string()));
        }
        if self.cabin != CabinClass::Economy {
            params.push(("travel_class".to_string(), self.cabin.api_code().to_string()));
        }

        params
    }
}

pub fn validate_airport(code: &str) -> Result<(), FlightError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(FlightError::InvalidAirport(code.to_string()));
    }
    Ok(())
}

pub fn parse_date(date: &str) -> Result<NaiveDate, FlightError> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| FlightError::InvalidDate(date.to_string()))?;
    if parsed.year() < 2000 {
        return Err(FlightError::InvalidDate(date.to_string()));
    }
    Ok(parsed)
}

pub fn validate_passengers(passengers: &Passengers) -> Result<(), FlightError> {
    let total = passengers.total();

    if total > MAX_PASSENGERS {
        return Err(FlightError::Validation(format!(
            "total passengers ({total}) exceeds maximum of {MAX_PASSENGERS}"
        )));
    }

    if total == 0 || passengers.adults == 0 {
        return Err(FlightError::Validation(
            "at least one adult passenger required".into(),
        ));
    }

    if passengers.infants > passengers.adults {
        return Err(FlightError::Validation(
            "infants cannot exceed number of adults".into(),
        ));
    }

    Ok(())
}

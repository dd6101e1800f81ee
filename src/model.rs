use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub carrier: String,
    pub flight_number: String,
}

/// One itinerary exactly as the search endpoint returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub airline_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_name: Option<String>,
    pub flight_number: String,
    pub departure_airport: String,
    pub departure_time: NaiveDateTime,
    pub arrival_airport: String,
    pub arrival_time: NaiveDateTime,
    pub duration: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub stops: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_direct: Option<bool>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(
        rename = "numberOfBookableSeats",
        default,
        deserialize_with = "seats_or_na",
        skip_serializing_if = "Option::is_none"
    )]
    pub seats: Option<u32>,
}

impl Flight {
    pub fn display_airline(&self) -> &str {
        self.airline_name.as_deref().unwrap_or(&self.airline_code)
    }
}

// The backend sends a count, or "N/A" when the offer doesn't say.
fn seats_or_na<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Airport {
    /// Human-readable label shown once a suggestion is picked.
    pub fn label(&self) -> String {
        let place = if self.city.is_empty() { &self.name } else { &self.city };
        if place.is_empty() {
            self.code.clone()
        } else {
            format!("{place} ({})", self.code)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passenger {
    pub name: String,
    pub passport_number: String,
}

impl Passenger {
    pub fn new(name: impl Into<String>, passport_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passport_number: passport_number.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.passport_number.trim().is_empty()
    }
}

/// Which leg of the reservation a booking request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegRole {
    #[serde(rename = "one-way")]
    OneWay,
    #[serde(rename = "round-trip-departure")]
    Departure,
    #[serde(rename = "round-trip-return")]
    Return,
}

impl std::fmt::Display for LegRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OneWay => "one-way",
            Self::Departure => "departure",
            Self::Return => "return",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub passenger_name: String,
    pub passport_number: String,
    pub airline_code: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub price: Decimal,
    pub currency: String,
    pub trip_type: LegRole,
}

impl BookingRequest {
    pub fn new(passenger: &Passenger, flight: &Flight, role: LegRole) -> Self {
        Self {
            passenger_name: passenger.name.trim().to_string(),
            passport_number: passenger.passport_number.trim().to_string(),
            airline_code: flight.airline_code.clone(),
            departure_airport: flight.departure_airport.clone(),
            arrival_airport: flight.arrival_airport.clone(),
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            price: flight.price,
            currency: flight.currency.clone(),
            trip_type: role,
        }
    }
}

/// What the backend answered for one accepted booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingReceipt {
    #[serde(default)]
    pub booking_id: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A row of the server-side booking log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: u64,
    pub passenger_name: String,
    #[serde(default)]
    pub passport_number: String,
    pub airline_code: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripKind {
    #[serde(rename = "one-way")]
    OneWay,
    #[serde(rename = "round-trip")]
    RoundTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnLeg {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

/// A booking summary kept in local trip storage.
///
/// Field names follow the stored document shape, which mixes camelCase
/// summary fields with the snake_case flight fields copied off the leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(rename = "bookingId")]
    pub booking_id: String,
    #[serde(rename = "tripType")]
    pub trip_type: TripKind,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub airline_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_name: Option<String>,
    #[serde(rename = "totalPrice", with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub currency: String,
    pub passengers: u32,
    #[serde(rename = "passengerNames", default)]
    pub passenger_names: Vec<String>,
    #[serde(rename = "bookedAt")]
    pub booked_at: DateTime<Utc>,
    #[serde(rename = "returnFlight", default, skip_serializing_if = "Option::is_none")]
    pub return_flight: Option<ReturnLeg>,
}

impl Trip {
    /// `BK` followed by the booking instant in unix milliseconds.
    pub fn booking_id_at(at: DateTime<Utc>) -> String {
        format!("BK{}", at.timestamp_millis())
    }
}

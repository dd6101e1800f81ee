use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::api::FlightApi;
use crate::error::FlightError;
use crate::model::{
    BookingReceipt, BookingRequest, LegRole, Passenger, ReturnLeg, Trip, TripKind,
};
use crate::results::{BookingState, Selection};
use crate::trips::{StorageBackend, TripRepository};

pub const MISSING_DETAILS_MESSAGE: &str = "Please fill in all passenger details";
pub const BOOKING_FAILED_MESSAGE: &str = "Failed to create booking. Please try again.";
pub const PAYMENT_NOTICE: &str = "Payment is collected at check-in; no card is charged here.";

pub const DEFAULT_REDIRECT_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub trip: Trip,
    /// Sum of the leg prices times the number of passengers.
    pub total_price: Decimal,
    pub currency: String,
    pub passengers: u32,
    pub redirect_after: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegBooking {
    pub role: LegRole,
    pub passenger_name: String,
    pub receipt: BookingReceipt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedBooking {
    pub role: LegRole,
    pub passenger_name: String,
    pub message: String,
}

/// How the batch of per-passenger, per-leg requests went.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Confirmed(Confirmation),
    /// Some requests went through before others failed. The accepted ones
    /// are not cancelled and no trip is stored.
    PartiallyFailed {
        succeeded: Vec<LegBooking>,
        failed: Vec<FailedBooking>,
    },
    Failed { failed: Vec<FailedBooking> },
}

impl BookingOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// The first failure's message, in submission order.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Confirmed(_) => None,
            Self::PartiallyFailed { failed, .. } | Self::Failed { failed } => failed
                .first()
                .map(|f| f.message.as_str())
                .or(Some(BOOKING_FAILED_MESSAGE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingStatus {
    Editing,
    Failed(String),
    Confirmed(Confirmation),
}

#[derive(Debug, PartialEq)]
pub enum BookingScreen<'a> {
    NoFlightSelected,
    Form {
        selection: &'a Selection,
        passengers: &'a [Passenger],
        error: Option<&'a str>,
    },
    Confirmed(&'a Confirmation),
}

/// One request per passenger per leg; departure requests first.
pub fn build_requests(selection: &Selection, passengers: &[Passenger]) -> Vec<BookingRequest> {
    match selection {
        Selection::OneWay(flight) => passengers
            .iter()
            .map(|p| BookingRequest::new(p, flight, LegRole::OneWay))
            .collect(),
        Selection::RoundTrip {
            departure,
            return_flight,
        } => passengers
            .iter()
            .map(|p| BookingRequest::new(p, departure, LegRole::Departure))
            .chain(
                passengers
                    .iter()
                    .map(|p| BookingRequest::new(p, return_flight, LegRole::Return)),
            )
            .collect(),
    }
}

/// The single stored record for a completed booking.
///
/// A round trip's `total_price` is the two leg fares added together; a
/// one-way trip stores the fare times the passenger count.
pub fn trip_summary(selection: &Selection, passengers: &[Passenger], booked_at: DateTime<Utc>) -> Trip {
    let count = passengers.len() as u32;
    let first = selection.first_leg();

    let (trip_type, total_price, return_flight) = match selection {
        Selection::OneWay(flight) => (TripKind::OneWay, flight.price * Decimal::from(count), None),
        Selection::RoundTrip {
            departure,
            return_flight,
        } => (
            TripKind::RoundTrip,
            departure.price + return_flight.price,
            Some(ReturnLeg {
                departure_airport: return_flight.departure_airport.clone(),
                arrival_airport: return_flight.arrival_airport.clone(),
                departure_time: return_flight.departure_time,
                arrival_time: return_flight.arrival_time,
            }),
        ),
    };

    Trip {
        booking_id: Trip::booking_id_at(booked_at),
        trip_type,
        departure_airport: first.departure_airport.clone(),
        arrival_airport: first.arrival_airport.clone(),
        departure_time: first.departure_time,
        arrival_time: first.arrival_time,
        airline_code: first.airline_code.clone(),
        airline_name: first.airline_name.clone(),
        total_price,
        currency: first.currency.clone(),
        passengers: count,
        passenger_names: passengers.iter().map(|p| p.name.trim().to_string()).collect(),
        booked_at,
        return_flight,
    }
}

pub fn confirmation_total(selection: &Selection, passengers: u32) -> Decimal {
    let per_passenger = match selection {
        Selection::OneWay(flight) => flight.price,
        Selection::RoundTrip {
            departure,
            return_flight,
        } => departure.price + return_flight.price,
    };
    per_passenger * Decimal::from(passengers)
}

pub struct BookingForm {
    state: Option<BookingState>,
    passengers: Vec<Passenger>,
    status: BookingStatus,
    redirect_after: Duration,
}

impl BookingForm {
    pub fn new(state: Option<BookingState>) -> Self {
        let seats = state
            .as_ref()
            .and_then(|s| s.params.as_ref())
            .map(|p| p.passengers.total())
            .filter(|n| *n > 0)
            .unwrap_or(1);

        Self {
            state,
            passengers: vec![Passenger::default(); seats as usize],
            status: BookingStatus::Editing,
            redirect_after: DEFAULT_REDIRECT_AFTER,
        }
    }

    pub fn with_redirect_after(mut self, delay: Duration) -> Self {
        self.redirect_after = delay;
        self
    }

    pub fn seat_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn status(&self) -> &BookingStatus {
        &self.status
    }

    pub fn set_passenger(
        &mut self,
        index: usize,
        name: impl Into<String>,
        passport_number: impl Into<String>,
    ) -> Result<(), FlightError> {
        let seats = self.passengers.len();
        let slot = self.passengers.get_mut(index).ok_or_else(|| {
            FlightError::Validation(format!(
                "passenger {} is out of range (this booking has {seats} seats)",
                index + 1
            ))
        })?;
        *slot = Passenger::new(name, passport_number);
        self.status = BookingStatus::Editing;
        Ok(())
    }

    /// Replaces every slot at once; the count must match the seats searched for.
    pub fn fill(&mut self, passengers: Vec<Passenger>) -> Result<(), FlightError> {
        if passengers.len() != self.passengers.len() {
            return Err(FlightError::Validation(format!(
                "{} passenger(s) given but {} seat(s) were searched for",
                passengers.len(),
                self.passengers.len()
            )));
        }
        self.passengers = passengers;
        self.status = BookingStatus::Editing;
        Ok(())
    }

    pub fn screen(&self) -> BookingScreen<'_> {
        let Some(state) = self.state.as_ref() else {
            return BookingScreen::NoFlightSelected;
        };
        match &self.status {
            BookingStatus::Confirmed(confirmation) => BookingScreen::Confirmed(confirmation),
            BookingStatus::Failed(message) => BookingScreen::Form {
                selection: &state.selection,
                passengers: &self.passengers,
                error: Some(message),
            },
            BookingStatus::Editing => BookingScreen::Form {
                selection: &state.selection,
                passengers: &self.passengers,
                error: None,
            },
        }
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        let expected = self
            .state
            .as_ref()
            .and_then(|s| s.params.as_ref())
            .map(|p| p.passengers.total() as usize)
            .filter(|n| *n > 0)
            .unwrap_or(1);
        if self.passengers.len() != expected {
            return Err(FlightError::Validation(format!(
                "{} passenger record(s) for {expected} seat(s)",
                self.passengers.len()
            )));
        }
        if self.passengers.iter().any(|p| !p.is_complete()) {
            return Err(FlightError::Validation(MISSING_DETAILS_MESSAGE.into()));
        }
        Ok(())
    }

    /// Sends every booking request at once and stores one trip when all of
    /// them succeed.
    ///
    /// `Err` means nothing was sent (no selection, invalid passengers) or the
    /// trip could not be stored afterwards; request failures come back as a
    /// non-confirmed [`BookingOutcome`].
    pub async fn submit<A, B>(
        &mut self,
        api: Arc<A>,
        trips: &TripRepository<B>,
        now: DateTime<Utc>,
    ) -> Result<BookingOutcome, FlightError>
    where
        A: FlightApi + 'static,
        B: StorageBackend,
    {
        let Some(selection) = self.state.as_ref().map(|s| s.selection.clone()) else {
            return Err(FlightError::Validation("No Flight Selected".into()));
        };
        if let Err(e) = self.validate() {
            self.status = BookingStatus::Failed(e.to_string());
            return Err(e);
        }

        let requests = build_requests(&selection, &self.passengers);
        info!(
            requests = requests.len(),
            round_trip = selection.is_round_trip(),
            "submitting bookings"
        );

        let outcome = match send_all(api, requests).await {
            Ok(_) => {
                let trip = trip_summary(&selection, &self.passengers, now);
                trips.append(trip.clone())?;
                info!(booking_id = %trip.booking_id, "trip saved");

                let count = self.passengers.len() as u32;
                let confirmation = Confirmation {
                    total_price: confirmation_total(&selection, count),
                    currency: trip.currency.clone(),
                    passengers: count,
                    trip,
                    redirect_after: self.redirect_after,
                };
                BookingOutcome::Confirmed(confirmation)
            }
            Err((succeeded, failed)) if succeeded.is_empty() => BookingOutcome::Failed { failed },
            Err((succeeded, failed)) => {
                warn!(
                    succeeded = succeeded.len(),
                    failed = failed.len(),
                    "bookings partially failed; accepted bookings are left in place"
                );
                BookingOutcome::PartiallyFailed { succeeded, failed }
            }
        };

        self.status = match &outcome {
            BookingOutcome::Confirmed(c) => BookingStatus::Confirmed(c.clone()),
            other => BookingStatus::Failed(
                other
                    .error_message()
                    .unwrap_or(BOOKING_FAILED_MESSAGE)
                    .to_string(),
            ),
        };
        Ok(outcome)
    }
}

type Split = (Vec<LegBooking>, Vec<FailedBooking>);

/// Fires every request concurrently and waits for all of them. Results are
/// reported in request order whatever order they finish in.
async fn send_all<A>(api: Arc<A>, requests: Vec<BookingRequest>) -> Result<Vec<LegBooking>, Split>
where
    A: FlightApi + 'static,
{
    let mut join_set = JoinSet::new();
    for (index, request) in requests.iter().cloned().enumerate() {
        let api = Arc::clone(&api);
        join_set.spawn(async move {
            let result = api.create_booking(&request).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<BookingReceipt, String>>> = vec![None; requests.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(receipt))) => results[index] = Some(Ok(receipt)),
            Ok((index, Err(e))) => {
                warn!(index, error = %e, "booking request failed");
                results[index] = Some(Err(e.user_message(BOOKING_FAILED_MESSAGE)));
            }
            Err(e) => warn!(error = %e, "booking task did not finish"),
        }
    }

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for (request, result) in requests.into_iter().zip(results) {
        match result {
            Some(Ok(receipt)) => succeeded.push(LegBooking {
                role: request.trip_type,
                passenger_name: request.passenger_name,
                receipt,
            }),
            Some(Err(message)) => failed.push(FailedBooking {
                role: request.trip_type,
                passenger_name: request.passenger_name,
                message,
            }),
            None => failed.push(FailedBooking {
                role: request.trip_type,
                passenger_name: request.passenger_name,
                message: BOOKING_FAILED_MESSAGE.to_string(),
            }),
        }
    }

    if failed.is_empty() {
        Ok(succeeded)
    } else {
        Err((succeeded, failed))
    }
}

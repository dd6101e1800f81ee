#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use flyhigh::api::FlightApi;
use flyhigh::error::FlightError;
use flyhigh::model::{
    Airport, BookingReceipt, BookingRecord, BookingRequest, Destination, Flight, LegRole,
};
use flyhigh::query::{LegQuery, Passengers, SearchParams, TripType};
use flyhigh::results::parse_duration_minutes;
use flyhigh::search::{AirportField, SearchForm};

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn idr(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

/// A flight whose arrival is `departure + duration` (or +1h when the
/// duration doesn't parse).
#[allow(clippy::too_many_arguments)]
pub fn flight(
    airline: &str,
    number: &str,
    from: &str,
    to: &str,
    departure: &str,
    duration: &str,
    price: i64,
    stops: u32,
) -> Flight {
    let departure_time = at(departure);
    let minutes = parse_duration_minutes(duration).unwrap_or(60);
    Flight {
        id: Some(format!("{airline}{number}")),
        airline_code: airline.to_string(),
        airline_name: None,
        flight_number: number.to_string(),
        departure_airport: from.to_string(),
        departure_time,
        arrival_airport: to.to_string(),
        arrival_time: departure_time + Duration::minutes(i64::from(minutes)),
        duration: duration.to_string(),
        price: idr(price),
        currency: "IDR".to_string(),
        stops,
        is_direct: Some(stops == 0),
        segments: Vec::new(),
        seats: Some(9),
    }
}

pub fn one_way_params(from: &str, to: &str, date: &str, adults: u32) -> SearchParams {
    let mut form = SearchForm {
        origin: AirportField::typed(from),
        destination: AirportField::typed(to),
        departure_date: date.to_string(),
        passengers: Passengers::adults(adults),
        ..SearchForm::default()
    };
    form.set_trip_type(TripType::OneWay);
    form.validate().unwrap()
}

pub fn round_trip_params(from: &str, to: &str, date: &str, back: &str, adults: u32) -> SearchParams {
    let form = SearchForm {
        origin: AirportField::typed(from),
        destination: AirportField::typed(to),
        departure_date: date.to_string(),
        return_date: back.to_string(),
        passengers: Passengers::adults(adults),
        ..SearchForm::default()
    };
    form.validate().unwrap()
}

type RouteKey = (String, String, Option<NaiveDate>);

/// In-memory backend. Unknown routes return no flights.
#[derive(Default)]
pub struct FakeApi {
    routes: HashMap<RouteKey, Vec<Flight>>,
    failing_routes: Vec<(String, String)>,
    airports: Vec<Airport>,
    destinations: Vec<Destination>,
    booking_failures: Vec<(String, LegRole, Option<String>)>,
    pub searches: Mutex<Vec<LegQuery>>,
    pub airport_lookups: Mutex<Vec<String>>,
    pub bookings: Mutex<Vec<BookingRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, from: &str, to: &str, flights: Vec<Flight>) -> Self {
        self.routes
            .insert((from.to_string(), to.to_string(), None), flights);
        self
    }

    pub fn with_day(mut self, from: &str, to: &str, date: &str, flights: Vec<Flight>) -> Self {
        self.routes
            .insert((from.to_string(), to.to_string(), Some(day(date))), flights);
        self
    }

    pub fn failing_route(mut self, from: &str, to: &str) -> Self {
        self.failing_routes.push((from.to_string(), to.to_string()));
        self
    }

    pub fn with_airports(mut self, airports: Vec<Airport>) -> Self {
        self.airports = airports;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<Destination>) -> Self {
        self.destinations = destinations;
        self
    }

    /// Rejects the booking for `passenger` on `role`, optionally with a
    /// server message.
    pub fn failing_booking(mut self, passenger: &str, role: LegRole, message: Option<&str>) -> Self {
        self.booking_failures
            .push((passenger.to_string(), role, message.map(String::from)));
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.lock().unwrap().len()
    }

    pub fn booked(&self) -> Vec<BookingRequest> {
        self.bookings.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlightApi for FakeApi {
    async fn search(&self, query: &LegQuery) -> Result<Vec<Flight>, FlightError> {
        self.searches.lock().unwrap().push(query.clone());

        let route = (query.origin.clone(), query.destination.clone());
        if self.failing_routes.contains(&route) {
            return Err(FlightError::ConnectionFailed("connection refused".into()));
        }

        let dated = (route.0.clone(), route.1.clone(), Some(query.departure_date));
        let any_day = (route.0, route.1, None);
        Ok(self
            .routes
            .get(&dated)
            .or_else(|| self.routes.get(&any_day))
            .cloned()
            .unwrap_or_default())
    }

    async fn airports(&self, keyword: &str) -> Result<Vec<Airport>, FlightError> {
        self.airport_lookups.lock().unwrap().push(keyword.to_string());
        let needle = keyword.to_lowercase();
        Ok(self
            .airports
            .iter()
            .filter(|a| {
                a.code.to_lowercase().contains(&needle)
                    || a.city.to_lowercase().contains(&needle)
                    || a.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn popular_destinations(&self) -> Result<Vec<Destination>, FlightError> {
        Ok(self.destinations.clone())
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingReceipt, FlightError> {
        let id = {
            let mut bookings = self.bookings.lock().unwrap();
            bookings.push(request.clone());
            bookings.len() as u64
        };

        let failure = self
            .booking_failures
            .iter()
            .find(|(name, role, _)| *name == request.passenger_name && *role == request.trip_type);
        if let Some((_, _, message)) = failure {
            return Err(FlightError::Api {
                status: 400,
                message: message.clone(),
            });
        }

        Ok(BookingReceipt {
            booking_id: Some(id),
            message: Some("Booking created successfully".into()),
        })
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, FlightError> {
        Ok(Vec::new())
    }
}

pub fn airport(code: &str, name: &str, city: &str, country: &str) -> Airport {
    Airport {
        code: code.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        country: country.to_string(),
        kind: Some("AIRPORT".to_string()),
    }
}

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::FlightApi;
use crate::error::FlightError;
use crate::model::{Airport, Destination, Flight};
use crate::query::{
    self, CabinClass, FormError, FormField, Passengers, SearchParams, TripType,
};

pub const MIN_KEYWORD_LEN: usize = 2;

/// What the search form hands to the results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsState {
    pub flights: Vec<Flight>,
    pub params: SearchParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_flights: Option<Vec<Flight>>,
}

/// An airport input: the code that gets searched and the label shown for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportField {
    pub code: String,
    pub label: Option<String>,
}

impl AirportField {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            code: text.into(),
            label: None,
        }
    }

    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    pub origin: AirportField,
    pub destination: AirportField,
    pub departure_date: String,
    pub return_date: String,
    pub trip: TripType,
    pub passengers: Passengers,
    pub cabin: CabinClass,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            origin: AirportField::default(),
            destination: AirportField::default(),
            departure_date: String::new(),
            return_date: String::new(),
            trip: TripType::RoundTrip,
            passengers: Passengers::default(),
            cabin: CabinClass::Economy,
        }
    }
}

impl SearchForm {
    pub fn set_trip_type(&mut self, trip: TripType) {
        self.trip = trip;
        if trip == TripType::OneWay {
            self.return_date.clear();
        }
    }

    pub fn swap_locations(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    /// Required fields first, one field at a time, then formats.
    pub fn validate(&self) -> Result<SearchParams, FlightError> {
        if self.origin.code.trim().is_empty() {
            return Err(FormError::missing(FormField::Origin).into());
        }
        if self.destination.code.trim().is_empty() {
            return Err(FormError::missing(FormField::Destination).into());
        }
        if self.departure_date.trim().is_empty() {
            return Err(FormError::missing(FormField::DepartureDate).into());
        }
        if self.trip == TripType::RoundTrip && self.return_date.trim().is_empty() {
            return Err(FormError::missing(FormField::ReturnDate).into());
        }

        let origin = self.origin.code.trim().to_uppercase();
        let destination = self.destination.code.trim().to_uppercase();
        query::validate_airport(&origin)?;
        query::validate_airport(&destination)?;
        if origin == destination {
            return Err(FlightError::Validation(
                "origin and destination must differ".into(),
            ));
        }

        let departure_date = query::parse_date(&self.departure_date)?;
        let return_date = match self.trip {
            TripType::RoundTrip => {
                let ret = query::parse_date(&self.return_date)?;
                if ret < departure_date {
                    return Err(FlightError::Validation(
                        "return date cannot be before the departure date".into(),
                    ));
                }
                Some(ret)
            }
            TripType::OneWay => None,
        };

        query::validate_passengers(&self.passengers)?;

        Ok(SearchParams {
            origin,
            destination,
            departure_date,
            return_date,
            trip: self.trip,
            passengers: self.passengers,
            cabin: self.cabin,
        })
    }
}

/// Validates the form and runs the search; round trips search both legs
/// at once and need both to come back.
pub async fn submit<A>(api: &A, form: &SearchForm) -> Result<ResultsState, FlightError>
where
    A: FlightApi + ?Sized,
{
    let params = form.validate()?;
    info!(
        origin = %params.origin,
        destination = %params.destination,
        date = %params.departure_date,
        round_trip = params.is_round_trip(),
        "searching flights"
    );

    match params.inbound() {
        None => {
            let flights = api.search(&params.outbound()).await.map_err(search_failure)?;
            Ok(ResultsState {
                flights,
                params,
                return_flights: None,
            })
        }
        Some(inbound) => {
            let outbound = params.outbound();
            let (out, back) = tokio::join!(api.search(&outbound), api.search(&inbound));
            match (out, back) {
                (Ok(flights), Ok(return_flights)) => Ok(ResultsState {
                    flights,
                    params,
                    return_flights: Some(return_flights),
                }),
                (out, back) => {
                    for err in [out.err(), back.err()].into_iter().flatten() {
                        warn!(error = %err, "round-trip leg search failed");
                    }
                    Err(FlightError::SearchFailed)
                }
            }
        }
    }
}

fn search_failure(err: FlightError) -> FlightError {
    warn!(error = %err, "flight search failed");
    match err {
        FlightError::NoResults | FlightError::Api { .. } => err,
        // Transport errors keep their own guidance.
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::ProxyError(_)
        | FlightError::TlsError(_) => err,
        _ => FlightError::SearchFailed,
    }
}

pub async fn popular_destinations<A>(api: &A) -> Result<Vec<Destination>, FlightError>
where
    A: FlightApi + ?Sized,
{
    api.popular_destinations().await
}

/// Suggestion list behind one airport input.
#[derive(Debug, Clone, Default)]
pub struct AirportAutocomplete {
    pub text: String,
    suggestions: Vec<Airport>,
    open: bool,
}

impl AirportAutocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Visible suggestions; empty while the list is closed.
    pub fn suggestions(&self) -> &[Airport] {
        if self.open {
            &self.suggestions
        } else {
            &[]
        }
    }

    pub async fn input<A>(&mut self, api: &A, text: &str)
    where
        A: FlightApi + ?Sized,
    {
        self.text = text.to_string();
        let keyword = text.trim();

        if keyword.chars().count() < MIN_KEYWORD_LEN {
            self.suggestions.clear();
            self.open = false;
            return;
        }

        match api.airports(keyword).await {
            Ok(airports) => {
                self.open = !airports.is_empty();
                self.suggestions = airports;
            }
            Err(e) => {
                warn!(keyword, error = %e, "airport lookup failed");
                self.suggestions.clear();
                self.open = false;
            }
        }
    }

    pub fn dismiss(&mut self) {
        self.open = false;
    }

    /// Fixes the field to the chosen airport and closes the list.
    pub fn select(&mut self, index: usize) -> Option<AirportField> {
        if !self.open {
            return None;
        }
        let airport = self.suggestions.get(index)?;
        let field = AirportField {
            code: airport.code.clone(),
            label: Some(airport.label()),
        };
        self.text = airport.label();
        self.open = false;
        Some(field)
    }
}

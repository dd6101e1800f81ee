use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{NaiveDate, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::FlightApi;
use crate::error::FlightError;
use crate::model::Flight;
use crate::query::SearchParams;
use crate::search::ResultsState;

/// Days shown on each side of the searched date.
pub const DATE_TAB_SPAN: i64 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    Best,
    Cheapest,
    Fastest,
}

impl SortMode {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s {
            "best" => Ok(Self::Best),
            "cheapest" => Ok(Self::Cheapest),
            "fastest" => Ok(Self::Fastest),
            _ => Err(FlightError::Validation(format!("invalid sort mode: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StopBucket {
    Direct,
    OneStop,
    TwoPlus,
}

impl StopBucket {
    pub fn of(stops: u32) -> Self {
        match stops {
            0 => Self::Direct,
            1 => Self::OneStop,
            _ => Self::TwoPlus,
        }
    }

    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s.trim() {
            "direct" | "0" | "nonstop" => Ok(Self::Direct),
            "1" | "1-stop" => Ok(Self::OneStop),
            "2" | "2+" | "2-plus" => Ok(Self::TwoPlus),
            other => Err(FlightError::Validation(format!(
                "invalid stop filter: {other} (use direct, 1 or 2+)"
            ))),
        }
    }
}

/// `"direct,2+"` → `{Direct, TwoPlus}`.
pub fn parse_stop_list(s: &str) -> Result<BTreeSet<StopBucket>, FlightError> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(StopBucket::from_str_loose)
        .collect()
}

pub fn parse_airline_list(s: &str) -> BTreeSet<String> {
    s.split(',')
        .map(|a| a.trim().to_uppercase())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Hour-of-day window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl Default for HourRange {
    fn default() -> Self {
        Self { start: 0, end: 24 }
    }
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Result<Self, FlightError> {
        if start > end || end > 24 {
            return Err(FlightError::Validation(format!(
                "invalid hour range {start}-{end} (hours run 0-24)"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses `"6-12"`.
    pub fn parse(s: &str) -> Result<Self, FlightError> {
        let invalid = || FlightError::Validation(format!("hour range must be \"START-END\", got: \"{s}\""));
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse().map_err(|_| invalid())?;
        let end = end.trim().parse().map_err(|_| invalid())?;
        Self::new(start, end)
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour <= self.end
    }
}

/// Stop, airline and time-of-day filters. Empty sets don't restrict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub stops: BTreeSet<StopBucket>,
    pub airlines: BTreeSet<String>,
    pub departure_hours: HourRange,
    pub arrival_hours: HourRange,
}

impl Filters {
    pub fn matches(&self, flight: &Flight) -> bool {
        if !self.stops.is_empty() && !self.stops.contains(&StopBucket::of(flight.stops)) {
            return false;
        }
        if !self.airlines.is_empty() && !self.airlines.contains(&flight.airline_code) {
            return false;
        }
        self.departure_hours.contains(flight.departure_time.hour())
            && self.arrival_hours.contains(flight.arrival_time.hour())
    }
}

/// Minutes in an ISO-8601 duration such as `PT2H30M` or `P1DT3H`.
pub fn parse_duration_minutes(duration: &str) -> Option<u32> {
    let rest = duration.trim().strip_prefix('P')?;
    let (days, time) = match rest.split_once('T') {
        Some((days, time)) => (days, time),
        None => (rest, ""),
    };

    let mut minutes = 0u32;
    let mut seen = false;

    if !days.is_empty() {
        let n: u32 = days.strip_suffix('D')?.parse().ok()?;
        minutes = n.checked_mul(24 * 60)?;
        seen = true;
    }

    let mut number = String::new();
    for c in time.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let n: u32 = number.parse().ok()?;
        number.clear();
        let add = match c {
            'H' => n.checked_mul(60)?,
            'M' => n,
            'S' => 0,
            _ => return None,
        };
        minutes = minutes.checked_add(add)?;
        seen = true;
    }

    if !number.is_empty() || !seen {
        return None;
    }
    Some(minutes)
}

/// `0.7 * price + 0.3 * (minutes * 100)`; lower is better.
pub fn best_score(flight: &Flight) -> Option<Decimal> {
    let minutes = parse_duration_minutes(&flight.duration)?;
    Some(
        Decimal::new(7, 1) * flight.price
            + Decimal::new(3, 1) * Decimal::from(u64::from(minutes) * 100),
    )
}

fn missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable, so equal keys keep the order the API returned.
pub fn sort_flights(flights: &mut [&Flight], mode: SortMode) {
    match mode {
        SortMode::Cheapest => flights.sort_by(|a, b| a.price.cmp(&b.price)),
        SortMode::Fastest => flights.sort_by(|a, b| {
            missing_last(
                parse_duration_minutes(&a.duration),
                parse_duration_minutes(&b.duration),
            )
        }),
        SortMode::Best => flights.sort_by(|a, b| missing_last(best_score(a), best_score(b))),
    }
}

pub fn filter_flights<'a>(flights: &'a [Flight], filters: &Filters) -> Vec<&'a Flight> {
    flights.iter().filter(|f| filters.matches(f)).collect()
}

/// Airline codes for the filter checkboxes, sorted, each once.
pub fn airline_codes(flights: &[Flight]) -> Vec<String> {
    flights
        .iter()
        .map(|f| f.airline_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    OneWay(Flight),
    RoundTrip { departure: Flight, return_flight: Flight },
}

impl Selection {
    pub fn is_round_trip(&self) -> bool {
        matches!(self, Self::RoundTrip { .. })
    }

    /// The leg whose departure decides whether the trip is behind us.
    pub fn first_leg(&self) -> &Flight {
        match self {
            Self::OneWay(f) => f,
            Self::RoundTrip { departure, .. } => departure,
        }
    }
}

/// What the results view hands to the booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingState {
    pub selection: Selection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<SearchParams>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    SelectingDeparture,
    SelectingReturn { departure: Flight },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Departure remembered; the return list is up next.
    ReturnStaged,
    Proceed(BookingState),
}

#[derive(Debug, PartialEq)]
pub enum ResultsScreen<'a> {
    /// Opened without a prior search.
    NothingSearched,
    /// The search itself came back empty.
    NoFlights,
    /// Flights exist but the filters exclude all of them.
    NoMatches,
    Flights(Vec<&'a Flight>),
}

pub struct ResultsView {
    state: Option<ResultsState>,
    pub filters: Filters,
    pub sort: SortMode,
    selection: SelectionState,
}

impl ResultsView {
    pub fn new(state: Option<ResultsState>) -> Self {
        Self {
            state,
            filters: Filters::default(),
            sort: SortMode::default(),
            selection: SelectionState::SelectingDeparture,
        }
    }

    pub fn params(&self) -> Option<&SearchParams> {
        self.state.as_ref().map(|s| &s.params)
    }

    pub fn is_round_trip(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.return_flights.is_some())
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn outbound_flights(&self) -> &[Flight] {
        self.state.as_ref().map(|s| s.flights.as_slice()).unwrap_or(&[])
    }

    pub fn return_flights(&self) -> &[Flight] {
        self.state
            .as_ref()
            .and_then(|s| s.return_flights.as_deref())
            .unwrap_or(&[])
    }

    /// The list currently being chosen from.
    pub fn current_flights(&self) -> &[Flight] {
        match self.selection {
            SelectionState::SelectingDeparture => self.outbound_flights(),
            SelectionState::SelectingReturn { .. } => self.return_flights(),
        }
    }

    pub fn airlines(&self) -> Vec<String> {
        airline_codes(self.current_flights())
    }

    pub fn visible(&self) -> Vec<&Flight> {
        let mut flights = filter_flights(self.current_flights(), &self.filters);
        sort_flights(&mut flights, self.sort);
        flights
    }

    pub fn screen(&self) -> ResultsScreen<'_> {
        if self.state.is_none() {
            return ResultsScreen::NothingSearched;
        }
        if self.current_flights().is_empty() {
            return ResultsScreen::NoFlights;
        }
        let visible = self.visible();
        if visible.is_empty() {
            ResultsScreen::NoMatches
        } else {
            ResultsScreen::Flights(visible)
        }
    }

    /// Picks the flight at `index` of [`visible`](Self::visible).
    pub fn select(&mut self, index: usize) -> Result<SelectOutcome, FlightError> {
        let flight = self
            .visible()
            .get(index)
            .map(|f| (*f).clone())
            .ok_or_else(|| {
                FlightError::Validation(format!("no flight at position {}", index + 1))
            })?;
        let params = self.params().cloned();

        match std::mem::replace(&mut self.selection, SelectionState::SelectingDeparture) {
            SelectionState::SelectingDeparture if self.is_round_trip() => {
                info!(flight = %flight.flight_number, "departure selected");
                self.selection = SelectionState::SelectingReturn { departure: flight };
                Ok(SelectOutcome::ReturnStaged)
            }
            SelectionState::SelectingDeparture => Ok(SelectOutcome::Proceed(BookingState {
                selection: Selection::OneWay(flight),
                params,
            })),
            SelectionState::SelectingReturn { departure } => {
                info!(flight = %flight.flight_number, "return selected");
                Ok(SelectOutcome::Proceed(BookingState {
                    selection: Selection::RoundTrip {
                        departure,
                        return_flight: flight,
                    },
                    params,
                }))
            }
        }
    }

    pub fn change_departure(&mut self) {
        self.selection = SelectionState::SelectingDeparture;
    }

    /// The searched departure date with its neighbours.
    pub fn date_tabs(&self) -> Vec<NaiveDate> {
        let Some(params) = self.params() else {
            return Vec::new();
        };
        (-DATE_TAB_SPAN..=DATE_TAB_SPAN)
            .filter_map(|offset| {
                params
                    .departure_date
                    .checked_add_signed(chrono::Duration::days(offset))
            })
            .collect()
    }

    /// Re-fetches one day's outbound flights. The return list stays as it
    /// was and selection starts over.
    pub async fn switch_date<A>(&mut self, api: &A, date: NaiveDate) -> Result<(), FlightError>
    where
        A: FlightApi + ?Sized,
    {
        let Some(state) = self.state.as_mut() else {
            return Err(FlightError::Validation(
                "no search to change the date of".into(),
            ));
        };

        let mut params = state.params.clone();
        params.departure_date = date;
        let flights = api.search(&params.outbound()).await?;
        info!(%date, count = flights.len(), "switched departure date");

        state.flights = flights;
        state.params = params;
        self.selection = SelectionState::SelectingDeparture;
        Ok(())
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{self, FlightError};
use crate::model::Trip;

/// The single key all trips live under.
pub const TRIPS_KEY: &str = "myTrips";

/// String key/value storage in the shape of browser local storage.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, FlightError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), FlightError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, FlightError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error::from_io_error(e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), FlightError> {
        fs::create_dir_all(&self.dir).map_err(error::from_io_error)?;
        let path = self.path(key);
        debug!(path = %path.display(), bytes = value.len(), "writing storage item");
        fs::write(path, value).map_err(error::from_io_error)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, FlightError> {
        let items = self
            .items
            .lock()
            .map_err(|_| FlightError::Storage("memory storage lock poisoned".into()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), FlightError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| FlightError::Storage("memory storage lock poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The stored trip list. Every change rewrites the whole list.
#[derive(Debug)]
pub struct TripRepository<B> {
    backend: B,
}

impl<B: StorageBackend> TripRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn all(&self) -> Result<Vec<Trip>, FlightError> {
        match self.backend.get_item(TRIPS_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| FlightError::Storage(format!("stored trips are unreadable: {e}"))),
        }
    }

    pub fn save(&self, trips: &[Trip]) -> Result<(), FlightError> {
        let raw = serde_json::to_string(trips).map_err(|e| FlightError::Storage(e.to_string()))?;
        self.backend.set_item(TRIPS_KEY, &raw)
    }

    pub fn append(&self, trip: Trip) -> Result<(), FlightError> {
        let mut trips = self.all()?;
        trips.push(trip);
        self.save(&trips)
    }

    /// `false` (and no write) when no trip has that id.
    pub fn delete(&self, booking_id: &str) -> Result<bool, FlightError> {
        let mut trips = self.all()?;
        let before = trips.len();
        trips.retain(|t| t.booking_id != booking_id);
        if trips.len() == before {
            return Ok(false);
        }
        self.save(&trips)?;
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Upcoming,
    Completed,
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => f.write_str("upcoming"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// A trip is completed once its departure is behind `now`.
pub fn status(trip: &Trip, now: NaiveDateTime) -> TripStatus {
    if trip.departure_time < now {
        TripStatus::Completed
    } else {
        TripStatus::Upcoming
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripFilter {
    #[default]
    All,
    Upcoming,
    Completed,
}

impl TripFilter {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        match s {
            "all" => Ok(Self::All),
            "upcoming" => Ok(Self::Upcoming),
            "completed" => Ok(Self::Completed),
            _ => Err(FlightError::Validation(format!("invalid trip filter: {s}"))),
        }
    }

    pub fn accepts(&self, status: TripStatus) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => status == TripStatus::Upcoming,
            Self::Completed => status == TripStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    NotFound,
}

#[derive(Debug, PartialEq)]
pub enum TripsScreen<'a> {
    Empty(TripFilter),
    Trips(Vec<&'a Trip>),
}

/// The trip list as read once when the view opened.
pub struct TripsView<B> {
    repository: TripRepository<B>,
    trips: Vec<Trip>,
    pub filter: TripFilter,
}

impl<B: StorageBackend> TripsView<B> {
    pub fn load(repository: TripRepository<B>) -> Result<Self, FlightError> {
        let trips = repository.all()?;
        debug!(count = trips.len(), "loaded trips");
        Ok(Self {
            repository,
            trips,
            filter: TripFilter::All,
        })
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn visible(&self, now: NaiveDateTime) -> Vec<&Trip> {
        self.trips
            .iter()
            .filter(|t| self.filter.accepts(status(t, now)))
            .collect()
    }

    pub fn screen(&self, now: NaiveDateTime) -> TripsScreen<'_> {
        let visible = self.visible(now);
        if visible.is_empty() {
            TripsScreen::Empty(self.filter)
        } else {
            TripsScreen::Trips(visible)
        }
    }

    /// Asks `confirm` first; on yes, drops the trip and rewrites storage
    /// from this view's list.
    pub fn delete<F>(&mut self, booking_id: &str, confirm: F) -> Result<DeleteOutcome, FlightError>
    where
        F: FnOnce(&Trip) -> bool,
    {
        let Some(trip) = self.trips.iter().find(|t| t.booking_id == booking_id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !confirm(trip) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let remaining: Vec<Trip> = self
            .trips
            .iter()
            .filter(|t| t.booking_id != booking_id)
            .cloned()
            .collect();
        self.repository.save(&remaining)?;
        self.trips = remaining;
        info!(booking_id, "trip deleted");
        Ok(DeleteOutcome::Deleted)
    }
}

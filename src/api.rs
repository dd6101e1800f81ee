use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use wreq::Client;

use crate::config::ApiConfig;
use crate::error::{self, FlightError};
use crate::model::{Airport, BookingReceipt, BookingRecord, BookingRequest, Destination, Flight};
use crate::query::LegQuery;

/// Everything the views need from the backend.
#[async_trait]
pub trait FlightApi: Send + Sync {
    async fn search(&self, query: &LegQuery) -> Result<Vec<Flight>, FlightError>;

    async fn airports(&self, keyword: &str) -> Result<Vec<Airport>, FlightError>;

    async fn popular_destinations(&self) -> Result<Vec<Destination>, FlightError>;

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingReceipt, FlightError>;

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, FlightError>;
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    flights: Vec<Flight>,
}

#[derive(Debug, Deserialize)]
struct AirportEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    airports: Vec<Airport>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestinationEnvelope {
    #[serde(default)]
    destinations: Vec<Destination>,
}

#[derive(Debug, Deserialize)]
struct BookingEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(flatten)]
    receipt: BookingReceipt,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookingListEnvelope {
    #[serde(default)]
    bookings: Vec<BookingRecord>,
}

/// `{error, details}` as the backend attaches them to failures.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl ErrorBody {
    /// `details` is the more specific of the two.
    fn message(self) -> Option<String> {
        self.details
            .filter(|d| !d.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self, FlightError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout));

        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, FlightError> {
        let url = self.url(path);
        debug!(%url, ?params, "GET");

        let response = self
            .client
            .get(url.as_str())
            .query(params)
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(error::from_http_error)?;
        decode(status, &body)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &impl serde::Serialize,
    ) -> Result<T, FlightError> {
        let url = self.url(path);
        let json = serde_json::to_string(payload).map_err(|e| FlightError::Decode(e.to_string()))?;
        debug!(%url, "POST");

        let response = self
            .client
            .post(url.as_str())
            .header("content-type", "application/json")
            .body(json)
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(error::from_http_error)?;
        decode(status, &body)
    }
}

/// Maps a raw response onto `T`, or onto the server's own error text.
fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, FlightError> {
    if status >= 400 {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::message);
        warn!(status, message = message.as_deref().unwrap_or(""), "API error");
        return Err(match message {
            Some(_) => FlightError::Api { status, message },
            None => FlightError::HttpStatus(status),
        });
    }

    serde_json::from_str(body).map_err(|e| FlightError::Decode(e.to_string()))
}

/// A 2xx answer with `success: false` still counts as no flights.
fn search_result(envelope: SearchEnvelope) -> Result<Vec<Flight>, FlightError> {
    if !envelope.success {
        return Err(FlightError::NoResults);
    }
    Ok(envelope.flights)
}

fn airport_result(envelope: AirportEnvelope) -> Result<Vec<Airport>, FlightError> {
    if !envelope.success {
        return Err(FlightError::Api {
            status: 200,
            message: envelope.error,
        });
    }
    Ok(envelope.airports)
}

/// Only an explicit `success: true` is an accepted booking.
fn booking_result(envelope: BookingEnvelope) -> Result<BookingReceipt, FlightError> {
    if !envelope.success {
        let message = ErrorBody {
            error: envelope.error,
            details: envelope.details,
        }
        .message();
        warn!(message = message.as_deref().unwrap_or(""), "booking rejected");
        return Err(FlightError::Api {
            status: 200,
            message,
        });
    }
    Ok(envelope.receipt)
}

#[async_trait]
impl FlightApi for HttpApi {
    async fn search(&self, query: &LegQuery) -> Result<Vec<Flight>, FlightError> {
        let envelope: SearchEnvelope = self.get("search/", &query.to_url_params()).await?;
        let flights = search_result(envelope)?;
        debug!(count = flights.len(), "search returned flights");
        Ok(flights)
    }

    async fn airports(&self, keyword: &str) -> Result<Vec<Airport>, FlightError> {
        let params = [("keyword".to_string(), keyword.to_string())];
        let envelope: AirportEnvelope = self.get("airports/", &params).await?;
        airport_result(envelope)
    }

    async fn popular_destinations(&self) -> Result<Vec<Destination>, FlightError> {
        let envelope: DestinationEnvelope = self.get("popular-destinations/", &[]).await?;
        Ok(envelope.destinations)
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingReceipt, FlightError> {
        let envelope: BookingEnvelope = self.post("bookings/", request).await?;
        booking_result(envelope)
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, FlightError> {
        let envelope: BookingListEnvelope = self.get("bookings/list/", &[]).await?;
        Ok(envelope.bookings)
    }
}

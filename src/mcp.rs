use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;

use crate::api::HttpApi;
use crate::config::AppConfig;
use crate::error::FlightError;
use crate::model::Flight;
use crate::query::{Passengers, TripType};
use crate::results::{self, Filters, SortMode};
use crate::search::{self, AirportField, SearchForm};
use crate::trips::{self, FileStorage, TripFilter, TripRepository, TripsView};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    #[schemars(description = "Departure airport IATA code, exactly 3 letters. Example: CGK")]
    origin: String,
    #[schemars(description = "Arrival airport IATA code, exactly 3 letters. Example: DPS")]
    destination: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format. Example: 2025-12-20")]
    date: String,
    #[schemars(description = "Return date in YYYY-MM-DD. Makes the search a round trip")]
    return_date: Option<String>,
    #[schemars(description = "Adult passengers. Default: 1")]
    adults: Option<u32>,
    #[schemars(description = "One of: best, cheapest, fastest. Default: best")]
    sort: Option<String>,
    #[schemars(description = "Stop buckets to keep, comma-separated: direct, 1, 2+. Omit for any")]
    stops: Option<String>,
    #[schemars(description = "Airline codes to keep, comma-separated. Example: GA,QZ")]
    airlines: Option<String>,
    #[schemars(description = "Keep only the first N flights of each leg after sorting")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct TripsArgs {
    #[schemars(description = "One of: all, upcoming, completed. Default: all")]
    filter: Option<String>,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

fn to_json(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => tool_error(e.to_string()),
    }
}

fn parse_filters(args: &SearchArgs) -> Result<Filters, FlightError> {
    Ok(Filters {
        stops: args
            .stops
            .as_deref()
            .map(results::parse_stop_list)
            .transpose()?
            .unwrap_or_default(),
        airlines: args
            .airlines
            .as_deref()
            .map(results::parse_airline_list)
            .unwrap_or_default(),
        ..Filters::default()
    })
}

fn build_form(args: &SearchArgs) -> SearchForm {
    let mut form = SearchForm {
        origin: AirportField::typed(args.origin.clone()),
        destination: AirportField::typed(args.destination.clone()),
        departure_date: args.date.clone(),
        return_date: args.return_date.clone().unwrap_or_default(),
        passengers: Passengers::adults(args.adults.unwrap_or(1)),
        ..SearchForm::default()
    };
    if args.return_date.is_none() {
        form.set_trip_type(TripType::OneWay);
    }
    form
}

#[derive(Debug, Clone)]
struct FlyHighMcp {
    config: AppConfig,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FlyHighMcp {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search flights on the FlyHigh backend and return them as JSON. One-way unless return_date is given; round trips return both the outbound and the return list. Prices are decimal strings in the currency the backend quotes (usually IDR)."
    )]
    async fn flyhigh_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let sort = match args.sort.as_deref().map(SortMode::from_str_loose).transpose() {
            Ok(s) => s.unwrap_or_default(),
            Err(e) => return tool_error(e.to_string()),
        };
        let filters = match parse_filters(&args) {
            Ok(f) => f,
            Err(e) => return tool_error(e.to_string()),
        };
        let api = match HttpApi::new(&self.config.api) {
            Ok(api) => api,
            Err(e) => return tool_error(e.to_string()),
        };

        let state = match search::submit(&api, &build_form(&args)).await {
            Ok(state) => state,
            Err(e) => return tool_error(e.to_string()),
        };

        let top = args.top.unwrap_or(usize::MAX);
        let pick = |flights: &[Flight]| {
            let mut kept = results::filter_flights(flights, &filters);
            results::sort_flights(&mut kept, sort);
            kept.into_iter().take(top).cloned().collect::<Vec<_>>()
        };

        let outbound = pick(&state.flights);
        let inbound = state.return_flights.as_deref().map(pick);
        to_json(&serde_json::json!({
            "params": state.params,
            "flights": outbound,
            "return_flights": inbound,
        }))
    }

    #[tool(
        description = "List trips booked from this machine, with an upcoming/completed status derived from the departure time."
    )]
    async fn flyhigh_trips(
        &self,
        Parameters(args): Parameters<TripsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let filter = match args.filter.as_deref().map(TripFilter::from_str_loose).transpose() {
            Ok(f) => f.unwrap_or_default(),
            Err(e) => return tool_error(e.to_string()),
        };

        let repository = TripRepository::new(FileStorage::new(&self.config.storage.dir));
        let mut view = match TripsView::load(repository) {
            Ok(v) => v,
            Err(e) => return tool_error(e.to_string()),
        };
        view.filter = filter;

        let now = chrono::Local::now().naive_local();
        let listed: Vec<serde_json::Value> = view
            .visible(now)
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "status": trips::status(t, now),
                    "trip": t,
                })
            })
            .collect();
        to_json(&listed)
    }
}

#[tool_handler]
impl ServerHandler for FlyHighMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "flyhigh".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Flight search and trip history. Use flyhigh_search to look up flights and flyhigh_trips to see what has been booked. Booking is done by the user through the flyhigh CLI.".into(),
            ),
        }
    }
}

pub async fn run(config: AppConfig) -> Result<(), FlightError> {
    let service = FlyHighMcp::new(config)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| FlightError::ConnectionFailed(format!("failed to start MCP server: {e}")))?;
    service
        .waiting()
        .await
        .map_err(|e| FlightError::ConnectionFailed(format!("MCP server error: {e}")))?;
    Ok(())
}

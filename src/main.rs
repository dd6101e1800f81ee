use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flyhigh::api::{FlightApi, HttpApi};
use flyhigh::booking::{BookingForm, BookingOutcome, Confirmation, PAYMENT_NOTICE};
use flyhigh::config::AppConfig;
use flyhigh::error::FlightError;
use flyhigh::model::{Flight, Passenger, Trip};
use flyhigh::query::{CabinClass, Passengers, TripType};
use flyhigh::results::{
    self, Filters, HourRange, ResultsScreen, ResultsView, SelectOutcome, SortMode,
};
use flyhigh::search::{self, AirportField, ResultsState, SearchForm};
use flyhigh::table;
use flyhigh::trips::{DeleteOutcome, FileStorage, TripFilter, TripRepository, TripsScreen, TripsView};

#[derive(Parser)]
#[command(
    name = "flyhigh",
    about = "Search and book FlyHigh flights from the terminal",
    version,
    after_help = "\
Examples:
  flyhigh search -f CGK -t DPS -d 2025-12-20
  flyhigh search -f CGK -t DPS -d 2025-12-20 --return-date 2025-12-27
  flyhigh search -f CGK -t SIN -d 2025-12-20 --sort cheapest --stops direct
  flyhigh book -f CGK -t DPS -d 2025-12-20 --pick 1 --passenger \"Budi Santoso,A1234567\"
  flyhigh airports jak
  flyhigh trips --filter upcoming

Configuration is read from ./flyhigh.toml (or --config) and FLYHIGH_* variables,
e.g. FLYHIGH_API__BASE_URL=http://localhost:8000/api"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file (default: ./flyhigh.toml when present)"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search for flights",
        long_about = "Search flights between two airports.\n\
            With --return-date the search becomes a round trip: both legs are fetched \
            at once and listed one after the other.",
        after_help = "\
Examples:
  One-way:      flyhigh search -f CGK -t DPS -d 2025-12-20
  Round-trip:   flyhigh search -f CGK -t DPS -d 2025-12-20 --return-date 2025-12-27
  Cheapest:     flyhigh search -f CGK -t DPS -d 2025-12-20 --sort cheapest --top 5
  Morning only: flyhigh search -f CGK -t DPS -d 2025-12-20 --depart-hours 6-12
  JSON output:  flyhigh search -f CGK -t DPS -d 2025-12-20 --json --pretty"
    )]
    Search(SearchArgs),

    #[command(
        about = "Search, pick flights and book them for every passenger",
        long_about = "Runs a search, picks the flight at --pick (and --return-pick for \
            round trips) from the sorted, filtered list, then books one seat per \
            passenger on every leg. A confirmed booking is saved to the local trip list.",
        after_help = "\
Examples:
  flyhigh book -f CGK -t DPS -d 2025-12-20 --pick 1 --passenger \"Budi Santoso,A1234567\"
  flyhigh book -f CGK -t DPS -d 2025-12-20 --return-date 2025-12-27 --adults 2 \\
      --pick 2 --return-pick 1 \\
      --passenger \"Budi Santoso,A1234567\" --passenger \"Sari Dewi,B7654321\""
    )]
    Book(BookArgs),

    #[command(about = "Look up airports by code, city or name")]
    Airports(AirportsArgs),

    #[command(about = "List popular destinations")]
    Destinations(OutputArgs),

    #[command(about = "Show and manage booked trips")]
    Trips(TripsArgs),

    #[command(about = "List bookings recorded on the server")]
    Bookings(OutputArgs),

    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(
        short, long,
        value_name = "IATA",
        help = "Departure airport code",
        long_help = "Departure airport IATA code (3 letters, e.g. CGK, DPS, SIN)."
    )]
    from: Option<String>,

    #[arg(
        short, long,
        value_name = "IATA",
        help = "Arrival airport code",
        long_help = "Arrival airport IATA code (3 letters, e.g. CGK, DPS, SIN)."
    )]
    to: Option<String>,

    #[arg(
        short, long,
        value_name = "YYYY-MM-DD",
        help = "Departure date"
    )]
    date: Option<String>,

    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        help = "Return date (makes it a round trip)"
    )]
    return_date: Option<String>,

    #[arg(
        long,
        value_name = "TYPE",
        help = "Trip type [one-way, round-trip] (default: round-trip when --return-date is set)"
    )]
    trip: Option<String>,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of adult passengers")]
    adults: u32,

    #[arg(long, default_value = "0", value_name = "N", help = "Number of child passengers")]
    children: u32,

    #[arg(long, default_value = "0", value_name = "N", help = "Number of infants")]
    infants: u32,

    #[arg(
        long,
        default_value = "economy",
        value_name = "CLASS",
        help = "Cabin class [economy, premium-economy, business, first]"
    )]
    cabin: String,

    #[arg(
        long,
        default_value = "best",
        value_name = "MODE",
        help = "Sort order [best, cheapest, fastest]",
        long_help = "Sort order. best weighs price and duration together, cheapest sorts by \
            price, fastest by total duration."
    )]
    sort: String,

    #[arg(
        long,
        value_name = "direct,1,2+",
        help = "Keep only these stop counts (comma-separated)"
    )]
    stops: Option<String>,

    #[arg(
        long,
        value_name = "GA,QZ,...",
        help = "Keep only these airlines (comma-separated codes)"
    )]
    airlines: Option<String>,

    #[arg(long, value_name = "START-END", help = "Departure hour window, e.g. 6-12")]
    depart_hours: Option<String>,

    #[arg(long, value_name = "START-END", help = "Arrival hour window, e.g. 12-18")]
    arrive_hours: Option<String>,

    #[arg(long, value_name = "N", help = "Show only the first N flights of each leg")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-flight output (for scripts and AI agents)")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(long, value_name = "SECS", help = "Request timeout (overrides api.timeout)")]
    timeout: Option<u64>,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy (overrides api.proxy)")]
    proxy: Option<String>,
}

#[derive(clap::Args)]
struct BookArgs {
    #[command(flatten)]
    search: SearchArgs,

    #[arg(long, value_name = "N", help = "Position of the departure flight in the list (1-based)")]
    pick: usize,

    #[arg(long, value_name = "N", help = "Position of the return flight (round trips)")]
    return_pick: Option<usize>,

    #[arg(
        long,
        value_name = "\"NAME,PASSPORT\"",
        help = "Passenger name and passport number (repeat once per seat)",
        num_args = 1
    )]
    passenger: Vec<String>,

    #[arg(long, help = "Don't pause on the confirmation before listing trips")]
    no_wait: bool,
}

#[derive(clap::Args)]
struct AirportsArgs {
    #[arg(value_name = "KEYWORD", help = "At least 2 characters of a code, city or name")]
    keyword: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
struct OutputArgs {
    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,
}

impl OutputArgs {
    fn is_json(&self) -> bool {
        self.json || self.pretty
    }
}

#[derive(clap::Args)]
struct TripsArgs {
    #[arg(
        long,
        default_value = "all",
        value_name = "FILTER",
        help = "Which trips to show [all, upcoming, completed]"
    )]
    filter: String,

    #[arg(long, value_name = "BOOKING_ID", help = "Remove a trip from the list")]
    delete: Option<String>,

    #[arg(long, short, help = "Don't ask before deleting")]
    yes: bool,

    #[command(flatten)]
    output: OutputArgs,
}

fn is_json(args: &SearchArgs) -> bool {
    args.json || args.pretty
}

fn error_code(err: &FlightError) -> i32 {
    match err {
        FlightError::InvalidAirport(_)
        | FlightError::InvalidDate(_)
        | FlightError::Form(_)
        | FlightError::Validation(_) => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_) => 3,
        FlightError::Api { .. } | FlightError::HttpStatus(_) | FlightError::SearchFailed => 5,
        FlightError::Decode(_) => 6,
        FlightError::Storage(_) | FlightError::Config(_) => 7,
        FlightError::NoResults => 0,
    }
}

fn error_kind(err: &FlightError) -> &'static str {
    match err {
        FlightError::InvalidAirport(_) => "invalid_airport",
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Form(_) => "missing_field",
        FlightError::Validation(_) => "validation_error",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::Api { .. } => "api_error",
        FlightError::HttpStatus(_) => "http_error",
        FlightError::SearchFailed => "search_failed",
        FlightError::Decode(_) => "decode_error",
        FlightError::NoResults => "no_results",
        FlightError::Storage(_) => "storage_error",
        FlightError::Config(_) => "config_error",
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": error_kind(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn print_json(value: &impl serde::Serialize, pretty: bool) {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match output {
        Ok(s) => println!("{s}"),
        Err(e) => die(&FlightError::Decode(e.to_string()), true),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flyhigh=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>, json_mode: bool) -> AppConfig {
    match AppConfig::load(path.map(PathBuf::as_path)) {
        Ok(cfg) => cfg,
        Err(e) => die(&e, json_mode),
    }
}

fn build_form(args: &SearchArgs) -> Result<SearchForm, FlightError> {
    let trip = match args.trip.as_deref() {
        Some(t) => TripType::from_str_loose(t)?,
        None if args.return_date.is_some() => TripType::RoundTrip,
        None => TripType::OneWay,
    };

    let mut form = SearchForm {
        origin: AirportField::typed(args.from.clone().unwrap_or_default()),
        destination: AirportField::typed(args.to.clone().unwrap_or_default()),
        departure_date: args.date.clone().unwrap_or_default(),
        return_date: args.return_date.clone().unwrap_or_default(),
        passengers: Passengers {
            adults: args.adults,
            children: args.children,
            infants: args.infants,
        },
        cabin: CabinClass::from_str_loose(&args.cabin)?,
        ..SearchForm::default()
    };
    form.set_trip_type(trip);
    Ok(form)
}

fn build_filters(args: &SearchArgs) -> Result<Filters, FlightError> {
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
        departure_hours: args
            .depart_hours
            .as_deref()
            .map(HourRange::parse)
            .transpose()?
            .unwrap_or_default(),
        arrival_hours: args
            .arrive_hours
            .as_deref()
            .map(HourRange::parse)
            .transpose()?
            .unwrap_or_default(),
    })
}

fn build_api(config: &mut AppConfig, args: &SearchArgs) -> Result<HttpApi, FlightError> {
    if let Some(t) = args.timeout {
        config.api.timeout = t;
    }
    if args.proxy.is_some() {
        config.api.proxy = args.proxy.clone();
    }
    HttpApi::new(&config.api)
}

/// Runs the search and sets up a results view with the requested
/// filters and sort order.
async fn prepare_results(
    api: &HttpApi,
    args: &SearchArgs,
) -> Result<ResultsView, FlightError> {
    let form = build_form(args)?;
    let filters = build_filters(args)?;
    let sort = SortMode::from_str_loose(&args.sort)?;

    let state: ResultsState = search::submit(api, &form).await?;
    let mut view = ResultsView::new(Some(state));
    view.filters = filters;
    view.sort = sort;
    Ok(view)
}

fn print_flights(title: Option<&str>, flights: &[&Flight], compact: bool) {
    if let Some(title) = title {
        println!("=== {title} ===");
    }
    if compact {
        for (i, flight) in flights.iter().enumerate() {
            println!("{}", table::compact_line(i + 1, flight));
        }
    } else {
        println!("{}", table::render_flights(flights));
    }
}

fn print_screen(title: Option<&str>, screen: ResultsScreen<'_>, top: Option<usize>, compact: bool) {
    match screen {
        ResultsScreen::NothingSearched => println!("No search yet."),
        ResultsScreen::NoFlights => {
            if let Some(title) = title {
                println!("=== {title} ===");
            }
            println!("No flights found.");
        }
        ResultsScreen::NoMatches => {
            if let Some(title) = title {
                println!("=== {title} ===");
            }
            println!("No flights match the selected filters.");
        }
        ResultsScreen::Flights(mut flights) => {
            if let Some(n) = top {
                flights.truncate(n);
            }
            print_flights(title, &flights, compact);
        }
    }
}

fn take_top<'a>(mut flights: Vec<&'a Flight>, top: Option<usize>) -> Vec<&'a Flight> {
    if let Some(n) = top {
        flights.truncate(n);
    }
    flights
}

async fn run_search(mut config: AppConfig, args: SearchArgs) {
    let json_mode = is_json(&args);
    let api = match build_api(&mut config, &args) {
        Ok(api) => api,
        Err(e) => die(&e, json_mode),
    };
    let view = match prepare_results(&api, &args).await {
        Ok(v) => v,
        Err(e) => die(&e, json_mode),
    };

    let mut return_flights = results::filter_flights(view.return_flights(), &view.filters);
    results::sort_flights(&mut return_flights, view.sort);

    if json_mode {
        let json = serde_json::json!({
            "params": view.params(),
            "flights": take_top(view.visible(), args.top),
            "return_flights": view
                .is_round_trip()
                .then(|| take_top(return_flights, args.top)),
        });
        print_json(&json, args.pretty);
        return;
    }

    if !view.is_round_trip() {
        print_screen(None, view.screen(), args.top, args.compact);
        return;
    }

    print_screen(Some("Departure flights"), view.screen(), args.top, args.compact);
    println!();
    let return_screen = if view.return_flights().is_empty() {
        ResultsScreen::NoFlights
    } else if return_flights.is_empty() {
        ResultsScreen::NoMatches
    } else {
        ResultsScreen::Flights(return_flights)
    };
    print_screen(Some("Return flights"), return_screen, args.top, args.compact);
}

fn parse_passenger(raw: &str) -> Result<Passenger, FlightError> {
    let (name, passport) = raw.rsplit_once(',').ok_or_else(|| {
        FlightError::Validation(format!(
            "--passenger must be \"NAME,PASSPORT\", got: \"{raw}\""
        ))
    })?;
    Ok(Passenger::new(name.trim(), passport.trim()))
}

fn print_confirmation(confirmation: &Confirmation) {
    let trip = &confirmation.trip;
    println!("Booking confirmed: {}", trip.booking_id);
    println!(
        "  {} → {}  {}",
        trip.departure_airport,
        trip.arrival_airport,
        table::format_time(&trip.departure_time)
    );
    if let Some(ret) = &trip.return_flight {
        println!(
            "  {} → {}  {}",
            ret.departure_airport,
            ret.arrival_airport,
            table::format_time(&ret.departure_time)
        );
    }
    println!("  Passengers: {}", confirmation.passengers);
    println!(
        "  Total: {}",
        table::format_price(confirmation.total_price, &confirmation.currency)
    );
    println!("{PAYMENT_NOTICE}");
}

fn open_trips(config: &AppConfig) -> Result<TripsView<FileStorage>, FlightError> {
    TripsView::load(TripRepository::new(FileStorage::new(&config.storage.dir)))
}

fn print_trips(view: &TripsView<FileStorage>) {
    let now = Local::now().naive_local();
    match view.screen(now) {
        TripsScreen::Empty(TripFilter::All) => {
            println!("No trips yet. Book a flight with `flyhigh book`.")
        }
        TripsScreen::Empty(TripFilter::Upcoming) => println!("No upcoming trips."),
        TripsScreen::Empty(TripFilter::Completed) => println!("No completed trips."),
        TripsScreen::Trips(trips) => println!("{}", table::render_trips(&trips, now)),
    }
}

async fn run_book(mut config: AppConfig, args: BookArgs) {
    let json_mode = is_json(&args.search);
    let api = match build_api(&mut config, &args.search) {
        Ok(api) => api,
        Err(e) => die(&e, json_mode),
    };
    let mut view = match prepare_results(&api, &args.search).await {
        Ok(v) => v,
        Err(e) => die(&e, json_mode),
    };

    let position = |n: usize| {
        n.checked_sub(1).ok_or_else(|| {
            FlightError::Validation("flight positions start at 1".into())
        })
    };

    let state = match position(args.pick).and_then(|i| view.select(i)) {
        Ok(SelectOutcome::Proceed(state)) => state,
        Ok(SelectOutcome::ReturnStaged) => {
            let Some(return_pick) = args.return_pick else {
                die(
                    &FlightError::Validation("--return-pick is required for round trips".into()),
                    json_mode,
                );
            };
            match position(return_pick).and_then(|i| view.select(i)) {
                Ok(SelectOutcome::Proceed(state)) => state,
                Ok(SelectOutcome::ReturnStaged) => die(
                    &FlightError::Validation("return flight was not selected".into()),
                    json_mode,
                ),
                Err(e) => die(&e, json_mode),
            }
        }
        Err(e) => die(&e, json_mode),
    };

    let mut form = BookingForm::new(Some(state)).with_redirect_after(config.booking.redirect_after());
    if !args.passenger.is_empty() {
        let passengers = match args
            .passenger
            .iter()
            .map(|p| parse_passenger(p))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(p) => p,
            Err(e) => die(&e, json_mode),
        };
        if let Err(e) = form.fill(passengers) {
            die(&e, json_mode);
        }
    }

    let repository = TripRepository::new(FileStorage::new(&config.storage.dir));
    let outcome = match form.submit(Arc::new(api), &repository, Utc::now()).await {
        Ok(outcome) => outcome,
        Err(e) => die(&e, json_mode),
    };

    match outcome {
        BookingOutcome::Confirmed(confirmation) => {
            if json_mode {
                print_json(&confirmation.trip, args.search.pretty);
                return;
            }
            print_confirmation(&confirmation);
            if !args.no_wait {
                println!(
                    "Showing your trips in {}s...",
                    confirmation.redirect_after.as_secs()
                );
                tokio::time::sleep(confirmation.redirect_after).await;
            }
            println!();
            match open_trips(&config) {
                Ok(view) => print_trips(&view),
                Err(e) => die(&e, json_mode),
            }
        }
        other => {
            if let BookingOutcome::PartiallyFailed { succeeded, .. } = &other {
                for leg in succeeded {
                    eprintln!(
                        "note: {} booking for {} was accepted (id {})",
                        leg.role,
                        leg.passenger_name,
                        leg.receipt
                            .booking_id
                            .map(|id| id.to_string())
                            .unwrap_or_else(|| "unknown".to_string())
                    );
                }
            }
            let message = other
                .error_message()
                .unwrap_or(flyhigh::booking::BOOKING_FAILED_MESSAGE)
                .to_string();
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({"error": {"kind": "booking_failed", "message": message}})
                );
            } else {
                eprintln!("error: {message}");
            }
            process::exit(4);
        }
    }
}

async fn run_airports(config: AppConfig, args: AirportsArgs) {
    let json_mode = args.output.is_json();
    if args.keyword.trim().chars().count() < search::MIN_KEYWORD_LEN {
        die(
            &FlightError::Validation(format!(
                "type at least {} characters to look up airports",
                search::MIN_KEYWORD_LEN
            )),
            json_mode,
        );
    }
    let api = match HttpApi::new(&config.api) {
        Ok(api) => api,
        Err(e) => die(&e, json_mode),
    };

    let airports = match api.airports(args.keyword.trim()).await {
        Ok(a) => a,
        Err(e) => die(&e, json_mode),
    };

    if json_mode {
        print_json(&airports, args.output.pretty);
    } else if airports.is_empty() {
        println!("No airports match \"{}\".", args.keyword.trim());
    } else {
        println!("{}", table::render_airports(&airports));
    }
}

async fn run_destinations(config: AppConfig, args: OutputArgs) {
    let json_mode = args.is_json();
    let api = match HttpApi::new(&config.api) {
        Ok(api) => api,
        Err(e) => die(&e, json_mode),
    };
    let destinations = match search::popular_destinations(&api).await {
        Ok(d) => d,
        Err(e) => die(&e, json_mode),
    };
    if json_mode {
        print_json(&destinations, args.pretty);
    } else if destinations.is_empty() {
        println!("No destinations available.");
    } else {
        println!("{}", table::render_destinations(&destinations));
    }
}

async fn run_bookings(config: AppConfig, args: OutputArgs) {
    let json_mode = args.is_json();
    let api = match HttpApi::new(&config.api) {
        Ok(api) => api,
        Err(e) => die(&e, json_mode),
    };
    let bookings = match api.list_bookings().await {
        Ok(b) => b,
        Err(e) => die(&e, json_mode),
    };
    if json_mode {
        print_json(&bookings, args.pretty);
    } else if bookings.is_empty() {
        println!("No bookings recorded.");
    } else {
        println!("{}", table::render_bookings(&bookings));
    }
}

fn confirm_delete(trip: &Trip) -> bool {
    print!(
        "Delete trip {} ({} → {})? [y/N] ",
        trip.booking_id, trip.departure_airport, trip.arrival_airport
    );
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn run_trips(config: AppConfig, args: TripsArgs) {
    let json_mode = args.output.is_json();
    let filter = match TripFilter::from_str_loose(&args.filter) {
        Ok(f) => f,
        Err(e) => die(&e, json_mode),
    };
    let mut view = match open_trips(&config) {
        Ok(v) => v,
        Err(e) => die(&e, json_mode),
    };
    view.filter = filter;

    if let Some(id) = args.delete.as_deref() {
        let yes = args.yes;
        let note = match view.delete(id, |trip| yes || confirm_delete(trip)) {
            Ok(DeleteOutcome::Deleted) => format!("Deleted trip {id}."),
            Ok(DeleteOutcome::Cancelled) => format!("Kept trip {id}."),
            Ok(DeleteOutcome::NotFound) => {
                format!("No trip with booking id {id}; nothing deleted.")
            }
            Err(e) => die(&e, json_mode),
        };
        // Keep stdout parseable in JSON mode.
        if json_mode {
            eprintln!("{note}");
        } else {
            println!("{note}\n");
        }
    }

    if json_mode {
        let now = Local::now().naive_local();
        let listed: Vec<serde_json::Value> = view
            .visible(now)
            .into_iter()
            .map(|t| serde_json::json!({"status": flyhigh::trips::status(t, now), "trip": t}))
            .collect();
        print_json(&listed, args.output.pretty);
    } else {
        print_trips(&view);
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Mcp => {
            let config = load_config(config_path, false);
            if let Err(e) = flyhigh::mcp::run(config).await {
                die(&e, false);
            }
        }
        Commands::Search(args) => {
            let config = load_config(config_path, is_json(&args));
            run_search(config, args).await;
        }
        Commands::Book(args) => {
            let config = load_config(config_path, is_json(&args.search));
            run_book(config, args).await;
        }
        Commands::Airports(args) => {
            let config = load_config(config_path, args.output.is_json());
            run_airports(config, args).await;
        }
        Commands::Destinations(args) => {
            let config = load_config(config_path, args.is_json());
            run_destinations(config, args).await;
        }
        Commands::Trips(args) => {
            let config = load_config(config_path, args.output.is_json());
            run_trips(config, args);
        }
        Commands::Bookings(args) => {
            let config = load_config(config_path, args.is_json());
            run_bookings(config, args).await;
        }
    }
}

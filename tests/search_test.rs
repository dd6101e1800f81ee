mod common;

use common::{airport, day, flight, FakeApi};
use flyhigh::error::{FlightError, SEARCH_FAILED_MESSAGE};
use flyhigh::model::Destination;
use flyhigh::query::{FormField, Passengers, TripType};
use flyhigh::search::{self, AirportAutocomplete, AirportField, SearchForm};

fn filled_form() -> SearchForm {
    SearchForm {
        origin: AirportField::typed("CGK"),
        destination: AirportField::typed("DPS"),
        departure_date: "2025-12-20".into(),
        return_date: "2025-12-27".into(),
        passengers: Passengers::adults(2),
        ..SearchForm::default()
    }
}

fn one_way_form() -> SearchForm {
    let mut form = filled_form();
    form.set_trip_type(TripType::OneWay);
    form
}

#[test]
fn form_defaults_to_round_trip() {
    let form = SearchForm::default();
    assert_eq!(form.trip, TripType::RoundTrip);
    assert_eq!(form.passengers.total(), 1);
}

#[test]
fn valid_form_produces_params() {
    let params = filled_form().validate().unwrap();
    assert_eq!(params.origin, "CGK");
    assert_eq!(params.destination, "DPS");
    assert_eq!(params.departure_date, day("2025-12-20"));
    assert_eq!(params.return_date, Some(day("2025-12-27")));
    assert!(params.is_round_trip());
}

#[test]
fn airport_codes_are_uppercased() {
    let mut form = one_way_form();
    form.origin = AirportField::typed(" cgk ");
    assert_eq!(form.validate().unwrap().origin, "CGK");
}

#[test]
fn missing_fields_are_reported_one_at_a_time() {
    let mut form = filled_form();
    form.origin = AirportField::default();
    form.departure_date.clear();

    let Err(FlightError::Form(err)) = form.validate() else {
        panic!("expected a form error");
    };
    assert_eq!(err.field, FormField::Origin);
    assert!(err.message.starts_with("Please fill in all required fields"));
}

#[test]
fn round_trip_requires_return_date() {
    let mut form = filled_form();
    form.return_date.clear();
    let err = form.validate().unwrap_err();
    assert_eq!(err.to_string(), "Please select a return date for round trip");
}

#[test]
fn one_way_clears_return_date() {
    let form = one_way_form();
    assert!(form.return_date.is_empty());
    let params = form.validate().unwrap();
    assert_eq!(params.return_date, None);
    assert!(params.inbound().is_none());
}

#[test]
fn rejects_same_origin_and_destination() {
    let mut form = one_way_form();
    form.destination = AirportField::typed("cgk");
    assert!(form.validate().is_err());
}

#[test]
fn rejects_return_before_departure() {
    let mut form = filled_form();
    form.return_date = "2025-12-19".into();
    assert!(matches!(form.validate(), Err(FlightError::Validation(_))));
}

#[test]
fn rejects_bad_codes_and_dates() {
    let mut form = one_way_form();
    form.origin = AirportField::typed("CG");
    assert!(matches!(form.validate(), Err(FlightError::InvalidAirport(_))));

    let mut form = one_way_form();
    form.departure_date = "20-12-2025".into();
    assert!(matches!(form.validate(), Err(FlightError::InvalidDate(_))));
}

#[test]
fn swap_exchanges_airports() {
    let mut form = filled_form();
    form.origin.label = Some("Jakarta (CGK)".into());
    form.swap_locations();
    assert_eq!(form.origin.code, "DPS");
    assert_eq!(form.destination.code, "CGK");
    assert_eq!(form.destination.display(), "Jakarta (CGK)");
}

#[tokio::test]
async fn one_way_submit_searches_once() {
    let outbound = vec![flight("GA", "402", "CGK", "DPS", "2025-12-20T06:00:00", "PT2H", 500_000, 0)];
    let api = FakeApi::new().with_route("CGK", "DPS", outbound.clone());

    let state = search::submit(&api, &one_way_form()).await.unwrap();

    assert_eq!(api.search_count(), 1);
    assert_eq!(state.flights, outbound);
    assert!(state.return_flights.is_none());
    assert_eq!(state.params.passengers.adults, 2);
}

#[tokio::test]
async fn round_trip_submit_searches_both_legs() {
    let outbound = vec![flight("GA", "402", "CGK", "DPS", "2025-12-20T06:00:00", "PT2H", 1_000_000, 0)];
    let inbound = vec![flight("GA", "403", "DPS", "CGK", "2025-12-27T10:00:00", "PT2H", 800_000, 0)];
    let api = FakeApi::new()
        .with_route("CGK", "DPS", outbound.clone())
        .with_route("DPS", "CGK", inbound.clone());

    let state = search::submit(&api, &filled_form()).await.unwrap();

    assert_eq!(state.flights, outbound);
    assert_eq!(state.return_flights, Some(inbound));

    let searches = api.searches.lock().unwrap().clone();
    assert_eq!(searches.len(), 2);
    let back = searches.iter().find(|q| q.origin == "DPS").unwrap();
    assert_eq!(back.destination, "CGK");
    assert_eq!(back.departure_date, day("2025-12-27"));
    assert_eq!(back.return_date, None);
}

#[tokio::test]
async fn round_trip_fails_when_either_leg_fails() {
    let outbound = vec![flight("GA", "402", "CGK", "DPS", "2025-12-20T06:00:00", "PT2H", 1_000_000, 0)];
    let api = FakeApi::new()
        .with_route("CGK", "DPS", outbound)
        .failing_route("DPS", "CGK");

    let err = search::submit(&api, &filled_form()).await.unwrap_err();

    assert!(matches!(err, FlightError::SearchFailed));
    assert_eq!(err.to_string(), SEARCH_FAILED_MESSAGE);
    assert_eq!(api.search_count(), 2);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_api() {
    let api = FakeApi::new();
    let mut form = filled_form();
    form.destination = AirportField::default();

    assert!(search::submit(&api, &form).await.is_err());
    assert_eq!(api.search_count(), 0);
}

#[tokio::test]
async fn one_way_transport_errors_pass_through() {
    let api = FakeApi::new().failing_route("CGK", "DPS");
    let err = search::submit(&api, &one_way_form()).await.unwrap_err();
    assert!(matches!(err, FlightError::ConnectionFailed(_)));
}

fn airports() -> Vec<flyhigh::model::Airport> {
    vec![
        airport("CGK", "Soekarno-Hatta International", "Jakarta", "Indonesia"),
        airport("HLP", "Halim Perdanakusuma", "Jakarta", "Indonesia"),
        airport("DPS", "Ngurah Rai International", "Denpasar", "Indonesia"),
    ]
}

#[tokio::test]
async fn autocomplete_needs_two_characters() {
    let api = FakeApi::new().with_airports(airports());
    let mut field = AirportAutocomplete::new();

    field.input(&api, "j").await;

    assert!(!field.is_open());
    assert!(field.suggestions().is_empty());
    assert!(api.airport_lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn autocomplete_select_fixes_code_and_label() {
    let api = FakeApi::new().with_airports(airports());
    let mut field = AirportAutocomplete::new();

    field.input(&api, "jak").await;
    assert!(field.is_open());
    assert_eq!(field.suggestions().len(), 2);

    let chosen = field.select(0).unwrap();
    assert_eq!(chosen.code, "CGK");
    assert_eq!(chosen.display(), "Jakarta (CGK)");
    assert_eq!(field.text, "Jakarta (CGK)");
    assert!(!field.is_open());
    assert!(field.select(0).is_none());
}

#[tokio::test]
async fn autocomplete_dismiss_hides_suggestions() {
    let api = FakeApi::new().with_airports(airports());
    let mut field = AirportAutocomplete::new();

    field.input(&api, "den").await;
    assert_eq!(field.suggestions().len(), 1);

    field.dismiss();
    assert!(field.suggestions().is_empty());

    field.input(&api, "zzz").await;
    assert!(!field.is_open());
}

#[tokio::test]
async fn popular_destinations_come_from_the_api() {
    let api = FakeApi::new().with_destinations(vec![Destination {
        code: "DPS".into(),
        city: "Denpasar".into(),
        country: "Indonesia".into(),
        name: Some("Bali".into()),
        image: None,
    }]);

    let destinations = search::popular_destinations(&api).await.unwrap();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0].city, "Denpasar");
}

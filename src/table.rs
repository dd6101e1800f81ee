use chrono::NaiveDateTime;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rust_decimal::Decimal;

use crate::model::{Airport, BookingRecord, Destination, Flight, Trip, TripKind};
use crate::results::parse_duration_minutes;
use crate::trips::{self, TripStatus};

/// `1234567` → `"1.234.567"`, the way Indonesian rupiah is written.
fn group_thousands(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn two_places(price: Decimal) -> String {
    let mut p = price.round_dp(2);
    p.rescale(2);
    p.to_string()
}

pub fn format_price(price: Decimal, currency: &str) -> String {
    match currency {
        "IDR" => {
            let whole = price.round_dp(0).trunc().abs().to_string();
            let sign = if price.is_sign_negative() && !price.is_zero() { "-" } else { "" };
            format!("Rp {sign}{}", group_thousands(&whole, '.'))
        }
        "USD" => format!("${}", two_places(price)),
        "EUR" => format!("€{}", two_places(price)),
        "GBP" => format!("£{}", two_places(price)),
        _ => format!("{currency} {}", two_places(price)),
    }
}

/// `PT2H30M` → `"2h 30m"`; anything unparseable is shown as sent.
pub fn format_duration(duration: &str) -> String {
    match parse_duration_minutes(duration) {
        Some(total) => format!("{}h {:02}m", total / 60, total % 60),
        None => duration.to_string(),
    }
}

pub fn format_time(at: &NaiveDateTime) -> String {
    at.format("%b %-d %H:%M").to_string()
}

fn format_stops(flight: &Flight) -> String {
    match flight.stops {
        0 => "Direct".to_string(),
        n => {
            let via: Vec<&str> = flight
                .segments
                .iter()
                .take(flight.segments.len().saturating_sub(1))
                .map(|s| s.arrival_airport.as_str())
                .collect();
            let label = if n == 1 { "stop" } else { "stops" };
            if via.is_empty() {
                format!("{n} {label}")
            } else {
                format!("{n} {label} ({})", via.join(", "))
            }
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn render_flights(flights: &[&Flight]) -> String {
    let mut table = new_table(vec![
        "#", "Airline", "Flight", "Route", "Depart", "Arrive", "Duration", "Stops", "Seats",
        "Price",
    ]);

    for (i, flight) in flights.iter().enumerate() {
        let airline = format!("{} ({})", flight.display_airline(), flight.airline_code);
        let route = format!("{} → {}", flight.departure_airport, flight.arrival_airport);
        let seats = flight
            .seats
            .map(|n| n.to_string())
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            (i + 1).to_string(),
            airline,
            format!("{}{}", flight.airline_code, flight.flight_number),
            route,
            format_time(&flight.departure_time),
            format_time(&flight.arrival_time),
            format_duration(&flight.duration),
            format_stops(flight),
            seats,
            format_price(flight.price, &flight.currency),
        ]);
    }

    table.to_string()
}

/// One line per flight, for scripts.
pub fn compact_line(position: usize, flight: &Flight) -> String {
    format!(
        "{position} | {} | {}>{} | {} | {} | {} | {}>{}",
        format_price(flight.price, &flight.currency),
        flight.departure_airport,
        flight.arrival_airport,
        format_duration(&flight.duration),
        format_stops(flight).to_lowercase(),
        flight.display_airline(),
        format_time(&flight.departure_time),
        flight.arrival_time.format("%H:%M"),
    )
}

pub fn render_trips(trips: &[&Trip], now: NaiveDateTime) -> String {
    let mut table = new_table(vec![
        "Booking", "Status", "Type", "Route", "Depart", "Return", "Airline", "Passengers",
        "Total",
    ]);

    for trip in trips {
        let status = match trips::status(trip, now) {
            TripStatus::Upcoming => "Upcoming",
            TripStatus::Completed => "Completed",
        };
        let kind = match trip.trip_type {
            TripKind::OneWay => "One way",
            TripKind::RoundTrip => "Round trip",
        };
        let route = match trip.trip_type {
            TripKind::RoundTrip => format!("{} ⇄ {}", trip.departure_airport, trip.arrival_airport),
            TripKind::OneWay => format!("{} → {}", trip.departure_airport, trip.arrival_airport),
        };
        let ret = trip
            .return_flight
            .as_ref()
            .map(|r| format_time(&r.departure_time))
            .unwrap_or_else(|| "—".to_string());
        let airline = trip.airline_name.as_deref().unwrap_or(&trip.airline_code);
        let passengers = if trip.passenger_names.is_empty() {
            trip.passengers.to_string()
        } else {
            format!("{} ({})", trip.passengers, trip.passenger_names.join(", "))
        };

        table.add_row(vec![
            trip.booking_id.clone(),
            status.to_string(),
            kind.to_string(),
            route,
            format_time(&trip.departure_time),
            ret,
            airline.to_string(),
            passengers,
            format_price(trip.total_price, &trip.currency),
        ]);
    }

    table.to_string()
}

pub fn render_airports(airports: &[Airport]) -> String {
    let mut table = new_table(vec!["#", "Code", "Name", "City", "Country"]);
    for (i, a) in airports.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            a.code.clone(),
            a.name.clone(),
            a.city.clone(),
            a.country.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_destinations(destinations: &[Destination]) -> String {
    let mut table = new_table(vec!["Code", "City", "Country"]);
    for d in destinations {
        table.add_row(vec![d.code.clone(), d.city.clone(), d.country.clone()]);
    }
    table.to_string()
}

pub fn render_bookings(bookings: &[BookingRecord]) -> String {
    let mut table = new_table(vec!["ID", "Passenger", "Airline", "Route", "Depart", "Price", "Booked"]);
    for b in bookings {
        table.add_row(vec![
            b.id.to_string(),
            b.passenger_name.clone(),
            b.airline_code.clone(),
            format!("{} → {}", b.departure_airport, b.arrival_airport),
            b.departure_time.clone(),
            format_price(b.price, &b.currency),
            b.created_at.clone().unwrap_or_default(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupiah_groups_with_dots() {
        assert_eq!(format_price(Decimal::new(1_250_000, 0), "IDR"), "Rp 1.250.000");
        assert_eq!(format_price(Decimal::new(30_000_000, 2), "IDR"), "Rp 300.000");
        assert_eq!(format_price(Decimal::new(999, 0), "IDR"), "Rp 999");
    }

    #[test]
    fn other_currencies_use_two_places() {
        assert_eq!(format_price(Decimal::new(125, 1), "USD"), "$12.50");
        assert_eq!(format_price(Decimal::new(9, 0), "SGD"), "SGD 9.00");
    }

    #[test]
    fn durations_render_as_hours_and_minutes() {
        assert_eq!(format_duration("PT2H5M"), "2h 05m");
        assert_eq!(format_duration("garbage"), "garbage");
    }
}

//! Plain-text rendering of cards, entry pages and notifications.

use std::fmt::Write;

use dashboard_core::{CityWeather, EntryPage, EntryView, Notification, Severity};

pub fn city_card(city: &CityWeather) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}, {}  [{}]", city.emoji(), city.name, city.country, city.band());
    let _ = writeln!(
        out,
        "  {}°C (feels like {}°C, min {}°C / max {}°C)",
        city.temperature, city.feels_like, city.temp_min, city.temp_max
    );
    let _ = writeln!(out, "  {}", city.description);
    let _ = writeln!(
        out,
        "  Humidity {}%  Wind {} m/s  Pressure {} hPa  Visibility {} km  Clouds {}%",
        city.humidity_pct,
        city.wind_speed,
        city.pressure_hpa,
        city.visibility_km,
        city.cloudiness_pct
    );
    let _ = writeln!(out, "  Sunrise {}  Sunset {}", city.sunrise, city.sunset);
    let _ = write!(out, "  Updated {}", city.captured_at);
    out
}

pub fn city_list(cities: &[CityWeather]) -> String {
    if cities.is_empty() {
        return "No cities match the current filters.".to_string();
    }
    cities.iter().map(city_card).collect::<Vec<_>>().join("\n\n")
}

pub fn entry_page(page: &EntryPage) -> String {
    if page.is_empty() {
        return "No entries match the current filters.".to_string();
    }

    let mut out = String::new();
    for entry in &page.entries {
        let _ = writeln!(
            out,
            "#{} {} in {}: {} [{}]",
            entry.id, entry.submitter_name, entry.city, entry.condition, entry.origin
        );
        if !entry.description.is_empty() {
            let _ = writeln!(out, "    {}", entry.description);
        }
    }

    let previous = if page.has_previous() { "< prev" } else { "      " };
    let next = if page.has_next() { "next >" } else { "" };
    let _ = write!(
        out,
        "{previous}  Page {} of {} ({} entries)  {next}",
        page.current_page, page.total_pages, page.filtered_count
    );
    out.trim_end().to_string()
}

pub fn entry_view(view: &EntryView) -> String {
    match view {
        EntryView::Page(page) => entry_page(page),
        EntryView::Unavailable { reason } => format!("Entries are unavailable: {reason}"),
    }
}

pub fn notification(note: &Notification) -> String {
    let tag = match note.severity {
        Severity::Success => "ok",
        Severity::Info => "info",
        Severity::Warning => "warn",
        Severity::Error => "error",
    };
    format!("[{tag}] {}", note.message)
}

pub fn print_notifications(notes: &[Notification]) {
    for note in notes {
        println!("{}", notification(note));
    }
}

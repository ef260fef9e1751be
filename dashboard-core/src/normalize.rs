//! Schema validation and normalization of weather service payloads.
//!
//! A payload is first deserialized into [`RawCityWeather`], which fails on
//! any missing or mistyped required field, then checked for values that
//! parse but make no sense, and finally turned into a [`CityWeather`].

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    error::{DashboardError, DashboardResult},
    model::CityWeather,
};

const CAPTURED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Payload of `GET /weather_api/{city}` exactly as the service sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCityWeather {
    pub ciudad: String,
    pub pais: String,
    pub temperatura: f64,
    pub sensacion_termica: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humedad: i64,
    pub presion: i64,
    pub descripcion: String,
    pub icono: Option<String>,
    pub nubosidad: i64,
    pub viento_velocidad: f64,
    pub visibilidad: f64,
    pub amanecer: String,
    pub atardecer: String,
    pub coordenadas: Map<String, Value>,
    pub timestamp: RawTimestamp,
}

/// The capture time is either an ISO-8601 string or epoch seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Epoch(i64),
    Text(String),
}

/// Deserialize a response body, rejecting anything that does not match the schema.
pub fn parse_weather(body: &str) -> DashboardResult<RawCityWeather> {
    serde_json::from_str(body)
        .map_err(|e| DashboardError::Validation(format!("malformed weather response: {e}")))
}

/// Normalize into a display model, rendering the capture time in local time.
pub fn normalize(raw: RawCityWeather) -> DashboardResult<CityWeather> {
    normalize_in(raw, &Local)
}

/// Same as [`normalize`] with an explicit display timezone.
pub fn normalize_in<Tz>(raw: RawCityWeather, tz: &Tz) -> DashboardResult<CityWeather>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let name = raw.ciudad.trim().to_string();
    if name.is_empty() {
        return Err(invalid("ciudad", "must not be empty"));
    }
    if raw.visibilidad < 0.0 {
        return Err(invalid("visibilidad", "must not be negative"));
    }
    if !raw.viento_velocidad.is_finite() {
        return Err(invalid("viento_velocidad", "must be a finite number"));
    }

    let captured_at = captured_at(&raw.timestamp, tz)?
        .format(CAPTURED_AT_FORMAT)
        .to_string();

    Ok(CityWeather {
        name,
        country: raw.pais,
        temperature: round_to_i32("temperatura", raw.temperatura)?,
        feels_like: round_to_i32("sensacion_termica", raw.sensacion_termica)?,
        description: capitalize_first(&raw.descripcion),
        humidity_pct: percentage("humedad", raw.humedad)?,
        wind_speed: one_decimal(raw.viento_velocidad),
        pressure_hpa: raw.presion,
        visibility_km: round_half_up("visibilidad", raw.visibilidad / 1000.0)?,
        icon_code: raw.icono.filter(|code| !code.trim().is_empty()),
        temp_min: round_to_i32("temp_min", raw.temp_min)?,
        temp_max: round_to_i32("temp_max", raw.temp_max)?,
        cloudiness_pct: percentage("nubosidad", raw.nubosidad)?,
        sunrise: raw.amanecer,
        sunset: raw.atardecer,
        coordinates: Value::Object(raw.coordenadas),
        captured_at,
    })
}

fn invalid(field: &str, problem: &str) -> DashboardError {
    DashboardError::Validation(format!("field '{field}' {problem}"))
}

/// Round to the nearest integer, ties toward positive infinity.
pub(crate) fn round_half_up(field: &str, value: f64) -> DashboardResult<i64> {
    if !value.is_finite() {
        return Err(invalid(field, "must be a finite number"));
    }
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return Err(invalid(field, "is out of range"));
    }
    Ok(rounded as i64)
}

fn round_to_i32(field: &str, value: f64) -> DashboardResult<i32> {
    let rounded = round_half_up(field, value)?;
    i32::try_from(rounded).map_err(|_| invalid(field, "is out of range"))
}

fn percentage(field: &str, value: i64) -> DashboardResult<u8> {
    match u8::try_from(value) {
        Ok(pct) if pct <= 100 => Ok(pct),
        _ => Err(invalid(field, "must be between 0 and 100")),
    }
}

/// Fixed one-decimal rendering.
///
/// Values ending in .25 or .75 are the only exact ties a double can hold
/// at this precision; those round away from zero. Everything else rounds
/// by its exact binary value.
pub(crate) fn one_decimal(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        let tenths = (value.abs() * 10.0).ceil().copysign(value);
        return format!("{:.1}", tenths / 10.0);
    }
    format!("{value:.1}")
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn captured_at<Tz: TimeZone>(raw: &RawTimestamp, tz: &Tz) -> DashboardResult<DateTime<Tz>> {
    match raw {
        RawTimestamp::Epoch(secs) => DateTime::from_timestamp(*secs, 0)
            .map(|utc| utc.with_timezone(tz))
            .ok_or_else(|| invalid("timestamp", "is not a valid epoch")),
        RawTimestamp::Text(text) => {
            if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
                return Ok(with_offset.with_timezone(tz));
            }
            // No offset: the service wrote its own wall-clock time.
            let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map_err(|_| invalid("timestamp", "is not an ISO-8601 date-time"))?;
            tz.from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| invalid("timestamp", "does not exist in the local timezone"))
        }
    }
}

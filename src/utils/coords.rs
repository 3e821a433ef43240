//! Equatorial coordinate formatting

use serde::{Deserialize, Serialize};

/// How right ascension and declination are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFormat {
    /// `HH:MM:SS.ss` / `±DD:MM:SS.s`
    #[default]
    Sexagesimal,
    /// Degrees with six decimals
    Decimal,
}

/// Right ascension in degrees to `HH:MM:SS.ss`
pub fn ra_to_hms(ra_deg: f64) -> String {
    const CENTISECONDS_PER_DAY: i64 = 24 * 3600 * 100;

    // 1 degree of RA is 240 seconds of time
    let total = (ra_deg.rem_euclid(360.0) * 240.0 * 100.0).round() as i64 % CENTISECONDS_PER_DAY;
    let hours = total / 360_000;
    let minutes = (total / 6_000) % 60;
    let centis = total % 6_000;

    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, centis / 100, centis % 100)
}

/// Declination in degrees to `±DD:MM:SS.s`
pub fn dec_to_dms(dec_deg: f64) -> String {
    let sign = if dec_deg < 0.0 { '-' } else { '+' };
    let total = (dec_deg.abs() * 3600.0 * 10.0).round() as i64;
    let degrees = total / 36_000;
    let minutes = (total / 600) % 60;
    let decis = total % 600;

    format!("{}{:02}:{:02}:{:02}.{}", sign, degrees, minutes, decis / 10, decis % 10)
}

pub fn format_ra(ra_deg: f64, format: CoordinateFormat) -> String {
    match format {
        CoordinateFormat::Sexagesimal => ra_to_hms(ra_deg),
        CoordinateFormat::Decimal => format!("{:.6}", ra_deg),
    }
}

pub fn format_dec(dec_deg: f64, format: CoordinateFormat) -> String {
    match format {
        CoordinateFormat::Sexagesimal => dec_to_dms(dec_deg),
        CoordinateFormat::Decimal => format!("{:.6}", dec_deg),
    }
}

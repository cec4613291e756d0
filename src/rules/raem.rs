//! RAEM memorial contest.
//!
//! The exchange carries the station's coordinates in whole degrees
//! (`57N085E`); points grow with the latitude/longitude difference, with
//! bonuses for polar correspondents and the memorial callsign itself.

use crate::{contact::Contact, types::DupeCheck};

use super::{ContestRules, ExchangeFieldSpec, ExchangeSlot, POLAR_LATITUDE, StationProfile, Totals};

const MEMORIAL_CALL: &str = "RAEM";

/// RAEM contest rules. Scores depend only on the two stations'
/// coordinates, so stored points never go stale and the recalculation
/// replay is disabled.
#[derive(Debug, Clone, Default)]
pub struct Raem;

/// Parses a `57N085E` style coordinate pair into signed whole degrees
/// (north and east positive). `O` (Ost) is accepted as an east marker.
pub fn parse_coordinates(nr: &str) -> Option<(i32, i32)> {
    let s = nr.trim().to_ascii_uppercase();
    let mut chars = s.chars().peekable();

    let mut read = |hemis: &[char]| -> Option<(i32, char)> {
        let mut digits = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        let h = chars.next()?;
        if digits.is_empty() || !hemis.contains(&h) {
            return None;
        }
        Some((digits.parse().ok()?, h))
    };

    let (lat, lat_h) = read(&['N', 'S'])?;
    let (lon, lon_h) = read(&['E', 'O', 'W'])?;
    if lat > 90 || lon > 180 {
        return None;
    }
    let lat = if lat_h == 'S' { -lat } else { lat };
    let lon = if lon_h == 'W' { -lon } else { lon };
    Some((lat, lon))
}

impl ContestRules for Raem {
    fn name(&self) -> &'static str {
        "RAEM"
    }

    fn cabrillo_name(&self) -> &'static str {
        "RAEM"
    }

    fn exchange_fields(&self) -> Vec<ExchangeFieldSpec> {
        vec![
            ExchangeFieldSpec {
                slot: ExchangeSlot::Rcv,
                label: "RST",
                hint: "599",
            },
            ExchangeFieldSpec {
                slot: ExchangeSlot::Nr,
                label: "Nr+Coords",
                hint: "# 57N085E",
            },
        ]
    }

    fn dupe_check(&self) -> DupeCheck {
        DupeCheck::ContestWide
    }

    fn points(&self, profile: &StationProfile, contact: &Contact, is_dupe: bool) -> f64 {
        if is_dupe {
            return 0.0;
        }
        let Some((their_lat, their_lon)) = parse_coordinates(&contact.exchange.nr) else {
            return 0.0;
        };
        let Some((my_lat, my_lon)) = crate::geo::grid_to_latlon(&profile.grid) else {
            return 0.0;
        };

        let mut points = 50.0
            + (my_lat.round() - f64::from(their_lat)).abs()
            + (my_lon.round() - f64::from(their_lon)).abs();
        if f64::from(their_lat) >= POLAR_LATITUDE {
            points += 100.0;
        }
        if contact.call == MEMORIAL_CALL {
            points += 300.0;
        }
        points
    }

    fn mult_key(
        &self,
        _axis: usize,
        _profile: &StationProfile,
        _contact: &Contact,
    ) -> Option<String> {
        None
    }

    fn claimed_score(&self, profile: &StationProfile, totals: &Totals) -> i64 {
        // Polar own stations multiply the final sum, not each QSO.
        let polar = profile.latitude().is_some_and(|lat| lat >= POLAR_LATITUDE);
        let factor = if polar { 1.1 } else { 1.0 };
        (totals.points * factor).round() as i64
    }

    fn supports_recalc(&self) -> bool {
        false
    }
}

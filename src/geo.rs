//! Geography and band-classification helpers.
//!
//! Pure functions only: Maidenhead grid decoding, great-circle distance
//! and bearing, WPX prefix derivation, and the three independent
//! frequency-to-band tables. The tables are literal range data; there is
//! no formula relating them and they must not be merged.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Converts a 4- or 6-character Maidenhead grid square to the lat/lon of
/// its center. Returns `None` for malformed grids.
pub fn grid_to_latlon(grid: &str) -> Option<(f64, f64)> {
    let grid = grid.trim().to_ascii_uppercase();
    let b = grid.as_bytes();
    if b.len() < 4 || b.len() % 2 != 0 {
        return None;
    }
    if !(b'A'..=b'R').contains(&b[0]) || !(b'A'..=b'R').contains(&b[1]) {
        return None;
    }
    if !b[2].is_ascii_digit() || !b[3].is_ascii_digit() {
        return None;
    }

    let lon_field = f64::from(b[0] - b'A');
    let lat_field = f64::from(b[1] - b'A');
    let lon_square = f64::from(b[2] - b'0');
    let lat_square = f64::from(b[3] - b'0');

    // Fields are 20x10 degrees, squares 2x1, origin at 180W 90S.
    let mut lon = -180.0 + lon_field * 20.0 + lon_square * 2.0;
    let mut lat = -90.0 + lat_field * 10.0 + lat_square;

    if b.len() >= 6 {
        if !(b'A'..=b'X').contains(&b[4]) || !(b'A'..=b'X').contains(&b[5]) {
            return None;
        }
        lon += f64::from(b[4] - b'A') * (2.0 / 24.0) + 1.0 / 24.0;
        lat += f64::from(b[5] - b'A') * (1.0 / 24.0) + 0.5 / 24.0;
    } else {
        lon += 1.0;
        lat += 0.5;
    }

    Some((lat, lon))
}

/// Great-circle distance in kilometers between two lat/lon points.
pub fn distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Initial great-circle bearing in degrees from `a` toward `b`.
pub fn bearing_deg(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlon = lon2 - lon1;
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Distance in whole kilometers between two grid squares, when both
/// decode. Malformed grids yield `None` (zero credit upstream).
pub fn grid_distance_km(a: &str, b: &str) -> Option<u32> {
    let pa = grid_to_latlon(a)?;
    let pb = grid_to_latlon(b)?;
    Some(distance_km(pa, pb).round() as u32)
}

/// Display band label for a frequency in kHz.
///
/// Lower bounds are exclusive and upper bounds inclusive: 1800.0 kHz is
/// out of band ("0"), 1800.001 kHz is "160".
pub fn display_band(freq_khz: f64) -> &'static str {
    let f = freq_khz;
    match () {
        _ if f > 1_800.0 && f <= 2_000.0 => "160",
        _ if f > 3_500.0 && f <= 4_000.0 => "80",
        _ if f > 5_250.0 && f <= 5_450.0 => "60",
        _ if f > 7_000.0 && f <= 7_300.0 => "40",
        _ if f > 10_100.0 && f <= 10_150.0 => "30",
        _ if f > 14_000.0 && f <= 14_350.0 => "20",
        _ if f > 18_068.0 && f <= 18_168.0 => "17",
        _ if f > 21_000.0 && f <= 21_450.0 => "15",
        _ if f > 24_890.0 && f <= 24_990.0 => "12",
        _ if f > 28_000.0 && f <= 29_700.0 => "10",
        _ if f > 50_000.0 && f <= 54_000.0 => "6",
        _ if f > 70_000.0 && f <= 70_500.0 => "4",
        _ if f > 144_000.0 && f <= 148_000.0 => "2",
        _ if f > 420_000.0 && f <= 450_000.0 => "70cm",
        _ if f > 1_240_000.0 && f <= 1_300_000.0 => "23cm",
        _ => "0",
    }
}

/// Logged/Cabrillo band designator for a frequency in kHz.
///
/// Same range boundaries as [`display_band`], different label convention.
pub fn logged_band(freq_khz: f64) -> &'static str {
    let f = freq_khz;
    match () {
        _ if f > 1_800.0 && f <= 2_000.0 => "1.8",
        _ if f > 3_500.0 && f <= 4_000.0 => "3.5",
        _ if f > 5_250.0 && f <= 5_450.0 => "5.3",
        _ if f > 7_000.0 && f <= 7_300.0 => "7",
        _ if f > 10_100.0 && f <= 10_150.0 => "10.1",
        _ if f > 14_000.0 && f <= 14_350.0 => "14",
        _ if f > 18_068.0 && f <= 18_168.0 => "18.1",
        _ if f > 21_000.0 && f <= 21_450.0 => "21",
        _ if f > 24_890.0 && f <= 24_990.0 => "24.9",
        _ if f > 28_000.0 && f <= 29_700.0 => "28",
        _ if f > 50_000.0 && f <= 54_000.0 => "50",
        _ if f > 70_000.0 && f <= 70_500.0 => "70",
        _ if f > 144_000.0 && f <= 148_000.0 => "144",
        _ if f > 420_000.0 && f <= 450_000.0 => "432",
        _ if f > 1_240_000.0 && f <= 1_300_000.0 => "1296",
        _ if f > 2_300_000.0 => "2300+",
        _ => "0",
    }
}

/// ADIF band token for a frequency in MHz (not kHz).
///
/// This is the ADIF 3.x table with its own, finer-grained boundaries,
/// inclusive at both ends.
pub fn adif_band(freq_mhz: f64) -> Option<&'static str> {
    let f = freq_mhz;
    match () {
        _ if (0.1357..=0.1378).contains(&f) => Some("2190m"),
        _ if (0.472..=0.479).contains(&f) => Some("630m"),
        _ if (0.501..=0.504).contains(&f) => Some("560m"),
        _ if (1.8..=2.0).contains(&f) => Some("160m"),
        _ if (3.5..=4.0).contains(&f) => Some("80m"),
        _ if (5.06..=5.45).contains(&f) => Some("60m"),
        _ if (7.0..=7.3).contains(&f) => Some("40m"),
        _ if (10.1..=10.15).contains(&f) => Some("30m"),
        _ if (14.0..=14.35).contains(&f) => Some("20m"),
        _ if (18.068..=18.168).contains(&f) => Some("17m"),
        _ if (21.0..=21.45).contains(&f) => Some("15m"),
        _ if (24.89..=24.99).contains(&f) => Some("12m"),
        _ if (28.0..=29.7).contains(&f) => Some("10m"),
        _ if (40.0..=45.0).contains(&f) => Some("8m"),
        _ if (50.0..=54.0).contains(&f) => Some("6m"),
        _ if (70.0..=71.0).contains(&f) => Some("4m"),
        _ if (144.0..=148.0).contains(&f) => Some("2m"),
        _ if (222.0..=225.0).contains(&f) => Some("1.25m"),
        _ if (420.0..=450.0).contains(&f) => Some("70cm"),
        _ if (902.0..=928.0).contains(&f) => Some("33cm"),
        _ if (1_240.0..=1_300.0).contains(&f) => Some("23cm"),
        _ if (2_300.0..=2_450.0).contains(&f) => Some("13cm"),
        _ if (3_300.0..=3_500.0).contains(&f) => Some("9cm"),
        _ if (5_650.0..=5_925.0).contains(&f) => Some("6cm"),
        _ if (10_000.0..=10_500.0).contains(&f) => Some("3cm"),
        _ if (24_000.0..=24_250.0).contains(&f) => Some("1.25cm"),
        _ if (47_000.0..=47_200.0).contains(&f) => Some("6mm"),
        _ if (75_500.0..=81_000.0).contains(&f) => Some("4mm"),
        _ if (119_980.0..=123_000.0).contains(&f) => Some("2.5mm"),
        _ if (134_000.0..=149_000.0).contains(&f) => Some("2mm"),
        _ if (241_000.0..=250_000.0).contains(&f) => Some("1mm"),
        _ if (300_000.0..=7_500_000.0).contains(&f) => Some("submm"),
        _ => None,
    }
}

/// Representative in-band frequency in kHz for a display band.
///
/// Used when a contact arrives from a source that reports only a band
/// (e.g. a decoder packet without frequency data).
pub fn fake_freq(band: &str) -> f64 {
    match band {
        "160" => 1_830.0,
        "80" => 3_550.0,
        "60" => 5_352.0,
        "40" => 7_050.0,
        "30" => 10_110.0,
        "20" => 14_050.0,
        "17" => 18_080.0,
        "15" => 21_050.0,
        "12" => 24_900.0,
        "10" => 28_050.0,
        "6" => 50_100.0,
        "4" => 70_100.0,
        "2" => 144_200.0,
        "70cm" => 432_100.0,
        "23cm" => 1_296_100.0,
        _ => 0.0,
    }
}

/// Derives the WPX prefix from a callsign.
///
/// The prefix is the leading letters plus the following digit run. A
/// portable single-digit suffix replaces the prefix digit; a letter-only
/// prefix designator gains a trailing zero.
pub fn wpx_prefix(call: &str) -> String {
    let call = call.trim().to_ascii_uppercase();
    if call.is_empty() {
        return String::new();
    }

    let parts: Vec<&str> = call.split('/').collect();
    let base = parts[0];

    // Operating suffixes that never change the prefix.
    let is_plain_suffix =
        |s: &str| matches!(s, "P" | "M" | "MM" | "AM" | "QRP" | "A" | "E") || s.is_empty();

    if parts.len() >= 2 {
        let tail = parts[parts.len() - 1];
        if tail.len() == 1 && tail.chars().all(|c| c.is_ascii_digit()) {
            // N8BJQ/9 counts as N9.
            let stem = prefix_of(base);
            let trimmed = stem.trim_end_matches(|c: char| c.is_ascii_digit());
            return format!("{trimmed}{tail}");
        }
        if !is_plain_suffix(tail) && tail.len() < base.len() {
            // PA/K1ABC counts as PA0 when the designator has no digit.
            return if tail.chars().any(|c| c.is_ascii_digit()) {
                prefix_of(tail)
            } else {
                format!("{tail}0")
            };
        }
    }

    prefix_of(base)
}

fn prefix_of(call: &str) -> String {
    // Everything through the last digit of the prefix run (K1, 4X4, W10).
    match call.rfind(|c: char| c.is_ascii_digit()) {
        Some(idx) => call[..=idx].to_string(),
        None => {
            // Callsigns without a digit take an implicit zero.
            let mut out: String = call.chars().take(2).collect();
            out.push('0');
            out
        }
    }
}

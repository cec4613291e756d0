use contestlog::geo::{
    adif_band, bearing_deg, display_band, fake_freq, grid_distance_km, grid_to_latlon,
    logged_band, wpx_prefix,
};

#[test]
fn display_band_boundaries_are_exclusive_low_inclusive_high() {
    assert_eq!(display_band(1_800.0), "0");
    assert_eq!(display_band(1_800.001), "160");
    assert_eq!(display_band(2_000.0), "160");
    assert_eq!(display_band(2_000.001), "0");
    assert_eq!(display_band(14_000.001), "20");
    assert_eq!(display_band(14_350.0), "20");
    assert_eq!(display_band(432_100.0), "70cm");
}

#[test]
fn logged_band_uses_megahertz_labels_over_same_ranges() {
    assert_eq!(logged_band(1_830.0), "1.8");
    assert_eq!(logged_band(3_550.0), "3.5");
    assert_eq!(logged_band(7_020.0), "7");
    assert_eq!(logged_band(14_025.0), "14");
    assert_eq!(logged_band(28_500.0), "28");
    assert_eq!(logged_band(2_400_000.0), "2300+");
    assert_eq!(logged_band(1_800.0), "0");
}

#[test]
fn adif_band_covers_its_own_finer_ranges() {
    assert_eq!(adif_band(0.1357), Some("2190m"));
    assert_eq!(adif_band(1.83), Some("160m"));
    assert_eq!(adif_band(14.0), Some("20m"));
    assert_eq!(adif_band(14.35), Some("20m"));
    assert_eq!(adif_band(5.1), Some("60m"));
    assert_eq!(adif_band(300_000.0), Some("submm"));
    assert_eq!(adif_band(13.9), None);
}

#[test]
fn fake_freq_lands_inside_its_display_band() {
    for band in ["160", "80", "40", "20", "15", "10", "2", "70cm"] {
        let freq = fake_freq(band);
        assert_eq!(display_band(freq), band, "band {band}");
    }
    assert_eq!(fake_freq("nonsense"), 0.0);
}

#[test]
fn grid_decoding_and_distance() {
    let (lat, lon) = grid_to_latlon("KP20").expect("grid");
    assert!((lat - 60.5).abs() < 1e-9);
    assert!((lon - 25.0).abs() < 1e-9);

    assert!(grid_to_latlon("ZZ99").is_none());
    assert!(grid_to_latlon("KP2").is_none());
    assert!(grid_to_latlon("").is_none());

    // Six-character grids refine toward the subsquare center.
    let (lat6, lon6) = grid_to_latlon("KP20AA").expect("grid6");
    assert!(lat6 < lat && lon6 < lon);

    assert_eq!(grid_distance_km("KP20", "KP20"), Some(0));
    assert_eq!(grid_distance_km("KP20", "KP30"), Some(110));
    assert_eq!(grid_distance_km("KP20", "bogus"), None);
}

#[test]
fn bearing_follows_compass_quadrants() {
    let helsinki = grid_to_latlon("KP20").expect("grid");
    let north = (helsinki.0 + 5.0, helsinki.1);
    let east = (helsinki.0, helsinki.1 + 5.0);
    assert!((bearing_deg(helsinki, north) - 0.0).abs() < 1.0);
    let b = bearing_deg(helsinki, east);
    assert!((45.0..135.0).contains(&b), "east bearing {b}");
}

#[test]
fn wpx_prefix_rules() {
    assert_eq!(wpx_prefix("K1ABC"), "K1");
    assert_eq!(wpx_prefix("OH2BH"), "OH2");
    assert_eq!(wpx_prefix("4X4AAA"), "4X4");
    // Portable digit suffix replaces the prefix digit.
    assert_eq!(wpx_prefix("N8BJQ/9"), "N9");
    // Letter-only designator gains an implicit zero.
    assert_eq!(wpx_prefix("PA/K1ABC"), "PA0");
    // Operating suffixes never change the prefix.
    assert_eq!(wpx_prefix("OH2BH/P"), "OH2");
    assert_eq!(wpx_prefix("K1ABC/MM"), "K1");
    // No-digit calls take two letters plus zero.
    assert_eq!(wpx_prefix("RAEM"), "RA0");
    assert_eq!(wpx_prefix(""), "");
}

/// Round a coordinate to a fixed number of decimal places
///
/// Exact halves of the last kept digit round to the even neighbour, as
/// pandas/numpy `round` does, so `0.125` becomes `0.12` and `0.375` becomes
/// `0.38`. Applying the rounding twice gives the same value as applying it
/// once.
///
/// # Examples
/// ```
/// use wildfire_features::utils::round_coordinate;
///
/// assert_eq!(round_coordinate(34.567, 2), 34.57);
/// assert_eq!(round_coordinate(-118.123, 2), -118.12);
/// assert_eq!(round_coordinate(0.125, 2), 0.12);
/// ```
pub fn round_coordinate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;

    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        2.0 * (scaled / 2.0).round()
    } else {
        scaled.round()
    };

    rounded / factor
}

/// Calculate the distance between two points using the Haversine formula
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

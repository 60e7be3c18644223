//! Spherical Web-Mercator projection into the unit square.
//!
//! `x` grows eastward from 0 at -180° to 1 at 180°; `y` grows southward from
//! 0 at the northern Mercator limit (about 85.05°) to 1 at the southern one.
//! Polar latitudes beyond the limits are not folded onto the square's edge:
//! they project outside `[0, 1]`, so distinct polar points stay apart. Only
//! latitudes past [`MAX_LATITUDE`] share a `y` with the pole.

use std::f64::consts::PI;

/// Largest latitude with a distinct projection; the poles map here.
pub const MAX_LATITUDE: f64 = 89.9999;

pub fn lon_to_x(lon: f64) -> f64 {
    lon / 360.0 + 0.5
}

pub fn lat_to_y(lat: f64) -> f64 {
    let sin = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().sin();
    0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI
}

pub fn x_to_lon(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

pub fn y_to_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0).to_radians();
    360.0 * y2.exp().atan() / PI - 90.0
}

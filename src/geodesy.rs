// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Distance and bearing calculations over [GeoNodes](GeoNode).
//!
//! All functions take positions in degrees. Formulas are described at
//! <http://www.movable-type.co.uk/scripts/latlong.html>.

use crate::GeoNode;

/// Mean radius of Earth, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Central angle (in radians) for the haversine term `h`.
#[inline]
fn central_angle(h: f64) -> f64 {
    let h = h.clamp(0.0, 1.0);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Difference `to - from` between two longitudes, in degrees, taking
/// the shorter way around the globe. The result is in `[-180, 180]`.
#[inline]
pub fn lon_difference(from: f64, to: f64) -> f64 {
    let d = (to - from) % 360.0;
    if d > 180.0 {
        d - 360.0
    } else if d < -180.0 {
        d + 360.0
    } else {
        d
    }
}

/// Brings a longitude from `[-360, 360]` back into `[-180, 180]`.
#[inline]
fn normalize_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

#[inline]
fn sin_half_squared(x: f64) -> f64 {
    let s = (x * 0.5).sin();
    s * s
}

/// Calculates the great-circle distance between two positions using the
/// [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
pub fn distance(a: &GeoNode, b: &GeoNode) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = sin_half_squared(dlat) + lat1.cos() * lat2.cos() * sin_half_squared(dlon);
    EARTH_RADIUS * central_angle(h)
}

/// Signed east-west offset of `b` relative to `a`, in meters.
///
/// The longitude difference is measured along the parallel of the average latitude
/// of both points. Positive when `b` lies east of `a` (across the antimeridian too).
/// Only meaningful for short ranges.
pub fn local_x(a: &GeoNode, b: &GeoNode) -> f64 {
    let cos_lat = ((a.lat + b.lat) * 0.5).to_radians().cos();
    let dlon_deg = lon_difference(a.lon, b.lon);
    let dlon = dlon_deg.to_radians();

    let dist = EARTH_RADIUS * central_angle(cos_lat * cos_lat * sin_half_squared(dlon));
    if dlon_deg > 0.0 {
        dist
    } else {
        -dist
    }
}

/// Signed north-south offset of `b` relative to `a`, in meters.
/// Positive when `b` lies north of `a`.
pub fn local_y(a: &GeoNode, b: &GeoNode) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();

    let dist = EARTH_RADIUS * central_angle(sin_half_squared(dlat));
    if a.lat < b.lat {
        dist
    } else {
        -dist
    }
}

/// Initial bearing from `a` to `b`, in radians, clockwise from north.
pub fn bearing(a: &GeoNode, b: &GeoNode) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x)
}

/// Linear interpolation in latitude/longitude space,
/// `t = 0` returning `a` and `t = 1` returning `b`.
///
/// Longitudes are interpolated the shorter way around the globe,
/// so segments crossing the antimeridian stay short.
pub fn interpolate(a: &GeoNode, b: &GeoNode, t: f64) -> GeoNode {
    GeoNode::new(
        a.lat + (b.lat - a.lat) * t,
        normalize_lon(a.lon + lon_difference(a.lon, b.lon) * t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    const KRAKOW: GeoNode = GeoNode::new(50.0614, 19.9366);
    const WARSAW: GeoNode = GeoNode::new(52.2297, 21.0122);

    #[test]
    fn distance_between_cities() {
        assert_almost_eq!(distance(&KRAKOW, &WARSAW), 252_501.3, 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance(&KRAKOW, &WARSAW);
        let ba = distance(&WARSAW, &KRAKOW);
        assert!((ab - ba).abs() <= ab * 1e-6);
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance(&KRAKOW, &KRAKOW), 0.0);
        assert_eq!(distance(&GeoNode::ORIGIN, &GeoNode::ORIGIN), 0.0);
    }

    #[test]
    fn distance_along_equator() {
        let a = GeoNode::new(0.0, 0.0);
        let b = GeoNode::new(0.0, 0.01);
        assert_almost_eq!(distance(&a, &b), 1111.9493, 1e-3);
    }

    #[test]
    fn distance_between_antipodes() {
        let a = GeoNode::new(0.0, 0.0);
        let b = GeoNode::new(0.0, 180.0);
        let d = distance(&a, &b);
        assert!(d.is_finite());
        assert_almost_eq!(d, std::f64::consts::PI * EARTH_RADIUS, 1e-3);
    }

    #[test]
    fn local_offsets() {
        let a = GeoNode::new(50.0, 19.0);
        let east = GeoNode::new(50.0, 19.001);
        let north = GeoNode::new(50.001, 19.0);

        assert_almost_eq!(local_x(&a, &east), 71.4747, 1e-3);
        assert_almost_eq!(local_x(&east, &a), -71.4747, 1e-3);
        assert_almost_eq!(local_y(&a, &north), 111.1949, 1e-3);
        assert_almost_eq!(local_y(&north, &a), -111.1949, 1e-3);

        assert_eq!(local_y(&a, &east), 0.0);
        assert_eq!(local_x(&a, &north), 0.0);
    }

    #[test]
    fn bearings() {
        let a = GeoNode::new(0.0, 0.0);
        assert_almost_eq!(bearing(&a, &GeoNode::new(1.0, 0.0)), 0.0);
        assert_almost_eq!(
            bearing(&a, &GeoNode::new(0.0, 1.0)),
            std::f64::consts::FRAC_PI_2
        );
        assert_almost_eq!(
            bearing(&a, &GeoNode::new(0.0, -1.0)),
            -std::f64::consts::FRAC_PI_2
        );
        assert_almost_eq!(
            bearing(&a, &GeoNode::new(-1.0, 0.0)).abs(),
            std::f64::consts::PI
        );
    }

    #[test]
    fn interpolation_endpoints() {
        let a = GeoNode::new(0.0, 0.0);
        let b = GeoNode::new(2.0, 4.0);
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 1.0), b);
        assert_eq!(interpolate(&a, &b, 0.5), GeoNode::new(1.0, 2.0));
    }

    #[test]
    fn longitude_differences() {
        assert_almost_eq!(lon_difference(10.0, 20.0), 10.0);
        assert_almost_eq!(lon_difference(20.0, 10.0), -10.0);
        assert_almost_eq!(lon_difference(179.99, -179.99), 0.02, 1e-9);
        assert_almost_eq!(lon_difference(-179.99, 179.99), -0.02, 1e-9);
        assert_almost_eq!(lon_difference(-90.0, 90.0).abs(), 180.0);
    }

    #[test]
    fn across_antimeridian() {
        let west = GeoNode::new(0.0, 179.99);
        let east = GeoNode::new(0.0, -179.99);

        assert_almost_eq!(distance(&west, &east), 2223.8985, 1e-3);
        assert_almost_eq!(local_x(&west, &east), 2223.8985, 1e-3);
        assert_almost_eq!(local_x(&east, &west), -2223.8985, 1e-3);

        let middle = interpolate(&west, &east, 0.5);
        assert_almost_eq!(middle.lon.abs(), 180.0, 1e-9);
        let past = interpolate(&west, &east, 0.75);
        assert_almost_eq!(past.lon, -179.995, 1e-9);
        assert_almost_eq!(distance(&west, &past), 0.75 * 2223.8985, 1e-3);
    }
}

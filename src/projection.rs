//! UTM projection
//!
//! Hull areas are computed in a planar metric system local to each user. The
//! zone is picked from the mean position of the user's landmarks and every
//! point is projected with the WGS84 transverse Mercator (Krüger series), which
//! is accurate to well under a millimetre inside a zone.

/// WGS84 semi-major axis (m)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM central scale factor
const UTM_K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const EPSG_UTM_NORTH_BASE: u32 = 32600;
const EPSG_UTM_SOUTH_BASE: u32 = 32700;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// A UTM zone with hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

impl UtmZone {
    /// Zone for a representative position: `floor((lon + 180) / 6) + 1`,
    /// north when `lat >= 0`
    pub fn for_position(lon: f64, lat: f64) -> Self {
        let zone = ((lon + 180.0) / 6.0).floor() as i64 + 1;
        UtmZone {
            // lon = +180 lands on 61; wrap-around inputs are out of range too
            zone: zone.clamp(1, 60) as u8,
            hemisphere: if lat >= 0.0 {
                Hemisphere::North
            } else {
                Hemisphere::South
            },
        }
    }

    /// Matching WGS84 / UTM EPSG code (e.g. 32633 for 33N)
    pub fn epsg(&self) -> u32 {
        let base = match self.hemisphere {
            Hemisphere::North => EPSG_UTM_NORTH_BASE,
            Hemisphere::South => EPSG_UTM_SOUTH_BASE,
        };
        base + self.zone as u32
    }

    /// Longitude of the zone's central meridian (degrees)
    pub fn central_meridian(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }

    /// Project WGS84 `(lon, lat)` in degrees to `(easting, northing)` in metres
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let big_a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];
        let e = 2.0 * n.sqrt() / (1.0 + n);

        let phi = lat.to_radians();
        let dlambda = (lon - self.central_meridian()).to_radians();

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(dlambda.cos());
        let eta_p = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let easting = FALSE_EASTING + UTM_K0 * big_a * eta;
        let northing = UTM_K0 * big_a * xi
            + match self.hemisphere {
                Hemisphere::North => 0.0,
                Hemisphere::South => FALSE_NORTHING_SOUTH,
            };
        (easting, northing)
    }
}

/// Arithmetic mean of `(lon, lat)` pairs; `None` when empty
pub fn mean_position(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let (sum_lon, sum_lat) = points
        .iter()
        .fold((0.0, 0.0), |(a, b), (lon, lat)| (a + lon, b + lat));
    Some((sum_lon / count, sum_lat / count))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// WGS84 meridian arc length from the equator to 45°
    const MERIDIAN_ARC_45: f64 = 4_984_944.378;

    #[test]
    fn test_zone_selection() {
        let london = UtmZone::for_position(-0.12, 51.5);
        assert_eq!(london.zone, 30);
        assert_eq!(london.epsg(), 32630);

        let sydney = UtmZone::for_position(151.2, -33.9);
        assert_eq!(sydney.zone, 56);
        assert_eq!(sydney.hemisphere, Hemisphere::South);
        assert_eq!(sydney.epsg(), 32756);

        assert_eq!(UtmZone::for_position(-180.0, 0.0).zone, 1);
        assert_eq!(UtmZone::for_position(180.0, 0.0).zone, 60);
        assert_eq!(UtmZone::for_position(3.0, 0.0).hemisphere, Hemisphere::North);
    }

    #[test]
    fn test_central_meridian() {
        assert_eq!(UtmZone::for_position(3.0, 10.0).central_meridian(), 3.0);
        assert_eq!(UtmZone::for_position(-0.12, 51.5).central_meridian(), -3.0);
    }

    #[test]
    fn test_origin_of_zone() {
        let zone = UtmZone::for_position(3.0, 0.0);
        let (e, n) = zone.project(3.0, 0.0);
        assert!((e - 500_000.0).abs() < 1e-6);
        assert!(n.abs() < 1e-6);
    }

    #[test]
    fn test_northing_on_central_meridian() {
        let north = UtmZone::for_position(3.0, 45.0);
        let (e, n) = north.project(3.0, 45.0);
        assert!((e - 500_000.0).abs() < 1e-6);
        assert!((n - UTM_K0 * MERIDIAN_ARC_45).abs() < 0.01);

        let south = UtmZone::for_position(3.0, -45.0);
        let (_, n) = south.project(3.0, -45.0);
        assert!((n - (FALSE_NORTHING_SOUTH - UTM_K0 * MERIDIAN_ARC_45)).abs() < 0.01);
    }

    #[test]
    fn test_easting_grows_eastward() {
        let zone = UtmZone::for_position(3.0, 10.0);
        let (west, _) = zone.project(2.5, 10.0);
        let (east, _) = zone.project(3.5, 10.0);
        assert!(west < 500_000.0 && east > 500_000.0);
        assert!(((500_000.0 - west) - (east - 500_000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_mean_position() {
        assert_eq!(mean_position(&[]), None);
        assert_eq!(
            mean_position(&[(0.0, 10.0), (2.0, 20.0)]),
            Some((1.0, 15.0))
        );
    }
}

use glam::DVec3;

/// Largest accepted observer speed as a fraction of c.
pub const MAX_BETA: f64 = 0.999;

/// Rejected per-frame or setup parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("beta {0} outside [0, {MAX_BETA}]")]
    BetaOutOfRange(f64),
    #[error("latitude {0} deg outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("{0} is not finite")]
    NonFinite(&'static str),
}

/// Observer velocity: speed `beta` and direction of motion in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverVelocity {
    beta: f64,
    lon_deg: f64,
    lat_deg: f64,
}

impl Default for ObserverVelocity {
    fn default() -> Self {
        Self::REST
    }
}

impl ObserverVelocity {
    pub const REST: Self = Self {
        beta: 0.0,
        lon_deg: 0.0,
        lat_deg: 0.0,
    };

    /// Validate and build a velocity. Longitude is wrapped into [-180, 180).
    pub fn new(beta: f64, lon_deg: f64, lat_deg: f64) -> Result<Self, ParamError> {
        if !beta.is_finite() {
            return Err(ParamError::NonFinite("beta"));
        }
        if !lon_deg.is_finite() {
            return Err(ParamError::NonFinite("longitude"));
        }
        if !lat_deg.is_finite() {
            return Err(ParamError::NonFinite("latitude"));
        }
        if !(0.0..=MAX_BETA).contains(&beta) {
            return Err(ParamError::BetaOutOfRange(beta));
        }
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(ParamError::LatitudeOutOfRange(lat_deg));
        }
        Ok(Self {
            beta,
            lon_deg: wrap_longitude(lon_deg),
            lat_deg,
        })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_deg
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_deg
    }

    /// Direction of motion scaled by beta.
    pub fn cartesian(&self) -> DVec3 {
        let (lon, lat) = (self.lon_deg.to_radians(), self.lat_deg.to_radians());
        DVec3::new(
            self.beta * lat.cos() * lon.cos(),
            self.beta * lat.cos() * lon.sin(),
            self.beta * lat.sin(),
        )
    }

    /// Lorentz factor 1/sqrt(1 - beta^2).
    pub fn gamma(&self) -> f64 {
        1.0 / (1.0 - self.beta * self.beta).sqrt()
    }
}

fn wrap_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_has_zero_vector() {
        let v = ObserverVelocity::REST;
        assert_eq!(v.cartesian(), DVec3::ZERO);
        assert_eq!(v.gamma(), 1.0);
    }

    #[test]
    fn half_c_along_x() {
        let v = ObserverVelocity::new(0.5, 0.0, 0.0).unwrap();
        let c = v.cartesian();
        assert!((c - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
        assert!((v.gamma() - 1.154_700_538_379_251_5).abs() < 1e-12);
    }

    #[test]
    fn pole_direction() {
        let v = ObserverVelocity::new(0.25, 42.0, 90.0).unwrap();
        let c = v.cartesian();
        assert!(c.x.abs() < 1e-12 && c.y.abs() < 1e-12);
        assert!((c.z - 0.25).abs() < 1e-12);
    }

    #[test]
    fn max_beta_gamma_is_finite() {
        let v = ObserverVelocity::new(MAX_BETA, 10.0, -20.0).unwrap();
        assert!((v.gamma() - 22.366).abs() < 1e-3);
        assert!((v.cartesian().length() - MAX_BETA).abs() < 1e-12);
    }

    #[test]
    fn rejects_out_of_range_beta() {
        assert_eq!(
            ObserverVelocity::new(1.0, 0.0, 0.0),
            Err(ParamError::BetaOutOfRange(1.0))
        );
        assert_eq!(
            ObserverVelocity::new(-0.1, 0.0, 0.0),
            Err(ParamError::BetaOutOfRange(-0.1))
        );
        assert!(ObserverVelocity::new(0.9995, 0.0, 0.0).is_err());
    }

    #[test]
    fn rejects_non_finite_and_bad_latitude() {
        assert_eq!(
            ObserverVelocity::new(f64::NAN, 0.0, 0.0),
            Err(ParamError::NonFinite("beta"))
        );
        assert_eq!(
            ObserverVelocity::new(0.1, f64::INFINITY, 0.0),
            Err(ParamError::NonFinite("longitude"))
        );
        assert_eq!(
            ObserverVelocity::new(0.1, 0.0, 91.0),
            Err(ParamError::LatitudeOutOfRange(91.0))
        );
    }

    #[test]
    fn longitude_wraps() {
        let v = ObserverVelocity::new(0.1, -270.0, 0.0).unwrap();
        assert!((v.lon_deg() - 90.0).abs() < 1e-12);
        let v = ObserverVelocity::new(0.1, 180.0, 0.0).unwrap();
        assert!((v.lon_deg() + 180.0).abs() < 1e-12);
    }
}

use nalgebra::{RealField, SMatrix, SVector};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticSink, LogSink};

use super::linear_kf::KalmanFilter;

/// Runtime toggles for diagnostics and numeric guards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Emit diagnostics through the sink
    pub verbose: bool,

    /// Reject non-finite observations/commands and flag non-finite estimates
    pub check: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            verbose: true,
            check: true,
        }
    }
}

/// Model and initial belief for a [`KalmanFilter`]
///
/// Evolution model: `x_k = F·x_{k-1} + B·u_k + q_k`
/// Measurement:     `z_k = H·x_k + r_k`
///
/// Every matrix starts at zero. Nothing is validated here; the filter's
/// numeric guards run at update time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KalmanConfig<T: RealField + Copy, const NS: usize, const NO: usize, const NC: usize = 0> {
    /// State transition [NS×NS]
    pub f: SMatrix<T, NS, NS>,

    /// Observation matrix [NO×NS]
    pub h: SMatrix<T, NO, NS>,

    /// Command matrix [NS×NC]
    pub b: SMatrix<T, NS, NC>,

    /// Process noise covariance [NS×NS]
    pub q: SMatrix<T, NS, NS>,

    /// Measurement noise covariance [NO×NO]
    pub r: SMatrix<T, NO, NO>,

    /// Initial state estimate
    pub x0: SVector<T, NS>,

    /// Initial estimate covariance
    pub p0: SMatrix<T, NS, NS>,

    pub settings: FilterSettings,
}

impl<T: RealField + Copy, const NS: usize, const NO: usize, const NC: usize>
    KalmanConfig<T, NS, NO, NC>
{
    pub fn new() -> Self {
        Self {
            f: SMatrix::zeros(),
            h: SMatrix::zeros(),
            b: SMatrix::zeros(),
            q: SMatrix::zeros(),
            r: SMatrix::zeros(),
            x0: SVector::zeros(),
            p0: SMatrix::zeros(),
            settings: FilterSettings::default(),
        }
    }

    pub fn transition(mut self, f: SMatrix<T, NS, NS>) -> Self {
        self.f = f;
        self
    }

    pub fn observation(mut self, h: SMatrix<T, NO, NS>) -> Self {
        self.h = h;
        self
    }

    pub fn command(mut self, b: SMatrix<T, NS, NC>) -> Self {
        self.b = b;
        self
    }

    pub fn process_noise(mut self, q: SMatrix<T, NS, NS>) -> Self {
        self.q = q;
        self
    }

    pub fn measurement_noise(mut self, r: SMatrix<T, NO, NO>) -> Self {
        self.r = r;
        self
    }

    pub fn initial_state(mut self, x0: SVector<T, NS>) -> Self {
        self.x0 = x0;
        self
    }

    pub fn initial_covariance(mut self, p0: SMatrix<T, NS, NS>) -> Self {
        self.p0 = p0;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.settings.verbose = verbose;
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.settings.check = check;
        self
    }

    pub fn settings(mut self, settings: FilterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Finish configuration, logging through the `log` facade
    pub fn build(self) -> KalmanFilter<T, NS, NO, NC, LogSink> {
        KalmanFilter::with_sink(self, LogSink)
    }

    /// Finish configuration with a caller-supplied diagnostic sink
    pub fn build_with_sink<D: DiagnosticSink>(self, sink: D) -> KalmanFilter<T, NS, NO, NC, D> {
        KalmanFilter::with_sink(self, sink)
    }
}

impl<T: RealField + Copy, const NS: usize, const NO: usize, const NC: usize> Default
    for KalmanConfig<T, NS, NO, NC>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix2, Vector2};

    #[test]
    fn test_new_config_is_zeroed() {
        let cfg = KalmanConfig::<f64, 2, 2>::new();
        assert_eq!(cfg.f, Matrix2::zeros());
        assert_eq!(cfg.p0, Matrix2::zeros());
        assert_eq!(cfg.x0, Vector2::zeros());
        assert!(cfg.settings.verbose);
        assert!(cfg.settings.check);
    }

    #[test]
    fn test_builder_sets_fields() {
        let f = Matrix2::new(1.0, 0.1, 0.0, 1.0);
        let cfg = KalmanConfig::<f64, 2, 2, 1>::new()
            .transition(f)
            .command(SMatrix::<f64, 2, 1>::new(0.005, 0.1))
            .initial_state(Vector2::new(1.0, 2.0))
            .verbose(false)
            .check(false);

        assert_eq!(cfg.f, f);
        assert_eq!(cfg.b[(1, 0)], 0.1);
        assert_eq!(cfg.x0[1], 2.0);
        assert_eq!(
            cfg.settings,
            FilterSettings {
                verbose: false,
                check: false
            }
        );
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: FilterSettings = serde_json::from_str(r#"{"verbose": false}"#).unwrap();
        assert!(!settings.verbose);
        assert!(settings.check);

        let json = serde_json::to_string(&FilterSettings::default()).unwrap();
        assert_eq!(json, r#"{"verbose":true,"check":true}"#);
    }
}

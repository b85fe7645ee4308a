//! Linear Kalman Filter with const-generic dimensions
//!
//! Model:
//!   x_k = F·x_{k-1} + B·u_k + q_k   (evolution)
//!   z_k = H·x_k + r_k               (measurement)
//!
//! NS = state dimension, NO = observation dimension, NC = command dimension
//! (0 when the system has no control input).
//!
//! Every update runs predict then correct in a single pass. The predict step
//! always executes; the correct step is skipped when the innovation
//! covariance cannot be inverted.

use log::Level;
use nalgebra::{RealField, SMatrix, SVector};
use serde::Serialize;

use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::{FilterStatus, KalmanError, KalmanResult};
use crate::types::linalg::{
    CommandMatrix, CommandVector, GainMatrix, ObservationCovariance, ObservationMatrix,
    ObservationVector, StateMatrix, StateVector,
};

use super::config::KalmanConfig;
use super::identity::DiagonalIdentity;

/// Point-in-time report of a filter, for logging and demo output
#[derive(Clone, Debug, Serialize)]
pub struct FilterSnapshot<T> {
    /// State estimate x
    pub state: Vec<T>,

    /// Trace of P, scalar summary of uncertainty
    pub covariance_trace: T,

    /// Update counters
    pub update_count: u64,
    pub failure_count: u64,

    /// Last status (0 = ok) and its label
    pub status_code: i32,
    pub status: &'static str,
}

pub struct KalmanFilter<
    T: RealField + Copy,
    const NS: usize,
    const NO: usize,
    const NC: usize = 0,
    D: DiagnosticSink = LogSink,
> {
    // ===== Model (configuration) =====
    /// State transition [NS×NS]
    f: StateMatrix<T, NS>,

    /// Observation matrix [NO×NS]
    h: ObservationMatrix<T, NO, NS>,

    /// Command matrix [NS×NC]
    b: CommandMatrix<T, NS, NC>,

    /// Process noise covariance [NS×NS]
    q: StateMatrix<T, NS>,

    /// Measurement noise covariance [NO×NO]
    r: ObservationCovariance<T, NO>,

    // ===== Belief =====
    x: StateVector<T, NS>,
    p: StateMatrix<T, NS>,

    // ===== Per-update quantities =====
    /// Innovation
    y: ObservationVector<T, NO>,
    /// Innovation covariance
    s: ObservationCovariance<T, NO>,
    /// Kalman gain
    k: GainMatrix<T, NS, NO>,

    identity: DiagonalIdentity<T, NS>,
    null_command: StateVector<T, NS>,

    status: FilterStatus,
    verbose: bool,
    check: bool,

    updates: u64,
    failures: u64,

    sink: D,
}

impl<T: RealField + Copy, const NS: usize, const NO: usize, const NC: usize>
    KalmanFilter<T, NS, NO, NC, LogSink>
{
    /// Create a filter that reports through the `log` facade
    pub fn new(config: KalmanConfig<T, NS, NO, NC>) -> Self {
        Self::with_sink(config, LogSink)
    }

    /// Same as [`KalmanFilter::new`], overriding the configured verbosity
    pub fn with_verbose(config: KalmanConfig<T, NS, NO, NC>, verbose: bool) -> Self {
        Self::new(config.verbose(verbose))
    }
}

impl<T, const NS: usize, const NO: usize, const NC: usize, D> KalmanFilter<T, NS, NO, NC, D>
where
    T: RealField + Copy,
    D: DiagnosticSink,
{
    pub fn with_sink(config: KalmanConfig<T, NS, NO, NC>, sink: D) -> Self {
        let mut filter = Self {
            f: config.f,
            h: config.h,
            b: config.b,
            q: config.q,
            r: config.r,
            x: config.x0,
            p: config.p0,
            y: SVector::zeros(),
            s: SMatrix::zeros(),
            k: SMatrix::zeros(),
            identity: DiagonalIdentity::new(),
            null_command: SVector::zeros(),
            status: FilterStatus::Ok,
            verbose: config.settings.verbose,
            check: config.settings.check,
            updates: 0,
            failures: 0,
            sink,
        };

        if filter.verbose {
            let init = if NC > 0 {
                format!("init <{},{},{}> filter", NS, NO, NC)
            } else {
                format!("init <{},{}> filter", NS, NO)
            };
            filter.sink.emit(Level::Info, &init);

            // Degenerate but still usable
            if NS <= 1 || NO <= 1 {
                filter.sink.emit(
                    Level::Warn,
                    &format!(
                        "state and observation dimensions should both be > 1 (got {} and {})",
                        NS, NO
                    ),
                );
            }
        }

        filter
    }

    /// Update with an observation and no command
    pub fn update(
        &mut self,
        observation: &ObservationVector<T, NO>,
    ) -> KalmanResult<StateVector<T, NS>> {
        let null_command = self.null_command;
        self.predict_correct(observation, &null_command)
    }

    /// Update with an observation and a command acting through B
    pub fn update_with_command(
        &mut self,
        observation: &ObservationVector<T, NO>,
        command: &CommandVector<T, NC>,
    ) -> KalmanResult<StateVector<T, NS>> {
        if self.check && !all_finite(command) {
            return self.finish(Err(KalmanError::InvalidCommand));
        }
        let contribution = self.b * command;
        self.predict_correct(observation, &contribution)
    }

    fn predict_correct(
        &mut self,
        observation: &ObservationVector<T, NO>,
        contribution: &StateVector<T, NS>,
    ) -> KalmanResult<StateVector<T, NS>> {
        if self.check && !all_finite(observation) {
            return self.finish(Err(KalmanError::InvalidObservation));
        }

        // Predict
        self.x = self.f * self.x + contribution;
        self.p = self.f * self.p * self.f.transpose() + self.q;

        // Innovation
        let h_t = self.h.transpose();
        self.y = observation - self.h * self.x;
        self.s = self.h * self.p * h_t + self.r;

        let Some(s_inv) = invert_innovation(&self.s) else {
            // Predict-only: drop accumulated uncertainty, keep the predicted x
            self.p.fill(nalgebra::zero());
            self.k.fill(nalgebra::zero());
            return self.finish(Err(KalmanError::SingularInnovationCovariance));
        };

        // Correct
        self.k = self.p * h_t * s_inv;
        self.x += self.k * self.y;
        self.p = self.identity.complement(&(self.k * self.h)) * self.p;

        // P stays corrected even if x went non-finite
        if self.check && !all_finite(&self.x) {
            return self.finish(Err(KalmanError::InvalidEstimate));
        }

        self.finish(Ok(self.x))
    }

    /// Record the outcome of one update call
    fn finish(
        &mut self,
        result: KalmanResult<StateVector<T, NS>>,
    ) -> KalmanResult<StateVector<T, NS>> {
        self.updates += 1;
        self.status = FilterStatus::from(&result);

        if let Err(err) = &result {
            self.failures += 1;
            if self.verbose {
                self.sink.emit(Level::Error, diagnostic(*err));
            }
        }

        result
    }

    /// Independent copy of the state vector
    pub fn state_copy(&self) -> StateVector<T, NS> {
        let mut out = StateVector::<T, NS>::zeros();
        out.copy_from(&self.x);
        out
    }

    #[inline]
    pub fn state(&self) -> &StateVector<T, NS> {
        &self.x
    }

    #[inline]
    pub fn covariance(&self) -> &StateMatrix<T, NS> {
        &self.p
    }

    pub fn covariance_trace(&self) -> T {
        self.p.trace()
    }

    pub fn innovation(&self) -> &ObservationVector<T, NO> {
        &self.y
    }

    pub fn innovation_covariance(&self) -> &ObservationCovariance<T, NO> {
        &self.s
    }

    pub fn gain(&self) -> &GainMatrix<T, NS, NO> {
        &self.k
    }

    pub fn transition_matrix(&self) -> &StateMatrix<T, NS> {
        &self.f
    }

    pub fn observation_matrix(&self) -> &ObservationMatrix<T, NO, NS> {
        &self.h
    }

    pub fn command_matrix(&self) -> &CommandMatrix<T, NS, NC> {
        &self.b
    }

    pub fn process_noise(&self) -> &StateMatrix<T, NS> {
        &self.q
    }

    pub fn measurement_noise(&self) -> &ObservationCovariance<T, NO> {
        &self.r
    }

    pub fn set_process_noise(&mut self, q: StateMatrix<T, NS>) {
        self.q = q;
    }

    pub fn set_measurement_noise(&mut self, r: ObservationCovariance<T, NO>) {
        self.r = r;
    }

    /// Reset the belief state (x, P) mid-loop
    ///
    /// The status of the last update is left as it was.
    pub fn reinitialize(&mut self, x: StateVector<T, NS>, p: StateMatrix<T, NS>) {
        self.x = x;
        self.p = p;
    }

    #[inline]
    pub fn status(&self) -> FilterStatus {
        self.status
    }

    /// 0 if the last update succeeded, nonzero otherwise
    #[inline]
    pub fn status_code(&self) -> i32 {
        self.status.code()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_checking(&self) -> bool {
        self.check
    }

    pub fn set_check(&mut self, check: bool) {
        self.check = check;
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn failure_count(&self) -> u64 {
        self.failures
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    pub fn snapshot(&self) -> FilterSnapshot<T> {
        FilterSnapshot {
            state: self.x.iter().copied().collect(),
            covariance_trace: self.covariance_trace(),
            update_count: self.updates,
            failure_count: self.failures,
            status_code: self.status.code(),
            status: self.status.label(),
        }
    }
}

fn all_finite<T: RealField + Copy, const R: usize, const C: usize>(
    m: &SMatrix<T, R, C>,
) -> bool {
    m.iter().all(|v| v.is_finite())
}

/// Inverse of S, or `None` when S is numerically singular
///
/// Runs partially pivoted elimination on a copy of S first. A pivot no larger
/// than `NO·ε·max|S_ij|` counts as zero, so rank-deficient S is rejected even
/// when rounding leaves its determinant slightly off zero.
fn invert_innovation<T: RealField + Copy, const NO: usize>(
    s: &ObservationCovariance<T, NO>,
) -> Option<ObservationCovariance<T, NO>> {
    let scale = s.iter().fold(nalgebra::zero::<T>(), |m, v| m.max(v.abs()));
    if !scale.is_finite() {
        return s.try_inverse();
    }
    let tol = T::default_epsilon() * nalgebra::convert::<f64, T>(NO as f64) * scale;

    let mut a = *s;
    for col in 0..NO {
        let mut max_row = col;
        let mut max_val = a[(col, col)].abs();
        for row in (col + 1)..NO {
            let val = a[(row, col)].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val <= tol {
            return None;
        }

        a.swap_rows(col, max_row);
        let pivot = a[(col, col)];
        for row in (col + 1)..NO {
            let factor = a[(row, col)] / pivot;
            for j in col..NO {
                let upper = a[(col, j)];
                a[(row, j)] -= factor * upper;
            }
        }
    }

    s.try_inverse()
}

fn diagnostic(err: KalmanError) -> &'static str {
    match err {
        KalmanError::InvalidObservation => "observation has nan or inf values",
        KalmanError::InvalidCommand => "command has nan or inf values",
        KalmanError::SingularInnovationCovariance => {
            "could not invert innovation covariance S, resetting P and K to zero"
        }
        KalmanError::InvalidEstimate => "estimated state has nan or inf values",
    }
}

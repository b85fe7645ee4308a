//! Matrix and vector aliases named after their role in the filter
//!
//! NS, NO and NC are the state, observation and command sizes. The constants
//! below fix those sizes for the demo scenarios.

use nalgebra::{SMatrix, SVector};

// ===== Scalar Filter Dimensions =====
pub const SCALAR_STATE_DIM: usize = 1;
pub const SCALAR_MEASURE_DIM: usize = 1;

// ===== Constant-Velocity Dimensions =====
pub const CV_STATE_DIM: usize = 2;   // (position, velocity)
pub const CV_MEASURE_DIM: usize = 2; // (position, velocity) readings
pub const CV_COMMAND_DIM: usize = 1; // acceleration

// ===== State Types =====
pub type StateVector<T, const NS: usize> = SVector<T, NS>;
pub type StateMatrix<T, const NS: usize> = SMatrix<T, NS, NS>;

// ===== Measurement Types =====
pub type ObservationVector<T, const NO: usize> = SVector<T, NO>;
pub type ObservationMatrix<T, const NO: usize, const NS: usize> = SMatrix<T, NO, NS>;
pub type ObservationCovariance<T, const NO: usize> = SMatrix<T, NO, NO>;

// ===== Command Types =====
pub type CommandVector<T, const NC: usize> = SVector<T, NC>;
pub type CommandMatrix<T, const NS: usize, const NC: usize> = SMatrix<T, NS, NC>;

// Kalman gain: NS×NO
pub type GainMatrix<T, const NS: usize, const NO: usize> = SMatrix<T, NS, NO>;

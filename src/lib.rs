//! Fixed-dimension linear Kalman filter
//!
//! State, observation and command sizes are const generics, so every matrix
//! lives on the stack and shape mismatches fail at compile time.
//!
//! ```
//! use linear_kalman_rs::{KalmanConfig, KalmanError};
//! use nalgebra::{Matrix2, Vector2};
//!
//! let mut kf = KalmanConfig::<f64, 2, 2>::new()
//!     .transition(Matrix2::new(1.0, 0.1, 0.0, 1.0))
//!     .observation(Matrix2::identity())
//!     .process_noise(Matrix2::identity() * 0.01)
//!     .measurement_noise(Matrix2::identity() * 0.5)
//!     .initial_covariance(Matrix2::identity())
//!     .build();
//!
//! match kf.update(&Vector2::new(0.12, 1.0)) {
//!     Ok(x) => assert!(x[0] > 0.0),
//!     Err(KalmanError::SingularInnovationCovariance) => unreachable!(),
//!     Err(e) => panic!("{e}"),
//! }
//! assert_eq!(kf.status_code(), 0);
//! ```

pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod types;

pub use diagnostics::{DiagnosticSink, LogSink, RecordingSink};
pub use error::{FilterStatus, KalmanError, KalmanResult};
pub use filters::{DiagonalIdentity, FilterSettings, FilterSnapshot, KalmanConfig, KalmanFilter};

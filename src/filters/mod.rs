pub mod config;
pub mod identity;
pub mod linear_kf;

pub use config::{FilterSettings, KalmanConfig};
pub use identity::DiagonalIdentity;
pub use linear_kf::{FilterSnapshot, KalmanFilter};

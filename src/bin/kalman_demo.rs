//! Kalman filter demo on simulated sensors
//!
//! Feeds a linear filter with deterministic, bounded sensor noise and reports
//! how close the estimate ends up to the simulated truth.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use linear_kalman_rs::types::linalg::*;
use linear_kalman_rs::{FilterSettings, FilterSnapshot, KalmanConfig};
use nalgebra::{Matrix1, Matrix2, Vector1, Vector2};
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Constant value seen by one noisy sensor
    Scalar,
    /// Position/velocity tracking with an acceleration command
    ConstantVelocity,
}

#[derive(Parser, Debug)]
#[command(name = "kalman_demo")]
#[command(about = "Linear Kalman filter on simulated noisy sensors", long_about = None)]
struct Args {
    /// Scenario to simulate
    #[arg(value_enum, default_value = "scalar")]
    scenario: Scenario,

    /// Number of filter updates
    #[arg(long, default_value = "200")]
    steps: usize,

    /// Peak amplitude of the sensor noise
    #[arg(long, default_value = "0.5")]
    noise: f64,

    /// Sampling period in seconds
    #[arg(long, default_value = "0.1")]
    dt: f64,

    /// True constant (scalar) or starting position (constant-velocity)
    #[arg(long, default_value = "5.0")]
    truth: f64,

    /// Disable nan/inf guards
    #[arg(long)]
    no_check: bool,

    /// Silence filter diagnostics
    #[arg(long)]
    quiet: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    scenario: String,
    steps: usize,
    failed_updates: u64,
    truth: Vec<f64>,
    final_error: f64,
    filter: FilterSnapshot<f64>,
}

/// Bounded pseudo-noise, repeatable between runs
fn sensor_noise(k: usize, amplitude: f64, phase: f64) -> f64 {
    amplitude * (k as f64 * 1.7 + phase).sin()
}

fn run_scalar(args: &Args, settings: FilterSettings) -> RunSummary {
    let mut kf = KalmanConfig::<f64, SCALAR_STATE_DIM, SCALAR_MEASURE_DIM>::new()
        .transition(Matrix1::new(1.0))
        .observation(Matrix1::new(1.0))
        .process_noise(Matrix1::new(0.01))
        .measurement_noise(Matrix1::new(1.0))
        .initial_covariance(Matrix1::new(1.0))
        .settings(settings)
        .build();

    for k in 0..args.steps {
        let z = Vector1::new(args.truth + sensor_noise(k, args.noise, 0.0));
        if let Err(e) = kf.update(&z) {
            log::debug!("step {}: {}", k, e);
        }
        if k % 50 == 0 {
            log::info!(
                "step {:>4}: x = {:.4}, trace(P) = {:.5}",
                k,
                kf.state()[0],
                kf.covariance_trace()
            );
        }
    }

    RunSummary {
        scenario: "scalar".to_string(),
        steps: args.steps,
        failed_updates: kf.failure_count(),
        truth: vec![args.truth],
        final_error: (kf.state()[0] - args.truth).abs(),
        filter: kf.snapshot(),
    }
}

fn run_constant_velocity(args: &Args, settings: FilterSettings) -> RunSummary {
    let dt = args.dt;
    let accel_std: f64 = 0.2;

    // Position/velocity process noise from white acceleration
    let q_pos = 0.25 * dt.powi(4) * accel_std.powi(2);
    let q_vel = dt.powi(2) * accel_std.powi(2);

    // Variance of a sine with peak amplitude a is a²/2
    let r_pos = (0.5 * args.noise.powi(2)).max(1e-6);
    let r_vel = (0.125 * args.noise.powi(2)).max(1e-6);

    let f = Matrix2::new(1.0, dt, 0.0, 1.0);
    let b = CommandMatrix::<f64, CV_STATE_DIM, CV_COMMAND_DIM>::new(0.5 * dt * dt, dt);

    let mut kf = KalmanConfig::<f64, CV_STATE_DIM, CV_MEASURE_DIM, CV_COMMAND_DIM>::new()
        .transition(f)
        .command(b)
        .observation(Matrix2::identity())
        .process_noise(Matrix2::new(q_pos, 0.0, 0.0, q_vel))
        .measurement_noise(Matrix2::new(r_pos, 0.0, 0.0, r_vel))
        .initial_covariance(Matrix2::identity() * 10.0)
        .settings(settings)
        .build();

    let mut truth = Vector2::new(args.truth, 1.0);
    for k in 0..args.steps {
        let u = Vector1::new(0.5 * (0.05 * k as f64).sin());
        truth = f * truth + b * u;

        let z = Vector2::new(
            truth[0] + sensor_noise(k, args.noise, 0.0),
            truth[1] + 0.5 * sensor_noise(k, args.noise, 1.3),
        );
        if let Err(e) = kf.update_with_command(&z, &u) {
            log::debug!("step {}: {}", k, e);
        }
        if k % 50 == 0 {
            log::info!(
                "step {:>4}: pos = {:.3} (true {:.3}), vel = {:.3} (true {:.3})",
                k,
                kf.state()[0],
                truth[0],
                kf.state()[1],
                truth[1]
            );
        }
    }

    RunSummary {
        scenario: "constant-velocity".to_string(),
        steps: args.steps,
        failed_updates: kf.failure_count(),
        truth: truth.iter().copied().collect(),
        final_error: (kf.state() - truth).norm(),
        filter: kf.snapshot(),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.steps == 0 {
        bail!("--steps must be greater than 0");
    }
    if !(args.noise >= 0.0) {
        bail!("--noise must be a non-negative number");
    }
    if !(args.dt > 0.0) {
        bail!("--dt must be positive");
    }

    let settings = FilterSettings {
        verbose: !args.quiet,
        check: !args.no_check,
    };

    let summary = match args.scenario {
        Scenario::Scalar => run_scalar(&args, settings),
        Scenario::ConstantVelocity => run_constant_velocity(&args, settings),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== {} ({} steps) ===", summary.scenario, summary.steps);
        println!("  Truth:          {:?}", summary.truth);
        println!("  Estimate:       {:?}", summary.filter.state);
        println!("  Error:          {:.4}", summary.final_error);
        println!("  trace(P):       {:.5}", summary.filter.covariance_trace);
        println!("  Failed updates: {}", summary.failed_updates);
        println!(
            "  Last status:    {} ({})",
            summary.filter.status_code, summary.filter.status
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_settings() -> FilterSettings {
        FilterSettings {
            verbose: false,
            check: true,
        }
    }

    #[test]
    fn test_scalar_scenario_converges() {
        let args = Args::parse_from(["kalman_demo", "scalar", "--quiet"]);
        let summary = run_scalar(&args, quiet_settings());

        assert_eq!(summary.failed_updates, 0);
        assert!(summary.final_error < 0.1);
        assert_eq!(summary.filter.update_count, 200);
    }

    #[test]
    fn test_constant_velocity_scenario_tracks() {
        let args = Args::parse_from(["kalman_demo", "constant-velocity", "--steps", "300"]);
        let summary = run_constant_velocity(&args, quiet_settings());

        assert_eq!(summary.failed_updates, 0);
        assert_eq!(summary.filter.status_code, 0);
        assert!(summary.final_error < 1.0);
    }

    #[test]
    fn test_sensor_noise_is_bounded() {
        for k in 0..1000 {
            assert!(sensor_noise(k, 0.5, 1.3).abs() <= 0.5);
        }
    }
}

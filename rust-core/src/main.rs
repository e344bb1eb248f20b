//! Stride Sensing demo
//!
//! Replays a synthetic walk through a workout session and prints the
//! progress line. For library use, see lib.rs.

use std::process::ExitCode;

use stride_sensing::{
    AccelerationSample, MotionReading, ReplayMotionSource, TrackerConfig, WorkoutSession,
};
use tracing::error;

fn main() -> ExitCode {
    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = config.logging.init() {
        eprintln!("failed to initialise logging: {err}");
    }

    println!("Stride Sensing v{}", env!("CARGO_PKG_VERSION"));

    let source = ReplayMotionSource::new();
    let mut session = WorkoutSession::new(config.detector);
    if let Err(err) = session.start(&source) {
        error!(error = %err, "could not start workout session");
        return ExitCode::FAILURE;
    }

    // 30 steps at 2Hz, sampled at 50Hz, one peak per step cycle
    for i in 0..750u64 {
        let magnitude = if i % 25 == 5 { 12.0 } else { 9.8 };
        source.emit(MotionReading::new(i * 20, AccelerationSample::along_z(magnitude)));
    }

    let steps = session.stop();
    let progress = config.daily_goal.snapshot(steps);
    println!("Sensor: {}", session.sensor_status());
    println!("Steps: {progress} ({}%)", progress.percent);

    ExitCode::SUCCESS
}

/// Basic usage example: feed acceleration samples, read the step count
use stride_sensing::{
    progress::WeeklySummary, AccelerationSample, DailyGoal, MotionReading, ReplayMotionSource,
    StepDetector, WorkoutSession,
};

fn main() {
    println!("=== Stride Sensing: Basic Example ===\n");

    // Direct detector use: magnitude jumps at 50ms and 450ms are steps,
    // the drop back to 1.0 at 400ms sits on the magnitude floor.
    let mut detector = StepDetector::default();
    let trace = [(1.0, 0), (3.0, 50), (1.0, 400), (3.0, 450)];
    for (magnitude, t) in trace {
        let count = detector.on_sample(&AccelerationSample::along_z(magnitude), t);
        println!("t={t:>4}ms  magnitude={magnitude:.1}  steps={count}");
    }

    // Session use: the subscription is released when the session stops.
    let source = ReplayMotionSource::new();
    let mut session = WorkoutSession::default();
    if let Err(err) = session.start(&source) {
        eprintln!("could not start session: {err}");
        return;
    }

    for i in 0..500u64 {
        let magnitude = if i % 25 == 5 { 12.0 } else { 9.8 };
        source.emit(MotionReading::new(i * 20, AccelerationSample::along_z(magnitude)));
    }
    let steps = session.stop();

    let goal = DailyGoal::default();
    println!("\nSession steps: {} ({}%)", goal.snapshot(steps), goal.percentage(steps));

    let week = WeeklySummary::from_daily_totals(
        &[7000, 6500, 1200, 6000, 8000, 9100, steps],
        &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        goal,
    );
    for day in &week.days {
        let mark = if day.completed { "x" } else { " " };
        println!("[{mark}] {:<5} {}", day.label, day.steps);
    }
}

//! Daily goal progress.
//!
//! Presentation reads a single integer step count; this module turns it into
//! the ratio, percentage and "steps / goal" line shown around the progress
//! ring, plus the seven-day completion strip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed daily target used for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyGoal(pub u64);

impl Default for DailyGoal {
    fn default() -> Self {
        DailyGoal(6000)
    }
}

impl DailyGoal {
    pub fn steps(&self) -> u64 {
        self.0
    }

    /// Fraction of the goal reached, clamped to `[0.0, 1.0]`.
    ///
    /// A zero goal counts as already met.
    pub fn progress_ratio(&self, steps: u64) -> f64 {
        if self.0 == 0 {
            return 1.0;
        }
        (steps as f64 / self.0 as f64).min(1.0)
    }

    /// Progress as a whole percentage, 0..=100.
    pub fn percentage(&self, steps: u64) -> u8 {
        (self.progress_ratio(steps) * 100.0).round() as u8
    }

    pub fn is_met(&self, steps: u64) -> bool {
        steps >= self.0
    }

    pub fn snapshot(&self, steps: u64) -> StepProgress {
        StepProgress {
            steps,
            goal: self.0,
            ratio: self.progress_ratio(steps),
            percent: self.percentage(steps),
        }
    }
}

/// Point-in-time progress towards the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepProgress {
    pub steps: u64,
    pub goal: u64,
    pub ratio: f64,
    pub percent: u8,
}

impl fmt::Display for StepProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}",
            group_thousands(self.steps),
            group_thousands(self.goal)
        )
    }
}

/// Format an integer with comma thousands separators (`4805` -> `"4,805"`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One day in the weekly strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProgress {
    pub label: String,
    pub steps: u64,
    pub completed: bool,
}

/// Seven-day completion summary ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub days: Vec<DayProgress>,
}

impl WeeklySummary {
    /// Build from per-day totals, oldest first; the last entry is today.
    ///
    /// `labels` names the days before today (e.g. `["Mon", ..., "Sat"]`).
    /// Missing labels fall back to `"Day N"`. Only the last seven totals are
    /// kept.
    pub fn from_daily_totals(totals: &[u64], labels: &[&str], goal: DailyGoal) -> Self {
        let window = &totals[totals.len().saturating_sub(7)..];
        let last = window.len().saturating_sub(1);
        let days = window
            .iter()
            .enumerate()
            .map(|(i, &steps)| {
                let label = if i == last {
                    "Today".to_string()
                } else {
                    labels
                        .get(i)
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| format!("Day {}", i + 1))
                };
                DayProgress {
                    label,
                    steps,
                    completed: goal.is_met(steps),
                }
            })
            .collect();
        Self { days }
    }

    pub fn completed_days(&self) -> usize {
        self.days.iter().filter(|d| d.completed).count()
    }

    pub fn total_steps(&self) -> u64 {
        self.days.iter().map(|d| d.steps).sum()
    }
}

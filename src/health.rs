//! Fleet-wide health grading.
//!
//! [`classify`] maps the latest metrics of every target plus the active
//! thresholds to a single letter grade and a one-line justification. It is a
//! pure function and is recomputed on every read; nothing here is cached.
//!
//! Grading order:
//!
//! ```text
//! no targets                         -> A
//! any offline / any loss > 10%       -> F
//! no thresholds                      -> A
//! red >= 3                           -> D
//! red >= 1                           -> C
//! yellow >= 1                        -> B
//! otherwise                          -> A (with fleet-average loss)
//! ```
//!
//! Red and yellow are counted across all targets and all three graded
//! metrics, because thresholds apply to the fleet rather than per target.

use std::fmt;

use netpulse_types::{Metrics, Thresholds};

/// Fraction of a threshold above which a metric counts as approaching it.
pub const WARN_RATIO: f64 = 0.8;

/// Packet loss (percent) that fails the fleet regardless of thresholds.
pub const SEVERE_LOSS_PCT: f64 = 10.0;

/// Letter grade, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn letter(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Where a single metric sits relative to its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricLevel {
    Ok,
    Warn,
    Alert,
}

/// Compare `value` against `threshold`.
///
/// A zero threshold turns any positive value into an infinite ratio and so
/// always alerts. `0 / 0` is NaN, which is neither above 1 nor above
/// [`WARN_RATIO`], so a zero value against a zero threshold stays `Ok`.
pub fn metric_level(value: f64, threshold: f64) -> MetricLevel {
    let ratio = value / threshold;
    if ratio > 1.0 {
        MetricLevel::Alert
    } else if ratio > WARN_RATIO {
        MetricLevel::Warn
    } else {
        MetricLevel::Ok
    }
}

/// Levels of the three graded metrics of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricLevels {
    pub loss: MetricLevel,
    pub p95: MetricLevel,
    pub jitter: MetricLevel,
}

impl MetricLevels {
    pub fn of(metrics: &Metrics, thresholds: &Thresholds) -> Self {
        Self {
            loss: metric_level(metrics.loss_pct, thresholds.loss_pct),
            p95: metric_level(metrics.p95_ms, thresholds.p95_ms),
            jitter: metric_level(metrics.jitter_ms, thresholds.jitter_ms),
        }
    }

    fn iter(&self) -> impl Iterator<Item = MetricLevel> {
        [self.loss, self.p95, self.jitter].into_iter()
    }

    /// Worst of the three.
    pub fn worst(&self) -> MetricLevel {
        self.iter().max().unwrap_or(MetricLevel::Ok)
    }
}

/// Result of grading the fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub grade: Grade,
    pub message: String,
}

impl HealthReport {
    fn new(grade: Grade, message: impl Into<String>) -> Self {
        Self {
            grade,
            message: message.into(),
        }
    }
}

/// Grade a fleet from each target's latest metrics.
pub fn classify<'a, I>(metrics: I, thresholds: Option<&Thresholds>) -> HealthReport
where
    I: IntoIterator<Item = &'a Metrics>,
{
    let fleet: Vec<&Metrics> = metrics.into_iter().collect();

    if fleet.is_empty() {
        return HealthReport::new(Grade::A, "no targets configured");
    }

    let offline = fleet.iter().filter(|m| !m.is_online()).count();
    let severe_loss = fleet.iter().any(|m| m.loss_pct > SEVERE_LOSS_PCT);

    if offline > 0 || severe_loss {
        let mut reasons = Vec::new();
        if offline > 0 {
            reasons.push(format!("{} offline", count_of(offline, "target")));
        }
        if severe_loss {
            reasons.push(format!(">{}% packet loss", SEVERE_LOSS_PCT));
        }
        return HealthReport::new(Grade::F, reasons.join(" · "));
    }

    let Some(thresholds) = thresholds else {
        return HealthReport::new(Grade::A, "all targets online");
    };

    let mut red = 0;
    let mut yellow = 0;
    for levels in fleet.iter().map(|m| MetricLevels::of(m, thresholds)) {
        for level in levels.iter() {
            match level {
                MetricLevel::Alert => red += 1,
                MetricLevel::Warn => yellow += 1,
                MetricLevel::Ok => {}
            }
        }
    }

    if red >= 3 {
        HealthReport::new(Grade::D, format!("{} metrics above threshold", red))
    } else if red >= 1 {
        HealthReport::new(
            Grade::C,
            format!("{} above threshold", count_of(red, "metric")),
        )
    } else if yellow >= 1 {
        HealthReport::new(
            Grade::B,
            format!("{} approaching threshold", count_of(yellow, "metric")),
        )
    } else {
        let avg_loss = fleet.iter().map(|m| m.loss_pct).sum::<f64>() / fleet.len() as f64;
        HealthReport::new(
            Grade::A,
            format!("all targets healthy · {:.1}% packet loss", avg_loss),
        )
    }
}

fn count_of(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(rtt: f64, loss: f64, p95: f64, jitter: f64) -> Metrics {
        Metrics {
            current_rtt_ms: rtt,
            max_rtt_ms: p95 * 1.5,
            loss_pct: loss,
            jitter_ms: jitter,
            p50_ms: rtt,
            p95_ms: p95,
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds::new(5.0, 100.0, 20.0)
    }

    #[test]
    fn test_no_targets() {
        let empty: [Metrics; 0] = [];
        let report = classify(&empty, None);
        assert_eq!(report.grade, Grade::A);
        assert_eq!(report.message, "no targets configured");

        let with_thresholds = classify(&empty, Some(&thresholds()));
        assert_eq!(with_thresholds.message, "no targets configured");
    }

    #[test]
    fn test_single_offline_target() {
        let fleet = [metrics(0.0, 0.0, 10.0, 1.0)];
        let report = classify(&fleet, Some(&thresholds()));
        assert_eq!(report.grade, Grade::F);
        assert!(report.message.contains("1 target offline"));
    }

    #[test]
    fn test_offline_and_severe_loss_both_listed() {
        let fleet = [
            metrics(0.0, 0.0, 10.0, 1.0),
            metrics(-1.0, 0.0, 10.0, 1.0),
            metrics(12.0, 25.0, 10.0, 1.0),
        ];
        let report = classify(&fleet, None);
        assert_eq!(report.grade, Grade::F);
        assert_eq!(report.message, "2 targets offline · >10% packet loss");
    }

    #[test]
    fn test_severe_loss_ignores_thresholds() {
        let fleet = [metrics(10.0, 15.0, 10.0, 1.0), metrics(11.0, 0.0, 10.0, 1.0)];
        let lenient = Thresholds::new(50.0, 1000.0, 1000.0);
        for t in [None, Some(&lenient)] {
            let report = classify(&fleet, t);
            assert_eq!(report.grade, Grade::F);
            assert_eq!(report.message, ">10% packet loss");
        }
    }

    #[test]
    fn test_loss_of_exactly_ten_percent_is_not_severe() {
        let fleet = [metrics(10.0, 10.0, 10.0, 1.0)];
        assert_eq!(classify(&fleet, None).grade, Grade::A);
    }

    #[test]
    fn test_no_thresholds_all_online() {
        let fleet = [metrics(10.0, 3.0, 500.0, 90.0)];
        let report = classify(&fleet, None);
        assert_eq!(report.grade, Grade::A);
        assert_eq!(report.message, "all targets online");
    }

    #[test]
    fn test_all_under_thresholds_reports_average_loss() {
        let fleet = [metrics(10.0, 0.5, 20.0, 2.0), metrics(12.0, 1.1, 30.0, 3.0)];
        let report = classify(&fleet, Some(&thresholds()));
        assert_eq!(report.grade, Grade::A);
        assert!(report.message.contains("0.8% packet loss"), "{}", report.message);
    }

    #[test]
    fn test_yellow_grades_b() {
        // p95 at 90% of its threshold
        let fleet = [metrics(10.0, 0.0, 90.0, 2.0)];
        let report = classify(&fleet, Some(&thresholds()));
        assert_eq!(report.grade, Grade::B);
        assert_eq!(report.message, "1 metric approaching threshold");
    }

    #[test]
    fn test_ratio_exactly_one_is_yellow() {
        let fleet = [metrics(10.0, 5.0, 10.0, 1.0)];
        assert_eq!(classify(&fleet, Some(&thresholds())).grade, Grade::B);
    }

    #[test]
    fn test_red_counts_across_targets() {
        let one_red = [metrics(10.0, 0.0, 150.0, 1.0)];
        let report = classify(&one_red, Some(&thresholds()));
        assert_eq!(report.grade, Grade::C);
        assert_eq!(report.message, "1 metric above threshold");

        // One red metric on each of three targets: D, not C.
        let spread = [
            metrics(10.0, 6.0, 10.0, 1.0),
            metrics(10.0, 0.0, 101.0, 1.0),
            metrics(10.0, 0.0, 10.0, 21.0),
        ];
        let report = classify(&spread, Some(&thresholds()));
        assert_eq!(report.grade, Grade::D);
        assert_eq!(report.message, "3 metrics above threshold");
    }

    #[test]
    fn test_zero_threshold_alerts_on_any_value() {
        let zero = Thresholds::new(0.0, 100.0, 20.0);
        let lossy = [metrics(10.0, 0.1, 10.0, 1.0)];
        assert_eq!(classify(&lossy, Some(&zero)).grade, Grade::C);

        let clean = [metrics(10.0, 0.0, 10.0, 1.0)];
        assert_eq!(classify(&clean, Some(&zero)).grade, Grade::A);
    }

    #[test]
    fn test_metric_level_boundaries() {
        assert_eq!(metric_level(8.0, 10.0), MetricLevel::Ok);
        assert_eq!(metric_level(8.1, 10.0), MetricLevel::Warn);
        assert_eq!(metric_level(10.0, 10.0), MetricLevel::Warn);
        assert_eq!(metric_level(10.1, 10.0), MetricLevel::Alert);
        assert_eq!(metric_level(1.0, 0.0), MetricLevel::Alert);
        assert_eq!(metric_level(0.0, 0.0), MetricLevel::Ok);
    }

    #[test]
    fn test_classify_is_pure() {
        let fleet = [metrics(10.0, 4.5, 95.0, 30.0), metrics(20.0, 0.2, 40.0, 5.0)];
        let t = thresholds();
        let first = classify(&fleet, Some(&t));
        // Unrelated calls in between must not influence the result.
        let _ = classify(std::iter::empty::<&Metrics>(), None);
        let _ = classify(&[metrics(0.0, 50.0, 0.0, 0.0)], Some(&t));
        assert_eq!(classify(&fleet, Some(&t)), first);
        assert_eq!(classify(fleet.iter().rev(), Some(&t)), first);
    }

    #[test]
    fn test_lowering_thresholds_never_improves_grade() {
        let fleet = [
            metrics(10.0, 1.0, 45.0, 4.0),
            metrics(25.0, 3.5, 80.0, 12.0),
            metrics(8.0, 0.0, 20.0, 0.5),
        ];
        let scales = [4.0, 2.0, 1.5, 1.0, 0.8, 0.5, 0.25, 0.1, 0.0];
        let base = Thresholds::new(5.0, 100.0, 20.0);

        for field in 0..3 {
            let mut previous = Grade::A;
            for scale in scales {
                let mut t = base;
                match field {
                    0 => t.loss_pct *= scale,
                    1 => t.p95_ms *= scale,
                    _ => t.jitter_ms *= scale,
                }
                let grade = classify(&fleet, Some(&t)).grade;
                assert!(
                    grade >= previous,
                    "field {} scale {}: {} improved on {}",
                    field,
                    scale,
                    grade,
                    previous
                );
                previous = grade;
            }
        }
    }
}

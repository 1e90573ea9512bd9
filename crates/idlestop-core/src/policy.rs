//! Idle classification

use crate::sampler::UtilizationSample;
use idlestop_cloud::MetricName;
use idlestop_config::IdleThresholds;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Idle,
    Active,
}

fn threshold(thresholds: &IdleThresholds, metric: MetricName) -> f64 {
    match metric {
        MetricName::CpuUtilization => thresholds.cpu_percent,
        MetricName::NetworkIn => thresholds.network_in_bytes,
        MetricName::NetworkOut => thresholds.network_out_bytes,
        MetricName::DiskReadOps => thresholds.disk_read_ops,
        MetricName::DiskWriteOps => thresholds.disk_write_ops,
    }
}

/// Metrics whose reading is not strictly below its threshold
pub fn breaches(thresholds: &IdleThresholds, sample: &UtilizationSample) -> Vec<MetricName> {
    MetricName::ALL
        .into_iter()
        .filter(|metric| !is_below(sample.get(*metric), threshold(thresholds, *metric)))
        .collect()
}

/// Strict less-than; NaN is never below
fn is_below(value: f64, limit: f64) -> bool {
    value < limit
}

/// Idle iff every reading is strictly below its threshold
pub fn classify(thresholds: &IdleThresholds, sample: &UtilizationSample) -> Verdict {
    if breaches(thresholds, sample).is_empty() {
        Verdict::Idle
    } else {
        Verdict::Active
    }
}

pub fn stop_message(instance_id: &str) -> String {
    format!(
        "EC2 Instance `{instance_id}` was stopped. Reason: Idle for over an hour with low CPU/Network/Disk usage"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> UtilizationSample {
        UtilizationSample {
            cpu_percent: 2.0,
            network_in_bytes: 100.0,
            network_out_bytes: 50.0,
            disk_read_ops: 0.0,
            disk_write_ops: 0.0,
        }
    }

    #[test]
    fn test_all_below_is_idle() {
        assert_eq!(classify(&IdleThresholds::default(), &quiet()), Verdict::Idle);
        assert_eq!(
            classify(&IdleThresholds::default(), &UtilizationSample::default()),
            Verdict::Idle
        );
    }

    #[test]
    fn test_each_threshold_is_strict() {
        let thresholds = IdleThresholds::default();
        let cases = [
            (MetricName::CpuUtilization, UtilizationSample { cpu_percent: 5.0, ..quiet() }),
            (MetricName::NetworkIn, UtilizationSample { network_in_bytes: 5000.0, ..quiet() }),
            (MetricName::NetworkOut, UtilizationSample { network_out_bytes: 5000.0, ..quiet() }),
            (MetricName::DiskReadOps, UtilizationSample { disk_read_ops: 1.0, ..quiet() }),
            (MetricName::DiskWriteOps, UtilizationSample { disk_write_ops: 1.0, ..quiet() }),
        ];

        for (metric, sample) in cases {
            assert_eq!(classify(&thresholds, &sample), Verdict::Active, "{metric}");
            assert_eq!(breaches(&thresholds, &sample), vec![metric]);
        }
    }

    #[test]
    fn test_just_below_threshold_is_idle() {
        let sample = UtilizationSample {
            cpu_percent: 4.99,
            network_in_bytes: 4999.9,
            network_out_bytes: 4999.9,
            disk_read_ops: 0.99,
            disk_write_ops: 0.99,
        };
        assert_eq!(classify(&IdleThresholds::default(), &sample), Verdict::Idle);
    }

    #[test]
    fn test_busy_cpu_is_active() {
        let sample = UtilizationSample { cpu_percent: 40.0, ..quiet() };
        assert_eq!(classify(&IdleThresholds::default(), &sample), Verdict::Active);
    }

    #[test]
    fn test_nan_reading_is_never_idle() {
        let sample = UtilizationSample { cpu_percent: f64::NAN, ..quiet() };
        assert_eq!(
            breaches(&IdleThresholds::default(), &sample),
            vec![MetricName::CpuUtilization]
        );
    }

    #[test]
    fn test_stop_message() {
        let message = stop_message("i-1");
        assert!(message.contains("`i-1`"));
        assert!(message.contains("Idle for over an hour"));
    }
}

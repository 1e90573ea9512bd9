//! Utilization sampling over a trailing window

use crate::error::Result;
use chrono::{DateTime, TimeDelta, Utc};
use idlestop_cloud::{CloudProvider, MetricName, MetricQuery};
use idlestop_config::{ConfigError, SamplingSettings};
use serde::Serialize;

/// Half-open window `[start, end)` and its aggregation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period_secs: i32,
}

impl SamplingWindow {
    /// Window of `settings.window_secs` ending at `end`
    pub fn trailing(end: DateTime<Utc>, settings: &SamplingSettings) -> Result<Self> {
        let start = TimeDelta::try_seconds(settings.window_secs)
            .and_then(|length| end.checked_sub_signed(length))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "sampling.window_secs {} does not fit before {}",
                    settings.window_secs, end
                ))
            })?;

        Ok(Self {
            start,
            end,
            period_secs: settings.period_secs,
        })
    }

    fn query(&self, instance_id: &str, metric: MetricName) -> MetricQuery {
        MetricQuery::new(instance_id, metric, self.start, self.end).with_period(self.period_secs)
    }
}

/// The five readings the idle policy looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UtilizationSample {
    pub cpu_percent: f64,
    pub network_in_bytes: f64,
    pub network_out_bytes: f64,
    pub disk_read_ops: f64,
    pub disk_write_ops: f64,
}

impl UtilizationSample {
    pub fn get(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::CpuUtilization => self.cpu_percent,
            MetricName::NetworkIn => self.network_in_bytes,
            MetricName::NetworkOut => self.network_out_bytes,
            MetricName::DiskReadOps => self.disk_read_ops,
            MetricName::DiskWriteOps => self.disk_write_ops,
        }
    }

    fn set(&mut self, metric: MetricName, value: f64) {
        match metric {
            MetricName::CpuUtilization => self.cpu_percent = value,
            MetricName::NetworkIn => self.network_in_bytes = value,
            MetricName::NetworkOut => self.network_out_bytes = value,
            MetricName::DiskReadOps => self.disk_read_ops = value,
            MetricName::DiskWriteOps => self.disk_write_ops = value,
        }
    }
}

/// Mean of the metric's data points in the window, or `0.0` when there are none
pub async fn sample_metric(
    provider: &dyn CloudProvider,
    instance_id: &str,
    metric: MetricName,
    window: &SamplingWindow,
) -> Result<f64> {
    let points = provider
        .get_metric_statistics(&window.query(instance_id, metric))
        .await?;

    if points.is_empty() {
        tracing::warn!("No data for {} on {}. Defaulting to 0.", metric, instance_id);
        return Ok(0.0);
    }

    let total: f64 = points.iter().map(|p| p.average).sum();
    Ok(total / points.len() as f64)
}

/// One provider call per metric, in a fixed order
pub async fn sample_instance(
    provider: &dyn CloudProvider,
    instance_id: &str,
    window: &SamplingWindow,
) -> Result<UtilizationSample> {
    let mut sample = UtilizationSample::default();
    for metric in MetricName::ALL {
        let value = sample_metric(provider, instance_id, metric, window).await?;
        sample.set(metric, value);
    }
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use idlestop_cloud::{Datapoint, InMemoryProvider};

    fn window() -> SamplingWindow {
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 16, 0, 0).unwrap();
        SamplingWindow::trailing(end, &SamplingSettings::default()).unwrap()
    }

    #[test]
    fn test_trailing_window() {
        let window = window();
        assert_eq!(window.end - window.start, Duration::hours(1));
        assert_eq!(window.period_secs, 300);
    }

    #[test]
    fn test_oversized_window_is_an_error() {
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 16, 0, 0).unwrap();
        for window_secs in [10_000_000_000_000, i64::MAX] {
            let settings = SamplingSettings {
                window_secs,
                period_secs: 300,
            };
            let err = SamplingWindow::trailing(end, &settings).unwrap_err();
            assert!(err.to_string().contains("window_secs"));
        }
    }

    #[tokio::test]
    async fn test_missing_data_is_zero() {
        let provider = InMemoryProvider::new();
        let value = sample_metric(&provider, "i-1", MetricName::CpuUtilization, &window())
            .await
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[tokio::test]
    async fn test_average_of_datapoints() {
        let window = window();
        let provider = InMemoryProvider::new().with_datapoints(
            "i-1",
            MetricName::CpuUtilization,
            vec![
                Datapoint::at(window.start, 2.0),
                Datapoint::at(window.start + Duration::minutes(5), 4.0),
                Datapoint::at(window.start + Duration::minutes(10), 9.0),
            ],
        );

        let value = sample_metric(&provider, "i-1", MetricName::CpuUtilization, &window)
            .await
            .unwrap();
        assert_eq!(value, 5.0);
    }

    #[tokio::test]
    async fn test_sample_instance_queries_each_metric_once() {
        let window = window();
        let provider = InMemoryProvider::new()
            .with_metric("i-1", MetricName::CpuUtilization, 12.5)
            .with_metric("i-1", MetricName::NetworkOut, 640.0);

        let sample = sample_instance(&provider, "i-1", &window).await.unwrap();

        assert_eq!(sample.cpu_percent, 12.5);
        assert_eq!(sample.network_out_bytes, 640.0);
        assert_eq!(sample.network_in_bytes, 0.0);

        let queries = provider.metric_queries();
        let metrics: Vec<MetricName> = queries.iter().map(|q| q.metric).collect();
        assert_eq!(metrics, MetricName::ALL.to_vec());
        assert!(queries.iter().all(|q| q.start == window.start
            && q.end == window.end
            && q.period_secs == 300
            && q.instance_id == "i-1"));
    }
}

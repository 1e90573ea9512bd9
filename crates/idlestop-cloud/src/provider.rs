//! Cloud provider trait definition

use crate::error::Result;
use crate::model::{Bucket, Datapoint, InstanceRecord, InstanceState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metric namespace for compute instance metrics
pub const EC2_NAMESPACE: &str = "AWS/EC2";

/// Default aggregation period for metric statistics (seconds)
pub const DEFAULT_PERIOD_SECS: i32 = 300;

/// Cloud provider abstraction trait
///
/// The narrow set of management calls the idle-stop workflow needs.
/// Implementations must not retry on their own beyond what the underlying
/// SDK already does.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws", "in-memory")
    fn name(&self) -> &str;

    /// List all storage buckets visible to the caller
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// Describe compute instances matching the filter
    async fn describe_instances(&self, filter: &InstanceFilter) -> Result<Vec<InstanceRecord>>;

    /// Fetch `Average` statistics for one metric of one instance
    async fn get_metric_statistics(&self, query: &MetricQuery) -> Result<Vec<Datapoint>>;

    /// Request a stop for the given instances
    async fn stop_instances(&self, instance_ids: &[String]) -> Result<()>;
}

/// Tag key/value pair used as a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Filter for `describe_instances`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceFilter {
    /// Only instances in this state
    pub state: Option<InstanceState>,

    /// Only instances carrying this tag
    pub tag: Option<TagFilter>,
}

impl InstanceFilter {
    /// All instances in the `running` state
    pub fn running() -> Self {
        Self {
            state: Some(InstanceState::Running),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: TagFilter) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Whether an instance satisfies this filter
    pub fn matches(&self, instance: &InstanceRecord) -> bool {
        let state_ok = self
            .state
            .as_ref()
            .is_none_or(|state| *state == instance.state);
        let tag_ok = self
            .tag
            .as_ref()
            .is_none_or(|tag| instance.has_tag(&tag.key, &tag.value));
        state_ok && tag_ok
    }
}

/// Compute instance metrics sampled by the idle policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricName {
    CpuUtilization,
    NetworkIn,
    NetworkOut,
    DiskReadOps,
    DiskWriteOps,
}

impl MetricName {
    pub const ALL: [MetricName; 5] = [
        MetricName::CpuUtilization,
        MetricName::NetworkIn,
        MetricName::NetworkOut,
        MetricName::DiskReadOps,
        MetricName::DiskWriteOps,
    ];

    /// Provider-side metric name
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CpuUtilization => "CPUUtilization",
            MetricName::NetworkIn => "NetworkIn",
            MetricName::NetworkOut => "NetworkOut",
            MetricName::DiskReadOps => "DiskReadOps",
            MetricName::DiskWriteOps => "DiskWriteOps",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query for one metric of one instance over `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub instance_id: String,
    pub metric: MetricName,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Aggregation bucket length in seconds
    pub period_secs: i32,
}

impl MetricQuery {
    pub fn new(
        instance_id: impl Into<String>,
        metric: MetricName,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            metric,
            start,
            end,
            period_secs: DEFAULT_PERIOD_SECS,
        }
    }

    pub fn with_period(mut self, period_secs: i32) -> Self {
        self.period_secs = period_secs;
        self
    }

    /// Whether a timestamp falls inside the half-open query window
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_running_filter_with_tag() {
        let filter = InstanceFilter::running().with_tag(TagFilter::new("Purpose", "test"));

        let tagged = InstanceRecord::running("i-1").with_tag("Purpose", "test");
        let untagged = InstanceRecord::running("i-2");
        let stopped = InstanceRecord::new("i-3", InstanceState::Stopped).with_tag("Purpose", "test");

        assert!(filter.matches(&tagged));
        assert!(!filter.matches(&untagged));
        assert!(!filter.matches(&stopped));
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = InstanceFilter::default();
        assert!(filter.matches(&InstanceRecord::new("i-1", InstanceState::Stopped)));
    }

    #[test]
    fn test_metric_query_window_is_half_open() {
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 16, 0, 0).unwrap();
        let start = end - Duration::hours(1);
        let query = MetricQuery::new("i-1", MetricName::CpuUtilization, start, end);

        assert!(query.contains(start));
        assert!(query.contains(end - Duration::seconds(1)));
        assert!(!query.contains(end));
        assert_eq!(query.period_secs, DEFAULT_PERIOD_SECS);
    }

    #[test]
    fn test_metric_names() {
        let names: Vec<&str> = MetricName::ALL.iter().map(MetricName::as_str).collect();
        assert_eq!(
            names,
            vec![
                "CPUUtilization",
                "NetworkIn",
                "NetworkOut",
                "DiskReadOps",
                "DiskWriteOps"
            ]
        );
    }
}

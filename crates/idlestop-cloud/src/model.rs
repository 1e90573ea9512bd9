//! Resource records returned by providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a compute instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Unknown(String),
}

impl InstanceState {
    /// Provider-side state name, as used in `instance-state-name` filters
    pub fn as_str(&self) -> &str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::Unknown(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => InstanceState::Pending,
            "running" => InstanceState::Running,
            "shutting-down" => InstanceState::ShuttingDown,
            "terminated" => InstanceState::Terminated,
            "stopping" => InstanceState::Stopping,
            "stopped" => InstanceState::Stopped,
            other => InstanceState::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compute instance as seen during one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Opaque provider identifier (e.g. `i-0abc...`)
    pub instance_id: String,

    /// Current lifecycle state
    pub state: InstanceState,

    /// Tag key to tag value
    pub tags: BTreeMap<String, String>,
}

impl InstanceRecord {
    pub fn new(instance_id: impl Into<String>, state: InstanceState) -> Self {
        Self {
            instance_id: instance_id.into(),
            state,
            tags: BTreeMap::new(),
        }
    }

    pub fn running(instance_id: impl Into<String>) -> Self {
        Self::new(instance_id, InstanceState::Running)
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tag(key) == Some(value)
    }
}

/// A storage bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }
}

/// One aggregated metric reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    /// Start of the aggregation bucket, when the provider reports it
    pub timestamp: Option<DateTime<Utc>>,

    /// `Average` statistic for the bucket
    pub average: f64,
}

impl Datapoint {
    pub fn new(average: f64) -> Self {
        Self {
            timestamp: None,
            average,
        }
    }

    pub fn at(timestamp: DateTime<Utc>, average: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_state_round_trip_names() {
        for name in ["pending", "running", "shutting-down", "stopped"] {
            assert_eq!(InstanceState::from_name(name).as_str(), name);
        }
        assert_eq!(
            InstanceState::from_name("rebooting"),
            InstanceState::Unknown("rebooting".to_string())
        );
    }

    #[test]
    fn test_instance_tags() {
        let instance = InstanceRecord::running("i-1")
            .with_tag("Purpose", "test")
            .with_tag("DoNotStop", "True");

        assert!(instance.has_tag("Purpose", "test"));
        assert!(!instance.has_tag("Purpose", "prod"));
        assert_eq!(instance.tag("DoNotStop"), Some("True"));
        assert_eq!(instance.tag("Owner"), None);
    }
}

//! In-memory provider
//!
//! Holds a fixed inventory and records every call made against it, so the
//! idle-stop workflow can be driven without a cloud account.

use crate::error::{CloudError, Result};
use crate::model::{Bucket, Datapoint, InstanceRecord, InstanceState};
use crate::provider::{CloudProvider, InstanceFilter, MetricName, MetricQuery};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inventory {
    buckets: Vec<Bucket>,
    instances: Vec<InstanceRecord>,
    metrics: HashMap<(String, MetricName), Vec<Datapoint>>,
    metric_queries: Vec<MetricQuery>,
    stop_requests: Vec<Vec<String>>,
    describe_calls: usize,
    fail_with: Option<String>,
    stop_failures: HashMap<String, String>,
}

/// Provider backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    inventory: Mutex<Inventory>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: Bucket) -> Self {
        self.lock().buckets.push(bucket);
        self
    }

    pub fn with_instance(self, instance: InstanceRecord) -> Self {
        self.lock().instances.push(instance);
        self
    }

    /// Register data points for one metric of one instance
    pub fn with_datapoints(
        self,
        instance_id: impl Into<String>,
        metric: MetricName,
        datapoints: Vec<Datapoint>,
    ) -> Self {
        self.lock()
            .metrics
            .insert((instance_id.into(), metric), datapoints);
        self
    }

    /// Register a single untimestamped reading for one metric
    pub fn with_metric(
        self,
        instance_id: impl Into<String>,
        metric: MetricName,
        value: f64,
    ) -> Self {
        self.with_datapoints(instance_id, metric, vec![Datapoint::new(value)])
    }

    /// Make every subsequent call fail with an API error
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.lock().fail_with = Some(message.into());
        self
    }

    /// Make `stop_instances` fail for one instance; every other call succeeds
    pub fn failing_stop(
        self,
        instance_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.lock()
            .stop_failures
            .insert(instance_id.into(), message.into());
        self
    }

    /// Metric queries received so far, in call order
    pub fn metric_queries(&self) -> Vec<MetricQuery> {
        self.lock().metric_queries.clone()
    }

    /// Instance ids passed to each `stop_instances` call, in call order
    pub fn stop_requests(&self) -> Vec<Vec<String>> {
        self.lock().stop_requests.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.lock().describe_calls
    }

    /// Current state of an instance
    pub fn instance_state(&self, instance_id: &str) -> Option<InstanceState> {
        self.lock()
            .instances
            .iter()
            .find(|i| i.instance_id == instance_id)
            .map(|i| i.state.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failure(inventory: &Inventory) -> Result<()> {
        match &inventory.fail_with {
            Some(message) => Err(CloudError::ApiError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CloudProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let inventory = self.lock();
        Self::check_failure(&inventory)?;
        Ok(inventory.buckets.clone())
    }

    async fn describe_instances(&self, filter: &InstanceFilter) -> Result<Vec<InstanceRecord>> {
        let mut inventory = self.lock();
        Self::check_failure(&inventory)?;
        inventory.describe_calls += 1;

        Ok(inventory
            .instances
            .iter()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect())
    }

    async fn get_metric_statistics(&self, query: &MetricQuery) -> Result<Vec<Datapoint>> {
        let mut inventory = self.lock();
        Self::check_failure(&inventory)?;
        inventory.metric_queries.push(query.clone());

        let key = (query.instance_id.clone(), query.metric);
        Ok(inventory
            .metrics
            .get(&key)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.timestamp.is_none_or(|ts| query.contains(ts)))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn stop_instances(&self, instance_ids: &[String]) -> Result<()> {
        let mut inventory = self.lock();
        Self::check_failure(&inventory)?;

        for id in instance_ids {
            if !inventory.instances.iter().any(|i| &i.instance_id == id) {
                return Err(CloudError::ResourceNotFound(id.clone()));
            }
            if let Some(message) = inventory.stop_failures.get(id) {
                return Err(CloudError::ApiError(message.clone()));
            }
        }

        inventory.stop_requests.push(instance_ids.to_vec());
        for instance in inventory
            .instances
            .iter_mut()
            .filter(|i| instance_ids.contains(&i.instance_id))
        {
            instance.state = InstanceState::Stopping;
        }

        tracing::debug!("in-memory stop: {}", instance_ids.join(", "));
        Ok(())
    }
}

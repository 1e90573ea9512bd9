//! idlestop Cloud Abstraction
//!
//! This crate defines the narrow provider interface the idle-stop workflow
//! runs against, the records it exchanges, and an in-memory provider for
//! exercising the workflow without a cloud account.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            idlestop CLI / Lambda                 │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                idlestop-core                     │
//! │   enumerate → sample → evaluate → stop/notify    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                idlestop-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait CloudProvider                      │   │
//! │  │    list_buckets / describe_instances      │   │
//! │  │    get_metric_statistics / stop_instances │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │  aws provider │ │   in-memory   │
//! └───────────────┘ └───────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod model;
pub mod provider;

// Re-exports
pub use error::{CloudError, Result};
pub use memory::InMemoryProvider;
pub use model::{Bucket, Datapoint, InstanceRecord, InstanceState};
pub use provider::{
    CloudProvider, DEFAULT_PERIOD_SECS, EC2_NAMESPACE, InstanceFilter, MetricName, MetricQuery,
    TagFilter,
};

//! AWS provider for idlestop
//!
//! Implements [`idlestop_cloud::CloudProvider`] on top of the AWS SDK:
//!
//! - `describe_instances` / `stop_instances` via EC2
//! - `get_metric_statistics` via CloudWatch (`AWS/EC2` namespace, `Average`)
//! - `list_buckets` via S3
//!
//! Credentials come from the default provider chain (env, profile, IMDS, or
//! the Lambda execution role). SDK-level retries are left at their defaults.
//!
//! # Example
//!
//! ```ignore
//! use idlestop_cloud::{CloudProvider, InstanceFilter};
//! use idlestop_cloud_aws::AwsProvider;
//!
//! let provider = AwsProvider::from_region("ap-south-1").await;
//! let running = provider.describe_instances(&InstanceFilter::running()).await?;
//! ```

mod convert;
pub mod error;
pub mod provider;

pub use error::{AwsError, Result};
pub use provider::AwsProvider;

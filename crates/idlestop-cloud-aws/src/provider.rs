//! AWS provider implementation
//!
//! EC2 for instances, CloudWatch for metric statistics, S3 for buckets.

use crate::convert;
use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use idlestop_cloud::{
    Bucket, CloudProvider, Datapoint, EC2_NAMESPACE, InstanceFilter, InstanceRecord, MetricQuery,
};

const EC2: &str = "ec2";
const CLOUDWATCH: &str = "cloudwatch";
const S3: &str = "s3";

/// AWS provider
pub struct AwsProvider {
    region: String,
    ec2: aws_sdk_ec2::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    s3: aws_sdk_s3::Client,
}

impl AwsProvider {
    /// Build clients from the default credential chain, pinned to `region`
    pub async fn from_region(region: impl Into<String>) -> Self {
        let region = region.into();
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;
        Self::from_sdk_config(region, &config)
    }

    pub fn from_sdk_config(region: impl Into<String>, config: &SdkConfig) -> Self {
        Self {
            region: region.into(),
            ec2: aws_sdk_ec2::Client::new(config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn list_buckets(&self) -> idlestop_cloud::Result<Vec<Bucket>> {
        tracing::debug!("s3:ListBuckets");
        let output = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(S3, e))?;

        Ok(output.buckets().iter().filter_map(convert::bucket).collect())
    }

    async fn describe_instances(
        &self,
        filter: &InstanceFilter,
    ) -> idlestop_cloud::Result<Vec<InstanceRecord>> {
        let filters = convert::ec2_filters(filter);
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            tracing::debug!(region = %self.region, "ec2:DescribeInstances {:?}", filter);
            let output = self
                .ec2
                .describe_instances()
                .set_filters((!filters.is_empty()).then(|| filters.clone()))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AwsError::from_sdk(EC2, e))?;

            instances.extend(
                output
                    .reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .filter_map(convert::instance_record),
            );

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(instances)
    }

    async fn get_metric_statistics(
        &self,
        query: &MetricQuery,
    ) -> idlestop_cloud::Result<Vec<Datapoint>> {
        tracing::debug!(
            "cloudwatch:GetMetricStatistics {} {} [{} .. {})",
            query.instance_id,
            query.metric,
            query.start,
            query.end
        );
        let output = self
            .cloudwatch
            .get_metric_statistics()
            .namespace(EC2_NAMESPACE)
            .metric_name(query.metric.as_str())
            .dimensions(
                Dimension::builder()
                    .name("InstanceId")
                    .value(query.instance_id.clone())
                    .build(),
            )
            .start_time(convert::to_smithy(query.start))
            .end_time(convert::to_smithy(query.end))
            .period(query.period_secs)
            .statistics(Statistic::Average)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(CLOUDWATCH, e))?;

        Ok(output
            .datapoints()
            .iter()
            .filter_map(convert::datapoint)
            .collect())
    }

    async fn stop_instances(&self, instance_ids: &[String]) -> idlestop_cloud::Result<()> {
        if instance_ids.is_empty() {
            return Ok(());
        }

        tracing::debug!("ec2:StopInstances {}", instance_ids.join(", "));
        let output = self
            .ec2
            .stop_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(EC2, e))?;

        for change in output.stopping_instances() {
            tracing::debug!(
                "{}: {} -> {}",
                change.instance_id().unwrap_or("?"),
                change
                    .previous_state()
                    .and_then(|s| s.name())
                    .map(|n| n.as_str())
                    .unwrap_or("?"),
                change
                    .current_state()
                    .and_then(|s| s.name())
                    .map(|n| n.as_str())
                    .unwrap_or("?"),
            );
        }
        Ok(())
    }
}

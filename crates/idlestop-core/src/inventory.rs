//! Read-only listings: storage buckets and running instances

use crate::enumerator;
use crate::error::Result;
use idlestop_cloud::{Bucket, CloudProvider, InstanceRecord};
use idlestop_config::TagSetting;
use serde::Serialize;

pub const BUCKET_LIST_BODY: &str = "Bucket list printed to logs";

/// Handler response for the bucket listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketListResponse {
    pub status_code: u16,
    pub body: String,
    #[serde(skip)]
    pub buckets: Vec<Bucket>,
}

/// List every bucket and log its name
pub async fn list_buckets(provider: &dyn CloudProvider) -> Result<BucketListResponse> {
    let buckets = provider.list_buckets().await?;

    tracing::info!("Existing Buckets");
    for bucket in &buckets {
        tracing::info!("{}", bucket.name);
    }

    Ok(BucketListResponse {
        status_code: 200,
        body: BUCKET_LIST_BODY.to_string(),
        buckets,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceListing {
    pub instances: Vec<InstanceRecord>,
}

/// Running instances with their tags, optionally restricted to one tag
pub async fn list_instances(
    provider: &dyn CloudProvider,
    tag: Option<&TagSetting>,
) -> Result<InstanceListing> {
    let instances = enumerator::running_instances(provider, tag).await?;

    if instances.is_empty() {
        tracing::info!("NO running Instance");
    } else {
        tracing::info!("Running EC2 Instances are: ");
        for instance in &instances {
            tracing::info!("InstanceId : {} , Tags: {:?}", instance.instance_id, instance.tags);
        }
    }

    Ok(InstanceListing { instances })
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlestop_cloud::InMemoryProvider;

    #[tokio::test]
    async fn test_list_buckets_response() {
        let provider = InMemoryProvider::new()
            .with_bucket(Bucket::new("assets"))
            .with_bucket(Bucket::new("logs"));

        let response = list_buckets(&provider).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.buckets.len(), 2);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "statusCode": 200, "body": "Bucket list printed to logs" })
        );
    }

    #[tokio::test]
    async fn test_list_buckets_propagates_failure() {
        let provider = InMemoryProvider::new().failing("AccessDenied");
        assert!(list_buckets(&provider).await.is_err());
    }

    #[tokio::test]
    async fn test_list_instances() {
        let provider = InMemoryProvider::new()
            .with_instance(InstanceRecord::running("i-1").with_tag("Purpose", "test"))
            .with_instance(InstanceRecord::running("i-2"));

        let all = list_instances(&provider, None).await.unwrap();
        assert_eq!(all.instances.len(), 2);

        let tagged = list_instances(&provider, Some(&TagSetting::new("Purpose", "test")))
            .await
            .unwrap();
        assert_eq!(tagged.instances.len(), 1);
        assert_eq!(tagged.instances[0].instance_id, "i-1");
    }
}

//! Instance enumeration

use crate::error::Result;
use idlestop_cloud::{CloudProvider, InstanceFilter, InstanceRecord, TagFilter};
use idlestop_config::TagSetting;
use std::collections::HashSet;

pub(crate) fn tag_filter(tag: &TagSetting) -> TagFilter {
    TagFilter::new(&tag.key, &tag.value)
}

/// Running instances, optionally restricted to those carrying `tag`
pub async fn running_instances(
    provider: &dyn CloudProvider,
    tag: Option<&TagSetting>,
) -> Result<Vec<InstanceRecord>> {
    let mut filter = InstanceFilter::running();
    if let Some(tag) = tag {
        filter = filter.with_tag(tag_filter(tag));
    }
    Ok(provider.describe_instances(&filter).await?)
}

/// Ids of running instances protected by the exemption tag
pub async fn exempt_instance_ids(
    provider: &dyn CloudProvider,
    exemption: &TagSetting,
) -> Result<HashSet<String>> {
    let instances = running_instances(provider, Some(exemption)).await?;
    Ok(instances.into_iter().map(|i| i.instance_id).collect())
}

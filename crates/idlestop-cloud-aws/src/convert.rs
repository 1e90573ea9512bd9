//! Conversions between SDK shapes and idlestop records

use aws_sdk_cloudwatch::primitives::DateTime as SmithyDateTime;
use aws_sdk_cloudwatch::types::Datapoint as CwDatapoint;
use aws_sdk_ec2::types::{Filter, Instance};
use chrono::{DateTime, Utc};
use idlestop_cloud::{Bucket, Datapoint, InstanceFilter, InstanceRecord, InstanceState};

/// Build EC2 `describe_instances` filters
pub(crate) fn ec2_filters(filter: &InstanceFilter) -> Vec<Filter> {
    let mut filters = Vec::new();
    if let Some(state) = &filter.state {
        filters.push(
            Filter::builder()
                .name("instance-state-name")
                .values(state.as_str())
                .build(),
        );
    }
    if let Some(tag) = &filter.tag {
        filters.push(
            Filter::builder()
                .name(format!("tag:{}", tag.key))
                .values(tag.value.clone())
                .build(),
        );
    }
    filters
}

/// Instances without an id are dropped
pub(crate) fn instance_record(instance: &Instance) -> Option<InstanceRecord> {
    let instance_id = instance.instance_id()?;
    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(|name| InstanceState::from_name(name.as_str()))
        .unwrap_or_else(|| InstanceState::Unknown("unknown".to_string()));

    let mut record = InstanceRecord::new(instance_id, state);
    for tag in instance.tags() {
        if let (Some(key), Some(value)) = (tag.key(), tag.value()) {
            record.tags.insert(key.to_string(), value.to_string());
        }
    }
    Some(record)
}

/// Points without an `Average` are dropped
pub(crate) fn datapoint(point: &CwDatapoint) -> Option<Datapoint> {
    let average = point.average()?;
    Some(Datapoint {
        timestamp: point.timestamp().and_then(from_smithy),
        average,
    })
}

pub(crate) fn bucket(bucket: &aws_sdk_s3::types::Bucket) -> Option<Bucket> {
    Some(Bucket {
        name: bucket.name()?.to_string(),
        created_at: bucket.creation_date().and_then(|d| {
            DateTime::from_timestamp(d.secs(), d.subsec_nanos())
        }),
    })
}

pub(crate) fn to_smithy(time: DateTime<Utc>) -> SmithyDateTime {
    SmithyDateTime::from_secs_and_nanos(time.timestamp(), time.timestamp_subsec_nanos())
}

pub(crate) fn from_smithy(time: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

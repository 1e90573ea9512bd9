//! Idle-stop workflow and the schedule gate in front of it

use crate::clock::Clock;
use crate::enumerator::{exempt_instance_ids, running_instances};
use crate::error::Result;
use crate::inventory::{self, BucketListResponse, InstanceListing};
use crate::notify::Notifier;
use crate::policy::{self, Verdict};
use crate::sampler::{SamplingWindow, sample_instance};
use chrono::{DateTime, Timelike, Utc};
use idlestop_cloud::CloudProvider;
use idlestop_config::{Settings, TagSetting, TriggerTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// What an invocation should do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    #[default]
    IdleStop,
    ListBuckets,
    ListInstances,
}

/// Invocation payload; unknown fields (e.g. scheduler metadata) are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEvent {
    /// Skip the clock gate and stop idle instances now
    #[serde(default)]
    pub manual: bool,

    #[serde(default)]
    pub task: Task,
}

impl InvocationEvent {
    pub fn manual() -> Self {
        Self {
            manual: true,
            task: Task::IdleStop,
        }
    }

    pub fn scheduled() -> Self {
        Self::default()
    }
}

/// Result of one pass of the idle-stop workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopReport {
    pub window: SamplingWindow,
    pub stopped: Vec<String>,
    pub active: Vec<String>,
    pub exempt: Vec<String>,
}

/// Result of the warning step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningReport {
    /// Instances named in the warning
    pub instance_ids: Vec<String>,
    /// Whether a notification went out
    pub sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum InvocationOutcome {
    Manual {
        report: StopReport,
    },
    Scheduled {
        at: DateTime<Utc>,
        warning: Option<WarningReport>,
        stop: Option<StopReport>,
    },
}

impl InvocationOutcome {
    /// Whether the invocation took any action
    pub fn acted(&self) -> bool {
        match self {
            InvocationOutcome::Manual { .. } => true,
            InvocationOutcome::Scheduled { warning, stop, .. } => {
                warning.is_some() || stop.is_some()
            }
        }
    }
}

/// Handler output for any task
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HandlerOutput {
    IdleStop(InvocationOutcome),
    Buckets(BucketListResponse),
    Instances(InstanceListing),
}

/// Warning text listing the instances due to be stopped
pub fn warning_message(
    instance_ids: &[String],
    exemption: &TagSetting,
    deadline: TriggerTime,
) -> String {
    let mut message = format!(
        "**Reminder:** The following EC2 instances will be stopped at {deadline} UTC unless they are tagged with `{exemption}`:\n"
    );
    for id in instance_ids {
        let _ = writeln!(message, "- `{id}`");
    }
    let _ = write!(
        message,
        "\nTo keep an instance running, add the tag `{exemption}` before {deadline} UTC."
    );
    message
}

/// Everything one invocation runs against
pub struct Workflow<'a> {
    provider: &'a dyn CloudProvider,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
    settings: &'a Settings,
}

impl<'a> Workflow<'a> {
    pub fn new(
        provider: &'a dyn CloudProvider,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
        settings: &'a Settings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            provider,
            notifier,
            clock,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Dispatch an event to its task
    pub async fn handle(&self, event: &InvocationEvent) -> Result<HandlerOutput> {
        match event.task {
            Task::IdleStop => Ok(HandlerOutput::IdleStop(self.invoke(event).await?)),
            Task::ListBuckets => Ok(HandlerOutput::Buckets(
                inventory::list_buckets(self.provider).await?,
            )),
            Task::ListInstances => Ok(HandlerOutput::Instances(
                inventory::list_instances(self.provider, None).await?,
            )),
        }
    }

    /// Schedule gate
    ///
    /// Manual events stop idle instances immediately and never warn. Otherwise
    /// the warning and the stop each run only when the clock's UTC hour and
    /// minute equal their trigger time; there is no catch-up for a missed
    /// minute.
    pub async fn invoke(&self, event: &InvocationEvent) -> Result<InvocationOutcome> {
        let now = self.clock.now();

        if event.manual {
            tracing::info!("Manual execution triggered. Stopping idle instances now...");
            let report = self.stop_idle_instances_at(now).await?;
            return Ok(InvocationOutcome::Manual { report });
        }

        let schedule = &self.settings.schedule;
        let (hour, minute) = (now.hour(), now.minute());

        let warning = if schedule.warning_at.matches(hour, minute) {
            Some(self.send_warning().await?)
        } else {
            None
        };

        let stop = if schedule.stop_at.matches(hour, minute) {
            Some(self.stop_idle_instances_at(now).await?)
        } else {
            None
        };

        if warning.is_none() && stop.is_none() {
            tracing::debug!(
                "{:02}:{:02} UTC matches no trigger (warning {}, stop {})",
                hour,
                minute,
                schedule.warning_at,
                schedule.stop_at
            );
        }

        Ok(InvocationOutcome::Scheduled {
            at: now,
            warning,
            stop,
        })
    }

    /// Warn about every running target instance, exempt or not
    pub async fn send_warning(&self) -> Result<WarningReport> {
        let instances = running_instances(self.provider, Some(&self.settings.target_tag)).await?;
        let instance_ids: Vec<String> = instances.into_iter().map(|i| i.instance_id).collect();

        if instance_ids.is_empty() {
            tracing::info!("No running instances to warn about");
            return Ok(WarningReport {
                instance_ids,
                sent: false,
            });
        }

        let message = warning_message(
            &instance_ids,
            &self.settings.exemption_tag,
            self.settings.schedule.stop_at,
        );
        self.notifier.notify(&message).await;
        tracing::info!("Sent stop warning for {} instance(s)", instance_ids.len());

        Ok(WarningReport {
            instance_ids,
            sent: true,
        })
    }

    /// Stop idle instances, sampling over the window ending now
    pub async fn stop_idle_instances(&self) -> Result<StopReport> {
        self.stop_idle_instances_at(self.clock.now()).await
    }

    async fn stop_idle_instances_at(&self, now: DateTime<Utc>) -> Result<StopReport> {
        let settings = self.settings;
        let window = SamplingWindow::trailing(now, &settings.sampling)?;
        let instances = running_instances(self.provider, Some(&settings.target_tag)).await?;
        let exempt = exempt_instance_ids(self.provider, &settings.exemption_tag).await?;

        let mut report = StopReport {
            window,
            stopped: Vec::new(),
            active: Vec::new(),
            exempt: Vec::new(),
        };

        for instance in instances {
            let instance_id = instance.instance_id;

            if exempt.contains(&instance_id) {
                tracing::info!(
                    "Instance {} has '{}' tag. Skipping...",
                    instance_id,
                    settings.exemption_tag.key
                );
                report.exempt.push(instance_id);
                continue;
            }

            let sample = sample_instance(self.provider, &instance_id, &window).await?;
            tracing::info!(
                instance = %instance_id,
                cpu_percent = sample.cpu_percent,
                network_in_bytes = sample.network_in_bytes,
                network_out_bytes = sample.network_out_bytes,
                disk_read_ops = sample.disk_read_ops,
                disk_write_ops = sample.disk_write_ops,
                "Instance metrics"
            );

            match policy::classify(&settings.thresholds, &sample) {
                Verdict::Idle => {
                    tracing::info!("Instance {} is idle. Stopping it...", instance_id);
                    self.provider
                        .stop_instances(std::slice::from_ref(&instance_id))
                        .await?;
                    self.notifier
                        .notify(&policy::stop_message(&instance_id))
                        .await;
                    report.stopped.push(instance_id);
                }
                Verdict::Active => {
                    let busy: Vec<String> = policy::breaches(&settings.thresholds, &sample)
                        .iter()
                        .map(|m| m.to_string())
                        .collect();
                    tracing::info!(
                        "Instance {} is active ({}). Keeping it running.",
                        instance_id,
                        busy.join(", ")
                    );
                    report.active.push(instance_id);
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_defaults_to_scheduled_idle_stop() {
        let event: InvocationEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event, InvocationEvent::scheduled());

        let event: InvocationEvent = serde_json::from_value(serde_json::json!({
            "version": "0",
            "detail-type": "Scheduled Event",
            "source": "aws.events",
            "detail": {}
        }))
        .unwrap();
        assert!(!event.manual);
        assert_eq!(event.task, Task::IdleStop);
    }

    #[test]
    fn test_event_parsing() {
        let event: InvocationEvent = serde_json::from_str(r#"{"manual": true}"#).unwrap();
        assert_eq!(event, InvocationEvent::manual());

        let event: InvocationEvent =
            serde_json::from_str(r#"{"task": "list-buckets"}"#).unwrap();
        assert_eq!(event.task, Task::ListBuckets);

        assert!(serde_json::from_str::<InvocationEvent>(r#"{"task": "reboot"}"#).is_err());
    }

    #[test]
    fn test_warning_message() {
        let message = warning_message(
            &["i-1".to_string(), "i-2".to_string()],
            &TagSetting::new("DoNotStop", "True"),
            TriggerTime::new(16, 0).unwrap(),
        );

        assert_eq!(
            message,
            "**Reminder:** The following EC2 instances will be stopped at 16:00 UTC unless they are tagged with `DoNotStop=True`:\n\
             - `i-1`\n\
             - `i-2`\n\
             \n\
             To keep an instance running, add the tag `DoNotStop=True` before 16:00 UTC."
        );
    }
}

//! idlestop core
//!
//! Stops running instances that have sat idle over a trailing window.
//!
//! One invocation is one linear pass:
//!
//! 1. enumerate running instances carrying the target tag, and the ids of
//!    those carrying the exemption tag
//! 2. sample five utilization metrics per non-exempt instance
//! 3. stop (then notify about) every instance whose readings are all below
//!    their thresholds
//!
//! A schedule gate in front of the pass sends a warning at one UTC minute and
//! runs the pass at another; a manual event bypasses the gate.
//!
//! # Example
//!
//! ```ignore
//! use idlestop_core::{InvocationEvent, SystemClock, WebhookNotifier, Workflow};
//!
//! let settings = idlestop_config::load_settings()?;
//! let provider = idlestop_cloud_aws::AwsProvider::from_region(&settings.region).await;
//! let notifier = WebhookNotifier::from_settings(&settings.notifications);
//! let workflow = Workflow::new(&provider, &notifier, &SystemClock, &settings)?;
//!
//! let outcome = workflow.invoke(&InvocationEvent::manual()).await?;
//! ```

pub mod clock;
pub mod enumerator;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod policy;
pub mod sampler;
pub mod workflow;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{IdleStopError, Result};
pub use inventory::{BucketListResponse, InstanceListing};
pub use notify::{Notifier, RecordingNotifier, WebhookKind, WebhookNotifier};
pub use policy::Verdict;
pub use sampler::{SamplingWindow, UtilizationSample};
pub use workflow::{
    HandlerOutput, InvocationEvent, InvocationOutcome, StopReport, Task, WarningReport, Workflow,
    warning_message,
};

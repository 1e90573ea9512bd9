use colored::Colorize;
use idlestop_cloud::CloudProvider;
use idlestop_config::{Settings, TriggerTime};
use idlestop_core::{
    Clock, FixedClock, InvocationEvent, InvocationOutcome, StopReport, SystemClock,
    WarningReport, WebhookNotifier, Workflow,
};

pub async fn handle(
    provider: &dyn CloudProvider,
    settings: &Settings,
    manual: bool,
    at: Option<TriggerTime>,
    json: bool,
) -> anyhow::Result<()> {
    let clock: Box<dyn Clock> = match at {
        Some(time) => Box::new(
            FixedClock::today_at(time.hour, time.minute)
                .ok_or_else(|| anyhow::anyhow!("invalid time: {}", time))?,
        ),
        None => Box::new(SystemClock),
    };
    let notifier = WebhookNotifier::from_settings(&settings.notifications);
    let workflow = Workflow::new(provider, &notifier, clock.as_ref(), settings)?;

    let event = if manual {
        InvocationEvent::manual()
    } else {
        InvocationEvent::scheduled()
    };
    let outcome = workflow.invoke(&event).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome {
        InvocationOutcome::Manual { report } => {
            println!("{}", "Manual run".cyan().bold());
            print_stop_report(report);
        }
        InvocationOutcome::Scheduled { at, warning, stop } => {
            println!(
                "Scheduled run at {} (warning {}, stop {})",
                at.format("%H:%M UTC").to_string().cyan(),
                settings.schedule.warning_at,
                settings.schedule.stop_at
            );
            if let Some(warning) = warning {
                print_warning_report(warning);
            }
            if let Some(report) = stop {
                print_stop_report(report);
            }
            if !outcome.acted() {
                println!("{}", "No trigger matched; nothing to do".dimmed());
            }
        }
    }

    Ok(())
}

pub async fn handle_warn(provider: &dyn CloudProvider, settings: &Settings) -> anyhow::Result<()> {
    let notifier = WebhookNotifier::from_settings(&settings.notifications);
    let workflow = Workflow::new(provider, &notifier, &SystemClock, settings)?;

    let report = workflow.send_warning().await?;
    print_warning_report(&report);
    Ok(())
}

fn print_warning_report(report: &WarningReport) {
    if report.sent {
        println!(
            "{} warning sent for {} instance(s)",
            "✓".green(),
            report.instance_ids.len()
        );
        for id in &report.instance_ids {
            println!("  - {}", id);
        }
    } else {
        println!("{}", "No running instances to warn about".dimmed());
    }
}

fn print_stop_report(report: &StopReport) {
    println!(
        "Window: {} .. {}",
        report.window.start.format("%Y-%m-%d %H:%M"),
        report.window.end.format("%Y-%m-%d %H:%M UTC")
    );

    if report.stopped.is_empty() && report.active.is_empty() && report.exempt.is_empty() {
        println!("{}", "No matching running instances".dimmed());
        return;
    }

    for id in &report.stopped {
        println!("  {} {:<22} {}", "■".red(), id, "stopped (idle)".red());
    }
    for id in &report.active {
        println!("  {} {:<22} {}", "●".green(), id, "active".green());
    }
    for id in &report.exempt {
        println!("  {} {:<22} {}", "○".yellow(), id, "exempt".yellow());
    }
}

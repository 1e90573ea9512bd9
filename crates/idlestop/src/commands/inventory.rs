use colored::Colorize;
use idlestop_cloud::CloudProvider;
use idlestop_config::Settings;
use idlestop_core::inventory;

pub async fn handle_instances(
    provider: &dyn CloudProvider,
    settings: &Settings,
    all: bool,
) -> anyhow::Result<()> {
    let tag = (!all).then_some(&settings.target_tag);
    let listing = inventory::list_instances(provider, tag).await?;

    if listing.instances.is_empty() {
        println!("{}", "NO running Instance".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<22} {:<10} {}", "INSTANCE ID", "STATE", "TAGS").bold()
    );
    println!("{}", "─".repeat(70).dimmed());
    for instance in &listing.instances {
        let tags = instance
            .tags
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<22} {:<10} {}",
            instance.instance_id.cyan(),
            instance.state.to_string().green(),
            tags
        );
    }
    Ok(())
}

pub async fn handle_buckets(provider: &dyn CloudProvider) -> anyhow::Result<()> {
    let response = inventory::list_buckets(provider).await?;

    println!("{}", "Existing Buckets".bold());
    if response.buckets.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for bucket in &response.buckets {
        match bucket.created_at {
            Some(created) => println!(
                "{}  {}",
                bucket.name.cyan(),
                created.format("%Y-%m-%d").to_string().dimmed()
            ),
            None => println!("{}", bucket.name.cyan()),
        }
    }
    Ok(())
}

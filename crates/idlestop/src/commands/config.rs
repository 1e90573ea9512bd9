use idlestop_config::Settings;

pub fn handle(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", settings.to_yaml()?);
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use vjoy_remap_lib::{AppConfig, RemapProfile, VirtualDeviceSource};

#[derive(Parser)]
#[command(
    name = "vjoy-remap",
    about = "Inspect a remap profile and fill in unassigned vJoy targets"
)]
struct Args {
    /// Profile XML file
    profile: PathBuf,

    /// Config file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pick vJoy targets for rules that have none
    #[arg(long)]
    resolve: bool,

    /// Write the profile back after resolving
    #[arg(long, requires = "resolve")]
    write: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load config")?;

    let (mut profile, skipped) = RemapProfile::load(&args.profile)
        .with_context(|| format!("failed to load profile {}", args.profile.display()))?;
    for entry in &skipped {
        eprintln!("skipped entry {}: {}", entry.index, entry.error);
    }

    if args.resolve {
        let catalog = config.enumerate_virtual_devices()?;
        let resolved = profile.resolve_defaults(&catalog)?;
        info!("{} rules received a default target", resolved);
    }

    for entry in profile.entries() {
        let target = entry.rule.target();
        let condition = match entry.rule.condition() {
            Some(c) => format!(" press={} release={}", c.on_press, c.on_release),
            None => String::new(),
        };
        println!(
            "device {} {:?} {} -> vjoy {} {} {}{}",
            entry.input.device_id,
            entry.input.kind,
            entry.input.input_id,
            target.device_id,
            target.kind.display_name(),
            target.input_id,
            condition
        );
    }

    if args.write {
        profile.save(&args.profile)?;
    }

    Ok(())
}

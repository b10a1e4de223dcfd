//! `avas config` - show or change the persisted output path preference.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::settings::Settings;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write outputs next to the executable
    #[arg(long, conflicts_with = "output_path")]
    use_default_path: bool,

    /// Write outputs under this folder instead
    #[arg(long)]
    output_path: Option<PathBuf>,
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    let mut settings = Settings::load();

    if !args.use_default_path && args.output_path.is_none() {
        let custom = if settings.custom_output_path.is_empty() {
            "(unset)"
        } else {
            settings.custom_output_path.as_str()
        };
        println!("use_default_path   : {}", settings.use_default_path);
        println!("custom_output_path : {custom}");
        println!("output base        : {}", settings.output_base().display());
        return Ok(());
    }

    if args.use_default_path {
        settings.use_default_path = true;
    }
    if let Some(path) = args.output_path {
        settings.custom_output_path = path.to_string_lossy().into_owned();
        settings.use_default_path = false;
    }
    settings.save()?;
    println!("Settings saved to {}", Settings::path().display());
    Ok(())
}

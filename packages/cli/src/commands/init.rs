use anyhow::Result;
use ara_media::{MediaConfig, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Upload endpoint (multipart POST)
    #[arg(short, long)]
    pub upload_url: Option<String>,

    /// Prefix of the public URL of stored images
    #[arg(short, long)]
    pub public_path: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = MediaConfig::path_in(cwd);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!("{} {} already exists", "⚠️".yellow(), DEFAULT_CONFIG_NAME.bright_white());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let mut config = MediaConfig::default();
    if let Some(url) = args.upload_url {
        config.upload_url = url;
    }
    if let Some(path) = args.public_path {
        config.public_path = path;
    }
    config.validate()?;

    config.save(cwd)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!("    upload:  {}", config.upload_url);
    println!("    public:  {}", config.public_path);
    println!(
        "    limits:  {} files per batch, {} bytes per file",
        config.max_files_per_batch, config.max_file_size
    );
    println!();
    println!("Next: ara import notes.json capture.png");

    Ok(())
}

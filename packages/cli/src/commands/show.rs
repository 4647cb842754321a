use anyhow::Result;
use ara_editor::{Block, Document};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document JSON file
    pub document: PathBuf,
}

pub fn show(args: ShowArgs, cwd: &Path) -> Result<()> {
    let document = Document::load(&cwd.join(&args.document))?;

    for line in describe(&document) {
        println!("{line}");
    }
    println!();
    println!("{} positions, {} images", document.content_size(), document.images().count());

    Ok(())
}

/// One line per block: its start position and content
fn describe(document: &Document) -> Vec<String> {
    document
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let start = document.block_start(index);
            match block {
                Block::Paragraph { text } => format!("{:>5}  {} {}", start, "¶".dimmed(), text),
                Block::Image(image) => format!(
                    "{:>5}  {} {} ({}x{}) \"{}\"",
                    start,
                    "▣".cyan(),
                    image.src,
                    image.width,
                    image.height,
                    image.alt
                ),
            }
        })
        .collect()
}

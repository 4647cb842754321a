use anyhow::{anyhow, Result};
use ara_editor::{Document, EditSession};
use ara_media::{
    DataTransfer, EditorHost, HttpFetcher, HttpUploader, ImportCandidate, MediaConfig, MediaImporter, Notification,
    Notifier, TracingErrorTracker,
};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Image files or http(s) URLs
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Insert position (defaults to the end of the document)
    #[arg(long)]
    pub at: Option<usize>,

    /// Write the result here instead of overwriting the document
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Prints notifications as they arrive
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let title = notification.title.as_deref().unwrap_or("");
        eprintln!(
            "  {} [{}] {} {}",
            "✗".red(),
            notification.category.as_str().yellow(),
            title.bold(),
            notification.message
        );
    }
}

pub async fn import(args: ImportArgs, cwd: &Path) -> Result<()> {
    let config = MediaConfig::load(cwd)?;
    let document_path = cwd.join(&args.document);
    let document = Document::load(&document_path)?;
    let images_before = document.images().count();

    let (urls, paths): (Vec<&String>, Vec<&String>) = args
        .sources
        .iter()
        .partition(|source| source.starts_with("http://") || source.starts_with("https://"));

    let files = paths
        .into_iter()
        .map(|path| {
            ImportCandidate::from_path(&cwd.join(path)).map_err(|e| anyhow!("Cannot read {}: {}", path, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let position = args.at.unwrap_or_else(|| document.content_size());
    if position > document.content_size() {
        return Err(anyhow!(
            "Position {} is outside the document (size {})",
            position,
            document.content_size()
        ));
    }

    let mut importer = MediaImporter::new(
        config.clone(),
        Arc::new(HttpUploader::new(&config)?),
        Arc::new(HttpFetcher::new(&config)?),
        Arc::new(ConsoleNotifier),
        Arc::new(TracingErrorTracker),
    );
    let mut host = EditorHost::new(EditSession::new(document_path.display().to_string(), document));

    println!("{}", "📥 Importing images...".bright_blue().bold());

    if !files.is_empty() {
        importer.handle_data_transfer(&mut host, DataTransfer::files(files), position);
    }
    if !urls.is_empty() {
        let list = urls.iter().map(|url| url.as_str()).collect::<Vec<_>>().join("\n");
        importer.handle_data_transfer(&mut host, DataTransfer::uri_list(&list), position);
    }

    println!("  {} upload(s) in flight, {} preview(s) shown", importer.pending(), host.placeholders().len());
    importer.run_until_idle(&mut host).await;

    let document = host.into_document();
    let inserted = document.images().count() - images_before;

    let out = args.out.map(|out| cwd.join(out)).unwrap_or(document_path);
    document.save(&out)?;

    println!();
    if inserted == args.sources.len() {
        println!("{}", format!("✅ Inserted {} image(s)", inserted).green().bold());
    } else {
        println!(
            "{}",
            format!("⚠️  Inserted {} of {} image(s)", inserted, args.sources.len()).yellow().bold()
        );
    }
    println!("  Output: {}", out.display());

    Ok(())
}

//! Summarize a document from the command line.
//!
//! Extracts text from a plain-text or PDF file, runs the map-reduce
//! summarization pipeline against a local Ollama instance, and prints the
//! final summary. The pipeline runs as its own unit of work; progress
//! arrives over a channel and renders as a determinate progress bar on
//! stderr, so stdout stays clean for the summary itself.
//!
//! # Examples
//!
//! ```sh
//! # Summarize a report
//! precis report.pdf --instruction "Summarize the key findings"
//!
//! # Different model, summary written to a file
//! precis notes.txt -i "Three bullet points" --model qwen2.5:7b --output summary.txt
//!
//! # Flaky network to the backend box? Retry transient failures.
//! precis paper.pdf -i "One paragraph, plain language" \
//!   --ollama-url http://gpu-box:11434 --retries 2
//! ```

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use precis_rs::pipeline::{ChannelSink, Pipeline, PipelineConfig};
use precis_rs::OllamaClient;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Summarize a document with a local Ollama model.
#[derive(Parser)]
#[command(name = "precis")]
struct Cli {
    /// Document to summarize (.pdf, or any plain-text file)
    file: PathBuf,

    /// What the summary should look like
    #[arg(short, long)]
    instruction: String,

    /// Ollama model to use
    #[arg(long, default_value = precis_rs::DEFAULT_MODEL)]
    model: String,

    /// Ollama base URL
    #[arg(long, default_value = precis_rs::DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Sampling temperature (0.0 – 1.0; low favors faithfulness)
    #[arg(long, default_value_t = precis_rs::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Target chunk size in characters
    #[arg(long, default_value_t = precis_rs::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Upper bound on the backend context window, in tokens
    #[arg(long)]
    max_context: Option<u32>,

    /// Retries for transient backend failures
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging (to stderr)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_base_url(&self.ollama_url)
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_chunk_size(self.chunk_size)
            .with_retries(self.retries);
        if let Some(max_context) = self.max_context {
            config = config.with_max_context(max_context);
        }
        config
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let text = extract_text(&cli.file)?;
    tracing::debug!("extracted {} chars from {}", text.len(), cli.file.display());

    let client = OllamaClient::new(&cli.ollama_url)?;
    let (sink, mut updates) = ChannelSink::new();

    // The progress bar renders on its own task; the pipeline only writes to
    // the channel. Closing the sink ends the render loop.
    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40} {percent:>3}% {msg}",
    )?);
    let render = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            bar.set_position(update.percent.round() as u64);
            bar.set_message(update.status);
        }
        bar.finish_and_clear();
    });

    let outcome = Pipeline::new(&client, cli.pipeline_config())
        .with_progress_sink(&sink)
        .run(&text, &cli.instruction)
        .await;

    drop(sink);
    render.await?;
    let result = outcome?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &result.summary)?;
            eprintln!("summary written to {}", path.display());
        }
        None => println!("{}", result.summary),
    }

    if !result.is_complete() {
        eprintln!(
            "note: {} of {} chunk(s) failed and were skipped",
            result.failed_chunks.len(),
            result.chunk_count
        );
    }
    Ok(())
}

/// Pull plain text out of the document. PDFs go through `pdf-extract`;
/// everything else is read as UTF-8 text. Whitespace normalization happens
/// inside the pipeline's chunker.
fn extract_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path)?
    } else {
        fs::read_to_string(path)?
    };
    Ok(text)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "precis_rs=debug,precis=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_parses_with_defaults() {
        let cli = Cli::try_parse_from(["precis", "doc.txt", "-i", "short summary"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("doc.txt"));
        assert_eq!(cli.instruction, "short summary");
        assert_eq!(cli.model, precis_rs::DEFAULT_MODEL);
        assert_eq!(cli.chunk_size, precis_rs::DEFAULT_CHUNK_SIZE);
        assert_eq!(cli.retries, 0);
        assert!(cli.output.is_none());
    }

    #[test]
    fn cli_requires_instruction() {
        assert!(Cli::try_parse_from(["precis", "doc.txt"]).is_err());
    }

    #[test]
    fn pipeline_config_reflects_flags() {
        let cli = Cli::try_parse_from([
            "precis",
            "doc.txt",
            "-i",
            "x",
            "--model",
            "qwen2.5:7b",
            "--chunk-size",
            "500",
            "--max-context",
            "4096",
            "--retries",
            "2",
        ])
        .unwrap();
        let config = cli.pipeline_config();
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.max_context, Some(4096));
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn extract_text_reads_plain_files() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        write!(file, "one paragraph\n\nanother paragraph").unwrap();
        let text = extract_text(file.path()).unwrap();
        assert_eq!(text, "one paragraph\n\nanother paragraph");
    }

    #[test]
    fn extract_text_treats_unknown_extensions_as_text() {
        let mut file = tempfile::NamedTempFile::with_suffix(".md").unwrap();
        write!(file, "# heading").unwrap();
        assert_eq!(extract_text(file.path()).unwrap(), "# heading");
    }

    #[test]
    fn extract_text_fails_on_missing_file() {
        assert!(extract_text(Path::new("/nonexistent/doc.txt")).is_err());
    }
}

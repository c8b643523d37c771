//! CLI binary for invoice2json.
//!
//! A thin shim over the library crate: maps CLI flags to
//! `ExtractionConfig`, drives the interactive file selector when no input
//! path is given, and presents/saves the extracted record.

use anyhow::{Context, Result};
use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use invoice2json::pipeline::browse::{list_entries, BrowseEntry};
use invoice2json::{
    check_server, extract, list_models, render_json, save_record, ExtractionConfig,
    InvoiceError, DEFAULT_MODEL, DEFAULT_OLLAMA_URL,
};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: browse for an invoice, display, confirm save
  invoice2json

  # Extract a specific file and save without prompting
  invoice2json scan.pdf -o invoice.json

  # Point at a remote Ollama instance with a different model
  invoice2json --url http://ollama.internal:11434 --model llama3.2-vision invoice.png

  # Machine output (full extraction result as JSON on stdout)
  invoice2json --json invoice.jpg > result.json

ENVIRONMENT VARIABLES:
  INVOICE2JSON_URL     Endpoint base URL (default: http://localhost:11434)
  INVOICE2JSON_MODEL   Vision model identifier

SETUP:
  1. Run an Ollama-compatible server with a vision model pulled:
       ollama pull granite3.2-vision:latest
  2. Extract:
       invoice2json invoice.pdf
"#;

/// Extract structured JSON from invoice images and PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "invoice2json",
    version,
    about = "Extract structured JSON from invoice images and PDFs using a vision model",
    long_about = "Convert an invoice image or PDF into a structured JSON record using a \
vision language model behind an Ollama-compatible endpoint. With no INPUT argument an \
interactive directory browser is shown.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Invoice file: PDF, PNG, JPG, or JPEG. Omit to browse interactively.
    input: Option<PathBuf>,

    /// Write the record to this file without asking.
    #[arg(short, long, env = "INVOICE2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// Endpoint base URL of the Ollama-compatible server.
    #[arg(long, env = "INVOICE2JSON_URL", default_value = DEFAULT_OLLAMA_URL)]
    url: String,

    /// Vision model identifier.
    #[arg(long, env = "INVOICE2JSON_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum rendered dimension for PDF pages, in pixels.
    #[arg(long, env = "INVOICE2JSON_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Model request timeout in seconds.
    #[arg(long, env = "INVOICE2JSON_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Answer yes to all prompts (save with the default filename).
    #[arg(short, long)]
    yes: bool,

    /// Print the full extraction result as JSON on stdout; no prompts.
    #[arg(long)]
    json: bool,

    /// Disable colored output.
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// Append diagnostics to this log file.
    #[arg(long, env = "INVOICE2JSON_LOG_FILE", default_value = "invoice2json.log")]
    log_file: PathBuf,

    /// Enable DEBUG-level tracing logs on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the record itself.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stderr gets a level matching the verbosity flags; the log file always
    // captures request/response diagnostics at debug level, without ANSI.
    let stderr_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("Failed to open log file {:?}", cli.log_file))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(stderr_filter)),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false)
                .with_filter(EnvFilter::new("invoice2json=debug")),
        )
        .init();

    let color = !cli.no_color && io::stdout().is_terminal();
    let interactive = !cli.json && !cli.quiet;

    let config = ExtractionConfig::builder()
        .url(&cli.url)
        .model(&cli.model)
        .max_rendered_pixels(cli.max_pixels)
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;

    // ── Banner & connectivity probe ──────────────────────────────────────
    if interactive {
        print_banner(&config);
        match check_server(&config).await {
            Ok(version) => {
                eprintln!(
                    "{} Connected to {} (server version {})",
                    style("✓").green(),
                    config.base_url(),
                    version
                );
            }
            Err(e) => {
                eprintln!("{} {}", style("✗").red(), e);
                eprintln!(
                    "Ensure the server is running and reachable at {} (override with --url).",
                    config.base_url()
                );
                std::process::exit(1);
            }
        }
        // A missing model only fails at generate time, after the user has
        // already picked a file; warn now instead.
        match list_models(&config).await {
            Ok(tags) if tags.has_model(&config.model) => {
                eprintln!("{} Model {} is available", style("✓").green(), config.model);
            }
            Ok(tags) => {
                eprintln!(
                    "{} Model {} is not pulled on this server. Available: {}",
                    style("⚠").yellow(),
                    config.model,
                    if tags.model_names().is_empty() {
                        "(none)".to_string()
                    } else {
                        tags.model_names().join(", ")
                    }
                );
            }
            Err(e) => {
                tracing::debug!("Model listing unavailable: {}", e);
            }
        }
        eprintln!();
    }

    // ── Select the invoice file ──────────────────────────────────────────
    let input = match cli.input.clone() {
        Some(path) => path,
        None => {
            if !interactive {
                anyhow::bail!("INPUT is required with --json or --quiet");
            }
            browse_for_file()?
        }
    };

    if interactive {
        eprintln!("{} {}", style("Selected:").bold(), input.display());
    }

    // ── Run the pipeline ─────────────────────────────────────────────────
    let spinner = if interactive {
        Some(make_spinner(&format!(
            "Analyzing invoice with {}…",
            config.model
        )))
    } else {
        None
    };

    let result = extract(&input, &config).await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            // Parse failures keep the model's reply; show it so the user can
            // judge what went wrong without digging through the log file.
            if let Some(raw) = e.raw_response() {
                eprintln!("{} {}", style("✗").red(), e);
                eprintln!("{}", style("Raw model response:").dim());
                eprintln!("{}", style(raw).dim());
                std::process::exit(1);
            }
            return Err(e).context("Extraction failed");
        }
    };

    // ── Present ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
        return Ok(());
    }

    if !cli.quiet {
        eprintln!();
        eprintln!("{}", style("Extracted Invoice Data").green().bold());
        eprintln!("{}", style("─".repeat(40)).dim());
    }
    println!("{}", render_json(&output.record, color));
    if !cli.quiet {
        eprintln!("{}", style("─".repeat(40)).dim());
        eprintln!(
            "{}",
            style(format!(
                "{} chars from model, {}ms total ({}ms in API call)",
                output.stats.response_chars,
                output.stats.total_duration_ms,
                output.stats.api_duration_ms
            ))
            .dim()
        );
    }

    // ── Export ───────────────────────────────────────────────────────────
    let save_to = resolve_save_path(&cli)?;
    if let Some(path) = save_to {
        match save_record(&output.record, &path).await {
            Ok(()) => {
                if !cli.quiet {
                    eprintln!(
                        "{} Invoice data saved to {}",
                        style("✓").green(),
                        style(path.display()).bold()
                    );
                }
            }
            // Per the error model, a failed save aborts only the save step.
            Err(e @ InvoiceError::OutputWriteFailed { .. }) => {
                eprintln!("{} {}", style("✗").red(), e);
            }
            Err(e) => return Err(e).context("Export failed"),
        }
    }

    Ok(())
}

/// Decide where (and whether) to save the record.
///
/// `-o` wins; otherwise interactive runs confirm and ask for a filename,
/// defaulting to a timestamped name; `--yes` accepts the default silently.
fn resolve_save_path(cli: &Cli) -> Result<Option<PathBuf>> {
    if let Some(ref path) = cli.output {
        return Ok(Some(path.clone()));
    }
    if cli.quiet {
        return Ok(None);
    }

    let default_name = format!(
        "invoice_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );

    if cli.yes {
        return Ok(Some(PathBuf::from(default_name)));
    }

    let term = Term::stderr();
    eprint!("Save to JSON file? [Y/n] ");
    let answer = term.read_line().unwrap_or_default();
    if matches!(answer.trim().to_lowercase().as_str(), "n" | "no") {
        return Ok(None);
    }

    eprint!("Filename [{default_name}]: ");
    let name = term.read_line().unwrap_or_default();
    let name = name.trim();
    if name.is_empty() {
        Ok(Some(PathBuf::from(default_name)))
    } else {
        Ok(Some(PathBuf::from(name)))
    }
}

/// Interactive directory browser: numbered menu, navigate until a file is
/// picked or the user quits.
fn browse_for_file() -> Result<PathBuf> {
    let term = Term::stderr();
    let mut current = std::env::current_dir().context("Cannot read current directory")?;

    loop {
        let entries = match list_entries(&current) {
            Ok(e) => e,
            Err(e) => {
                // Unreadable directory: report and fall back to home, like
                // any file manager would. If home is the one that failed,
                // give up rather than loop.
                eprintln!("{} {}", style("✗").red(), e);
                let home = dirs_home().unwrap_or_else(|| PathBuf::from("/"));
                if current == home {
                    return Err(InvoiceError::SelectionCancelled.into());
                }
                current = home;
                continue;
            }
        };

        eprintln!();
        eprintln!("{} {}", style("Directory:").bold(), current.display());
        for (i, entry) in entries.iter().enumerate() {
            let label = entry.label();
            match entry {
                BrowseEntry::Parent(_) | BrowseEntry::Dir(_) => {
                    eprintln!("  {:>3}  {}", i + 1, style(label).cyan())
                }
                BrowseEntry::File(_) => eprintln!("  {:>3}  {}", i + 1, label),
            }
        }
        eprint!("Select [1-{}], or q to quit: ", entries.len());

        let line = term.read_line().unwrap_or_default();
        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Err(InvoiceError::SelectionCancelled.into());
        }

        let Ok(n) = choice.parse::<usize>() else {
            eprintln!("{} Enter a number or q", style("!").yellow());
            continue;
        };
        let Some(entry) = n.checked_sub(1).and_then(|i| entries.get(i)) else {
            eprintln!("{} Out of range", style("!").yellow());
            continue;
        };

        match entry {
            BrowseEntry::Parent(p) | BrowseEntry::Dir(p) => current = p.clone(),
            BrowseEntry::File(p) => return Ok(p.clone()),
        }
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn print_banner(config: &ExtractionConfig) {
    eprintln!(
        "{} {}",
        style("invoice2json").blue().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    eprintln!(
        "{}",
        style("Extracting structured data from invoices with a vision model").dim()
    );
    eprintln!("{}", style(format!("model: {}", config.model)).dim());
    eprintln!("{}", style("═".repeat(60)).blue());
}

fn make_spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

//! Resolves run settings: CLI flags > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Args;
use paperdigest_core::config_file::ConfigFile;
use paperdigest_core::summarize::SummarizerSettings;
use paperdigest_core::{Config, SummarizerKind, default_save_path};
use paperdigest_pdf_mupdf::MupdfBackend;

/// Options shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// Where the downloaded PDF is written (overwritten on every run)
    #[arg(long, global = true)]
    pub save_path: Option<PathBuf>,

    /// Characters per summarized chunk [default: 2048]
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Minimum summary length per chunk, in model tokens [default: 30]
    #[arg(long, global = true)]
    pub min_length: Option<u32>,

    /// Maximum summary length per chunk, in model tokens [default: 150]
    #[arg(long, global = true)]
    pub max_length: Option<u32>,

    /// Summarization backend: huggingface or ollama
    #[arg(long, global = true)]
    pub backend: Option<SummarizerKind>,

    /// Model name passed to the summarization backend
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Base URL of the summarization backend
    #[arg(long, global = true)]
    pub summarizer_url: Option<String>,

    /// Fraction of page height dropped from the top of every page (0 to disable)
    #[arg(long, global = true)]
    pub header_exclusion: Option<f32>,

    /// Fraction of page height dropped from the bottom of every page (0 to disable)
    #[arg(long, global = true)]
    pub footer_exclusion: Option<f32>,

    /// HTTP timeout in seconds (default: wait indefinitely)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug)]
pub struct Resolved {
    pub config: Config,
    pub save_path: PathBuf,
    pub summarizer: SummarizerSettings,
    /// Header band ratio; 0 keeps the whole page.
    pub header_exclusion: f32,
    /// Footer band ratio; 0 keeps the whole page.
    pub footer_exclusion: f32,
}

impl Resolved {
    /// Text extractor with the configured page bands.
    pub fn pdf_backend(&self) -> MupdfBackend {
        MupdfBackend::new()
            .with_header_exclusion(self.header_exclusion)
            .with_footer_exclusion(self.footer_exclusion)
    }
}

/// Resolve settings from flags, then `env`, then `file`, then defaults.
///
/// `env` is a lookup function so tests need not touch the process
/// environment.
pub fn resolve(
    opts: &RunOptions,
    file: &ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Resolved> {
    let search = file.search.clone().unwrap_or_default();
    let summ = file.summarizer.clone().unwrap_or_default();
    let chunking = file.chunking.clone().unwrap_or_default();
    let pdf = file.pdf.clone().unwrap_or_default();
    let defaults = Config::default();

    let save_path = opts
        .save_path
        .clone()
        .or_else(|| env("PAPERDIGEST_SAVE_PATH").map(PathBuf::from))
        .or_else(|| search.save_path.map(PathBuf::from))
        .unwrap_or_else(default_save_path);

    let kind = match opts.backend {
        Some(kind) => kind,
        None => match env("PAPERDIGEST_BACKEND") {
            Some(raw) => raw
                .parse::<SummarizerKind>()
                .map_err(|e| anyhow::anyhow!(e))?,
            None => summ.backend.unwrap_or_default(),
        },
    };

    let env_url = match kind {
        SummarizerKind::Ollama => env("OLLAMA_URL"),
        SummarizerKind::HuggingFace => None,
    };
    let api_token = match kind {
        SummarizerKind::HuggingFace => env("HF_TOKEN").or(summ.api_token),
        SummarizerKind::Ollama => None,
    };

    let summarizer = SummarizerSettings {
        kind,
        model: opts
            .model
            .clone()
            .or_else(|| env("PAPERDIGEST_MODEL"))
            .or(summ.model),
        base_url: opts.summarizer_url.clone().or(env_url).or(summ.base_url),
        api_token,
    };

    let mut config = Config {
        search_url: search.search_url.unwrap_or(defaults.search_url),
        pdf_base_url: search.pdf_base_url.unwrap_or(defaults.pdf_base_url),
        chunk_size: opts
            .chunk_size
            .or(chunking.chunk_size)
            .unwrap_or(defaults.chunk_size),
        summary: defaults.summary,
        http_timeout_secs: opts.timeout.or(search.http_timeout_secs),
    };
    if let Some(min) = opts.min_length.or(chunking.min_length) {
        config.summary.min_length = min;
    }
    if let Some(max) = opts.max_length.or(chunking.max_length) {
        config.summary.max_length = max;
    }
    config.validate()?;

    let header_exclusion = opts.header_exclusion.or(pdf.header_exclusion).unwrap_or(0.0);
    let footer_exclusion = opts.footer_exclusion.or(pdf.footer_exclusion).unwrap_or(0.0);
    for (name, ratio) in [("header", header_exclusion), ("footer", footer_exclusion)] {
        if !(0.0..1.0).contains(&ratio) {
            anyhow::bail!("{name} exclusion must be in [0, 1), got {ratio}");
        }
    }
    if header_exclusion + footer_exclusion >= 1.0 {
        anyhow::bail!("header and footer exclusions together cover the whole page");
    }

    Ok(Resolved {
        config,
        save_path,
        summarizer,
        header_exclusion,
        footer_exclusion,
    })
}

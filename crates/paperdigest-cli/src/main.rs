use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paperdigest_core::config_file::load_config;
use paperdigest_core::search::search_listing;
use paperdigest_core::summarize::build_summarizer;
use paperdigest_core::{
    CoreError, HttpFetcher, PipelineDeps, PipelineEvent, Summarizer, run_pipeline,
    select_resource, summarize_file,
};
use paperdigest_pdf_mupdf::MupdfBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod output;
mod settings;

use output::ColorMode;
use settings::{Resolved, RunOptions, resolve};

/// Find an arXiv paper by title and summarize it chunk by chunk
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    opts: RunOptions,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prompt for paper titles until EOF or `quit` (the default)
    Interactive,

    /// Search, download and summarize one paper
    Run {
        /// Paper title or search terms
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Show which paper a query would select, without downloading it
    Search {
        /// Paper title or search terms
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Summarize a PDF already on disk
    Summarize {
        /// Path to the PDF
        pdf: PathBuf,
    },
}

/// Everything a command needs once settings are resolved.
struct App {
    resolved: Resolved,
    fetcher: HttpFetcher,
    summarizer: Box<dyn Summarizer>,
    pdf: MupdfBackend,
    color: ColorMode,
    writer: RefCell<Box<dyn Write>>,
    /// Spinner only when the report goes to the terminal.
    show_spinner: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _guard = init_tracing(cli.opts.log_file.as_deref())?;

    let file_config = load_config();
    let resolved = resolve(&cli.opts, &file_config, |key| std::env::var(key).ok())?;
    tracing::debug!(?resolved, "resolved settings");

    let fetcher = HttpFetcher::new(resolved.config.http_timeout_secs.map(Duration::from_secs))?;
    let summarizer = build_summarizer(&resolved.summarizer, fetcher.client().clone());

    let use_color = !cli.opts.no_color && cli.opts.output.is_none();
    let writer: Box<dyn Write> = if let Some(ref output_path) = cli.opts.output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    let pdf = resolved.pdf_backend();
    let app = App {
        resolved,
        fetcher,
        summarizer,
        pdf,
        color: ColorMode(use_color),
        writer: RefCell::new(writer),
        show_spinner: cli.opts.output.is_none(),
    };

    let code = match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            interactive(&app).await?;
            ExitCode::SUCCESS
        }
        Command::Run { query } => app.report(app.run(&query.join(" ")).await)?,
        Command::Search { query } => app.report(app.search(&query.join(" ")).await)?,
        Command::Summarize { pdf } => app.report(app.summarize(&pdf).await)?,
    };
    app.writer.borrow_mut().flush()?;
    Ok(code)
}

/// Logs go to stderr at `warn` unless `--log-file` is given, in which case
/// they go to that file at `info`. `RUST_LOG` overrides either default.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Read titles from stdin and run the pipeline on each. A failed run is
/// reported and the prompt comes back.
async fn interactive(app: &App) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        {
            let mut w = app.writer.borrow_mut();
            if app.show_spinner {
                write!(w, "Enter the title of the paper: ")?;
            } else {
                // Report goes to a file; prompt on the terminal instead.
                eprint!("Enter the title of the paper: ");
            }
            w.flush()?;
        }

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query == ":q" || query.eq_ignore_ascii_case("quit") {
            break;
        }

        if let Err(e) = app.run(query).await {
            app.print_error(&e)?;
        }
        writeln!(app.writer.borrow_mut())?;
    }
    Ok(())
}

impl App {
    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_spinner {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    fn emit(&self, spinner: &ProgressBar, event: &PipelineEvent) {
        spinner.suspend(|| {
            let mut w = self.writer.borrow_mut();
            if let Err(e) = output::print_event(&mut **w, event, self.color).and_then(|_| w.flush()) {
                tracing::warn!(error = %e, "failed to write progress");
            }
        });
    }

    async fn run(&self, query: &str) -> Result<(), CoreError> {
        let deps = PipelineDeps {
            fetcher: &self.fetcher,
            pdf: &self.pdf,
            summarizer: self.summarizer.as_ref(),
        };
        let spinner = self.spinner("Searching and Summarizing...");
        let result = run_pipeline(
            query,
            &self.resolved.save_path,
            &deps,
            &self.resolved.config,
            |event| self.emit(&spinner, &event),
        )
        .await;
        spinner.finish_and_clear();

        let report = result?;
        tracing::info!(
            paper_id = %report.selected.paper_id,
            bytes = report.bytes,
            chunks = report.chunks,
            path = %report.path.display(),
            "run complete"
        );
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<(), CoreError> {
        let spinner = self.spinner("Searching...");
        let listing =
            search_listing(&self.fetcher, &self.resolved.config.search_url, query).await;
        spinner.finish_and_clear();

        let selected = select_resource(&listing?, &self.resolved.config.pdf_base_url)
            .ok_or(CoreError::NoCandidateFound)?;
        let mut w = self.writer.borrow_mut();
        output::print_selection(&mut **w, &selected, self.color)?;
        Ok(())
    }

    async fn summarize(&self, pdf: &Path) -> Result<(), CoreError> {
        let spinner = self.spinner("Summarizing...");
        let result = summarize_file(
            pdf,
            &self.pdf,
            self.summarizer.as_ref(),
            &self.resolved.config,
            |event| self.emit(&spinner, &event),
        )
        .await;
        spinner.finish_and_clear();
        result.map(|_| ())
    }

    fn print_error(&self, err: &CoreError) -> std::io::Result<()> {
        tracing::debug!(error = ?err, "run failed");
        let mut w = self.writer.borrow_mut();
        output::print_error(&mut **w, err, self.color)?;
        w.flush()
    }

    /// Print a one-shot command's error and map it to an exit code.
    fn report(&self, result: Result<(), CoreError>) -> std::io::Result<ExitCode> {
        match result {
            Ok(()) => Ok(ExitCode::SUCCESS),
            Err(e) => {
                self.print_error(&e)?;
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

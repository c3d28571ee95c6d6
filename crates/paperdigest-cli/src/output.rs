use std::io::Write;

use owo_colors::OwoColorize;
use paperdigest_core::{CoreError, PipelineEvent, SelectedResource};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a real-time pipeline event.
pub fn print_event(w: &mut dyn Write, event: &PipelineEvent, color: ColorMode) -> std::io::Result<()> {
    match event {
        PipelineEvent::Searching { query } => {
            writeln!(w, "Searching arXiv for \"{}\"...", query)?;
        }
        PipelineEvent::Selected {
            paper_id,
            locator,
            score,
        } => {
            print_selection(
                w,
                &SelectedResource {
                    paper_id: paper_id.clone(),
                    locator: locator.clone(),
                    score: *score,
                },
                color,
            )?;
        }
        PipelineEvent::Downloaded { path, bytes } => {
            let msg = "Paper downloaded successfully!";
            if color.enabled() {
                writeln!(w, "{}", msg.green())?;
            } else {
                writeln!(w, "{}", msg)?;
            }
            let detail = format!("({} bytes -> {})", bytes, path.display());
            if color.enabled() {
                writeln!(w, "{}", detail.dimmed())?;
            } else {
                writeln!(w, "{}", detail)?;
            }
        }
        PipelineEvent::Extracted {
            raw_chars,
            cleaned_chars,
            chunks,
        } => {
            let msg = format!(
                "Extracted {} characters ({} after cleaning), {} chunk{} to summarize",
                raw_chars,
                cleaned_chars,
                chunks,
                if *chunks == 1 { "" } else { "s" }
            );
            if color.enabled() {
                writeln!(w, "{}", msg.dimmed())?;
            } else {
                writeln!(w, "{}", msg)?;
            }
            writeln!(w)?;
        }
        PipelineEvent::Summary { index, total, text } => {
            let label = format!("[{}/{}]", index + 1, total);
            if color.enabled() {
                writeln!(w, "{} {}", label.bold().cyan(), text)?;
            } else {
                writeln!(w, "{} {}", label, text)?;
            }
            writeln!(w)?;
        }
        PipelineEvent::Finished { .. } => {
            if color.enabled() {
                writeln!(w, "{}", "Finished Summarising".green().bold())?;
            } else {
                writeln!(w, "Finished Summarising")?;
            }
        }
    }
    Ok(())
}

/// Print the paper picked from the listing.
pub fn print_selection(
    w: &mut dyn Write,
    selected: &SelectedResource,
    color: ColorMode,
) -> std::io::Result<()> {
    let terms = if selected.score == 1 { "term" } else { "terms" };
    if color.enabled() {
        writeln!(
            w,
            "Selected {} ({} highlighted {})",
            format!("arXiv:{}", selected.paper_id).bold(),
            selected.score,
            terms
        )?;
    } else {
        writeln!(
            w,
            "Selected arXiv:{} ({} highlighted {})",
            selected.paper_id, selected.score, terms
        )?;
    }
    writeln!(w, "  PDF: {}", selected.locator)?;
    Ok(())
}

/// Report a failed run. Warnings (no paper found) are yellow, errors red.
pub fn print_error(w: &mut dyn Write, err: &CoreError, color: ColorMode) -> std::io::Result<()> {
    let message = match err {
        CoreError::EmptyQuery => "Please enter the title of a paper.".to_string(),
        other => other.to_string(),
    };
    if err.is_warning() {
        if color.enabled() {
            writeln!(w, "{} {}", "WARNING:".yellow(), message)?;
        } else {
            writeln!(w, "WARNING: {}", message)?;
        }
    } else if color.enabled() {
        writeln!(w, "{} {}", "ERROR:".red().bold(), message)?;
    } else {
        writeln!(w, "ERROR: {}", message)?;
    }
    Ok(())
}

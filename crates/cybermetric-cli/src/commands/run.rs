//! The `cybermetric run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use cybermetric_core::engine::{EvalEngine, ProgressReporter, QuestionProgress, RetryCause};
use cybermetric_core::report::EvalReport;
use cybermetric_core::results::EvaluationRun;
use cybermetric_core::traits::ModelClient;
use cybermetric_providers::config::load_config_from;
use cybermetric_providers::create_provider;
use cybermetric_report::html::write_html_report;
use cybermetric_report::text::{sanitize, write_text_report};

use super::resolve_dataset_path;

/// Flags accepted by `cybermetric run`.
pub struct RunOptions {
    pub model: Option<String>,
    pub test: Option<String>,
    pub provider: Option<String>,
    pub max_attempts: Option<u32>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub verbose: bool,
    pub no_save: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

fn parse_formats(format: &str) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for fmt in format.split(',').map(str::trim) {
        let parsed: &[OutputFormat] = match fmt {
            "all" => &[OutputFormat::Text, OutputFormat::Json, OutputFormat::Html],
            "text" => &[OutputFormat::Text],
            "json" => &[OutputFormat::Json],
            "html" => &[OutputFormat::Html],
            other => anyhow::bail!("unknown format '{other}' (expected text, json, html or all)"),
        };
        for f in parsed {
            if !formats.contains(f) {
                formats.push(*f);
            }
        }
    }
    Ok(formats)
}

/// Console progress reporter backed by an indicatif bar.
struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_run_start(&self, run: &EvaluationRun, total: usize) {
        self.bar.println(format!(
            "Evaluating {} on {} ({} questions)",
            run.model, run.dataset, total
        ));
        self.bar.set_length(total as u64);
        self.bar.set_message("Accuracy: -");
    }

    fn on_retry(&self, index: usize, attempt: u32, cause: &RetryCause) {
        self.bar.println(format!(
            "  question {}: attempt {} failed: {cause}",
            index + 1,
            attempt + 1
        ));
    }

    fn on_question_complete(&self, progress: &QuestionProgress) {
        self.bar.set_position(progress.asked as u64);
        self.bar
            .set_message(format!("Accuracy: {:.2}%", progress.running_accuracy));
    }

    fn on_run_complete(&self, report: &EvalReport) {
        self.bar
            .finish_with_message(format!("Accuracy: {:.2}%", report.accuracy));
    }
}

pub async fn execute(opts: RunOptions) -> Result<()> {
    let formats = parse_formats(&opts.format)?;

    // Load config
    let config = load_config_from(opts.config.as_deref())?;

    let provider_name = opts
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let model = opts.model.unwrap_or_else(|| config.default_model.clone());
    let dataset_path =
        resolve_dataset_path(opts.test.as_deref().unwrap_or(&config.default_dataset));
    let output = opts.output.unwrap_or_else(|| config.output_dir.clone());
    let save = config.save_evaluation && !opts.no_save;
    let verbose = config.verbose || opts.verbose;

    let mut engine_config = config.engine_config();
    if let Some(n) = opts.max_attempts {
        engine_config.max_attempts = n;
    }

    let client: Arc<dyn ModelClient> =
        Arc::from(create_provider(&provider_name, config.provider(&provider_name)?)?);

    tracing::info!(
        provider = %provider_name,
        model = %model,
        dataset = %dataset_path.display(),
        max_attempts = engine_config.max_attempts,
        "starting evaluation"
    );

    let engine = EvalEngine::new(client, model, engine_config);
    let reporter = ConsoleReporter::new();
    let report = engine.run_evaluation(&dataset_path, &reporter).await?;

    println!("{}", report.summary());
    print_summary(&report);

    if verbose {
        print_mistakes(&report);
    }

    if save {
        save_outputs(&report, &output, &formats)?;
    }

    Ok(())
}

fn save_outputs(report: &EvalReport, output: &std::path::Path, formats: &[OutputFormat]) -> Result<()> {
    let timestamp = sanitize(&report.run.timestamp());

    for fmt in formats {
        match fmt {
            OutputFormat::Text => {
                let path = write_text_report(report, output)?;
                eprintln!("Evaluation saved to: {}", path.display());
            }
            OutputFormat::Json => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            OutputFormat::Html => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
        }
    }
    Ok(())
}

fn print_summary(report: &EvalReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Model", "Test", "Asked", "Correct", "Mistakes", "Accuracy", "Duration",
    ]);
    table.add_row(vec![
        Cell::new(&report.run.model),
        Cell::new(&report.run.dataset),
        Cell::new(report.asked),
        Cell::new(report.correct),
        Cell::new(report.mistakes.len()),
        Cell::new(format!("{:.2}%", report.accuracy)),
        Cell::new(format!("{:.1}s", report.duration_ms as f64 / 1000.0)),
    ]);

    eprintln!("\n{table}");
}

fn print_mistakes(report: &EvalReport) {
    if report.mistakes.is_empty() {
        println!("No incorrect answers.");
        return;
    }
    println!("___________ INCORRECT ANSWERS ___________");
    print!("{}", report.mistake_lines());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_expand_and_dedupe() {
        assert_eq!(parse_formats("text").unwrap(), vec![OutputFormat::Text]);
        assert_eq!(
            parse_formats("all").unwrap(),
            vec![OutputFormat::Text, OutputFormat::Json, OutputFormat::Html]
        );
        assert_eq!(
            parse_formats("json, text,json").unwrap(),
            vec![OutputFormat::Json, OutputFormat::Text]
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = parse_formats("sarif").unwrap_err();
        assert!(err.to_string().contains("unknown format 'sarif'"));
    }
}

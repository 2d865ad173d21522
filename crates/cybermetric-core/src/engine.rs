//! Central evaluation engine.
//!
//! Asks every question of a dataset to one model, one question and one
//! attempt at a time, retrying until a single-letter answer comes back or
//! the attempt budget runs out, and tallies the results into a report.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;

use crate::dataset::load_dataset;
use crate::error::ConfigError;
use crate::extract::extract_answer;
use crate::model::{Answer, Dataset, QuestionRecord};
use crate::prompt::build_messages;
use crate::report::EvalReport;
use crate::results::{EvaluationRun, ScoreBoard};
use crate::traits::{is_empty_output, ChatMessage, ModelClient};

/// Configuration for the evaluation engine.
#[derive(Debug, Clone)]
pub struct EvalEngineConfig {
    /// Requests made per question before giving up.
    pub max_attempts: u32,
    /// Base delay for backoff after a backend error; attempt `n` waits
    /// `backoff_unit * 2^n`.
    pub backoff_unit: Duration,
}

impl Default for EvalEngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Waits between retries. Swappable so tests can observe backoff.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Backoff delay before the attempt following `attempt` (zero-based).
///
/// Doubles without a cap; saturates instead of overflowing.
pub fn backoff_delay(unit: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    unit.saturating_mul(factor)
}

/// Why an attempt did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryCause {
    /// The backend call itself failed.
    Transient(String),
    /// The backend returned no output.
    EmptyOutput,
    /// The reply had no text, or no single-letter answer in it.
    BadFormat { text: Option<String> },
}

impl RetryCause {
    /// How long to wait before the next attempt. Only backend errors back off.
    pub fn backoff(&self, attempt: u32, unit: Duration) -> Option<Duration> {
        match self {
            RetryCause::Transient(_) => Some(backoff_delay(unit, attempt)),
            RetryCause::EmptyOutput | RetryCause::BadFormat { .. } => None,
        }
    }
}

impl fmt::Display for RetryCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryCause::Transient(e) => write!(f, "backend error: {e}"),
            RetryCause::EmptyOutput => write!(f, "client did not provide any output"),
            RetryCause::BadFormat { .. } => write!(f, "incorrect answer format"),
        }
    }
}

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptOutcome {
    Parsed(Answer),
    Retry(RetryCause),
}

/// Snapshot emitted after each question is scored.
#[derive(Debug, Clone)]
pub struct QuestionProgress {
    /// Zero-based index of the question just scored.
    pub index: usize,
    /// Number of questions in the dataset.
    pub total: usize,
    /// Questions scored so far, including this one.
    pub asked: usize,
    /// Correct answers so far.
    pub correct: usize,
    /// Mistakes recorded so far.
    pub mistakes: usize,
    /// The model's answer to this question.
    pub answer: Option<Answer>,
    /// The correct answer to this question.
    pub expected: Answer,
    /// `correct / asked * 100`.
    pub running_accuracy: f64,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_run_start(&self, run: &EvaluationRun, total: usize);
    fn on_retry(&self, index: usize, attempt: u32, cause: &RetryCause);
    fn on_question_complete(&self, progress: &QuestionProgress);
    fn on_run_complete(&self, report: &EvalReport);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_run_start(&self, _: &EvaluationRun, _: usize) {}
    fn on_retry(&self, _: usize, _: u32, _: &RetryCause) {}
    fn on_question_complete(&self, _: &QuestionProgress) {}
    fn on_run_complete(&self, _: &EvalReport) {}
}

/// The central evaluation engine.
pub struct EvalEngine {
    client: Arc<dyn ModelClient>,
    model: String,
    config: EvalEngineConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl EvalEngine {
    pub fn new(client: Arc<dyn ModelClient>, model: impl Into<String>, config: EvalEngineConfig) -> Self {
        Self {
            client,
            model: model.into(),
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the backoff sleeper.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &EvalEngineConfig {
        &self.config
    }

    /// Load a dataset file and evaluate every question in it.
    pub async fn run_evaluation(
        &self,
        dataset_path: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<EvalReport> {
        let dataset = load_dataset(dataset_path)?;
        self.run(&dataset, progress).await
    }

    /// Evaluate every question of an in-memory dataset, in order.
    pub async fn run(&self, dataset: &Dataset, progress: &dyn ProgressReporter) -> Result<EvalReport> {
        if self.config.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts.into());
        }
        if dataset.is_empty() {
            return Err(ConfigError::EmptyDataset {
                path: dataset.name.clone().into(),
            }
            .into());
        }

        let start = Instant::now();
        let run = EvaluationRun::new(self.model.clone(), dataset.name.clone());
        let total = dataset.len();
        tracing::info!(
            run_id = %run.id,
            model = %run.model,
            dataset = %run.dataset,
            questions = total,
            "starting evaluation"
        );
        progress.on_run_start(&run, total);

        let mut board = ScoreBoard::new();
        for (index, record) in dataset.questions.iter().enumerate() {
            let answer = self.ask(record, index, progress).await;
            let correct = board.record(record, answer);
            tracing::debug!(question = index, ?answer, expected = %record.solution, correct, "question scored");

            progress.on_question_complete(&QuestionProgress {
                index,
                total,
                asked: board.asked(),
                correct: board.correct(),
                mistakes: board.mistakes().len(),
                answer,
                expected: record.solution,
                running_accuracy: board.accuracy().unwrap_or(0.0),
            });
        }

        let elapsed = start.elapsed();
        let report = EvalReport::from_scoreboard(run, board, elapsed.as_millis() as u64).ok_or_else(|| {
            ConfigError::EmptyDataset {
                path: dataset.name.clone().into(),
            }
        })?;

        tracing::info!(
            run_id = %report.run.id,
            accuracy = report.accuracy,
            correct = report.correct,
            asked = report.asked,
            "evaluation complete"
        );
        progress.on_run_complete(&report);

        Ok(report)
    }

    /// Ask a single question, retrying until a valid letter comes back.
    ///
    /// Returns `None` once `max_attempts` requests have failed to produce one.
    pub async fn evaluate_question(&self, record: &QuestionRecord) -> Option<Answer> {
        self.ask(record, 0, &NoopReporter).await
    }

    async fn ask(&self, record: &QuestionRecord, index: usize, progress: &dyn ProgressReporter) -> Option<Answer> {
        let messages = build_messages(&record.question, &record.answers);

        for attempt in 0..self.config.max_attempts {
            match self.attempt(&messages).await {
                AttemptOutcome::Parsed(answer) => return Some(answer),
                AttemptOutcome::Retry(cause) => {
                    let wait = cause.backoff(attempt, self.config.backoff_unit);
                    match wait {
                        Some(delay) => tracing::debug!(
                            question = index,
                            attempt,
                            "{cause}. Attempting the question again in {:.1}s",
                            delay.as_secs_f64()
                        ),
                        None => tracing::debug!(
                            question = index,
                            attempt,
                            "{cause}. Attempting the question again"
                        ),
                    }
                    progress.on_retry(index, attempt, &cause);
                    if let Some(delay) = wait {
                        self.sleeper.sleep(delay).await;
                    }
                }
            }
        }

        tracing::warn!(
            question = index,
            attempts = self.config.max_attempts,
            "no valid answer after exhausting attempts"
        );
        None
    }

    async fn attempt(&self, messages: &[ChatMessage]) -> AttemptOutcome {
        let response = match self.client.send(&self.model, messages).await {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Retry(RetryCause::Transient(format!("{e:#}"))),
        };

        if is_empty_output(&response) {
            return AttemptOutcome::Retry(RetryCause::EmptyOutput);
        }

        let text = self.client.extract_text(&response);
        match text.as_deref().and_then(extract_answer) {
            Some(answer) => AttemptOutcome::Parsed(answer),
            None => AttemptOutcome::Retry(RetryCause::BadFormat { text }),
        }
    }
}

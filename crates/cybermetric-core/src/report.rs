//! Evaluation report type with text rendering and JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::results::{EvaluationRun, Mistake, ScoreBoard};

/// The frozen outcome of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Run identity (id, model, dataset, start time).
    pub run: EvaluationRun,
    /// Number of questions asked.
    pub asked: usize,
    /// Number of questions answered correctly.
    pub correct: usize,
    /// Accuracy in percent.
    pub accuracy: f64,
    /// Incorrect or missing answers, in dataset order.
    pub mistakes: Vec<Mistake>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl EvalReport {
    /// Freeze a finished score board into a report.
    ///
    /// Returns `None` if nothing was scored, since accuracy is undefined.
    pub fn from_scoreboard(run: EvaluationRun, board: ScoreBoard, duration_ms: u64) -> Option<Self> {
        let accuracy = board.accuracy()?;
        Some(Self {
            run,
            asked: board.asked(),
            correct: board.correct(),
            accuracy,
            mistakes: board.into_mistakes(),
            duration_ms,
        })
    }

    /// The summary block shown on the terminal and at the top of the log.
    pub fn summary(&self) -> String {
        format!(
            "Model: {}\nTest: {}\nTime: {}\nId: {}\n\nAccuracy: {:.2}%\n",
            self.run.model,
            self.run.dataset,
            self.run.timestamp(),
            self.run.id,
            self.accuracy
        )
    }

    /// Two lines per mistake: the question, then expected vs. model answer.
    pub fn mistake_lines(&self) -> String {
        let mut out = String::new();
        for m in &self.mistakes {
            out.push_str(&format!("Question: {}\n", m.question));
            out.push_str(&format!(
                "Expected Answer: {}, LLM Answer: {}\n",
                m.expected,
                m.model_answer_label()
            ));
        }
        out
    }

    /// Full plain-text evaluation log.
    pub fn to_log(&self) -> String {
        format!(
            "___________ EVALUATION ___________\n{}\n\n___________ INCORRECT ANSWERS ___________\n{}",
            self.summary(),
            self.mistake_lines()
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: EvalReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

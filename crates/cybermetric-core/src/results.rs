//! Run metadata and per-run score bookkeeping.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, QuestionRecord};

/// Identity of a single evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRun {
    /// Unique run identifier.
    pub id: Uuid,
    /// Model under evaluation.
    pub model: String,
    /// Dataset file name.
    pub dataset: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl EvaluationRun {
    pub fn new(model: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            dataset: dataset.into(),
            started_at: Utc::now(),
        }
    }

    /// Start time in local time, formatted as `YYYY-MM-DD HH:MM:SS`.
    ///
    /// `started_at` itself stays UTC in serialized reports.
    pub fn timestamp(&self) -> String {
        self.started_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// First five characters of the run id, used in file names.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(5).collect()
    }
}

/// A question the model answered incorrectly or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    /// The question text.
    pub question: String,
    /// The correct option.
    pub expected: Answer,
    /// What the model answered, `None` if no valid answer was obtained.
    pub model_answer: Option<Answer>,
}

impl Mistake {
    /// Model answer as printed in reports (`None` when absent).
    pub fn model_answer_label(&self) -> String {
        self.model_answer
            .map(|a| a.to_string())
            .unwrap_or_else(|| "None".to_string())
    }
}

/// Running tally of asked and correct questions.
///
/// `asked == correct + mistakes.len()` holds after every call to
/// [`ScoreBoard::record`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    asked: usize,
    correct: usize,
    mistakes: Vec<Mistake>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one question. Returns `true` if the answer was correct.
    pub fn record(&mut self, record: &QuestionRecord, answer: Option<Answer>) -> bool {
        let correct = answer == Some(record.solution);
        if correct {
            self.correct += 1;
        } else {
            self.mistakes.push(Mistake {
                question: record.question.clone(),
                expected: record.solution,
                model_answer: answer,
            });
        }
        self.asked += 1;
        correct
    }

    pub fn asked(&self) -> usize {
        self.asked
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    /// Accuracy in percent, `None` before any question has been scored.
    pub fn accuracy(&self) -> Option<f64> {
        (self.asked > 0).then(|| self.correct as f64 / self.asked as f64 * 100.0)
    }

    pub fn into_mistakes(self) -> Vec<Mistake> {
        self.mistakes
    }
}

//! Core data model types for the CyberMetric harness.
//!
//! These are the fundamental types that the entire system uses to represent
//! benchmark questions, their options, and the datasets that hold them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four multiple-choice options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Answer {
    A,
    B,
    C,
    D,
}

impl Answer {
    /// All options in presentation order.
    pub const ALL: [Answer; 4] = [Answer::A, Answer::B, Answer::C, Answer::D];

    /// Map a single character (either case) to an option.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Answer::A),
            'B' => Some(Answer::B),
            'C' => Some(Answer::C),
            'D' => Some(Answer::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Answer::A => 'A',
            Answer::B => 'B',
            Answer::C => 'C',
            Answer::D => 'D',
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Answer::from_char(c).ok_or_else(|| format!("unknown answer: {s}"))
            }
            _ => Err(format!("unknown answer: {s}")),
        }
    }
}

/// The four option texts of a question, keyed by letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl Answers {
    /// Text of the given option.
    pub fn get(&self, answer: Answer) -> &str {
        match answer {
            Answer::A => &self.a,
            Answer::B => &self.b,
            Answer::C => &self.c,
            Answer::D => &self.d,
        }
    }

    /// Iterate `(letter, text)` pairs in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (Answer, &str)> {
        Answer::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

/// A single benchmark question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// The question text.
    pub question: String,
    /// The four candidate answers.
    pub answers: Answers,
    /// The correct option.
    pub solution: Answer,
}

/// A loaded benchmark dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset file name, used to label reports.
    pub name: String,
    /// Questions in file order.
    pub questions: Vec<QuestionRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

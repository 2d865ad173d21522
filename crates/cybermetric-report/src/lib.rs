//! cybermetric-report: Persisted outputs for evaluation runs.
//!
//! The plain-text evaluation log is the canonical artifact; the HTML page is
//! a self-contained view of the same data.

pub mod html;
pub mod text;

pub use html::{generate_html, write_html_report};
pub use text::{report_file_name, write_text_report};

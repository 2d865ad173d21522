pub mod init;
pub mod list_models;
pub mod run;
pub mod validate;

use std::path::PathBuf;

/// Turn a `--test` value into a dataset path, appending `.json` when missing.
pub fn resolve_dataset_path(test: &str) -> PathBuf {
    if test.ends_with(".json") {
        PathBuf::from(test)
    } else {
        PathBuf::from(format!("{test}.json"))
    }
}

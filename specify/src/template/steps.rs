//! Step keys and the up-front plan registered for every run.

use crate::progress::ProgressTracker;

pub const PRECHECK: &str = "precheck";
pub const AI_SELECT: &str = "ai-select";
pub const FETCH: &str = "fetch";
pub const DOWNLOAD: &str = "download";
pub const EXTRACT: &str = "extract";
pub const ZIP_LIST: &str = "zip-list";
pub const EXTRACTED_SUMMARY: &str = "extracted-summary";
pub const FLATTEN: &str = "flatten";
pub const CLEANUP: &str = "cleanup";
pub const GIT: &str = "git";
pub const FINAL: &str = "final";

/// Tracker title used by `init`.
pub const TRACKER_TITLE: &str = "Initialize Specify Project";

/// Every step of a run, in display order.
pub const PLAN: [(&str, &str); 11] = [
    (PRECHECK, "Check required tools"),
    (AI_SELECT, "Select AI assistant"),
    (FETCH, "Fetch latest release"),
    (DOWNLOAD, "Download template"),
    (EXTRACT, "Extract template"),
    (ZIP_LIST, "Archive contents"),
    (EXTRACTED_SUMMARY, "Extraction summary"),
    (FLATTEN, "Flatten nested directory"),
    (CLEANUP, "Remove temporary archive"),
    (GIT, "Initialize git repository"),
    (FINAL, "Finalize"),
];

/// Register the full plan so it renders before any stage runs.
pub fn register_plan(tracker: &mut ProgressTracker) {
    for (key, label) in PLAN {
        tracker.add(key, label);
    }
}

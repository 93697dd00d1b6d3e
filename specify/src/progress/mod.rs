//! Hierarchical step tracking for the template pipeline.
//!
//! A [`ProgressTracker`] owns an ordered list of [`Step`]s. Every mutation
//! notifies an optional observer synchronously, which is how the CLI keeps a
//! live tree on screen without a background refresh thread.
//!
//! # Observer contract
//!
//! The observer is invoked exactly once per mutation, after the mutation has
//! been applied. Errors returned by the observer and panics raised inside it
//! are discarded: a broken renderer must never abort the pipeline.
//!
//! # Example
//!
//! ```
//! use specify::progress::{ProgressTracker, StepStatus};
//!
//! let mut tracker = ProgressTracker::new("Initialize Specify Project");
//! tracker.add("fetch", "Fetch latest release");
//! tracker.start("fetch", "contacting release endpoint");
//! tracker.complete("fetch", "release v0.1.0");
//!
//! assert_eq!(tracker.step("fetch").unwrap().status, StepStatus::Done);
//! println!("{}", tracker.render());
//! ```

mod render;

pub use render::{StepTone, StepTree, TreeLine};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

/// Result returned by a tracker observer.
pub type ObserverResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Callback invoked after every tracker mutation.
pub type TrackerObserver = Box<dyn Fn(&ProgressTracker) -> ObserverResult>;

/// Status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// Registered but not started.
    Pending,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Done,
    /// Failed.
    Error,
    /// Not executed.
    Skipped,
}

impl StepStatus {
    /// Get a short name for the status.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }

    /// Whether the step has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named unit of work tracked by [`ProgressTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unique key within the tracker.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Current status.
    pub status: StepStatus,
    /// Free-form detail shown next to the label.
    pub detail: String,
}

impl Step {
    fn new(key: &str, label: &str, status: StepStatus, detail: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            status,
            detail: detail.to_string(),
        }
    }
}

/// Ordered collection of steps with an optional mutation observer.
pub struct ProgressTracker {
    title: String,
    steps: Vec<Step>,
    observer: Option<TrackerObserver>,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("title", &self.title)
            .field("steps", &self.steps)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ProgressTracker {
    /// Create an empty tracker with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: Vec::new(),
            observer: None,
        }
    }

    /// Title shown at the root of the rendered tree.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// All steps in insertion order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Look up a step by key.
    pub fn step(&self, key: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.key == key)
    }

    /// Attach the observer notified after every mutation.
    ///
    /// Replaces any previously attached observer.
    pub fn attach_observer<F>(&mut self, observer: F)
    where
        F: Fn(&ProgressTracker) -> ObserverResult + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the observer, returning whether one was attached.
    pub fn detach_observer(&mut self) -> bool {
        self.observer.take().is_some()
    }

    /// Register a pending step.
    ///
    /// Adding a key that already exists is a no-op and does not notify.
    pub fn add(&mut self, key: &str, label: &str) {
        if self.step(key).is_some() {
            return;
        }
        self.steps.push(Step::new(key, label, StepStatus::Pending, ""));
        self.notify();
    }

    /// Mark a step as running. An empty `detail` keeps the existing detail.
    pub fn start(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Running, detail);
    }

    /// Mark a step as done. An empty `detail` keeps the existing detail.
    pub fn complete(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Done, detail);
    }

    /// Mark a step as failed. An empty `detail` keeps the existing detail.
    pub fn error(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Error, detail);
    }

    /// Mark a step as skipped. An empty `detail` keeps the existing detail.
    pub fn skip(&mut self, key: &str, detail: &str) {
        self.update(key, StepStatus::Skipped, detail);
    }

    /// Render the tracker as a tree value.
    ///
    /// Pure: rendering never mutates the tracker or calls the observer.
    pub fn render(&self) -> StepTree {
        StepTree::from_steps(&self.title, &self.steps)
    }

    fn update(&mut self, key: &str, status: StepStatus, detail: &str) {
        match self.steps.iter_mut().find(|s| s.key == key) {
            Some(step) => {
                step.status = status;
                if !detail.is_empty() {
                    step.detail = detail.to_string();
                }
            }
            // Late updates for unregistered keys are kept, labelled by key
            None => self.steps.push(Step::new(key, key, status, detail)),
        }
        self.notify();
    }

    fn notify(&self) {
        let Some(observer) = self.observer.as_ref() else {
            return;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| observer(self))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Tracker observer failed"),
            Err(_) => debug!("Tracker observer panicked"),
        }
    }
}

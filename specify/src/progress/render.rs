//! Pure tree rendering for tracked steps.
//!
//! The tracker renders to a [`StepTree`] value rather than to a terminal so
//! that the CLI decides how tones map to colors.

use std::fmt;

use super::{Step, StepStatus};

/// Visual tone class for a rendered step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTone {
    /// Pending step, drawn muted.
    Muted,
    /// Running step, highlighted.
    Active,
    /// Completed step.
    Success,
    /// Failed step.
    Failure,
    /// Skipped step.
    Skipped,
}

impl From<StepStatus> for StepTone {
    fn from(status: StepStatus) -> Self {
        match status {
            StepStatus::Pending => Self::Muted,
            StepStatus::Running => Self::Active,
            StepStatus::Done => Self::Success,
            StepStatus::Error => Self::Failure,
            StepStatus::Skipped => Self::Skipped,
        }
    }
}

impl StepTone {
    /// Marker drawn before the label. Each terminal tone has its own glyph
    /// so the tree reads correctly without color.
    pub fn marker(&self) -> char {
        match self {
            Self::Muted | Self::Active => '○',
            Self::Success => '●',
            Self::Failure => '✗',
            Self::Skipped => '⊘',
        }
    }
}

/// One rendered step line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub tone: StepTone,
    pub label: String,
    /// Trimmed detail, `None` when empty.
    pub detail: Option<String>,
}

impl TreeLine {
    fn from_step(step: &Step) -> Self {
        let detail = step.detail.trim();
        Self {
            tone: step.status.into(),
            label: step.label.clone(),
            detail: (!detail.is_empty()).then(|| detail.to_string()),
        }
    }

    /// Marker for this line's tone.
    pub fn marker(&self) -> char {
        self.tone.marker()
    }
}

/// Rendered tracker: a title and one line per step in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTree {
    pub title: String,
    pub lines: Vec<TreeLine>,
}

impl StepTree {
    pub(super) fn from_steps(title: &str, steps: &[Step]) -> Self {
        Self {
            title: title.to_string(),
            lines: steps.iter().map(TreeLine::from_step).collect(),
        }
    }

    /// Tree guide for the line at `index`.
    pub fn guide(&self, index: usize) -> &'static str {
        if index + 1 == self.lines.len() {
            "└── "
        } else {
            "├── "
        }
    }

    /// Number of terminal rows the tree occupies.
    pub fn height(&self) -> usize {
        self.lines.len() + 1
    }
}

impl fmt::Display for StepTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for (i, line) in self.lines.iter().enumerate() {
            write!(f, "{}{} {}", self.guide(i), line.marker(), line.label)?;
            if let Some(detail) = &line.detail {
                write!(f, " ({})", detail)?;
            }
            if i + 1 < self.lines.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

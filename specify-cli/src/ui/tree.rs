//! Step tree painting.
//!
//! [`LiveTree`] redraws the tracker in place on every mutation and is used
//! when stdout is a terminal. [`LineReporter`] prints one line per status
//! change for logs and pipes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use console::{style, Term};

use specify::progress::{ProgressTracker, StepStatus, StepTone, StepTree, TreeLine};

/// Paint one step line with the tone's style.
fn paint_line(tree: &StepTree, index: usize, line: &TreeLine) -> String {
    let marker = line.marker().to_string();
    let (marker, label) = match line.tone {
        StepTone::Muted => (style(marker).dim(), style(line.label.clone()).dim()),
        StepTone::Active => (
            style(marker).cyan().bold(),
            style(line.label.clone()).cyan().bold(),
        ),
        StepTone::Success => (style(marker).green(), style(line.label.clone())),
        StepTone::Failure => (style(marker).red(), style(line.label.clone()).red()),
        StepTone::Skipped => (style(marker).yellow(), style(line.label.clone()).dim()),
    };

    let mut out = format!("{}{} {}", style(tree.guide(index)).dim(), marker, label);
    if let Some(detail) = &line.detail {
        out.push_str(&format!(" {}", style(format!("({})", detail)).dim()));
    }
    out
}

/// Paint the whole tree, title first.
fn paint(tree: &StepTree) -> Vec<String> {
    let mut lines = Vec::with_capacity(tree.height());
    lines.push(style(tree.title.clone()).cyan().bold().to_string());
    lines.extend(
        tree.lines
            .iter()
            .enumerate()
            .map(|(i, line)| paint_line(tree, i, line)),
    );
    lines
}

/// Print a finished tree.
pub fn print_tree(tree: &StepTree) {
    for line in paint(tree) {
        println!("{}", line);
    }
}

/// In-place tree redrawn by the tracker observer.
pub struct LiveTree {
    term: Term,
    drawn: Rc<Cell<usize>>,
}

impl LiveTree {
    /// Draw the tracker now and redraw it after every mutation.
    pub fn attach(tracker: &mut ProgressTracker) -> Self {
        let term = Term::stdout();
        let drawn = Rc::new(Cell::new(0));

        let live = Self {
            term: term.clone(),
            drawn: Rc::clone(&drawn),
        };
        // Best effort; the observer retries on the next mutation
        let _ = redraw(&term, &drawn, &tracker.render());

        tracker.attach_observer(move |t| {
            redraw(&term, &drawn, &t.render())?;
            Ok(())
        });
        live
    }

    /// Stop redrawing and leave the final tree on screen.
    pub fn finish(self, tracker: &mut ProgressTracker) {
        tracker.detach_observer();
        let _ = self.term.clear_last_lines(self.drawn.get());
        print_tree(&tracker.render());
    }
}

fn redraw(term: &Term, drawn: &Cell<usize>, tree: &StepTree) -> std::io::Result<()> {
    let (_, width) = term.size();
    // Lines that wrap would break the row count used to clear
    let width = (width as usize).saturating_sub(1).max(20);

    term.clear_last_lines(drawn.get())?;
    let lines = paint(tree);
    for line in &lines {
        term.write_line(&console::truncate_str(line, width, "…"))?;
    }
    drawn.set(lines.len());
    Ok(())
}

/// Prints a line whenever a step changes status or detail.
pub struct LineReporter;

impl LineReporter {
    pub fn attach(tracker: &mut ProgressTracker) {
        let seen: RefCell<Vec<(String, StepStatus, String)>> = RefCell::new(Vec::new());

        tracker.attach_observer(move |t| {
            let mut seen = seen.borrow_mut();
            for step in t.steps() {
                let state = (step.key.clone(), step.status, step.detail.clone());
                match seen.iter_mut().find(|(key, _, _)| *key == step.key) {
                    Some(prev) if *prev == state => continue,
                    Some(prev) => *prev = state,
                    None => seen.push(state),
                }
                // Pending registrations are not news
                if step.status != StepStatus::Pending {
                    println!("{}", format_status_line(&step.label, step.status, &step.detail));
                }
            }
            Ok(())
        });
    }
}

fn format_status_line(label: &str, status: StepStatus, detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        format!("[{}] {}", status, label)
    } else {
        format!("[{}] {}: {}", status, label, detail)
    }
}

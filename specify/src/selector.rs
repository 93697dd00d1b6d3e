//! Single-key menu state machine.
//!
//! [`MenuState`] holds an ordered option set and the highlighted index. Keys
//! are fed in one at a time through [`MenuState::handle`]; the terminal
//! driver lives in the CLI and only translates raw key events into
//! [`MenuKey`]s and paints [`MenuState::render`].

use thiserror::Error;

/// Errors constructing a menu.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// The option set is empty.
    #[error("menu has no options")]
    NoOptions,
}

/// Input alphabet of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Escape,
    /// Ctrl-C while waiting for input.
    Interrupt,
    /// Any other key; ignored.
    Other,
}

/// Why a selection ended without a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Escape,
    Interrupt,
}

/// Result of feeding one key to the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTransition {
    /// Selection changed or key ignored; redraw and keep reading.
    Continue,
    /// The user confirmed the highlighted option.
    Selected(String),
    /// The user cancelled.
    Cancelled(CancelReason),
}

/// One rendered menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLine {
    pub highlighted: bool,
    pub key: String,
    pub label: String,
}

/// Ordered options plus the highlighted index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    options: Vec<(String, String)>,
    selected_index: usize,
}

impl MenuState {
    /// Create a menu from `(key, label)` pairs.
    ///
    /// The initial selection is `default_key` when present in the options,
    /// otherwise the first option.
    pub fn new(
        options: Vec<(String, String)>,
        default_key: Option<&str>,
    ) -> Result<Self, MenuError> {
        if options.is_empty() {
            return Err(MenuError::NoOptions);
        }

        let selected_index = default_key
            .and_then(|key| options.iter().position(|(k, _)| k == key))
            .unwrap_or(0);

        Ok(Self {
            options,
            selected_index,
        })
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_key(&self) -> &str {
        &self.options[self.selected_index].0
    }

    /// Move the highlight up one row, wrapping to the last option.
    pub fn move_up(&mut self) {
        let len = self.options.len();
        self.selected_index = (self.selected_index + len - 1) % len;
    }

    /// Move the highlight down one row, wrapping to the first option.
    pub fn move_down(&mut self) {
        self.selected_index = (self.selected_index + 1) % self.options.len();
    }

    /// Apply one key.
    pub fn handle(&mut self, key: MenuKey) -> MenuTransition {
        match key {
            MenuKey::Up => {
                self.move_up();
                MenuTransition::Continue
            }
            MenuKey::Down => {
                self.move_down();
                MenuTransition::Continue
            }
            MenuKey::Enter => MenuTransition::Selected(self.selected_key().to_string()),
            MenuKey::Escape => MenuTransition::Cancelled(CancelReason::Escape),
            MenuKey::Interrupt => MenuTransition::Cancelled(CancelReason::Interrupt),
            MenuKey::Other => MenuTransition::Continue,
        }
    }

    /// Rows to draw; exactly one is highlighted.
    pub fn render(&self) -> Vec<MenuLine> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, (key, label))| MenuLine {
                highlighted: i == self.selected_index,
                key: key.clone(),
                label: label.clone(),
            })
            .collect()
    }
}

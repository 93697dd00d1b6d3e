//! Arrow-key variant menu.
//!
//! Reads raw key events with crossterm and feeds them to
//! [`specify::selector::MenuState`]. Raw mode is restored on every exit
//! path, including errors.

use std::io::{self, Write};

use console::style;
use crossterm::cursor::{Hide, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};

use specify::selector::{CancelReason, MenuKey, MenuLine, MenuState, MenuTransition};

use crate::error::CliError;

/// Raw mode with a hidden cursor until dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// Translate a key event into the menu alphabet.
fn map_key(key: KeyEvent) -> MenuKey {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => MenuKey::Interrupt,
        KeyCode::Up | KeyCode::Char('k') => MenuKey::Up,
        KeyCode::Down | KeyCode::Char('j') => MenuKey::Down,
        KeyCode::Enter => MenuKey::Enter,
        KeyCode::Esc => MenuKey::Escape,
        _ => MenuKey::Other,
    }
}

fn read_key() -> io::Result<MenuKey> {
    loop {
        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind == KeyEventKind::Press {
                return Ok(map_key(key));
            }
        }
    }
}

fn format_line(line: &MenuLine) -> String {
    if line.highlighted {
        format!(
            "{} {} {}",
            style("▶").cyan(),
            style(&line.key).cyan().bold(),
            style(format!("({})", line.label)).cyan()
        )
    } else {
        format!("  {} {}", line.key, style(format!("({})", line.label)).dim())
    }
}

/// Draw the menu, overwriting the previous frame of `previous` rows.
fn draw(out: &mut impl Write, prompt: &str, state: &MenuState, previous: u16) -> io::Result<u16> {
    if previous > 0 {
        queue!(out, MoveUp(previous), MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
    }

    // Raw mode needs explicit carriage returns
    write!(out, "{}\r\n", style(prompt).bold())?;
    for line in state.render() {
        write!(out, "{}\r\n", format_line(&line))?;
    }
    write!(
        out,
        "{}\r\n",
        style("Use ↑/↓ to navigate, Enter to select, Esc to cancel").dim()
    )?;
    out.flush()?;

    Ok(state.len() as u16 + 2)
}

fn run_menu(prompt: &str, state: &mut MenuState) -> Result<String, CliError> {
    let _guard = RawModeGuard::enter()?;
    let mut out = io::stdout();
    let mut height = draw(&mut out, prompt, state, 0)?;

    let outcome = loop {
        match state.handle(read_key()?) {
            MenuTransition::Continue => height = draw(&mut out, prompt, state, height)?,
            MenuTransition::Selected(key) => break Ok(key),
            MenuTransition::Cancelled(CancelReason::Escape) => break Err(CliError::Cancelled),
            MenuTransition::Cancelled(CancelReason::Interrupt) => {
                break Err(CliError::Interrupted)
            }
        }
    };

    queue!(out, MoveUp(height), MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
    out.flush()?;
    outcome
}

/// Let the user pick one of `options`, starting on `default`.
pub fn select_variant(
    prompt: &str,
    options: Vec<(String, String)>,
    default: Option<&str>,
) -> Result<String, CliError> {
    let mut state = MenuState::new(options, default)?;
    let key = run_menu(prompt, &mut state)?;
    println!("{} {}", style("Selected AI assistant:").bold(), style(&key).cyan());
    Ok(key)
}

//! Startup banner.

use console::{style, Color, Term};

const BANNER: [&str; 6] = [
    "███████╗██████╗ ███████╗ ██████╗██╗███████╗██╗   ██╗",
    "██╔════╝██╔══██╗██╔════╝██╔════╝██║██╔════╝╚██╗ ██╔╝",
    "███████╗██████╔╝█████╗  ██║     ██║█████╗   ╚████╔╝ ",
    "╚════██║██╔═══╝ ██╔══╝  ██║     ██║██╔══╝    ╚██╔╝  ",
    "███████║██║     ███████╗╚██████╗██║██║        ██║   ",
    "╚══════╝╚═╝     ╚══════╝ ╚═════╝╚═╝╚═╝        ╚═╝   ",
];

const TAGLINE: &str = "Spec-Driven Development Toolkit";

/// Line colors, cycled top to bottom.
const PALETTE: [(Color, bool); 6] = [
    (Color::Blue, true),
    (Color::Blue, false),
    (Color::Cyan, false),
    (Color::Cyan, true),
    (Color::White, false),
    (Color::White, true),
];

/// Left padding that centers `text` in `width` columns.
fn centered(text: &str, width: usize) -> String {
    let len = console::measure_text_width(text);
    let pad = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Print the banner and tagline centered on the terminal.
pub fn print_banner() {
    let (_, width) = Term::stdout().size();
    let width = width as usize;

    println!();
    for (i, line) in BANNER.iter().enumerate() {
        let (color, bright) = PALETTE[i % PALETTE.len()];
        let mut styled = style(centered(line, width)).fg(color);
        if bright {
            styled = styled.bright();
        }
        println!("{}", styled);
    }
    println!(
        "{}",
        style(centered(TAGLINE, width)).yellow().bright().italic()
    );
    println!();
}

/// Hint shown when no subcommand is given.
pub fn print_usage_hint() {
    let (_, width) = Term::stdout().size();
    println!(
        "{}",
        style(centered("Run 'specify --help' for usage information", width as usize)).dim()
    );
    println!();
}

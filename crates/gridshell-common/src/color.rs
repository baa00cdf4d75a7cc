//! Terminal color helpers.

use std::io::IsTerminal;
use std::sync::OnceLock;

static NO_COLOR: OnceLock<bool> = OnceLock::new();

pub fn init(no_color_flag: bool) {
    let _ = NO_COLOR.set(
        no_color_flag || std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal(),
    );
}

pub fn is_disabled() -> bool {
    *NO_COLOR.get().unwrap_or(&false)
}

mod codes {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const DIM: &str = "\x1b[90m";
    pub const BOLD: &str = "\x1b[1m";
}

pub struct Colors;

fn paint(text: &str, prefixes: &[&str]) -> String {
    if is_disabled() {
        return text.to_string();
    }
    let prefix_len: usize = prefixes.iter().map(|prefix| prefix.len()).sum();
    let mut out = String::with_capacity(prefix_len + text.len() + codes::RESET.len());
    for prefix in prefixes {
        out.push_str(prefix);
    }
    out.push_str(text);
    out.push_str(codes::RESET);
    out
}

impl Colors {
    pub fn error(text: &str) -> String {
        paint(text, &[codes::RED])
    }

    pub fn info(text: &str) -> String {
        paint(text, &[codes::CYAN])
    }

    pub fn warning(text: &str) -> String {
        paint(text, &[codes::YELLOW])
    }

    pub fn dim(text: &str) -> String {
        paint(text, &[codes::DIM])
    }

    pub fn bold(text: &str) -> String {
        paint(text, &[codes::BOLD])
    }

    /// Styling for the `user@/dir/>` prompt.
    pub fn prompt(text: &str) -> String {
        paint(text, &[codes::BOLD, codes::CYAN])
    }
}

use std::cell::RefCell;
use std::io::IsTerminal;
use std::io::Write;
use std::rc::Rc;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::Clear;
use crossterm::terminal::ClearType;
use gridshell_common::Colors;
use gridshell_rpc::RpcValue;
use serde_json::json;

use crate::commands::OutputFormat;
use crate::error::ShellError;
use crate::render::render_result;
use crate::render::Line;
use crate::render::Style;

/// Trait for presenting shell output.
///
/// The dispatcher only talks to this trait, so the same command logic serves
/// the interactive terminal, JSON output and tests.
pub trait Presenter {
    /// Present one output line.
    fn present_line(&self, line: &Line);

    /// Present the echo of a submitted command after its prompt.
    fn present_echo(&self, prompt: &str, command: &str);

    /// Present a shell error.
    fn present_error(&self, error: &ShellError);

    /// Clear previous output.
    fn clear(&self);

    fn present_text(&self, text: &str) {
        self.present_line(&Line::plain(text));
    }

    /// Present a decoded remote result.
    fn present_result(&self, value: &RpcValue) {
        for line in render_result(value) {
            self.present_line(&line);
        }
    }
}

/// Text presenter for human-readable output.
pub struct TextPresenter;

fn styled(line: &Line) -> String {
    match line.style {
        Style::Plain => line.text.clone(),
        Style::Title | Style::Header => Colors::bold(&line.text),
        Style::SectionHeader => Colors::info(&line.text),
        Style::Error => Colors::error(&line.text),
        Style::Warning => Colors::warning(&line.text),
        Style::Dim => Colors::dim(&line.text),
    }
}

impl Presenter for TextPresenter {
    fn present_line(&self, line: &Line) {
        println!("{}", styled(line));
    }

    fn present_echo(&self, prompt: &str, command: &str) {
        println!("{}{}", Colors::prompt(prompt), command);
    }

    fn present_error(&self, error: &ShellError) {
        match error {
            ShellError::Command(e) => println!("{}", Colors::error(&e.to_string())),
            ShellError::RemoteFault { .. } => {
                println!("{}", Colors::error(&error.to_string()));
                if let Some(hint) = error.suggestion() {
                    println!("{}", hint);
                }
            }
            _ => {
                eprintln!("{} {}", Colors::error("Error:"), error);
                if let Some(suggestion) = error.suggestion() {
                    eprintln!("{} {}", Colors::dim("Suggestion:"), suggestion);
                }
                if error.is_retryable() {
                    eprintln!(
                        "{}",
                        Colors::dim("(This error may be transient - retry may succeed)")
                    );
                }
            }
        }
    }

    fn clear(&self) {
        let mut stdout = std::io::stdout();
        if stdout.is_terminal() {
            let _ = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
            let _ = stdout.flush();
        }
    }
}

/// JSON presenter for machine-readable output, one document per line.
pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn present_line(&self, line: &Line) {
        let output = json!({ "style": line.style.as_str(), "output": line.text });
        println!("{}", output);
    }

    fn present_echo(&self, prompt: &str, command: &str) {
        println!("{}", json!({ "prompt": prompt, "command": command }));
    }

    fn present_error(&self, error: &ShellError) {
        println!("{}", json!({ "error": error.to_json() }));
    }

    fn clear(&self) {
        // Nothing to clear in a JSON stream
    }

    fn present_result(&self, value: &RpcValue) {
        println!("{}", json!({ "result": value }));
    }
}

/// Presenter that keeps output in memory.
///
/// Clones share the buffer, so a caller can keep one handle while the
/// dispatcher owns another.
#[derive(Clone, Default)]
pub struct BufferPresenter {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    fn push(&self, text: String) {
        self.lines.borrow_mut().push(text);
    }
}

impl Presenter for BufferPresenter {
    fn present_line(&self, line: &Line) {
        self.push(line.text.clone());
    }

    fn present_echo(&self, prompt: &str, command: &str) {
        self.push(format!("{}{}", prompt, command));
    }

    fn present_error(&self, error: &ShellError) {
        self.push(error.to_string());
        if let ShellError::RemoteFault { .. } = error {
            if let Some(hint) = error.suggestion() {
                self.push(hint.to_string());
            }
        }
    }

    fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

/// Create a presenter based on the output format.
pub fn create_presenter(format: OutputFormat) -> Box<dyn Presenter> {
    match format {
        OutputFormat::Json => Box::new(JsonPresenter),
        OutputFormat::Text => Box::new(TextPresenter),
    }
}

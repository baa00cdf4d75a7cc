//! Raw-mode line editor for the interactive shell.

use std::io;
use std::io::Write;

use crossterm::cursor::MoveToColumn;
use crossterm::event;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::Clear;
use crossterm::terminal::ClearType;
use gridshell_common::Colors;
use gridshell_core::Direction;
use gridshell_core::History;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Keep reading; the line did not change.
    Continue,
    /// The line changed and must be redrawn.
    Redraw,
    Submit(String),
    /// End of input on an empty line.
    Exit,
}

/// Edit buffer with history recall.
///
/// Tab, Up and Down recall history entries starting with what was typed
/// before the first recall key. Any other edit ends the recall.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
    recalling: bool,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle_key(&mut self, key: KeyEvent, history: &mut History) -> EditorAction {
        if key.kind == KeyEventKind::Release {
            return EditorAction::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                self.end_recall(history);
                EditorAction::Submit(std::mem::take(&mut self.buffer))
            }
            KeyCode::Char('c') if ctrl => {
                self.end_recall(history);
                self.buffer.clear();
                EditorAction::Redraw
            }
            KeyCode::Char('d') if ctrl => {
                if self.buffer.is_empty() {
                    EditorAction::Exit
                } else {
                    EditorAction::Continue
                }
            }
            KeyCode::Char('u') if ctrl => {
                self.end_recall(history);
                self.buffer.clear();
                EditorAction::Redraw
            }
            KeyCode::Char(c) if !ctrl => {
                self.end_recall(history);
                self.buffer.push(c);
                EditorAction::Redraw
            }
            KeyCode::Backspace => {
                self.end_recall(history);
                if self.buffer.pop().is_some() {
                    EditorAction::Redraw
                } else {
                    EditorAction::Continue
                }
            }
            KeyCode::Tab | KeyCode::Up => self.recall(history, Direction::Older),
            KeyCode::Down => self.recall(history, Direction::Newer),
            _ => EditorAction::Continue,
        }
    }

    fn recall(&mut self, history: &mut History, direction: Direction) -> EditorAction {
        let found = if self.recalling {
            history.cycle(direction)
        } else {
            self.recalling = true;
            history.start_search(&self.buffer)
        };
        match found {
            Some(entry) => {
                self.buffer = entry.to_string();
                EditorAction::Redraw
            }
            None => EditorAction::Continue,
        }
    }

    fn end_recall(&mut self, history: &mut History) {
        if self.recalling {
            history.reset_search();
            self.recalling = false;
        }
    }
}

/// Restores cooked mode on drop.
#[must_use = "RawModeGuard must be held while reading a line"]
struct RawModeGuard;

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn redraw(stdout: &mut impl Write, prompt: &str, buffer: &str) -> io::Result<()> {
    queue!(
        stdout,
        MoveToColumn(0),
        Clear(ClearType::UntilNewLine),
        Print(Colors::prompt(prompt)),
        Print(buffer)
    )?;
    stdout.flush()
}

/// Reads one line from the terminal.
///
/// Returns `None` at end of input.
pub fn read_line(prompt: &str, history: &mut History) -> io::Result<Option<String>> {
    let guard = RawModeGuard::new()?;
    let mut stdout = io::stdout();
    let mut editor = LineEditor::new();
    redraw(&mut stdout, prompt, editor.buffer())?;

    let outcome = loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match editor.handle_key(key, history) {
            EditorAction::Continue => {}
            EditorAction::Redraw => redraw(&mut stdout, prompt, editor.buffer())?,
            EditorAction::Submit(line) => break Some(line),
            EditorAction::Exit => break None,
        }
    };

    drop(guard);
    println!();
    Ok(outcome)
}

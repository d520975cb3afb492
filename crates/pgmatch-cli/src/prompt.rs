use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::CliError;

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
    Cancelled,
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> Step {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Step::Cancelled,
        KeyCode::Esc => Step::Cancelled,
        KeyCode::Enter => Step::Done,
        KeyCode::Backspace => {
            buffer.pop();
            Step::Continue
        }
        KeyCode::Char(ch) => {
            buffer.push(ch);
            Step::Continue
        }
        _ => Step::Continue,
    }
}

fn read_hidden_line() -> Result<String, CliError> {
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match apply_key(&mut buffer, key) {
                Step::Continue => {}
                Step::Done => return Ok(buffer),
                Step::Cancelled => {
                    return Err(CliError::Prompt("password entry cancelled".to_string()));
                }
            }
        }
    }
}

/// Ask for a password on the terminal without echoing it.
pub fn read_password(prompt: &str) -> Result<String, CliError> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    enable_raw_mode()?;
    let result = read_hidden_line();
    disable_raw_mode()?;
    writeln!(stderr)?;

    result
}

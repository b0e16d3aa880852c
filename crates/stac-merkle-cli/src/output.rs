//! Terminal output.
//!
//! With `--json` every command prints one pretty JSON document on stdout.
//! Otherwise commands write human-readable lines, with PASS/FAIL colored when
//! stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct Output {
    json: bool,
}

fn color_choice(terminal: bool) -> ColorChoice {
    if terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print `value` as JSON in `--json` mode, otherwise run `human`.
    pub fn report<T, F>(&self, value: &T, human: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&mut StandardStream) -> io::Result<()>,
    {
        if self.json {
            return self.print_json(value);
        }
        let mut stdout = StandardStream::stdout(color_choice(io::stdout().is_terminal()));
        human(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let s = serde_json::to_string_pretty(value)?;
        println!("{s}");
        Ok(())
    }

    pub fn error(&self, msg: &str) {
        let mut stderr = StandardStream::stderr(color_choice(io::stderr().is_terminal()));
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(stderr, "error");
        let _ = stderr.reset();
        let _ = writeln!(stderr, ": {msg}");
    }
}

/// Write a colored PASS/FAIL tag followed by `msg`.
pub fn status(w: &mut impl WriteColor, ok: bool, msg: &str) -> io::Result<()> {
    let (tag, color) = if ok {
        ("PASS", Color::Green)
    } else {
        ("FAIL", Color::Red)
    };
    w.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(w, "{tag}")?;
    w.reset()?;
    writeln!(w, " {msg}")
}

//! Console output and input abstraction
//!
//! The [`Console`] writes translated, color-tagged lines through the active
//! [`ConsoleDriver`]. The driver can be swapped at runtime; cancellation
//! uses this to park input on a [`NullDriver`] while it tears down a
//! running command.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::ansi::{self, ColorRole};
use crate::translation::{self, Translator};

/// Backend that actually reads and writes console text
pub trait ConsoleDriver: Send + Sync {
    /// Driver name, for diagnostics
    fn name(&self) -> &str;

    /// Write text with the given color role
    fn write(&self, text: &str, newline: bool, role: ColorRole);

    /// Read one line of input, `Ok(None)` at end of input
    fn read_line(&self, prompt: &str) -> io::Result<Option<String>>;
}

/// Driver bound to the process stdin/stdout
#[derive(Debug, Default)]
pub struct TerminalDriver;

impl ConsoleDriver for TerminalDriver {
    fn name(&self) -> &str {
        "terminal"
    }

    fn write(&self, text: &str, newline: bool, role: ColorRole) {
        let mut stdout = io::stdout().lock();
        let colored = ansi::colorize(text, role);
        let result = if newline {
            writeln!(stdout, "{}", colored)
        } else {
            write!(stdout, "{}", colored).and_then(|_| stdout.flush())
        };
        if let Err(e) = result {
            debug!("Console write failed: {}", e);
        }
    }

    fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        self.write(prompt, false, ColorRole::Input);

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Driver that discards output and yields empty input lines
#[derive(Debug, Default)]
pub struct NullDriver;

impl ConsoleDriver for NullDriver {
    fn name(&self) -> &str {
        "null"
    }

    fn write(&self, _text: &str, _newline: bool, _role: ColorRole) {}

    fn read_line(&self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(Some(String::new()))
    }
}

/// Driver that records output and replays scripted input
///
/// Escape sequences are stripped from recorded text.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    lines: Mutex<Vec<(ColorRole, String)>>,
    partial: Mutex<String>,
    input: Mutex<VecDeque<String>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver preloaded with input lines
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let driver = Self::new();
        driver.push_input(lines);
        driver
    }

    /// Queue more input lines
    pub fn push_input<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.lock().extend(lines.into_iter().map(Into::into));
    }

    /// Completed output lines
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    /// Completed output lines with their color roles
    pub fn entries(&self) -> Vec<(ColorRole, String)> {
        self.lines.lock().clone()
    }

    /// Whether any completed line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(_, text)| text.contains(needle))
    }

    /// Forget recorded output
    pub fn clear(&self) {
        self.lines.lock().clear();
        self.partial.lock().clear();
    }
}

impl ConsoleDriver for MemoryDriver {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&self, text: &str, newline: bool, role: ColorRole) {
        let mut partial = self.partial.lock();
        partial.push_str(&ansi::strip_ansi_codes(text));
        if newline {
            let line = std::mem::take(&mut *partial);
            self.lines.lock().push((role, line));
        }
    }

    fn read_line(&self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.input.lock().pop_front())
    }
}

/// Translated console front-end over a swappable driver
pub struct Console {
    driver: RwLock<Arc<dyn ConsoleDriver>>,
    translator: Arc<dyn Translator>,
}

impl Console {
    /// Create a console over the given driver and translator
    pub fn new(driver: Arc<dyn ConsoleDriver>, translator: Arc<dyn Translator>) -> Self {
        Self {
            driver: RwLock::new(driver),
            translator,
        }
    }

    /// Translate a message key
    pub fn translate(&self, key: &str) -> String {
        self.translator.translate(key)
    }

    /// Translate `key`, fill its placeholders and write it
    pub fn write(&self, key: &str, newline: bool, role: ColorRole, args: &[&dyn fmt::Display]) {
        let text = translation::fill(&self.translate(key), args);
        self.write_raw(&text, newline, role);
    }

    /// Translate and write a full line
    pub fn write_line(&self, key: &str, role: ColorRole, args: &[&dyn fmt::Display]) {
        self.write(key, true, role, args);
    }

    /// Write text as-is, without translation
    pub fn write_raw(&self, text: &str, newline: bool, role: ColorRole) {
        let driver = self.driver();
        driver.write(text, newline, role);
    }

    /// Read a line through the active driver
    pub fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        let driver = self.driver();
        driver.read_line(prompt)
    }

    /// Currently active driver
    pub fn driver(&self) -> Arc<dyn ConsoleDriver> {
        self.driver.read().clone()
    }

    /// Replace the active driver, returning the previous one
    pub fn set_driver(&self, driver: Arc<dyn ConsoleDriver>) -> Arc<dyn ConsoleDriver> {
        std::mem::replace(&mut *self.driver.write(), driver)
    }

    /// Install `driver` until the returned guard is dropped
    pub fn swap_driver(&self, driver: Arc<dyn ConsoleDriver>) -> DriverGuard<'_> {
        let previous = self.set_driver(driver);
        DriverGuard {
            console: self,
            previous: Some(previous),
        }
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("driver", &self.driver().name())
            .finish()
    }
}

/// Restores the previous console driver on drop
pub struct DriverGuard<'a> {
    console: &'a Console,
    previous: Option<Arc<dyn ConsoleDriver>>,
}

impl Drop for DriverGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.console.set_driver(previous);
        }
    }
}

//! Optional debug text output
//!
//! A small text display may or may not be attached. It is probed once at
//! startup; afterwards the rest of the core writes through
//! [`DebugConsole`] and never learns whether anything is listening.

use heapless::{Deque, String};

/// Sink for one-line debug messages
pub trait DebugConsole {
    fn print_line(&mut self, line: &str);
}

impl<T: DebugConsole + ?Sized> DebugConsole for &mut T {
    fn print_line(&mut self, line: &str) {
        (**self).print_line(line);
    }
}

/// Console that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConsole;

impl DebugConsole for NoConsole {
    fn print_line(&mut self, _line: &str) {}
}

/// Result of probing for a display: either attached or absent
#[derive(Debug)]
pub struct Console<D> {
    display: Option<D>,
}

impl<D> Console<D> {
    /// Run the display bring-up once, falling back to no output on failure
    pub fn probe<E>(bring_up: impl FnOnce() -> Result<D, E>) -> Self {
        Self {
            display: bring_up().ok(),
        }
    }

    pub const fn attached(display: D) -> Self {
        Self {
            display: Some(display),
        }
    }

    pub const fn absent() -> Self {
        Self { display: None }
    }

    pub const fn is_attached(&self) -> bool {
        self.display.is_some()
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }
}

impl<D: DebugConsole> DebugConsole for Console<D> {
    fn print_line(&mut self, line: &str) {
        if let Some(display) = &mut self.display {
            display.print_line(line);
        }
    }
}

/// Scrolling text buffer for small displays
///
/// Keeps the last `LINES` lines, each cut to `WIDTH` bytes on a char
/// boundary. A display driver redraws from [`ScrollBuffer::lines`] after
/// each push.
#[derive(Debug, Clone, Default)]
pub struct ScrollBuffer<const LINES: usize, const WIDTH: usize> {
    lines: Deque<String<WIDTH>, LINES>,
}

impl<const LINES: usize, const WIDTH: usize> ScrollBuffer<LINES, WIDTH> {
    pub const fn new() -> Self {
        Self {
            lines: Deque::new(),
        }
    }

    /// Append a line, scrolling the oldest one out when full
    pub fn push(&mut self, text: &str) {
        let mut line = String::new();
        for ch in text.chars() {
            if line.push(ch).is_err() {
                break;
            }
        }
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let _ = self.lines.push_back(line);
    }

    /// Lines from oldest to newest
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<const LINES: usize, const WIDTH: usize> DebugConsole for ScrollBuffer<LINES, WIDTH> {
    fn print_line(&mut self, line: &str) {
        self.push(line);
    }
}

//! Input and output for running programs
//!
//! Programs never touch stdin/stdout directly; every `listen`, `say` and
//! `debug` goes through a [`RockstarIo`] owned by the root environment.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Line-oriented I/O capability
pub trait RockstarIo {
    /// Next input line without its terminator; `None` at end of input
    fn read(&mut self) -> Option<String>;

    fn write(&mut self, text: &str);

    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }
}

/// Shared handle to an I/O implementation
pub type IoRef = Rc<RefCell<dyn RockstarIo>>;

/// In-memory I/O: scripted input lines and a captured output buffer
#[derive(Debug, Default)]
pub struct BufferIo {
    input: VecDeque<String>,
    output: String,
}

impl BufferIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferIo {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    /// Wrap in a shared cell; keep a clone to inspect output afterwards
    pub fn shared(self) -> Rc<RefCell<BufferIo>> {
        Rc::new(RefCell::new(self))
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Take the captured output, leaving the buffer empty
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl RockstarIo for BufferIo {
    fn read(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }
}

/// Process stdin / stdout
#[derive(Debug, Default)]
pub struct StdIo;

impl StdIo {
    pub fn shared() -> IoRef {
        Rc::new(RefCell::new(StdIo))
    }
}

impl RockstarIo for StdIo {
    fn read(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Some(line)
            }
            Err(e) => {
                tracing::warn!("failed to read stdin: {e}");
                None
            }
        }
    }

    fn write(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let written = stdout.write_all(text.as_bytes());
        if let Err(e) = written.and_then(|()| stdout.flush()) {
            tracing::warn!("failed to write stdout: {e}");
        }
    }
}

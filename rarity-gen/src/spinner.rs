//! Terminal progress spinner
//!
//! Each [`Spinner`] is owned by the code driving it. Frames are drawn on
//! stderr from a tokio task, so `start` must be called inside a runtime.

use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// Braille "dots" animation
pub const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub const FRAME_INTERVAL: Duration = Duration::from_millis(80);

const CLEAR_LINE: &str = "\r\x1b[2K";

pub struct Spinner {
    id: String,
    draw: bool,
    running: bool,
    affix: Option<String>,
    starts: usize,
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Spinner that draws when stderr is a terminal
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_drawing(id, std::io::stderr().is_terminal())
    }

    /// Spinner that tracks start/stop but never draws
    pub fn hidden(id: impl Into<String>) -> Self {
        Self::with_drawing(id, false)
    }

    fn with_drawing(id: impl Into<String>, draw: bool) -> Self {
        Self {
            id: id.into(),
            draw,
            running: false,
            affix: None,
            starts: 0,
            task: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn affix(&self) -> Option<&str> {
        self.affix.as_deref()
    }

    /// Number of successful starts over this spinner's lifetime
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Start animating, prefixed by `affix`.
    ///
    /// Returns `false` and leaves the current animation alone when already running.
    pub fn start(&mut self, affix: Option<&str>) -> bool {
        if self.running {
            warn!(spinner = %self.id, "Spinner is already running");
            return false;
        }

        self.running = true;
        self.starts += 1;
        self.affix = affix.map(str::to_string);

        if self.draw {
            let prefix = self.affix.clone();
            self.task = Some(tokio::spawn(async move {
                let mut interval = tokio::time::interval(FRAME_INTERVAL);
                let mut frame = 0usize;
                loop {
                    interval.tick().await;
                    let text = match &prefix {
                        Some(p) => format!("{}{} {} ", CLEAR_LINE, p, FRAMES[frame]),
                        None => format!("{}{} ", CLEAR_LINE, FRAMES[frame]),
                    };
                    let mut err = std::io::stderr().lock();
                    let _ = err.write_all(text.as_bytes());
                    let _ = err.flush();
                    frame = (frame + 1) % FRAMES.len();
                }
            }));
        }

        true
    }

    /// Stop animating; a spinner with an affix leaves the affix on its own line
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }

        if let Some(task) = self.task.take() {
            task.abort();
            let mut err = std::io::stderr().lock();
            let _ = match &self.affix {
                Some(affix) => write!(err, "\r{}  \n", affix),
                None => write!(err, "{}", CLEAR_LINE),
            };
            let _ = err.flush();
        }

        self.running = false;
        self.affix = None;
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

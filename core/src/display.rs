//! Display port
//!
//! The window or canvas the game renders into. Fullscreen transitions are
//! asynchronous: a request returns immediately and its effects arrive later
//! as [`DisplayEvent`]s.

use std::collections::VecDeque;

/// Something the display reports back to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The display entered (`true`) or left fullscreen
    FullscreenChanged(bool),
    /// A fullscreen request finished, successfully or not
    FullscreenRequestSettled(Result<(), String>),
}

/// Platform display the host drives
pub trait Display {
    /// Whether fullscreen can be requested at all
    fn supports_fullscreen(&self) -> bool;

    /// Begin entering (`true`) or leaving fullscreen
    fn request_fullscreen(&mut self, enter: bool);

    /// Next pending event, if any
    fn poll_event(&mut self) -> Option<DisplayEvent>;

    /// Resize the displayed canvas in physical pixels
    fn set_canvas_size(&mut self, width: u32, height: u32);
}

/// Display without a window
///
/// Fullscreen requests are honoured on the next poll, so the host sees the
/// same request/settle ordering a windowed display produces.
#[derive(Debug)]
pub struct HeadlessDisplay {
    fullscreen_supported: bool,
    is_fullscreen: bool,
    canvas_size: (u32, u32),
    requests: u32,
    pending: VecDeque<DisplayEvent>,
}

impl HeadlessDisplay {
    pub fn new(fullscreen_supported: bool) -> Self {
        Self {
            fullscreen_supported,
            is_fullscreen: false,
            canvas_size: (0, 0),
            requests: 0,
            pending: VecDeque::new(),
        }
    }

    /// Displayed canvas size set by the host
    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Number of fullscreen requests received
    pub fn fullscreen_requests(&self) -> u32 {
        self.requests
    }

    /// Simulate the user leaving fullscreen outside the host's control
    pub fn user_exit_fullscreen(&mut self) {
        if self.is_fullscreen {
            self.is_fullscreen = false;
            self.pending.push_back(DisplayEvent::FullscreenChanged(false));
        }
    }
}

impl Display for HeadlessDisplay {
    fn supports_fullscreen(&self) -> bool {
        self.fullscreen_supported
    }

    fn request_fullscreen(&mut self, enter: bool) {
        self.requests += 1;
        if !self.fullscreen_supported {
            self.pending.push_back(DisplayEvent::FullscreenRequestSettled(Err(
                "fullscreen is not supported".to_string(),
            )));
            return;
        }
        if self.is_fullscreen == enter {
            self.pending.push_back(DisplayEvent::FullscreenRequestSettled(Err(format!(
                "display is already {}",
                if enter { "fullscreen" } else { "windowed" }
            ))));
            return;
        }
        self.is_fullscreen = enter;
        self.pending
            .push_back(DisplayEvent::FullscreenChanged(enter));
        self.pending
            .push_back(DisplayEvent::FullscreenRequestSettled(Ok(())));
    }

    fn poll_event(&mut self) -> Option<DisplayEvent> {
        self.pending.pop_front()
    }

    fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_size = (width, height);
    }
}

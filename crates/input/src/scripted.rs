use std::collections::VecDeque;

use glam::DVec2;

use crate::{Key, MouseButton, WindowProvider};

/// Input snapshot replayed by [`ScriptedWindow`] for one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    pub keys: Vec<Key>,
    pub buttons: Vec<MouseButton>,
    pub pointer: Option<DVec2>,
    /// Close the window once this frame is polled.
    pub close: bool,
}

impl InputFrame {
    pub fn keys(keys: &[Key]) -> Self {
        Self {
            keys: keys.to_vec(),
            ..Self::default()
        }
    }

    pub fn pointer(mut self, x: f64, y: f64) -> Self {
        self.pointer = Some(DVec2::new(x, y));
        self
    }

    pub fn button(mut self, button: MouseButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// Headless window that replays a fixed queue of input frames.
///
/// Each poll consumes one frame. Once the script runs out the last frame stays
/// current, and the window reports closing if it was built to close on
/// exhaustion or its poll limit is reached.
#[derive(Debug, Clone)]
pub struct ScriptedWindow {
    script: VecDeque<InputFrame>,
    current: InputFrame,
    framebuffer: (u32, u32),
    close_when_exhausted: bool,
    poll_limit: Option<u64>,
    polls: u64,
    closing: bool,
}

impl ScriptedWindow {
    /// Replay `frames`, then close on the first poll past the end.
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            script: frames.into_iter().collect(),
            current: InputFrame::default(),
            framebuffer: (1280, 720),
            close_when_exhausted: true,
            poll_limit: None,
            polls: 0,
            closing: false,
        }
    }

    /// Replay `frames` and keep the window open afterwards.
    pub fn endless(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            close_when_exhausted: false,
            ..Self::new(frames)
        }
    }

    /// Close once `polls` polls have happened, whatever the script holds.
    pub fn with_poll_limit(mut self, polls: u64) -> Self {
        self.poll_limit = Some(polls);
        self
    }

    pub fn with_framebuffer_size(mut self, width: u32, height: u32) -> Self {
        self.framebuffer = (width, height);
        self
    }

    pub fn request_close(&mut self) {
        self.closing = true;
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl WindowProvider for ScriptedWindow {
    fn poll_events(&mut self) {
        self.polls += 1;
        match self.script.pop_front() {
            Some(frame) => {
                self.closing |= frame.close;
                self.current = frame;
            }
            None => self.closing |= self.close_when_exhausted,
        }
        if self.poll_limit.is_some_and(|limit| self.polls >= limit) {
            self.closing = true;
        }
        if self.closing {
            tracing::debug!(polls = self.polls, "scripted window closing");
        }
    }

    fn is_closing(&self) -> bool {
        self.closing
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.current.keys.contains(&key)
    }

    fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.current.buttons.contains(&button)
    }

    fn pointer_position(&self) -> Option<DVec2> {
        self.current.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_frames_in_order() {
        let mut window = ScriptedWindow::new([
            InputFrame::keys(&[Key::W]),
            InputFrame::keys(&[Key::A]).pointer(3.0, 4.0),
        ]);
        window.poll_events();
        assert!(window.is_key_pressed(Key::W));
        assert!(window.pointer_position().is_none());
        window.poll_events();
        assert!(!window.is_key_pressed(Key::W));
        assert!(window.is_key_pressed(Key::A));
        assert_eq!(window.pointer_position(), Some(DVec2::new(3.0, 4.0)));
        assert!(!window.is_closing());
        window.poll_events();
        assert!(window.is_closing());
    }

    #[test]
    fn endless_window_honours_poll_limit() {
        let mut window = ScriptedWindow::endless([]).with_poll_limit(3);
        window.poll_events();
        window.poll_events();
        assert!(!window.is_closing());
        window.poll_events();
        assert!(window.is_closing());
        assert_eq!(window.polls(), 3);
    }

    #[test]
    fn frame_can_close_early() {
        let mut window = ScriptedWindow::endless([
            InputFrame { close: true, ..InputFrame::default() },
            InputFrame::keys(&[Key::D]),
        ]);
        window.poll_events();
        assert!(window.is_closing());
        assert_eq!(window.remaining(), 1);
    }

    #[test]
    fn buttons_and_framebuffer() {
        let mut window = ScriptedWindow::new([InputFrame::default().button(MouseButton::Right)])
            .with_framebuffer_size(640, 480);
        window.poll_events();
        assert!(window.is_button_pressed(MouseButton::Right));
        assert!(!window.is_button_pressed(MouseButton::Left));
        assert_eq!(window.framebuffer_size(), (640, 480));
    }
}

use glam::DVec2;

/// Keys the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    ShiftLeft,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Platform window and raw input state.
///
/// Implemented by the windowing layer; the engine only ever polls it once per
/// tick and then queries the snapshot.
pub trait WindowProvider {
    /// Pump pending platform events and refresh the input snapshot.
    fn poll_events(&mut self);

    fn is_closing(&self) -> bool;

    /// Framebuffer size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn is_key_pressed(&self, key: Key) -> bool;

    fn is_button_pressed(&self, button: MouseButton) -> bool;

    /// Pointer position in window pixels, or `None` when no pointer device exists.
    fn pointer_position(&self) -> Option<DVec2>;
}

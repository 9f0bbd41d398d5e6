//! Input state tracking for keyboard and mouse.

/// Snapshot of keyboard and mouse state, rebuilt once per event pump.
///
/// Keys are indexed by platform scan code and mouse buttons by a small
/// stable index (see [`button_index`]). Both tables grow on demand, so a
/// scan code never seen before simply reads as released. State persists
/// across pumps until a release event arrives; only the relative mouse
/// delta is transient and is zeroed at the start of every pump.
///
/// Relative mouse motion accumulates only while mouse capture is enabled,
/// so camera-style consumers see (0, 0) whenever the cursor is free.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: Vec<bool>,
    buttons: Vec<bool>,
    mouse_position: (f32, f32),
    mouse_delta: (f32, f32),
    capture_mouse: bool,
}

impl InputState {
    /// Create an empty input state with nothing pressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each event pump, before merging new events.
    ///
    /// Resets the relative mouse delta; pressed keys and buttons carry over.
    pub fn begin_pump(&mut self) {
        self.mouse_delta = (0.0, 0.0);
    }

    /// Record a key press or release by platform scan code.
    pub fn set_key(&mut self, scan_code: u32, pressed: bool) {
        let index = scan_code as usize;
        if self.keys.len() <= index {
            self.keys.resize(index + 1, false);
        }
        self.keys[index] = pressed;
    }

    /// Record a mouse button press or release by button index.
    pub fn set_button(&mut self, button: usize, pressed: bool) {
        if self.buttons.len() <= button {
            self.buttons.resize(button + 1, false);
        }
        self.buttons[button] = pressed;
    }

    /// Record the absolute cursor position in window coordinates.
    pub fn set_mouse_position(&mut self, x: f32, y: f32) {
        self.mouse_position = (x, y);
    }

    /// Accumulate relative mouse motion for this pump.
    ///
    /// Ignored while the mouse is not captured.
    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.capture_mouse {
            self.mouse_delta.0 += dx;
            self.mouse_delta.1 += dy;
        }
    }

    /// Enable or disable mouse capture.
    pub fn set_mouse_capture(&mut self, capture: bool) {
        self.capture_mouse = capture;
    }

    /// Flip the mouse capture flag and return the new value.
    pub fn toggle_mouse_capture(&mut self) -> bool {
        self.capture_mouse = !self.capture_mouse;
        self.capture_mouse
    }

    /// Whether relative mouse motion is currently being accumulated.
    pub fn mouse_captured(&self) -> bool {
        self.capture_mouse
    }

    /// Whether the key with the given scan code is held down.
    pub fn is_key_down(&self, scan_code: u32) -> bool {
        self.keys.get(scan_code as usize).copied().unwrap_or(false)
    }

    /// Whether the mouse button with the given index is held down.
    pub fn is_button_down(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    /// Absolute cursor position in window coordinates.
    pub fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    /// Relative mouse motion accumulated since the start of this pump.
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }
}

/// Map a winit mouse button to a stable table index.
pub fn button_index(button: winit::event::MouseButton) -> usize {
    match button {
        winit::event::MouseButton::Left => 0,
        winit::event::MouseButton::Right => 1,
        winit::event::MouseButton::Middle => 2,
        winit::event::MouseButton::Back => 3,
        winit::event::MouseButton::Forward => 4,
        winit::event::MouseButton::Other(n) => 5 + n as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scan_code_reads_released() {
        let input = InputState::new();
        assert!(!input.is_key_down(0));
        assert!(!input.is_key_down(500));
        assert!(!input.is_button_down(7));
    }

    #[test]
    fn key_table_grows_on_demand() {
        let mut input = InputState::new();
        input.set_key(41, true);
        assert!(input.is_key_down(41));
        assert!(!input.is_key_down(40));

        input.set_key(300, true);
        assert!(input.is_key_down(300));
        // Earlier state survives the resize.
        assert!(input.is_key_down(41));

        input.set_key(41, false);
        assert!(!input.is_key_down(41));
    }

    #[test]
    fn pressed_state_survives_pump_boundary() {
        let mut input = InputState::new();
        input.set_key(17, true);
        input.set_button(0, true);

        input.begin_pump();
        assert!(input.is_key_down(17));
        assert!(input.is_button_down(0));
    }

    #[test]
    fn delta_resets_each_pump() {
        let mut input = InputState::new();
        input.set_mouse_capture(true);

        input.begin_pump();
        input.add_mouse_motion(3.0, -2.0);
        input.add_mouse_motion(1.0, 1.0);
        assert_eq!(input.mouse_delta(), (4.0, -1.0));

        input.begin_pump();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn delta_ignored_without_capture() {
        let mut input = InputState::new();
        input.begin_pump();
        input.add_mouse_motion(5.0, 5.0);
        assert_eq!(input.mouse_delta(), (0.0, 0.0));

        assert!(input.toggle_mouse_capture());
        input.add_mouse_motion(5.0, 5.0);
        assert_eq!(input.mouse_delta(), (5.0, 5.0));
    }

    #[test]
    fn button_indices_are_stable() {
        use winit::event::MouseButton;

        assert_eq!(button_index(MouseButton::Left), 0);
        assert_eq!(button_index(MouseButton::Right), 1);
        assert_eq!(button_index(MouseButton::Middle), 2);
        assert_eq!(button_index(MouseButton::Back), 3);
        assert_eq!(button_index(MouseButton::Forward), 4);
        assert_eq!(button_index(MouseButton::Other(2)), 7);
    }
}

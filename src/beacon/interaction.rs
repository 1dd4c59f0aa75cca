use nalgebra::{Vector2, Vector3};
use winit::event::VirtualKeyCode;

use crate::beacon::index::SceneIndex;

/// Selection state carried from one frame to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    pub selected: Option<SceneIndex>,
    /// True until the mouse button has been held for a frame.
    pub first_press: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            selected: None,
            first_press: true,
        }
    }
}

/// What the host gathered from the window during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Cursor relative to the viewport centre, divided by its height.
    pub cursor_offset: Vector2<f32>,
    pub mouse_down: bool,
    /// Colour coming out of the picker widget this frame.
    pub picked_color: Option<Vector3<f32>>,
    /// Unit direction to move the selection by one step.
    pub nudge: Option<Vector3<f32>>,
}

/// Collects window events between frames so none of them is lost when several
/// arrive before the next redraw.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputLatch {
    held: bool,
    pressed: bool,
    nudge: Option<Vector3<f32>>,
}

impl InputLatch {
    pub fn press(&mut self) {
        self.held = true;
        self.pressed = true;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    /// Nudges from several key presses add up.
    pub fn nudge(&mut self, direction: Vector3<f32>) {
        self.nudge = Some(self.nudge.unwrap_or_else(Vector3::zeros) + direction);
    }

    /// Builds this frame's input and starts collecting the next one.
    ///
    /// A press counts as held for the frame it happened in, even if the button
    /// was already released again.
    pub fn take(&mut self, cursor_offset: Vector2<f32>, picked_color: Option<Vector3<f32>>) -> FrameInput {
        let input = FrameInput {
            cursor_offset,
            mouse_down: self.held || self.pressed,
            picked_color,
            nudge: self.nudge.take(),
        };
        self.pressed = false;
        input
    }
}

pub fn nudge_direction(key: VirtualKeyCode) -> Option<Vector3<f32>> {
    let direction = match key {
        VirtualKeyCode::Left => -Vector3::x(),
        VirtualKeyCode::Right => Vector3::x(),
        VirtualKeyCode::Up => Vector3::y(),
        VirtualKeyCode::Down => -Vector3::y(),
        VirtualKeyCode::PageUp => -Vector3::z(),
        VirtualKeyCode::PageDown => Vector3::z(),
        _ => return None,
    };
    Some(direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_map_to_unit_nudges() {
        assert_eq!(nudge_direction(VirtualKeyCode::Up), Some(Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(nudge_direction(VirtualKeyCode::Left), Some(Vector3::new(-1.0, 0.0, 0.0)));
        assert_eq!(nudge_direction(VirtualKeyCode::A), None);
    }

    #[test]
    fn click_within_one_frame_still_counts_as_pressed() {
        let mut latch = InputLatch::default();
        latch.press();
        latch.release();

        assert!(latch.take(Vector2::zeros(), None).mouse_down);
        assert!(!latch.take(Vector2::zeros(), None).mouse_down);
    }

    #[test]
    fn holding_stays_down_across_frames() {
        let mut latch = InputLatch::default();
        latch.press();

        assert!(latch.take(Vector2::zeros(), None).mouse_down);
        assert!(latch.take(Vector2::zeros(), None).mouse_down);
        latch.release();
        assert!(!latch.take(Vector2::zeros(), None).mouse_down);
    }

    #[test]
    fn nudges_in_one_frame_add_up() {
        let mut latch = InputLatch::default();
        latch.nudge(Vector3::x());
        latch.nudge(Vector3::y());
        latch.nudge(Vector3::x());

        let input = latch.take(Vector2::zeros(), None);
        assert_eq!(input.nudge, Some(Vector3::new(2.0, 1.0, 0.0)));
        assert_eq!(latch.take(Vector2::zeros(), None).nudge, None);
    }
}

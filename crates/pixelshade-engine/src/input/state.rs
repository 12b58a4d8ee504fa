use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, MouseButton};

/// What is held right now.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    /// Logical pixels; `None` while the pointer is outside the window.
    pub pointer: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Updates the held sets and records `ev` (and any fresh press) in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, state, repeat } => match state {
                ButtonState::Pressed => {
                    if self.keys_down.insert(key) && !repeat {
                        frame.keys_pressed.insert(key);
                    }
                }
                ButtonState::Released => {
                    self.keys_down.remove(&key);
                }
            },
            InputEvent::PointerButton { button, state } => match state {
                ButtonState::Pressed => {
                    if self.buttons_down.insert(button) {
                        frame.buttons_pressed.insert(button);
                    }
                }
                ButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },
            InputEvent::PointerMoved { x, y } => self.pointer = Some((x, y)),
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Focused(focused) => {
                self.focused = focused;
                // No release events arrive while unfocused.
                if !focused {
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }
        }
        frame.events.push(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: ButtonState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            repeat: false,
        }
    }

    #[test]
    fn held_key_is_pressed_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::T, ButtonState::Pressed));
        assert!(frame.keys_pressed.contains(&Key::T));

        frame.clear();
        state.apply_event(
            &mut frame,
            InputEvent::Key {
                key: Key::T,
                state: ButtonState::Pressed,
                repeat: true,
            },
        );
        assert!(frame.keys_pressed.is_empty());
        assert!(state.key_down(Key::T));

        state.apply_event(&mut frame, key(Key::T, ButtonState::Released));
        assert!(!state.key_down(Key::T));
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::I, ButtonState::Pressed));
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: ButtonState::Pressed,
            },
        );
        assert!(state.button_down(MouseButton::Left));

        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::I));
        assert!(!state.button_down(MouseButton::Left));
    }

    #[test]
    fn pointer_path_is_kept_in_order() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for (x, y) in [(1.0, 1.0), (3.0, 4.0)] {
            state.apply_event(&mut frame, InputEvent::PointerMoved { x, y });
        }
        assert_eq!(frame.pointer_moves().collect::<Vec<_>>(), vec![(1.0, 1.0), (3.0, 4.0)]);
        assert_eq!(state.pointer, Some((3.0, 4.0)));

        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer, None);
    }
}

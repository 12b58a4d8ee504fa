use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton};

/// Everything that happened since the last frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
    }

    /// Pointer positions in arrival order.
    pub fn pointer_moves(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.events.iter().filter_map(|ev| match *ev {
            InputEvent::PointerMoved { x, y } => Some((x, y)),
            _ => None,
        })
    }
}

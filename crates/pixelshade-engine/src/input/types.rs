/// Keys the viewer binds, by physical position (US layout names).
///
/// Everything else is `Other` with the platform's key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    /// `=` and keypad `+`.
    Equal,
    /// `-` and keypad `-`.
    Minus,
    Comma,
    Period,
    I,
    O,
    T,
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Window input, independent of the windowing library.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: ButtonState,
        /// Generated by the platform's key repeat.
        repeat: bool,
    },
    /// Pointer position in logical pixels.
    PointerMoved { x: f32, y: f32 },
    PointerButton {
        button: MouseButton,
        state: ButtonState,
    },
    PointerLeft,
    Focused(bool),
}

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{ButtonState, InputEvent, Key, MouseButton};

/// Converts the window events the viewer cares about. `scale_factor` turns
/// physical cursor positions into logical ones.
pub fn translate_window_event(event: &WindowEvent, scale_factor: f64) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: match event.physical_key {
                PhysicalKey::Code(code) => map_key_code(code),
                PhysicalKey::Unidentified(_) => Key::Other(0),
            },
            state: button_state(event.state),
            repeat: event.repeat,
        },
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = logical(*position, scale_factor);
            InputEvent::PointerMoved { x, y }
        }
        WindowEvent::MouseInput { state, button, .. } => InputEvent::PointerButton {
            button: map_button(*button),
            state: button_state(*state),
        },
        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,
        WindowEvent::Focused(focused) => InputEvent::Focused(*focused),
        _ => return None,
    };
    Some(ev)
}

fn logical(position: PhysicalPosition<f64>, scale_factor: f64) -> (f32, f32) {
    let p = position.to_logical::<f32>(scale_factor);
    (p.x, p.y)
}

fn button_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(n) => MouseButton::Other(n),
    }
}

fn map_key_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Equal | KeyCode::NumpadAdd => Key::Equal,
        KeyCode::Minus | KeyCode::NumpadSubtract => Key::Minus,
        KeyCode::Comma => Key::Comma,
        KeyCode::Period => Key::Period,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyT => Key::T,
        other => Key::Other(other as u32),
    }
}

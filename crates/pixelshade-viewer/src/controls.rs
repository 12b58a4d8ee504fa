//! Keyboard bindings of the viewer.

use std::time::{Duration, Instant};

use pixelshade_engine::input::{InputState, Key, KeyDebounce};

/// What the keyboard asks for this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlActions {
    pub exit: bool,
    /// Number of zoom steps, positive is outward.
    pub zoom: i32,
    pub finer: bool,
    pub coarser: bool,
    pub toggle_palette: bool,
    /// Number of dither steps, positive is more.
    pub dither: i32,
}

/// Held-key polling plus debouncing for the discrete actions.
#[derive(Debug, Clone)]
pub struct Controls {
    finer: KeyDebounce,
    coarser: KeyDebounce,
    palette: KeyDebounce,
}

impl Controls {
    pub fn new(factor_repeat: Duration) -> Self {
        Self {
            finer: KeyDebounce::with_repeat(factor_repeat),
            coarser: KeyDebounce::with_repeat(factor_repeat),
            palette: KeyDebounce::new(),
        }
    }

    pub fn poll(&mut self, input: &InputState, now: Instant) -> ControlActions {
        let down = |k| input.key_down(k);
        let axis = |pos: Key, neg: Key| down(pos) as i32 - down(neg) as i32;

        ControlActions {
            exit: down(Key::Escape),
            zoom: axis(Key::O, Key::I),
            finer: self.finer.update(down(Key::Equal), now),
            coarser: self.coarser.update(down(Key::Minus), now),
            toggle_palette: self.palette.update(down(Key::T), now),
            dither: axis(Key::Period, Key::Comma),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[Key]) -> InputState {
        let mut input = InputState::default();
        input.keys_down.extend(keys.iter().copied());
        input
    }

    #[test]
    fn palette_toggle_fires_once_per_press() {
        let t0 = Instant::now();
        let mut c = Controls::new(Duration::from_millis(250));
        let t = held(&[Key::T]);

        assert!(c.poll(&t, t0).toggle_palette);
        for ms in [16, 500, 5000] {
            assert!(!c.poll(&t, t0 + Duration::from_millis(ms)).toggle_palette);
        }
        assert!(!c.poll(&held(&[]), t0 + Duration::from_millis(5016)).toggle_palette);
        assert!(c.poll(&t, t0 + Duration::from_millis(5032)).toggle_palette);
    }

    #[test]
    fn factor_keys_repeat_while_held() {
        let t0 = Instant::now();
        let mut c = Controls::new(Duration::from_millis(250));
        let minus = held(&[Key::Minus]);

        let fired: Vec<bool> = [0, 100, 250, 300, 500]
            .into_iter()
            .map(|ms| c.poll(&minus, t0 + Duration::from_millis(ms)).coarser)
            .collect();
        assert_eq!(fired, vec![true, false, true, false, true]);
    }

    #[test]
    fn held_keys_map_to_continuous_actions() {
        let mut c = Controls::new(Duration::from_millis(250));
        let a = c.poll(&held(&[Key::I, Key::Period, Key::Escape]), Instant::now());
        assert!(a.exit);
        assert_eq!(a.zoom, -1);
        assert_eq!(a.dither, 1);

        let b = c.poll(&held(&[Key::I, Key::O, Key::Comma]), Instant::now());
        assert_eq!(b.zoom, 0);
        assert_eq!(b.dither, -1);
        assert!(!b.exit);
    }
}

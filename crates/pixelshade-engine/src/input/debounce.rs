//! Per-key debouncing for actions that should not fire every frame.

use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DebounceState {
    Idle,
    Pressed,
    Released,
}

/// Turns a held key into discrete firings.
///
/// A press fires once. While the key stays down it fires again only when a
/// repeat interval is set and has elapsed since the last firing.
#[derive(Debug, Clone)]
pub struct KeyDebounce {
    state: DebounceState,
    repeat: Option<Duration>,
    last_fired: Option<Instant>,
}

impl KeyDebounce {
    /// Fires once per press.
    pub fn new() -> Self {
        Self {
            state: DebounceState::Idle,
            repeat: None,
            last_fired: None,
        }
    }

    /// Fires on press, then every `interval` while held.
    pub fn with_repeat(interval: Duration) -> Self {
        Self {
            repeat: Some(interval),
            ..Self::new()
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Feeds the key's current held state. Returns `true` when the action fires.
    pub fn update(&mut self, down: bool, now: Instant) -> bool {
        match (self.state, down) {
            (DebounceState::Idle | DebounceState::Released, true) => {
                self.state = DebounceState::Pressed;
                self.last_fired = Some(now);
                true
            }
            (DebounceState::Pressed, true) => {
                let due = match (self.repeat, self.last_fired) {
                    (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
                    _ => false,
                };
                if due {
                    self.last_fired = Some(now);
                }
                due
            }
            (DebounceState::Pressed, false) => {
                self.state = DebounceState::Released;
                false
            }
            (_, false) => false,
        }
    }
}

impl Default for KeyDebounce {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn fires_once_per_press_without_repeat() {
        let t0 = Instant::now();
        let mut d = KeyDebounce::new();
        assert_eq!(d.state(), DebounceState::Idle);

        assert!(d.update(true, t0));
        for i in 1..100 {
            assert!(!d.update(true, ms(t0, i * 50)));
        }
        assert!(!d.update(false, ms(t0, 6000)));
        assert_eq!(d.state(), DebounceState::Released);

        assert!(d.update(true, ms(t0, 6100)));
    }

    #[test]
    fn repeats_after_interval_while_held() {
        let t0 = Instant::now();
        let mut d = KeyDebounce::with_repeat(Duration::from_millis(250));

        assert!(d.update(true, t0));
        assert!(!d.update(true, ms(t0, 100)));
        assert!(!d.update(true, ms(t0, 249)));
        assert!(d.update(true, ms(t0, 250)));
        assert!(!d.update(true, ms(t0, 400)));
        assert!(d.update(true, ms(t0, 500)));
    }

    #[test]
    fn release_rearms_immediately() {
        let t0 = Instant::now();
        let mut d = KeyDebounce::with_repeat(Duration::from_millis(250));
        assert!(d.update(true, t0));
        assert!(!d.update(false, ms(t0, 10)));
        assert!(d.update(true, ms(t0, 20)));
    }

    #[test]
    fn idle_key_never_fires() {
        let t0 = Instant::now();
        let mut d = KeyDebounce::new();
        for i in 0..10 {
            assert!(!d.update(false, ms(t0, i)));
        }
        assert_eq!(d.state(), DebounceState::Idle);
    }
}

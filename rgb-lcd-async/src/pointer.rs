//! Touch samples to GUI pointer events.
//!
//! The touch controller is polled once per GUI loop and reports either the
//! first touch point or nothing. GUI toolkits expect edge events instead, so
//! [`PointerTracker`] remembers the previous state and emits a press, a move
//! when the point actually changed, or a release at the last known position.

/// A pointer transition to forward to the GUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// A finger touched the panel.
    Pressed {
        /// Panel x coordinate.
        x: u16,
        /// Panel y coordinate.
        y: u16,
    },
    /// A touching finger moved.
    Moved {
        /// Panel x coordinate.
        x: u16,
        /// Panel y coordinate.
        y: u16,
    },
    /// The finger was lifted; reported at the last touched position.
    Released {
        /// Panel x coordinate.
        x: u16,
        /// Panel y coordinate.
        y: u16,
    },
}

/// Edge detector over polled touch samples.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last: Option<(u16, u16)>,
    pressed: bool,
}

impl PointerTracker {
    /// A tracker in the released state.
    pub const fn new() -> Self {
        Self {
            last: None,
            pressed: false,
        }
    }

    /// Feeds one poll result, `Some((x, y))` while touched.
    pub fn update(&mut self, sample: Option<(u16, u16)>) -> Option<PointerEvent> {
        match (sample, self.pressed) {
            (Some((x, y)), false) => {
                self.pressed = true;
                self.last = Some((x, y));
                Some(PointerEvent::Pressed { x, y })
            }
            (Some((x, y)), true) => {
                if self.last == Some((x, y)) {
                    return None;
                }
                self.last = Some((x, y));
                Some(PointerEvent::Moved { x, y })
            }
            (None, true) => {
                self.pressed = false;
                let (x, y) = self.last.unwrap_or_default();
                Some(PointerEvent::Released { x, y })
            }
            (None, false) => None,
        }
    }

    /// Whether the last sample was a touch.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// The last touched position, kept after release.
    pub fn last_position(&self) -> Option<(u16, u16)> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_move_release() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.update(None), None);
        assert_eq!(
            tracker.update(Some((10, 20))),
            Some(PointerEvent::Pressed { x: 10, y: 20 })
        );
        assert!(tracker.is_pressed());
        assert_eq!(tracker.update(Some((10, 20))), None);
        assert_eq!(
            tracker.update(Some((12, 25))),
            Some(PointerEvent::Moved { x: 12, y: 25 })
        );
        assert_eq!(
            tracker.update(None),
            Some(PointerEvent::Released { x: 12, y: 25 })
        );
        assert!(!tracker.is_pressed());
        assert_eq!(tracker.update(None), None);
        assert_eq!(tracker.last_position(), Some((12, 25)));
    }

    #[test]
    fn a_new_touch_after_release_is_a_press() {
        let mut tracker = PointerTracker::new();
        tracker.update(Some((1, 1)));
        tracker.update(None);
        assert_eq!(
            tracker.update(Some((1, 1))),
            Some(PointerEvent::Pressed { x: 1, y: 1 })
        );
    }
}

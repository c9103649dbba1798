//! Region-of-interest selection over a displayed image
//!
//! The selection is driven by pointer down/move/up. `RoiState` is a plain
//! value with a pure transition function; `RoiController` owns one and maps
//! client coordinates through the image's on-screen box.

use crate::models::{NormalizedPoint, NormalizedRect, ScreenBox};

/// What the pointer is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RoiMode {
    /// No gesture in progress
    #[default]
    Idle,
    /// Dragging out a new rectangle from `anchor`
    Drawing {
        /// Pointer-down position
        anchor: NormalizedPoint,
    },
    /// Dragging an existing rectangle
    Moving {
        /// Pointer minus rectangle origin at pointer-down
        offset: (f32, f32),
        /// Rectangle as it was at pointer-down
        anchor_rect: NormalizedRect,
    },
}

/// Pointer input, already normalized to image space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button/finger pressed
    Down(NormalizedPoint),
    /// Pointer moved
    Move(NormalizedPoint),
    /// Button/finger released
    Up,
}

/// Selection state: gesture mode plus the current rectangle, if any
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoiState {
    /// Gesture mode
    pub mode: RoiMode,
    /// Current selection
    pub rect: Option<NormalizedRect>,
}

impl RoiState {
    /// Apply one pointer event
    pub fn transition(self, event: PointerEvent) -> RoiState {
        match (self.mode, event) {
            (_, PointerEvent::Down(p)) => match self.rect {
                Some(rect) if rect.contains(&p) => RoiState {
                    mode: RoiMode::Moving {
                        offset: p.offset_from(&rect.origin()),
                        anchor_rect: rect,
                    },
                    rect: Some(rect),
                },
                _ => RoiState {
                    mode: RoiMode::Drawing { anchor: p },
                    rect: Some(NormalizedRect::at(p)),
                },
            },
            (RoiMode::Drawing { anchor }, PointerEvent::Move(p)) => RoiState {
                mode: self.mode,
                rect: Some(NormalizedRect::from_corners(anchor, p)),
            },
            (
                RoiMode::Moving {
                    offset,
                    anchor_rect,
                },
                PointerEvent::Move(p),
            ) => RoiState {
                mode: self.mode,
                rect: Some(anchor_rect.translated_to(p.x - offset.0, p.y - offset.1)),
            },
            (RoiMode::Idle, PointerEvent::Move(_)) => self,
            (_, PointerEvent::Up) => RoiState {
                mode: RoiMode::Idle,
                rect: self.rect.filter(|r| !r.is_too_small()),
            },
        }
    }

    /// The rectangle, once no gesture is in progress
    pub fn finalized(&self) -> Option<NormalizedRect> {
        match self.mode {
            RoiMode::Idle => self.rect,
            _ => None,
        }
    }
}

/// Owns the selection for one displayed image
#[derive(Debug, Clone, Default)]
pub struct RoiController {
    state: RoiState,
    screen: ScreenBox,
}

impl RoiController {
    /// Controller for an image rendered at `screen`
    pub fn new(screen: ScreenBox) -> Self {
        Self {
            state: RoiState::default(),
            screen,
        }
    }

    /// Update the on-screen box after a layout change
    pub fn set_screen_box(&mut self, screen: ScreenBox) {
        self.screen = screen;
    }

    /// Feed a normalized pointer event
    pub fn handle(&mut self, event: PointerEvent) {
        let next = self.state.transition(event);
        if next.mode != self.state.mode {
            log::trace!("roi mode {:?} -> {:?}", self.state.mode, next.mode);
        }
        if self.state.rect.is_some() && next.rect.is_none() {
            log::debug!("selection discarded as too small");
        }
        self.state = next;
    }

    /// Pointer pressed at client coordinates
    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) {
        let p = self.screen.normalize(client_x, client_y);
        self.handle(PointerEvent::Down(p));
    }

    /// Pointer moved to client coordinates
    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        let p = self.screen.normalize(client_x, client_y);
        self.handle(PointerEvent::Move(p));
    }

    /// Pointer released
    pub fn pointer_up(&mut self) {
        self.handle(PointerEvent::Up);
    }

    /// Drop the selection
    pub fn clear(&mut self) {
        self.state = RoiState::default();
    }

    /// Current state
    pub fn state(&self) -> RoiState {
        self.state
    }

    /// Current gesture mode
    pub fn mode(&self) -> RoiMode {
        self.state.mode
    }

    /// Current rectangle, including one still being dragged
    pub fn rect(&self) -> Option<NormalizedRect> {
        self.state.rect
    }

    /// Rectangle ready for scanning
    pub fn selection(&self) -> Option<NormalizedRect> {
        self.state.finalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> NormalizedPoint {
        NormalizedPoint::new(x, y)
    }

    fn drag(state: RoiState, from: NormalizedPoint, to: NormalizedPoint) -> RoiState {
        state
            .transition(PointerEvent::Down(from))
            .transition(PointerEvent::Move(to))
            .transition(PointerEvent::Up)
    }

    #[test]
    fn test_tap_is_discarded() {
        let s = drag(RoiState::default(), pt(0.5, 0.5), pt(0.51, 0.51));
        assert_eq!(s.mode, RoiMode::Idle);
        assert_eq!(s.rect, None);
    }

    #[test]
    fn test_small_drag_is_kept() {
        let s = drag(RoiState::default(), pt(0.5, 0.5), pt(0.55, 0.55));
        let rect = s.finalized().expect("kept");
        assert!((rect.w - 0.05).abs() < 1e-5);
        assert!((rect.h - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_drawing_backwards_normalizes() {
        let s = RoiState::default()
            .transition(PointerEvent::Down(pt(0.8, 0.7)))
            .transition(PointerEvent::Move(pt(0.2, 0.1)));
        assert!(matches!(s.mode, RoiMode::Drawing { .. }));
        assert!(s.finalized().is_none());
        let rect = s.rect.expect("live rect");
        assert!((rect.x - 0.2).abs() < 1e-6);
        assert!((rect.y - 0.1).abs() < 1e-6);
        assert!((rect.w - 0.6).abs() < 1e-6);
        assert!((rect.h - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_move_clamps_to_unit_square() {
        let start = RoiState {
            mode: RoiMode::Idle,
            rect: Some(NormalizedRect::new(0.4, 0.5, 0.3, 0.2)),
        };
        let s = start
            .transition(PointerEvent::Down(pt(0.5, 0.6)))
            .transition(PointerEvent::Move(pt(1.0, 1.0)));
        let rect = s.rect.expect("rect");
        assert!(rect.x <= 0.7 + 1e-6);
        assert!(rect.y <= 0.8 + 1e-6);
        assert!((rect.w - 0.3).abs() < 1e-6);
        assert!((rect.h - 0.2).abs() < 1e-6);

        let s = s.transition(PointerEvent::Move(pt(0.0, 0.0)));
        let rect = s.rect.expect("rect");
        assert_eq!((rect.x, rect.y), (0.0, 0.0));
    }

    #[test]
    fn test_move_anchor_past_edge_clamps() {
        // Anchored at (0.8, 0.8) the rect already overflows; any move pulls it back in.
        let start = RoiState {
            mode: RoiMode::Idle,
            rect: Some(NormalizedRect::new(0.8, 0.8, 0.3, 0.2)),
        };
        let s = start
            .transition(PointerEvent::Down(pt(0.85, 0.85)))
            .transition(PointerEvent::Move(pt(0.95, 0.95)))
            .transition(PointerEvent::Up);
        let rect = s.finalized().expect("rect");
        assert!(rect.x <= 0.7 + 1e-6);
        assert!(rect.y <= 0.8 + 1e-6);
    }

    #[test]
    fn test_down_outside_replaces_rect() {
        let first = drag(RoiState::default(), pt(0.1, 0.1), pt(0.3, 0.3));
        assert!(first.rect.is_some());
        let s = first.transition(PointerEvent::Down(pt(0.6, 0.6)));
        assert!(matches!(s.mode, RoiMode::Drawing { .. }));
        assert_eq!(s.rect, Some(NormalizedRect::at(pt(0.6, 0.6))));
    }

    #[test]
    fn test_idle_move_and_up_are_noops() {
        let s = RoiState::default().transition(PointerEvent::Move(pt(0.3, 0.3)));
        assert_eq!(s, RoiState::default());
        let s = s.transition(PointerEvent::Up);
        assert_eq!(s, RoiState::default());
    }

    #[test]
    fn test_controller_uses_screen_box() {
        let mut roi = RoiController::new(ScreenBox::new(100.0, 100.0, 200.0, 100.0));
        roi.pointer_down(110.0, 130.0);
        roi.pointer_move(290.0, 160.0);
        assert!(roi.selection().is_none());
        roi.pointer_up();
        let rect = roi.selection().expect("selection");
        assert!((rect.x - 0.05).abs() < 1e-5);
        assert!((rect.y - 0.3).abs() < 1e-5);
        assert!((rect.w - 0.9).abs() < 1e-5);
        assert!((rect.h - 0.3).abs() < 1e-5);

        roi.clear();
        assert_eq!(roi.rect(), None);
        assert_eq!(roi.mode(), RoiMode::Idle);
    }
}

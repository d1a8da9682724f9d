//! Pointer interaction shared by the platform backends
//!
//! Backends feed raw button/motion events in window-local and screen
//! coordinates; the tracker decides whether the gesture is a drag, an edge
//! resize or a click and which cursor shape the edge under the pointer needs.

use meetclock_core::Geometry;

/// Width of the border band that starts a resize
pub const RESIZE_MARGIN: i32 = 5;
/// Resizes are only applied while the window stays larger than this
pub const MIN_RESIZE_WIDTH: i32 = 100;
pub const MIN_RESIZE_HEIGHT: i32 = 50;
/// Movement (px) after which a press becomes a drag instead of a click
pub const CLICK_SLOP: i32 = 3;

/// Window edges under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeEdge {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl ResizeEdge {
    pub const NONE: ResizeEdge = ResizeEdge {
        top: false,
        bottom: false,
        left: false,
        right: false,
    };

    /// Edges within [`RESIZE_MARGIN`] of a window-local point
    pub fn at(x: i32, y: i32, width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self {
            top: y < RESIZE_MARGIN,
            bottom: y > h - RESIZE_MARGIN,
            left: x < RESIZE_MARGIN,
            right: x > w - RESIZE_MARGIN,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn cursor(&self) -> CursorShape {
        match (self.top, self.bottom, self.left, self.right) {
            (true, _, true, _) | (_, true, _, true) => CursorShape::DiagonalNwSe,
            (true, _, _, true) | (_, true, true, _) => CursorShape::DiagonalNeSw,
            (true, _, _, _) | (_, true, _, _) => CursorShape::Vertical,
            (_, _, true, _) | (_, _, _, true) => CursorShape::Horizontal,
            _ => CursorShape::Arrow,
        }
    }

    /// Geometry after dragging these edges by (dx, dy) from `start`.
    /// `None` when the result would be too small to apply.
    pub fn resize(&self, start: Geometry, dx: i32, dy: i32) -> Option<Geometry> {
        let (mut left, mut top) = (start.x, start.y);
        let (mut right, mut bottom) = (start.x + start.width as i32, start.y + start.height as i32);
        if self.top {
            top += dy;
        }
        if self.bottom {
            bottom += dy;
        }
        if self.left {
            left += dx;
        }
        if self.right {
            right += dx;
        }

        let (width, height) = (right - left, bottom - top);
        (width > MIN_RESIZE_WIDTH && height > MIN_RESIZE_HEIGHT).then_some(Geometry {
            x: left,
            y: top,
            width: width as u32,
            height: height as u32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    Horizontal,
    Vertical,
    /// Top-left / bottom-right
    DiagonalNwSe,
    /// Top-right / bottom-left
    DiagonalNeSw,
}

/// What a pointer event asks the backend to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    None,
    /// Move the window to this screen position
    Move { x: i32, y: i32 },
    /// Apply this geometry
    Resize(Geometry),
    /// Change the cursor
    Cursor(CursorShape),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    edge: ResizeEdge,
    local: (i32, i32),
    screen: (i32, i32),
    start: Geometry,
    moved: bool,
}

/// Left-button gesture tracker
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    press: Option<Press>,
    cursor: CursorShape,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Left button went down
    pub fn press(&mut self, local: (i32, i32), screen: (i32, i32), geometry: Geometry) {
        self.press = Some(Press {
            edge: ResizeEdge::at(local.0, local.1, geometry.width, geometry.height),
            local,
            screen,
            start: geometry,
            moved: false,
        });
    }

    /// Pointer moved
    pub fn motion(&mut self, local: (i32, i32), screen: (i32, i32), geometry: Geometry) -> PointerAction {
        let Some(press) = self.press.as_mut() else {
            let shape = ResizeEdge::at(local.0, local.1, geometry.width, geometry.height).cursor();
            if shape == self.cursor {
                return PointerAction::None;
            }
            self.cursor = shape;
            return PointerAction::Cursor(shape);
        };

        let dx = screen.0 - press.screen.0;
        let dy = screen.1 - press.screen.1;
        if !press.moved && dx.abs() <= CLICK_SLOP && dy.abs() <= CLICK_SLOP {
            return PointerAction::None;
        }
        press.moved = true;

        if press.edge.is_none() {
            PointerAction::Move {
                x: press.start.x + dx,
                y: press.start.y + dy,
            }
        } else {
            press
                .edge
                .resize(press.start, dx, dy)
                .map_or(PointerAction::None, PointerAction::Resize)
        }
    }

    /// Left button released. Returns the click position (window-local) when
    /// the press was neither a drag nor a resize.
    pub fn release(&mut self) -> Option<(f32, f32)> {
        let press = self.press.take()?;
        (!press.moved && press.edge.is_none())
            .then_some((press.local.0 as f32, press.local.1 as f32))
    }

    /// Pointer left the window
    pub fn leave(&mut self) -> PointerAction {
        if self.press.is_some() || self.cursor == CursorShape::Arrow {
            return PointerAction::None;
        }
        self.cursor = CursorShape::Arrow;
        PointerAction::Cursor(CursorShape::Arrow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> Geometry {
        Geometry {
            x: 100,
            y: 100,
            width: 350,
            height: 250,
        }
    }

    #[test]
    fn test_edges_and_cursors() {
        assert_eq!(ResizeEdge::at(2, 2, 350, 250).cursor(), CursorShape::DiagonalNwSe);
        assert_eq!(ResizeEdge::at(348, 248, 350, 250).cursor(), CursorShape::DiagonalNwSe);
        assert_eq!(ResizeEdge::at(348, 2, 350, 250).cursor(), CursorShape::DiagonalNeSw);
        assert_eq!(ResizeEdge::at(2, 248, 350, 250).cursor(), CursorShape::DiagonalNeSw);
        assert_eq!(ResizeEdge::at(100, 1, 350, 250).cursor(), CursorShape::Vertical);
        assert_eq!(ResizeEdge::at(349, 100, 350, 250).cursor(), CursorShape::Horizontal);
        assert_eq!(ResizeEdge::at(100, 100, 350, 250).cursor(), CursorShape::Arrow);
        // Margin boundary is exclusive
        assert!(ResizeEdge::at(5, 100, 350, 250).is_none());
        assert!(ResizeEdge::at(345, 100, 350, 250).is_none());
    }

    #[test]
    fn test_resize_top_left_moves_origin() {
        let edge = ResizeEdge::at(0, 0, 350, 250);
        let resized = edge.resize(geo(), 20, 10).unwrap();
        assert_eq!(
            resized,
            Geometry {
                x: 120,
                y: 110,
                width: 330,
                height: 240
            }
        );
    }

    #[test]
    fn test_resize_rejected_below_minimum() {
        let edge = ResizeEdge::at(349, 249, 350, 250);
        assert!(edge.resize(geo(), -250, 0).is_none());
        assert!(edge.resize(geo(), 0, -200).is_none());
        assert!(edge.resize(geo(), -249, -199).is_some());
    }

    #[test]
    fn test_press_release_without_motion_is_click() {
        let mut tracker = PointerTracker::new();
        tracker.press((50, 60), (150, 160), geo());
        assert_eq!(tracker.motion((51, 61), (151, 161), geo()), PointerAction::None);
        assert_eq!(tracker.release(), Some((50.0, 60.0)));
        assert!(tracker.press.is_none());
    }

    #[test]
    fn test_drag_moves_window_and_suppresses_click() {
        let mut tracker = PointerTracker::new();
        tracker.press((50, 60), (150, 160), geo());
        assert_eq!(
            tracker.motion((50, 60), (190, 130), geo()),
            PointerAction::Move { x: 140, y: 70 }
        );
        assert_eq!(tracker.release(), None);
    }

    #[test]
    fn test_edge_press_resizes_not_clicks() {
        let mut tracker = PointerTracker::new();
        tracker.press((348, 100), (448, 200), geo());
        assert!(tracker.press.is_some_and(|p| !p.edge.is_none()));
        assert_eq!(
            tracker.motion((398, 100), (498, 200), geo()),
            PointerAction::Resize(Geometry {
                x: 100,
                y: 100,
                width: 400,
                height: 250
            })
        );
        assert_eq!(tracker.release(), None);

        // An edge press that never moves is still not a click
        tracker.press((348, 100), (448, 200), geo());
        assert_eq!(tracker.release(), None);
    }

    #[test]
    fn test_hover_reports_cursor_changes_once() {
        let mut tracker = PointerTracker::new();
        assert_eq!(
            tracker.motion((1, 100), (101, 200), geo()),
            PointerAction::Cursor(CursorShape::Horizontal)
        );
        assert_eq!(tracker.motion((2, 100), (102, 200), geo()), PointerAction::None);
        assert_eq!(tracker.leave(), PointerAction::Cursor(CursorShape::Arrow));
        assert_eq!(tracker.leave(), PointerAction::None);
    }
}

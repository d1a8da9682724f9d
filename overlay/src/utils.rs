//! Small helpers shared by the widgets and the countdown overlay

use tiny_skia::Color;

/// Convert [u8; 4] RGBA array to tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Axis-aligned rectangle in window pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Shrink on every side by `by`, never below zero size
    pub fn inset(&self, by: f32) -> Self {
        Self {
            x: self.x + by,
            y: self.y + by,
            w: (self.w - by * 2.0).max(0.0),
            h: (self.h - by * 2.0).max(0.0),
        }
    }

    /// Split horizontally into `count` equal cells separated by `gap`
    pub fn columns(&self, count: usize, gap: f32) -> Vec<Bounds> {
        if count == 0 {
            return Vec::new();
        }
        let total_gap = gap * (count - 1) as f32;
        let cell = ((self.w - total_gap) / count as f32).max(0.0);
        (0..count)
            .map(|i| Bounds::new(self.x + i as f32 * (cell + gap), self.y, cell, self.h))
            .collect()
    }
}

/// Truncate a string to max_chars, adding "..." if truncated
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("Quarterly planning review", 10), "Quarter...");
        assert_eq!(truncate_name("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_bounds_contains_is_half_open() {
        let b = Bounds::new(10.0, 10.0, 20.0, 10.0);
        assert!(b.contains(10.0, 10.0));
        assert!(b.contains(29.9, 19.9));
        assert!(!b.contains(30.0, 15.0));
        assert!(!b.contains(15.0, 20.0));
    }

    #[test]
    fn test_columns_split_evenly() {
        let cells = Bounds::new(0.0, 0.0, 330.0, 30.0).columns(4, 10.0);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].w, 75.0);
        assert_eq!(cells[1].x, 85.0);
        assert_eq!(cells[3].right(), 330.0);
    }

    #[test]
    fn test_inset_never_negative() {
        let b = Bounds::new(0.0, 0.0, 4.0, 4.0).inset(5.0);
        assert_eq!((b.w, b.h), (0.0, 0.0));
    }
}

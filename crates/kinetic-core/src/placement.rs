//! Popover placement next to an anchor, clamped into the viewport

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport-relative pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// An unmounted anchor reports an empty rect
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Visual viewport: scroll offset, layout size and pinch scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub offset_left: f64,
    #[serde(default)]
    pub offset_top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            offset_left: 0.0,
            offset_top: 0.0,
            width,
            height,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Placement geometry constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementParams {
    /// Arrow size in pixels
    #[serde(default = "default_arrow_size")]
    pub arrow_size: f64,
    /// Upper bound of the combined padding on each axis
    #[serde(default = "default_max_padding")]
    pub max_padding: f64,
    /// How far the popover may rise above the anchor
    #[serde(default = "default_max_lift")]
    pub max_lift: f64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            arrow_size: default_arrow_size(),
            max_padding: default_max_padding(),
            max_lift: default_max_lift(),
        }
    }
}

fn default_arrow_size() -> f64 {
    16.0
}

fn default_max_padding() -> f64 {
    16.0
}

fn default_max_lift() -> f64 {
    64.0
}

/// Result of one placement pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Point the arrow aims at: trailing edge of the anchor, vertically centered
    pub anchor: (f64, f64),
    pub x: f64,
    pub y: f64,
    /// The popover could not fit beside the anchor and overlaps it
    pub is_floating: bool,
}

/// Computes popover positions, remembering the last valid anchor
#[derive(Debug, Clone, Default)]
pub struct PlacementEngine {
    params: PlacementParams,
    last_anchor: Option<(f64, f64)>,
}

impl PlacementEngine {
    pub fn new(params: PlacementParams) -> Self {
        Self {
            params,
            last_anchor: None,
        }
    }

    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    pub fn place(&mut self, anchor: Rect, viewport: Viewport, content: Size) -> Placement {
        let mut point = (
            viewport.offset_left + anchor.right(),
            viewport.offset_top + anchor.top + anchor.height / 2.0,
        );
        if anchor.is_empty() {
            // Anchor unmounted mid-animation: stay where we were
            if let Some(last) = self.last_anchor {
                point = last;
            }
        } else {
            self.last_anchor = Some(point);
        }

        let p = &self.params;
        let mut x = point.0 + p.arrow_size / 2.0;
        let mut y = point.1 - p.arrow_size - p.max_lift.min(content.height);

        let view_w = viewport.width * viewport.scale;
        let view_h = viewport.height * viewport.scale;
        let pad_x = (view_w - content.width).min(p.max_padding) / 2.0;
        let pad_y = (view_h - content.height).min(p.max_padding) / 2.0;

        // Clamp to the upper bound, then the padding floor, which wins when content overflows
        x = x.min(view_w - content.width - pad_x).max(pad_x).round();
        y = y.min(view_h - content.height - pad_y).max(pad_y).round();

        Placement {
            anchor: point,
            x,
            y,
            is_floating: x < point.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PlacementEngine {
        PlacementEngine::new(PlacementParams::default())
    }

    #[test]
    fn test_clamps_to_padding_floor() {
        let placement = engine().place(
            Rect::new(780.0, 20.0, 20.0, 40.0),
            Viewport::new(1024.0, 768.0),
            Size::new(200.0, 100.0),
        );
        assert_eq!(placement.anchor, (800.0, 40.0));
        assert_eq!(placement.x, 808.0);
        assert_eq!(placement.y, 8.0);
        assert!(!placement.is_floating);
    }

    #[test]
    fn test_right_edge_floats() {
        let placement = engine().place(
            Rect::new(980.0, 300.0, 20.0, 40.0),
            Viewport::new(1024.0, 768.0),
            Size::new(200.0, 100.0),
        );
        assert_eq!(placement.x, 816.0);
        assert_eq!(placement.y, 320.0 - 16.0 - 64.0);
        assert!(placement.is_floating);
    }

    #[test]
    fn test_bounds_hold_across_anchors() {
        let mut engine = engine();
        let viewport = Viewport::new(640.0, 480.0);
        let content = Size::new(300.0, 200.0);
        for i in 0..20 {
            for j in 0..20 {
                let rect = Rect::new(i as f64 * 35.0, j as f64 * 25.0, 24.0, 24.0);
                let p = engine.place(rect, viewport, content);
                assert!(p.x >= 8.0 && p.x <= 640.0 - 300.0 - 8.0, "x = {}", p.x);
                assert!(p.y >= 8.0 && p.y <= 480.0 - 200.0 - 8.0, "y = {}", p.y);
            }
        }
    }

    #[test]
    fn test_empty_anchor_reuses_last_point() {
        let mut engine = engine();
        let viewport = Viewport::new(1024.0, 768.0);
        let content = Size::new(200.0, 100.0);
        let before = engine.place(Rect::new(100.0, 300.0, 20.0, 40.0), viewport, content);
        let after = engine.place(Rect::default(), viewport, content);
        assert_eq!(before, after);
    }

    #[test]
    fn test_scale_and_offset() {
        let viewport = Viewport {
            offset_left: 10.0,
            offset_top: 20.0,
            width: 500.0,
            height: 400.0,
            scale: 2.0,
        };
        let p = engine().place(Rect::new(100.0, 200.0, 10.0, 10.0), viewport, Size::new(100.0, 50.0));
        assert_eq!(p.anchor, (120.0, 225.0));
        assert_eq!(p.x, 128.0);
        assert_eq!(p.y, 225.0 - 16.0 - 50.0);
    }

    #[test]
    fn test_content_larger_than_viewport() {
        let p = engine().place(
            Rect::new(100.0, 100.0, 10.0, 10.0),
            Viewport::new(200.0, 200.0),
            Size::new(300.0, 300.0),
        );
        // Negative padding; the floor still wins
        assert_eq!(p.x, -50.0);
        assert_eq!(p.y, -50.0);
    }
}

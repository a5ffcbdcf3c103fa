//! Scene configuration.

use canvanim_core::Point;
use serde::{Deserialize, Serialize};

/// How far the view may scroll past the surface edges, per side.
/// Negative extents are treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollRegion {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl ScrollRegion {
    pub fn uniform(extent: f64) -> Self {
        Self {
            west: extent,
            north: extent,
            east: extent,
            south: extent,
        }
    }

    fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            west: clean(self.west),
            north: clean(self.north),
            east: clean(self.east),
            south: clean(self.south),
        }
    }

    /// Clamp a requested view origin into `[-west, east] x [-north, south]`.
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(-self.west, self.east), y.clamp(-self.north, self.south))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneOptions {
    pub scroll_region: ScrollRegion,
    /// Position of the surface inside the host page; subtracted from raw
    /// pointer coordinates.
    pub offset: Point,
}

impl SceneOptions {
    pub fn with_scroll_region(mut self, region: ScrollRegion) -> Self {
        self.scroll_region = region;
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Point::new(x, y);
        self
    }

    pub(crate) fn sanitized(mut self) -> Self {
        self.scroll_region = self.scroll_region.sanitized();
        if !(self.offset.x.is_finite() && self.offset.y.is_finite()) {
            log::warn!("ignoring non-finite surface offset {:?}", self.offset);
            self.offset = Point::default();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clamp_stays_within_margins() {
        let region = ScrollRegion {
            west: 10.0,
            north: 20.0,
            east: 30.0,
            south: 40.0,
        };
        assert_eq!(region.clamp(-100.0, -100.0), (-10.0, -20.0));
        assert_eq!(region.clamp(100.0, 100.0), (30.0, 40.0));
        assert_eq!(region.clamp(5.0, -5.0), (5.0, -5.0));
    }

    #[test]
    fn negative_extents_become_zero() {
        let opts = SceneOptions::default()
            .with_scroll_region(ScrollRegion {
                west: -5.0,
                ..ScrollRegion::uniform(8.0)
            })
            .sanitized();
        assert_eq!(opts.scroll_region.west, 0.0);
        assert_eq!(opts.scroll_region.east, 8.0);
    }

    #[test]
    fn options_deserialize_from_partial_json() {
        let opts: SceneOptions =
            serde_json::from_str(r#"{"scrollRegion": {"south": 200}}"#).unwrap();
        assert_eq!(opts.scroll_region.south, 200.0);
        assert_eq!(opts.scroll_region.north, 0.0);
        assert_eq!(opts.offset, Point::default());
    }
}

//! Item styling ("pattern").
//!
//! A [`Pattern`] is always fully resolved: every key has a value, starting
//! from the defaults below. Updates arrive as a [`PatternPatch`] whose set
//! keys overwrite and whose unset keys leave the current value alone, so a
//! partial update never resets an earlier one.
//!
//! Colors are kept as CSS color strings; the drawing surface interprets them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Border dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
}

/// Border line-end and corner style.
///
/// | Style | Join | Cap |
/// |-------|------|-----|
/// | `square` | miter | square |
/// | `round` | round | round |
/// | `bevel` | bevel | butt |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderEnds {
    #[default]
    Square,
    Round,
    Bevel,
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Start,
    End,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Start => "start",
            TextAlign::End => "end",
        }
    }
}

/// A background gradient stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64, // 0.0 .. 1.0
    pub color: String,
}

/// Fully resolved style of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub background_color: String,
    pub border_width: f64,
    pub border_style: BorderStyle,
    pub border_color: String,
    pub border_ends_style: BorderEnds,
    pub color: String,
    pub font_size: f64,
    pub font_family: String,
    pub text_align: TextAlign,
    pub text_stroke_width: f64,
    pub text_stroke_color: String,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    pub shadow_blur: f64,
    pub shadow_color: String,
    pub background_gradient: Vec<GradientStop>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            background_color: "transparent".into(),
            border_width: 1.0,
            border_style: BorderStyle::Solid,
            border_color: "black".into(),
            border_ends_style: BorderEnds::Square,
            color: "black".into(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.into(),
            text_align: TextAlign::Left,
            text_stroke_width: 0.0,
            text_stroke_color: "black".into(),
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            shadow_blur: 0.0,
            shadow_color: "black".into(),
            background_gradient: Vec::new(),
        }
    }
}

/// A partial pattern update. Keys left `None` keep their current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternPatch {
    pub background_color: Option<String>,
    pub border_width: Option<f64>,
    pub border_style: Option<BorderStyle>,
    pub border_color: Option<String>,
    pub border_ends_style: Option<BorderEnds>,
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub text_align: Option<TextAlign>,
    pub text_stroke_width: Option<f64>,
    pub text_stroke_color: Option<String>,
    pub shadow_offset_x: Option<f64>,
    pub shadow_offset_y: Option<f64>,
    pub shadow_blur: Option<f64>,
    pub shadow_color: Option<String>,
    pub background_gradient: Option<Vec<GradientStop>>,
}

impl PatternPatch {
    pub fn is_empty(&self) -> bool {
        *self == PatternPatch::default()
    }

    /// Check every set key without touching any pattern.
    pub fn validate(&self, operation: &'static str) -> Result<()> {
        let non_negative = [
            ("borderWidth", self.border_width),
            ("textStrokeWidth", self.text_stroke_width),
            ("shadowBlur", self.shadow_blur),
        ];
        for (key, value) in non_negative {
            if let Some(v) = value
                && !(v.is_finite() && v >= 0.0)
            {
                return Err(Error::argument(
                    operation,
                    key,
                    format!("must be a finite, non-negative number (got {v})"),
                ));
            }
        }
        for (key, value) in [
            ("shadowOffsetX", self.shadow_offset_x),
            ("shadowOffsetY", self.shadow_offset_y),
        ] {
            if let Some(v) = value
                && !v.is_finite()
            {
                return Err(Error::argument(operation, key, format!("is not a finite number ({v})")));
            }
        }
        if let Some(size) = self.font_size
            && !(size.is_finite() && size > 0.0)
        {
            return Err(Error::argument(
                operation,
                "fontSize",
                format!("must be a positive number (got {size})"),
            ));
        }
        if let Some(ref stops) = self.background_gradient
            && let Some(bad) = stops
                .iter()
                .find(|s| !(s.offset.is_finite() && (0.0..=1.0).contains(&s.offset)))
        {
            return Err(Error::argument(
                operation,
                "backgroundGradient",
                format!("stop offset {} is outside 0..=1", bad.offset),
            ));
        }
        Ok(())
    }
}

impl Pattern {
    /// Defaults overlaid with `patch`.
    pub fn from_patch(patch: &PatternPatch, operation: &'static str) -> Result<Self> {
        let mut pattern = Pattern::default();
        pattern.apply(patch, operation)?;
        Ok(pattern)
    }

    /// Validate then merge `patch` into this pattern.
    pub fn apply(&mut self, patch: &PatternPatch, operation: &'static str) -> Result<()> {
        patch.validate(operation)?;
        merge_pattern(self, patch);
        Ok(())
    }

    /// CSS font shorthand, e.g. `12px Arial`.
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }

    /// Whether closed shapes get a background fill.
    pub fn has_fill(&self) -> bool {
        !self.background_gradient.is_empty() || !self.background_color.eq_ignore_ascii_case("transparent")
    }

    pub fn has_border(&self) -> bool {
        self.border_width > 0.0
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow_blur > 0.0 || self.shadow_offset_x != 0.0 || self.shadow_offset_y != 0.0
    }
}

fn merge_pattern(dst: &mut Pattern, src: &PatternPatch) {
    if let Some(ref v) = src.background_color {
        dst.background_color = v.clone();
    }
    if let Some(v) = src.border_width {
        dst.border_width = v;
    }
    if let Some(v) = src.border_style {
        dst.border_style = v;
    }
    if let Some(ref v) = src.border_color {
        dst.border_color = v.clone();
    }
    if let Some(v) = src.border_ends_style {
        dst.border_ends_style = v;
    }
    if let Some(ref v) = src.color {
        dst.color = v.clone();
    }
    if let Some(v) = src.font_size {
        dst.font_size = v;
    }
    if let Some(ref v) = src.font_family {
        dst.font_family = v.clone();
    }
    if let Some(v) = src.text_align {
        dst.text_align = v;
    }
    if let Some(v) = src.text_stroke_width {
        dst.text_stroke_width = v;
    }
    if let Some(ref v) = src.text_stroke_color {
        dst.text_stroke_color = v.clone();
    }
    if let Some(v) = src.shadow_offset_x {
        dst.shadow_offset_x = v;
    }
    if let Some(v) = src.shadow_offset_y {
        dst.shadow_offset_y = v;
    }
    if let Some(v) = src.shadow_blur {
        dst.shadow_blur = v;
    }
    if let Some(ref v) = src.shadow_color {
        dst.shadow_color = v.clone();
    }
    if let Some(ref v) = src.background_gradient {
        dst.background_gradient = v.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_update_keeps_earlier_keys() {
        let mut pattern = Pattern::from_patch(
            &PatternPatch {
                background_color: Some("red".into()),
                ..Default::default()
            },
            "test",
        )
        .unwrap();

        pattern
            .apply(
                &PatternPatch {
                    border_width: Some(2.0),
                    ..Default::default()
                },
                "test",
            )
            .unwrap();

        assert_eq!(pattern.background_color, "red");
        assert_eq!(pattern.border_width, 2.0);
        // Untouched keys stay at their defaults
        assert_eq!(pattern.border_color, "black");
        assert_eq!(pattern.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn zero_is_a_real_value() {
        let pattern = Pattern::from_patch(
            &PatternPatch {
                border_width: Some(0.0),
                ..Default::default()
            },
            "test",
        )
        .unwrap();
        assert_eq!(pattern.border_width, 0.0);
        assert!(!pattern.has_border());
    }

    #[test]
    fn invalid_patch_leaves_pattern_untouched() {
        let mut pattern = Pattern::default();
        let err = pattern
            .apply(
                &PatternPatch {
                    background_color: Some("blue".into()),
                    font_size: Some(-4.0),
                    ..Default::default()
                },
                "Item::set_pattern",
            )
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentType { argument: "fontSize", .. }));
        assert_eq!(pattern, Pattern::default());
    }

    #[test]
    fn patch_deserializes_from_camel_case_json() {
        let patch: PatternPatch = serde_json::from_str(
            r##"{"backgroundColor":"#F4A460","borderWidth":0,"borderEndsStyle":"round","unknownKey":1}"##,
        )
        .unwrap();
        assert_eq!(patch.background_color.as_deref(), Some("#F4A460"));
        assert_eq!(patch.border_width, Some(0.0));
        assert_eq!(patch.border_ends_style, Some(BorderEnds::Round));
        assert!(patch.color.is_none());
    }

    #[test]
    fn fill_detection() {
        let mut pattern = Pattern::default();
        assert!(!pattern.has_fill());
        pattern.background_gradient.push(GradientStop {
            offset: 0.0,
            color: "white".into(),
        });
        assert!(pattern.has_fill());
        assert_eq!(pattern.font(), "12px Arial");
    }

    #[test]
    fn gradient_offsets_are_checked() {
        let patch = PatternPatch {
            background_gradient: Some(vec![GradientStop {
                offset: 1.5,
                color: "red".into(),
            }]),
            ..Default::default()
        };
        assert!(patch.validate("test").is_err());
        assert!(PatternPatch::default().is_empty());
    }
}

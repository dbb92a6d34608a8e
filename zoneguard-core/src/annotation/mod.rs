//! annotation — overlay directives for the external renderer
//!
//! Nothing here draws pixels.  A directive describes how one object (or the
//! whole frame) should be marked: border and background colours, label text
//! and font, and for frame-level text a fixed position.

use serde::{Deserialize, Serialize};

// ── Colours and fonts ────────────────────────────────────────────────────────

/// RGBA colour with components in `[0, 1]`.  Serialised as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Font {
    pub name: String,
    pub size: u32,
    pub color: Rgba,
}

impl Font {
    pub fn new(name: impl Into<String>, size: u32, color: Rgba) -> Self {
        Self {
            name: name.into(),
            size,
            color,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Serif", 12, Rgba::WHITE)
    }
}

/// Pixel offset of frame-level text from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

// ── Directives ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotationTarget {
    Frame,
    /// `index` is the object's position in the frame's object list.
    Object { index: usize, track_id: Option<u64> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationDirective {
    pub target: AnnotationTarget,
    pub border_color: Rgba,
    pub background_color: Option<Rgba>,
    pub text: String,
    pub font: Font,
    /// Set for frame-level directives only.
    pub position: Option<Position>,
}

// ── Styles ───────────────────────────────────────────────────────────────────

/// Per-object styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationStyles {
    pub compliant_border: Rgba,
    pub violation_border: Rgba,
    pub label_background: Rgba,
    pub violation_background: Rgba,
    pub label_font: Font,
}

impl AnnotationStyles {
    /// Default look for any object: plain label, green border.
    pub fn neutral(&self, target: AnnotationTarget, label: &str) -> AnnotationDirective {
        AnnotationDirective {
            target,
            border_color: self.compliant_border,
            background_color: Some(self.label_background),
            text: label.to_string(),
            font: self.label_font.clone(),
            position: None,
        }
    }

    pub fn compliant(&self, target: AnnotationTarget, label: &str) -> AnnotationDirective {
        self.neutral(target, label)
    }

    pub fn violation(
        &self,
        target: AnnotationTarget,
        label: &str,
        warning_suffix: &str,
    ) -> AnnotationDirective {
        AnnotationDirective {
            border_color: self.violation_border,
            background_color: Some(self.violation_background),
            text: format!("{label}{warning_suffix}"),
            ..self.neutral(target, label)
        }
    }
}

impl Default for AnnotationStyles {
    fn default() -> Self {
        Self {
            compliant_border: Rgba::GREEN,
            violation_border: Rgba::RED,
            label_background: Rgba::GREEN.with_alpha(0.3),
            violation_background: Rgba::RED.with_alpha(0.3),
            label_font: Font::default(),
        }
    }
}

/// Styling of the frame-level summary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayStyle {
    pub x: u32,
    pub y: u32,
    pub background: Rgba,
    pub font: Font,
}

impl OverlayStyle {
    pub fn directive(&self, text: String) -> AnnotationDirective {
        AnnotationDirective {
            target: AnnotationTarget::Frame,
            border_color: Rgba::TRANSPARENT,
            background_color: Some(self.background),
            text,
            font: self.font.clone(),
            position: Some(Position {
                x: self.x,
                y: self.y,
            }),
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            x: 10,
            y: 12,
            background: Rgba::BLACK,
            font: Font::new("Serif", 18, Rgba::WHITE),
        }
    }
}

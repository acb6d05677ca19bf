//! Block symbol model shared by the parsers, the schematic and the exporter.
//!
//! A [`Symbol`] is produced either by reading a native symbol description
//! (`.bsf`, see [`bsf`]) or by synthesizing one from an entity declaration
//! (`.vhd`, see [`vhdl`]). Both paths yield interchangeable values.

pub mod bsf;
pub mod library;
pub mod vhdl;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use library::{SymbolLibrary, PIN_INPUT, PIN_OUTPUT};
pub use vhdl::{EntityDecl, PortMode, PortSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by two corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: i32,
}

impl Font {
    pub fn new(family: impl Into<String>, size: i32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new("Arial", 10)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    pub rect: Rect,
    pub font: Font,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
    pub width: i32,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2, width: 1 }
    }
}

/// Decorative geometry. Carries no connectivity meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub lines: Vec<Line>,
    pub texts: Vec<Text>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    #[default]
    #[serde(rename = "input")]
    Input,
    #[serde(rename = "output")]
    Output,
    #[serde(rename = "bidir")]
    Bidirectional,
}

impl PortDirection {
    /// Keyword used for this direction in symbol description files.
    pub fn keyword(self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
            PortDirection::Bidirectional => "bidir",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "input" => Some(PortDirection::Input),
            "output" => Some(PortDirection::Output),
            "bidir" => Some(PortDirection::Bidirectional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name with any `[hi..lo]` bus suffix removed.
    pub name: String,
    pub direction: PortDirection,
    /// Number of bits, always at least 1.
    pub width: u32,
    /// Pin endpoint relative to the symbol origin.
    pub location: Point,
    /// Label texts, the first of which named the port.
    pub texts: Vec<Text>,
    /// Pigtail segments drawn from the pin into the body.
    pub lines: Vec<Line>,
}

impl Port {
    pub fn is_bus(&self) -> bool {
        self.width > 1
    }

    /// Labels with repeated values removed, for display.
    pub fn display_texts(&self) -> Vec<&Text> {
        let mut seen: Vec<&str> = Vec::new();
        self.texts
            .iter()
            .filter(|text| {
                if seen.contains(&text.value.as_str()) {
                    false
                } else {
                    seen.push(&text.value);
                    true
                }
            })
            .collect()
    }

    /// The label a user sees, e.g. `A[7..0]`.
    pub fn label(&self) -> String {
        match self.texts.first() {
            Some(text) => text.value.clone(),
            None if self.is_bus() => bus_label(&self.name, self.width),
            None => self.name.clone(),
        }
    }
}

/// Format a bus label in `NAME[hi..0]` notation.
pub fn bus_label(name: &str, width: u32) -> String {
    if width > 1 {
        format!("{name}[{}..0]", width - 1)
    } else {
        name.to_string()
    }
}

/// Split a label into its base name and bit width.
///
/// `A[7..0]` yields `("A", 8)`, `CLK` yields `("CLK", 1)`.
pub fn split_bus_label(label: &str) -> (String, u32) {
    let label = label.trim();
    if let Some(open) = label.find('[') {
        if let Some(range) = label[open + 1..].strip_suffix(']') {
            if let Some((hi, lo)) = range.split_once("..") {
                if let (Ok(hi), Ok(lo)) = (hi.trim().parse::<i64>(), lo.trim().parse::<i64>()) {
                    let width = u32::try_from((hi - lo).unsigned_abs() + 1).unwrap_or(1);
                    return (label[..open].trim().to_string(), width);
                }
            }
        }
    }
    (label.to_string(), 1)
}

/// Normalized port name used for name-based matching: bus suffix stripped,
/// trimmed and lower-cased.
pub fn base_name(name: &str) -> String {
    name.split('[').next().unwrap_or_default().trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub version: String,
    pub bounds: Rect,
    pub ports: Vec<Port>,
    pub drawing: Drawing,
    pub main_texts: Vec<Text>,
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol {
            name: "Unknown".to_string(),
            version: "0.1".to_string(),
            bounds: Rect::default(),
            ports: Vec::new(),
            drawing: Drawing::default(),
            main_texts: Vec::new(),
        }
    }
}

impl Symbol {
    /// Load a symbol from a `.bsf`, `.vhd` or `.vhdl` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbol file {}", path.display()))?;
        let file_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let mut symbol = Self::from_string(&contents, &file_type)
            .with_context(|| format!("Failed to load symbol from {}", path.display()))?;

        if symbol.name == "Unknown" {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbol.name = stem.to_string();
            }
        }
        Ok(symbol)
    }

    pub fn from_string(contents: &str, file_type: &str) -> Result<Self> {
        match file_type {
            "bsf" => Ok(bsf::parse_bsf(contents)),
            "vhd" | "vhdl" => {
                let entity = vhdl::parse_entity(contents)
                    .ok_or_else(|| anyhow::anyhow!("No entity declaration found"))?;
                Ok(vhdl::synthesize_symbol(&entity.name, &entity.ports))
            }
            _ => Err(anyhow::anyhow!("Unsupported file type: {}", file_type)),
        }
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    pub fn port(&self, index: usize) -> Option<&Port> {
        self.ports.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bus_label() {
        assert_eq!(split_bus_label("A[7..0]"), ("A".to_string(), 8));
        assert_eq!(split_bus_label("D[0..15]"), ("D".to_string(), 16));
        assert_eq!(split_bus_label(" SEL "), ("SEL".to_string(), 1));
        assert_eq!(split_bus_label("X[3]"), ("X[3]".to_string(), 1));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("Data[7..0]"), "data");
        assert_eq!(base_name(" clk "), "clk");
    }

    #[test]
    fn test_display_texts_dedupes_repeated_labels() {
        let text = Text {
            value: "SEL".to_string(),
            rect: Rect::default(),
            font: Font::default(),
        };
        let port = Port {
            name: "SEL".to_string(),
            direction: PortDirection::Input,
            width: 1,
            location: Point::default(),
            texts: vec![text.clone(), text],
            lines: vec![],
        };
        assert_eq!(port.display_texts().len(), 1);
        assert_eq!(port.label(), "SEL");
    }

    #[test]
    fn test_unsupported_file_type() {
        assert!(Symbol::from_string("", "kicad_sym").is_err());
    }
}

use super::{PortMode, PortSpec};
use crate::{bus_label, Drawing, Font, Line, Point, Port, Rect, Symbol, Text};

const PIGTAIL: i32 = 16;
const PORT_PITCH: i32 = 16;
const TOP_MARGIN: i32 = 24;
const BOTTOM_MARGIN: i32 = 16;
const CHAR_WIDTH: i32 = 7;
const LABEL_CHAR_WIDTH: i32 = 6;
const LABEL_GAP: i32 = 4;
const TITLE_CHAR_WIDTH: i32 = 8;
const MIN_BODY_WIDTH: i32 = 60;
const CENTER_GAP: i32 = 20;
const GRID: i32 = 10;

/// Lay out a symbol for an entity that has no drawn symbol.
///
/// Inputs go on the left edge and every other mode on the right, each side
/// top-aligned at a fixed pitch. Pin endpoints sit at the end of a pigtail
/// outside the body rectangle.
pub fn synthesize_symbol(name: &str, ports: &[PortSpec]) -> Symbol {
    let (inputs, outputs): (Vec<&PortSpec>, Vec<&PortSpec>) =
        ports.iter().partition(|p| p.mode == PortMode::In);

    let rows = inputs.len().max(outputs.len()) as i32;
    let content_height = if rows > 0 { (rows - 1) * PORT_PITCH } else { 0 };
    let total_height = TOP_MARGIN + content_height + BOTTOM_MARGIN;

    let calc_width = longest_label(&inputs) * CHAR_WIDTH + CENTER_GAP + longest_label(&outputs) * CHAR_WIDTH;
    let body_width = MIN_BODY_WIDTH.max(div_ceil(calc_width, GRID) * GRID);
    let total_width = body_width + 2 * PIGTAIL;

    let label_font = Font::new("Arial", 8);
    let mut symbol_ports = Vec::with_capacity(ports.len());

    for (i, spec) in inputs.iter().enumerate() {
        let y = TOP_MARGIN + i as i32 * PORT_PITCH;
        let label = bus_label(&spec.name, spec.width);
        let label_x = PIGTAIL + LABEL_GAP;
        symbol_ports.push(Port {
            name: spec.name.clone(),
            direction: spec.mode.direction(),
            width: spec.width,
            location: Point::new(0, y),
            lines: vec![Line::new(Point::new(0, y), Point::new(PIGTAIL, y))],
            texts: vec![Text {
                rect: Rect::new(label_x, y - 6, label_x + label_len(&label) * LABEL_CHAR_WIDTH, y + 6),
                value: label,
                font: label_font.clone(),
            }],
        });
    }

    for (i, spec) in outputs.iter().enumerate() {
        let y = TOP_MARGIN + i as i32 * PORT_PITCH;
        let label = bus_label(&spec.name, spec.width);
        let label_right = total_width - PIGTAIL - LABEL_GAP;
        symbol_ports.push(Port {
            name: spec.name.clone(),
            direction: spec.mode.direction(),
            width: spec.width,
            location: Point::new(total_width, y),
            lines: vec![Line::new(
                Point::new(total_width - PIGTAIL, y),
                Point::new(total_width, y),
            )],
            texts: vec![Text {
                rect: Rect::new(label_right - label_len(&label) * LABEL_CHAR_WIDTH, y - 6, label_right, y + 6),
                value: label,
                font: label_font.clone(),
            }],
        });
    }

    let left = PIGTAIL;
    let right = total_width - PIGTAIL;
    let corners = [
        Point::new(left, 0),
        Point::new(right, 0),
        Point::new(right, total_height),
        Point::new(left, total_height),
    ];
    let body = (0..corners.len())
        .map(|i| Line::new(corners[i], corners[(i + 1) % corners.len()]))
        .collect();

    let title_half = label_len(name) * TITLE_CHAR_WIDTH / 2;
    let title_x = total_width / 2;

    log::debug!(
        "Synthesized symbol '{name}' ({total_width}x{total_height}) with {} left and {} right ports",
        inputs.len(),
        outputs.len()
    );

    Symbol {
        name: name.to_string(),
        version: "1.0".to_string(),
        bounds: Rect::new(0, 0, total_width, total_height),
        ports: symbol_ports,
        drawing: Drawing {
            lines: body,
            texts: Vec::new(),
        },
        main_texts: vec![Text {
            value: name.to_string(),
            rect: Rect::new(title_x - title_half, 2, title_x + title_half, 18),
            font: Font::new("Arial", 10),
        }],
    }
}

/// Longest label on one side, counting a bus suffix as five characters.
fn longest_label(ports: &[&PortSpec]) -> i32 {
    ports
        .iter()
        .map(|p| label_len(&p.name) + if p.width > 1 { 5 } else { 0 })
        .max()
        .unwrap_or(0)
}

fn label_len(label: &str) -> i32 {
    label.chars().count() as i32
}

fn div_ceil(value: i32, divisor: i32) -> i32 {
    (value + divisor - 1) / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PortDirection;

    #[test]
    fn test_and2_layout() {
        let symbol = synthesize_symbol(
            "AND2",
            &[
                PortSpec::new("A", PortMode::In, 1),
                PortSpec::new("B", PortMode::In, 1),
                PortSpec::new("Y", PortMode::Out, 1),
            ],
        );

        // (1*7 + 20 + 1*7) = 34 -> 40, below the 60 minimum
        assert_eq!(symbol.bounds, Rect::new(0, 0, 92, 56));
        let left: Vec<_> = symbol.ports.iter().filter(|p| p.location.x == 0).collect();
        let right: Vec<_> = symbol.ports.iter().filter(|p| p.location.x == 92).collect();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 1);
        assert!(symbol.ports.iter().all(|p| p.width == 1));
        assert_eq!(left[1].location, Point::new(0, 40));
        assert_eq!(right[0].direction, PortDirection::Output);
        assert_eq!(symbol.name, "AND2");
        assert_eq!(symbol.main_texts[0].value, "AND2");
        assert_eq!(symbol.drawing.lines.len(), 4);
    }

    #[test]
    fn test_bus_labels_and_wide_body() {
        let symbol = synthesize_symbol(
            "alu",
            &[
                PortSpec::new("operand_a", PortMode::In, 16),
                PortSpec::new("result", PortMode::Out, 16),
                PortSpec::new("flags", PortMode::InOut, 4),
            ],
        );

        // (14*7 + 20 + 11*7) = 195 -> 200
        assert_eq!(symbol.width(), 232);
        // two rows on the right
        assert_eq!(symbol.height(), 24 + 16 + 16);
        assert_eq!(symbol.ports[0].texts[0].value, "operand_a[15..0]");
        assert_eq!(symbol.ports[0].name, "operand_a");
        assert_eq!(symbol.ports[2].direction, PortDirection::Bidirectional);
        assert_eq!(symbol.ports[2].location, Point::new(232, 40));
        assert_eq!(
            symbol.ports[1].lines[0],
            Line::new(Point::new(216, 24), Point::new(232, 24))
        );
    }

    #[test]
    fn test_no_ports() {
        let symbol = synthesize_symbol("empty", &[]);
        assert!(symbol.ports.is_empty());
        assert_eq!(symbol.bounds, Rect::new(0, 0, 92, 40));
    }
}

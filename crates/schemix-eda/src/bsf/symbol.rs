use crate::{split_bus_label, Drawing, Font, Line, Point, Port, PortDirection, Rect, Symbol, Text};
use schemix_sexpr::{parse_all, Sexpr};

/// Parse symbol description text into a [`Symbol`].
///
/// Never fails: text that does not contain a `symbol` form (or does not
/// parse at all) yields [`placeholder_symbol`].
pub fn parse_bsf(content: &str) -> Symbol {
    match parse_all(content) {
        Ok(forms) => symbol_from_forms(&forms),
        Err(e) => {
            log::warn!("Symbol description could not be parsed: {e}");
            placeholder_symbol()
        }
    }
}

/// Extract the first `symbol` form among already-parsed top-level forms.
pub fn symbol_from_forms(forms: &[Sexpr]) -> Symbol {
    match forms.iter().find(|form| form.is_form("symbol")) {
        Some(Sexpr::List(items)) => {
            let mut symbol = parse_symbol(items);
            // (header "symbol" (version "0.1"))
            if let Some(version) = forms
                .iter()
                .find(|form| form.is_form("header"))
                .and_then(|header| header.find_form("version"))
                .and_then(Sexpr::as_list)
                .and_then(|version| version.get(1))
                .and_then(Sexpr::as_atom)
            {
                symbol.version = version.to_string();
            }
            symbol
        }
        _ => {
            log::warn!("No 'symbol' form among {} top-level forms", forms.len());
            placeholder_symbol()
        }
    }
}

/// Renderable stand-in returned when no symbol could be found.
pub fn placeholder_symbol() -> Symbol {
    let corners = [
        Point::new(0, 0),
        Point::new(200, 0),
        Point::new(200, 200),
        Point::new(0, 200),
    ];
    let lines = (0..corners.len())
        .map(|i| Line::new(corners[i], corners[(i + 1) % corners.len()]))
        .collect();

    Symbol {
        name: "No Symbol".to_string(),
        version: "0.0".to_string(),
        bounds: Rect::new(0, 0, 200, 200),
        ports: Vec::new(),
        drawing: Drawing {
            lines,
            texts: vec![Text {
                value: "Symbol Not Found".to_string(),
                rect: Rect::new(50, 90, 150, 110),
                font: Font::new("Arial", 12),
            }],
        },
        main_texts: Vec::new(),
    }
}

fn parse_symbol(symbol_data: &[Sexpr]) -> Symbol {
    let mut symbol = Symbol::default();

    for item in symbol_data.iter().skip(1) {
        let Sexpr::List(prop_list) = item else {
            continue;
        };
        match item.head() {
            Some("rect") => symbol.bounds = parse_rect(prop_list),
            Some("text") => {
                if let Some(text) = parse_text(prop_list) {
                    symbol.main_texts.push(text);
                }
            }
            Some("port") => symbol.ports.push(parse_port(prop_list)),
            Some("drawing") => parse_drawing(&mut symbol.drawing, prop_list),
            _ => {}
        }
    }

    if let Some(title) = symbol.main_texts.first() {
        symbol.name = title.value.clone();
    }

    log::debug!(
        "Extracted symbol '{}' with {} ports",
        symbol.name,
        symbol.ports.len()
    );
    symbol
}

fn parse_port(port_data: &[Sexpr]) -> Port {
    let mut port = Port {
        name: "unknown".to_string(),
        direction: PortDirection::Input,
        width: 1,
        location: Point::default(),
        texts: Vec::new(),
        lines: Vec::new(),
    };

    for item in port_data.iter().skip(1) {
        match item {
            // Direction may appear bare or as a one-element list
            Sexpr::Symbol(keyword) => {
                if let Some(direction) = PortDirection::from_keyword(keyword) {
                    port.direction = direction;
                }
            }
            Sexpr::List(prop_list) => match item.head() {
                Some("pt") => port.location = parse_point(prop_list),
                Some("text") => {
                    if let Some(text) = parse_text(prop_list) {
                        port.texts.push(text);
                    }
                }
                Some("line") => {
                    if let Some(line) = parse_line(prop_list) {
                        port.lines.push(line);
                    }
                }
                Some(keyword) => {
                    if let Some(direction) = PortDirection::from_keyword(keyword) {
                        port.direction = direction;
                    }
                }
                None => {}
            },
            Sexpr::String(_) => {}
        }
    }

    if let Some(first) = port.texts.first() {
        let (name, width) = split_bus_label(&first.value);
        port.name = name;
        port.width = width;
    }

    port
}

fn parse_drawing(drawing: &mut Drawing, drawing_data: &[Sexpr]) {
    for item in drawing_data.iter().skip(1) {
        let Sexpr::List(prop_list) = item else {
            continue;
        };
        match item.head() {
            Some("line") => {
                if let Some(line) = parse_line(prop_list) {
                    drawing.lines.push(line);
                }
            }
            Some("text") => {
                if let Some(text) = parse_text(prop_list) {
                    drawing.texts.push(text);
                }
            }
            _ => {}
        }
    }
}

// (text "value" (rect x1 y1 x2 y2) (font "Arial" (font_size 8)))
fn parse_text(text_data: &[Sexpr]) -> Option<Text> {
    let value = text_data.get(1).and_then(Sexpr::as_atom)?.to_string();
    let mut text = Text {
        value,
        rect: Rect::default(),
        font: Font::default(),
    };

    for item in text_data.iter().skip(2) {
        let Sexpr::List(prop_list) = item else {
            continue;
        };
        match item.head() {
            Some("rect") => text.rect = parse_rect(prop_list),
            Some("font") => {
                if let Some(family) = prop_list.get(1).and_then(Sexpr::as_atom) {
                    text.font.family = family.to_string();
                }
                if let Some(size) = item
                    .find_form("font_size")
                    .and_then(Sexpr::as_list)
                    .and_then(|size| size.get(1))
                {
                    text.font.size = parse_int(size);
                }
            }
            _ => {}
        }
    }

    Some(text)
}

// (line (pt x1 y1) (pt x2 y2) (line_width w))
fn parse_line(line_data: &[Sexpr]) -> Option<Line> {
    let points: Vec<Point> = line_data
        .iter()
        .filter_map(|item| match item {
            Sexpr::List(pt) if item.is_form("pt") => Some(parse_point(pt)),
            _ => None,
        })
        .collect();

    let width = line_data
        .iter()
        .find(|item| item.is_form("line_width"))
        .and_then(Sexpr::as_list)
        .and_then(|w| w.get(1))
        .map(parse_int)
        .unwrap_or(1);

    match points.as_slice() {
        [p1, p2, ..] => Some(Line {
            p1: *p1,
            p2: *p2,
            width,
        }),
        _ => None,
    }
}

fn parse_point(pt: &[Sexpr]) -> Point {
    Point {
        x: pt.get(1).map(parse_int).unwrap_or(0),
        y: pt.get(2).map(parse_int).unwrap_or(0),
    }
}

fn parse_rect(rect: &[Sexpr]) -> Rect {
    let field = |i: usize| rect.get(i).map(parse_int).unwrap_or(0);
    Rect::new(field(1), field(2), field(3), field(4))
}

/// Leading-integer parse: `"12"` → 12, `"3.5"` → 3, junk → 0.
fn parse_int(atom: &Sexpr) -> i32 {
    let Some(s) = atom.as_atom() else {
        return 0;
    };
    let s = s.trim();
    let digits_end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..digits_end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_is_lenient() {
        assert_eq!(parse_int(&Sexpr::symbol("42")), 42);
        assert_eq!(parse_int(&Sexpr::symbol("-7")), -7);
        assert_eq!(parse_int(&Sexpr::symbol("3.5")), 3);
        assert_eq!(parse_int(&Sexpr::symbol("abc")), 0);
        assert_eq!(parse_int(&Sexpr::list(vec![])), 0);
    }

    #[test]
    fn test_port_defaults() {
        let symbol = parse_bsf("(symbol (port))");
        let port = &symbol.ports[0];
        assert_eq!(port.name, "unknown");
        assert_eq!(port.direction, PortDirection::Input);
        assert_eq!(port.width, 1);
        assert_eq!(port.location, Point::default());
    }

    #[test]
    fn test_bare_and_listed_direction() {
        let symbol = parse_bsf(r#"(symbol (port (pt 1 2) output (text "Q")) (port (bidir) (text "IO")))"#);
        assert_eq!(symbol.ports[0].direction, PortDirection::Output);
        assert_eq!(symbol.ports[0].location, Point::new(1, 2));
        assert_eq!(symbol.ports[1].direction, PortDirection::Bidirectional);
    }

    #[test]
    fn test_malformed_subforms_take_defaults() {
        let symbol = parse_bsf(r#"(symbol (rect 1 2) (text) (port (line (pt 0 0))) (drawing (line (pt 0 0) (pt 5 5))))"#);
        assert_eq!(symbol.bounds, Rect::new(1, 2, 0, 0));
        assert!(symbol.main_texts.is_empty());
        assert!(symbol.ports[0].lines.is_empty());
        assert_eq!(symbol.drawing.lines.len(), 1);
        assert_eq!(symbol.drawing.lines[0].width, 1);
    }

    #[test]
    fn test_unknown_forms_are_ignored() {
        let symbol = parse_bsf(r#"(symbol (future_form 1 2) (text "X") (circle (pt 0 0)))"#);
        assert_eq!(symbol.name, "X");
        assert!(symbol.ports.is_empty());
    }

    #[test]
    fn test_placeholder_when_no_symbol() {
        let symbol = parse_bsf(r#"(header "symbol" (version "0.1"))"#);
        assert_eq!(symbol, placeholder_symbol());
        assert_eq!(symbol.bounds, Rect::new(0, 0, 200, 200));
        assert_eq!(symbol.drawing.lines.len(), 4);
        assert!(symbol.ports.is_empty());
    }

    #[test]
    fn test_placeholder_when_unparseable() {
        assert_eq!(parse_bsf("(symbol))"), placeholder_symbol());
        assert_eq!(parse_bsf(""), placeholder_symbol());
    }
}

use crate::{Line, Point, Port, Rect, Symbol, Text};
use schemix_sexpr::{format_sexpr, Sexpr};

/// Render a symbol as symbol description text that [`super::parse_bsf`]
/// reads back to the same ports, bounds and drawing.
pub fn to_bsf_string(symbol: &Symbol) -> String {
    let header = Sexpr::form(
        "header",
        [
            Sexpr::string("symbol"),
            Sexpr::form("version", [Sexpr::string(&symbol.version)]),
        ],
    );

    format!(
        "// Generated by schemix\n{}\n{}\n",
        format_sexpr(&header, 0),
        format_sexpr(&symbol_sexpr(symbol), 0)
    )
}

fn symbol_sexpr(symbol: &Symbol) -> Sexpr {
    let mut items = vec![rect_sexpr(&symbol.bounds)];
    items.extend(symbol.main_texts.iter().map(text_sexpr));
    items.extend(symbol.ports.iter().map(port_sexpr));

    let drawing = symbol
        .drawing
        .texts
        .iter()
        .map(text_sexpr)
        .chain(symbol.drawing.lines.iter().map(line_sexpr));
    items.push(Sexpr::form("drawing", drawing));

    Sexpr::form("symbol", items)
}

fn port_sexpr(port: &Port) -> Sexpr {
    let mut items = vec![
        point_sexpr(&port.location),
        Sexpr::form(port.direction.keyword(), []),
    ];
    if port.texts.is_empty() {
        items.push(Sexpr::form("text", [Sexpr::string(port.label())]));
    }
    items.extend(port.texts.iter().map(text_sexpr));
    items.extend(port.lines.iter().map(line_sexpr));
    Sexpr::form("port", items)
}

fn text_sexpr(text: &Text) -> Sexpr {
    Sexpr::form(
        "text",
        [
            Sexpr::string(&text.value),
            rect_sexpr(&text.rect),
            Sexpr::form(
                "font",
                [
                    Sexpr::string(&text.font.family),
                    Sexpr::form("font_size", [int(text.font.size)]),
                ],
            ),
        ],
    )
}

fn line_sexpr(line: &Line) -> Sexpr {
    Sexpr::form(
        "line",
        [
            point_sexpr(&line.p1),
            point_sexpr(&line.p2),
            Sexpr::form("line_width", [int(line.width)]),
        ],
    )
}

fn point_sexpr(point: &Point) -> Sexpr {
    Sexpr::form("pt", [int(point.x), int(point.y)])
}

fn rect_sexpr(rect: &Rect) -> Sexpr {
    Sexpr::form(
        "rect",
        [int(rect.x1), int(rect.y1), int(rect.x2), int(rect.y2)],
    )
}

fn int(value: i32) -> Sexpr {
    Sexpr::symbol(value.to_string())
}

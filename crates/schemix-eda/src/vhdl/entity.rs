use crate::PortDirection;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bentity\s+(\w+)\s+is\b").expect("valid entity regex"));
static PORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bport\s*\(").expect("valid port regex"));
static MODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(inout|in|out|buffer)\b\s*(.*)$").expect("valid mode regex")
});
static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\s*(\d+)\s+(?:downto|to)\s+(\d+)\s*\)").expect("valid range regex")
});

/// Port mode as written in an entity declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    In,
    Out,
    InOut,
    Buffer,
}

impl PortMode {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "in" => Some(PortMode::In),
            "out" => Some(PortMode::Out),
            "inout" => Some(PortMode::InOut),
            "buffer" => Some(PortMode::Buffer),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PortMode::In => "in",
            PortMode::Out => "out",
            PortMode::InOut => "inout",
            PortMode::Buffer => "buffer",
        }
    }

    /// Symbol port direction: `inout` is bidirectional, `out` and
    /// `buffer` are outputs.
    pub fn direction(self) -> PortDirection {
        match self {
            PortMode::In => PortDirection::Input,
            PortMode::InOut => PortDirection::Bidirectional,
            PortMode::Out | PortMode::Buffer => PortDirection::Output,
        }
    }
}

/// Abstract port: no coordinates, only what connectivity needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub mode: PortMode,
    pub width: u32,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, mode: PortMode, width: u32) -> Self {
        Self {
            name: name.into(),
            mode,
            width: width.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    pub ports: Vec<PortSpec>,
}

/// Read the entity name and port clause from declarative source text.
///
/// Returns `None` only when no `entity <name> is` header exists. A missing
/// or unbalanced port clause yields an entity without ports.
pub fn parse_entity(source: &str) -> Option<EntityDecl> {
    let cleaned = strip_comments(source);

    let Some(entity) = ENTITY_RE.captures(&cleaned) else {
        log::debug!("No entity declaration found");
        return None;
    };
    let name = entity[1].to_string();
    let after_header = entity.get(0).map(|m| m.end()).unwrap_or(0);

    let ports = match port_clause(&cleaned[after_header..]) {
        Some(clause) => parse_port_clause(clause),
        None => {
            log::debug!("Entity '{name}' has no port clause");
            Vec::new()
        }
    };

    log::debug!("Parsed entity '{name}' with {} ports", ports.len());
    Some(EntityDecl { name, ports })
}

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split("--").next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The text between `port (` and its balancing `)`.
fn port_clause(text: &str) -> Option<&str> {
    let open = PORT_RE.find(text)?;
    let body = &text[open.end()..];

    let mut depth = 1usize;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[..i]);
                }
            }
            _ => {}
        }
    }

    log::warn!("Unbalanced port clause");
    None
}

fn parse_port_clause(clause: &str) -> Vec<PortSpec> {
    let mut ports = Vec::new();

    for statement in clause.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((names, rest)) = statement.split_once(':') else {
            log::debug!("Skipping port statement without ':': {statement}");
            continue;
        };
        let Some(mode_match) = MODE_RE.captures(rest) else {
            log::debug!("Skipping port statement with unknown mode: {statement}");
            continue;
        };
        let Some(mode) = PortMode::from_keyword(&mode_match[1]) else {
            continue;
        };

        let port_type = mode_match[2].split(":=").next().unwrap_or_default();
        let width = RANGE_RE
            .captures(port_type)
            .and_then(|range| {
                let high: i64 = range[1].parse().ok()?;
                let low: i64 = range[2].parse().ok()?;
                u32::try_from((high - low).unsigned_abs() + 1).ok()
            })
            .unwrap_or(1);

        ports.extend(
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| PortSpec::new(name, mode, width)),
        );
    }

    ports
}

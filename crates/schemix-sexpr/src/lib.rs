//! A small S-expression reader for symbol description files.
//!
//! Atoms are kept as raw strings; interpreting numbers is left to the caller.
//! Quoted spans are a single atom with the quotes removed and no escape
//! processing, and `//` starts a comment that runs to the end of the line.

use std::fmt;

/// An S-expression value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sexpr {
    /// A symbol - unquoted token
    Symbol(String),
    /// A string - quoted text
    String(String),
    /// A list of S-expressions
    List(Vec<Sexpr>),
}

impl Sexpr {
    /// Create a symbol (unquoted atom)
    pub fn symbol(s: impl Into<String>) -> Self {
        Sexpr::Symbol(s.into())
    }

    /// Create a string (quoted atom)
    pub fn string(s: impl Into<String>) -> Self {
        Sexpr::String(s.into())
    }

    /// Create a list from a vector of S-expressions
    pub fn list(items: Vec<Sexpr>) -> Self {
        Sexpr::List(items)
    }

    /// Build a list whose head is the symbol `head`.
    pub fn form(head: &str, rest: impl IntoIterator<Item = Sexpr>) -> Self {
        let mut items = vec![Sexpr::symbol(head)];
        items.extend(rest);
        Sexpr::List(items)
    }

    /// Check if this is an atom (symbol or string)
    pub fn is_atom(&self) -> bool {
        self.as_atom().is_some()
    }

    /// Check if this is a list
    pub fn is_list(&self) -> bool {
        self.as_list().is_some()
    }

    /// Get the atom value if this is an atom (symbol or string)
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexpr::Symbol(s) | Sexpr::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list items if this is a list
    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Sexpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// The head atom of a list, e.g. `port` for `(port (pt 0 0) ...)`.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// True when this is a list headed by `name`.
    pub fn is_form(&self, name: &str) -> bool {
        self.head() == Some(name)
    }

    /// The first child list headed by `name`.
    pub fn find_form(&self, name: &str) -> Option<&Sexpr> {
        self.as_list()?.iter().skip(1).find(|item| item.is_form(name))
    }
}

/// Parser for S-expressions
pub struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            chars: input.char_indices().peekable(),
            current_pos: 0,
        }
    }

    /// Parse the next S-expression
    pub fn parse(&mut self) -> Result<Sexpr, ParseError> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_list(),
            Some(')') => Err(ParseError::UnexpectedClose(self.current_pos)),
            Some(_) => self.parse_atom(),
        }
    }

    /// Parse every top-level S-expression in the input
    pub fn parse_all(&mut self) -> Result<Vec<Sexpr>, ParseError> {
        let mut results = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            results.push(self.parse()?);
        }

        Ok(results)
    }

    fn parse_list(&mut self) -> Result<Sexpr, ParseError> {
        let start_pos = self.current_pos;
        self.expect('(')?;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();

            match self.peek_char() {
                None => return Err(ParseError::UnclosedList(start_pos)),
                Some(')') => {
                    self.advance();
                    break;
                }
                Some(_) => items.push(self.parse()?),
            }

            if items.len() % 1000 == 0 {
                log::trace!(
                    "Parsed {} items in list at position {start_pos}",
                    items.len()
                );
            }
        }

        Ok(Sexpr::List(items))
    }

    fn parse_atom(&mut self) -> Result<Sexpr, ParseError> {
        if self.peek_char() == Some('"') {
            return self.parse_string();
        }

        let start = self.current_pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '"') || self.at_comment() {
                break;
            }
            self.advance();
        }

        if self.current_pos == start {
            return Err(ParseError::EmptyAtom(start));
        }

        Ok(Sexpr::Symbol(self.input[start..self.current_pos].to_string()))
    }

    fn parse_string(&mut self) -> Result<Sexpr, ParseError> {
        let start_pos = self.current_pos;
        self.expect('"')?;
        let body_start = self.current_pos;

        loop {
            match self.peek_char() {
                None => return Err(ParseError::UnterminatedString(start_pos)),
                Some('"') => break,
                Some(_) => self.advance(),
            }
        }

        let value = self.input[body_start..self.current_pos].to_string();
        self.advance();
        Ok(Sexpr::String(value))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if self.at_comment() {
                while let Some(ch) = self.peek_char() {
                    self.advance();
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn at_comment(&self) -> bool {
        self.input[self.current_pos..].starts_with("//")
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError::UnexpectedChar(ch, expected)),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }
}

/// Parse a string into a single S-expression
pub fn parse(input: &str) -> Result<Sexpr, ParseError> {
    log::trace!("Parsing S-expression from {} bytes of input", input.len());
    Parser::new(input).parse()
}

/// Parse a string into all of its top-level S-expressions
pub fn parse_all(input: &str) -> Result<Vec<Sexpr>, ParseError> {
    log::trace!(
        "Parsing top-level S-expressions from {} bytes of input",
        input.len()
    );
    let result = Parser::new(input).parse_all();
    match &result {
        Ok(exprs) => log::trace!("Parsed {} top-level S-expressions", exprs.len()),
        Err(e) => log::trace!("Failed to parse S-expressions: {e}"),
    }
    result
}

/// Errors that can occur during parsing. Positions are byte offsets.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedEof,
    UnexpectedChar(char, char),
    UnexpectedClose(usize),
    UnclosedList(usize),
    UnterminatedString(usize),
    EmptyAtom(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof => write!(f, "Unexpected end of input"),
            ParseError::UnexpectedChar(found, expected) => {
                write!(f, "Expected '{expected}', found '{found}'")
            }
            ParseError::UnexpectedClose(pos) => write!(f, "Unmatched ')' at byte {pos}"),
            ParseError::UnclosedList(pos) => write!(f, "Unclosed list opened at byte {pos}"),
            ParseError::UnterminatedString(pos) => {
                write!(f, "Unterminated string starting at byte {pos}")
            }
            ParseError::EmptyAtom(pos) => write!(f, "Empty atom at byte {pos}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Format an S-expression with indentation
pub fn format_sexpr(sexpr: &Sexpr, indent_level: usize) -> String {
    format_sexpr_inner(sexpr, indent_level, true)
}

fn format_sexpr_inner(sexpr: &Sexpr, indent_level: usize, add_indent: bool) -> String {
    let indent = if add_indent {
        "\t".repeat(indent_level)
    } else {
        String::new()
    };

    match sexpr {
        Sexpr::Symbol(s) => format!("{indent}{s}"),
        // Quotes cannot be escaped in this format.
        Sexpr::String(s) => format!("{indent}\"{}\"", s.replace('"', "'")),
        Sexpr::List(items) => {
            if items.is_empty() {
                return format!("{indent}()");
            }

            if is_simple_list(items) {
                let inner: Vec<String> = items
                    .iter()
                    .map(|item| format_sexpr_inner(item, 0, false))
                    .collect();
                return format!("{indent}({})", inner.join(" "));
            }

            let mut result = format!("{indent}(");
            if let Some(first) = items.first() {
                result.push_str(&format_sexpr_inner(first, 0, false));
            }
            for item in items.iter().skip(1) {
                result.push('\n');
                result.push_str(&format_sexpr_inner(item, indent_level + 1, true));
            }
            result.push(')');
            result
        }
    }
}

fn is_simple_list(items: &[Sexpr]) -> bool {
    if let Some(Sexpr::Symbol(first)) = items.first() {
        match first.as_str() {
            "pt" | "rect" | "font_size" | "line_width" | "version" | "input" | "output"
            | "bidir" => return true,
            // Leaf forms stay on one line as long as their children do
            "text" | "line" | "font" | "header" => {
                return items.iter().all(|item| match item {
                    Sexpr::List(inner) => is_simple_list(inner),
                    _ => true,
                })
            }
            _ => {}
        }
    }

    items.len() <= 2 && items.iter().all(Sexpr::is_atom)
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_sexpr(self, 0))
    }
}

//! Whole-identifier substitution inside VHDL code fragments.

use std::collections::HashMap;

/// Replace identifiers in `code` by their entry in `replacements`.
///
/// Matching is case-sensitive and on whole identifiers only. Comments,
/// string literals, character literals, bit-string literals and numeric
/// literals are copied through unchanged.
pub(crate) fn substitute_identifiers(code: &str, replacements: &HashMap<String, String>) -> String {
    let chars: Vec<char> = code.chars().collect();
    let scan = |from: usize, keep: fn(char) -> bool| {
        chars[from..]
            .iter()
            .position(|&c| !keep(c))
            .map_or(chars.len(), |offset| from + offset)
    };

    let mut out = String::with_capacity(code.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let end = if c == '-' && chars.get(i + 1) == Some(&'-') {
            scan(i, |c| c != '\n')
        } else if c == '"' {
            // "" inside a literal closes and reopens, which copies the same
            scan(i + 1, |c| c != '"').saturating_add(1).min(chars.len())
        } else if c == '\'' && chars.get(i + 2) == Some(&'\'') {
            i + 3
        } else if c.is_ascii_digit() {
            scan(i, |c| c.is_ascii_alphanumeric() || matches!(c, '_' | '#' | '.'))
        } else if c.is_ascii_alphabetic() || c == '_' {
            let end = scan(i, |c| c.is_ascii_alphanumeric() || c == '_');
            let word: String = chars[i..end].iter().collect();
            let bit_string = chars.get(end) == Some(&'"')
                && matches!(word.to_ascii_lowercase().as_str(), "b" | "o" | "x");
            match replacements.get(&word) {
                Some(replacement) if !bit_string => out.push_str(replacement),
                _ => out.push_str(&word),
            }
            i = end;
            continue;
        } else {
            i + 1
        };
        out.extend(&chars[i..end]);
        i = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_whole_identifiers_only() {
        let names = map(&[("a", "net_0"), ("y", "y_pin")]);
        assert_eq!(
            substitute_identifiers("y <= a and a_b and ab;", &names),
            "y_pin <= net_0 and a_b and ab;"
        );
    }

    #[test]
    fn test_case_sensitive() {
        let names = map(&[("a", "net_0")]);
        assert_eq!(substitute_identifiers("A <= a;", &names), "A <= net_0;");
    }

    #[test]
    fn test_literals_and_comments_untouched() {
        let names = map(&[("a", "net_0"), ("x", "net_1"), ("b", "net_2")]);
        let code = "x <= a when b = '1' else '0'; -- drives x from a\nx <= X\"0a\" & \"a b\" & a'length;";
        assert_eq!(
            substitute_identifiers(code, &names),
            "net_1 <= net_0 when net_2 = '1' else '0'; -- drives x from a\nnet_1 <= X\"0a\" & \"a b\" & net_0'length;"
        );
    }

    #[test]
    fn test_numeric_literals_untouched() {
        let names = map(&[("e3", "oops"), ("FF", "oops")]);
        assert_eq!(
            substitute_identifiers("t := 1e3 + 16#FF#;", &names),
            "t := 1e3 + 16#FF#;"
        );
    }

    #[test]
    fn test_unterminated_literal() {
        let names = map(&[("a", "net_0")]);
        assert_eq!(substitute_identifiers("a <= \"a", &names), "net_0 <= \"a");
    }
}

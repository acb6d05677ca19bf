/// Turn a display name into a legal VHDL identifier.
///
/// A `[...]` bus suffix is dropped, every character outside
/// `[A-Za-z0-9_]` becomes `_`, a name not starting with a letter gets a
/// `v_` prefix, runs of underscores collapse and a trailing underscore is
/// removed. Applying it twice gives the same result as applying it once.
pub fn sanitize_identifier(name: &str) -> String {
    let base = match (name.find('['), name.rfind(']')) {
        (Some(open), Some(close)) if close > open => format!("{}{}", &name[..open], &name[close + 1..]),
        _ => name.to_string(),
    };

    let replaced: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let prefixed = if replaced.starts_with(|c: char| c.is_ascii_alphabetic()) {
        replaced
    } else {
        format!("v_{replaced}")
    };

    let mut out = String::with_capacity(prefixed.len());
    for c in prefixed.chars() {
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

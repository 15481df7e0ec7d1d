/// True for a plain `[A-Za-z_][A-Za-z0-9_]*` token.
pub fn is_simple_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier for DuckDB: wrap in double quotes, doubling any embedded quote.
///
/// Every identifier is quoted, simple or not, so unit-bearing column names such as
/// `RICE_PRODUCTION_(1000_TONS)` and keyword-like names such as `YEAR` are handled alike.
pub fn quote_ident(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_tokens() {
        assert!(is_simple_ident("YEAR"));
        assert!(is_simple_ident("_dist_name2"));
        assert!(!is_simple_ident("RICE_PRODUCTION_(1000_TONS)"));
        assert!(!is_simple_ident("AREA/HA"));
        assert!(!is_simple_ident("2020"));
        assert!(!is_simple_ident(""));
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_ident("YEAR"), "\"YEAR\"");
        assert_eq!(
            quote_ident("WHEAT_YIELD_(KG_PER_HA)"),
            "\"WHEAT_YIELD_(KG_PER_HA)\""
        );
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
        assert_eq!(quote_ident(""), "\"\"");
    }
}

//! Identifier and literal quoting for generated SQL
//!
//! Every table, column, index or trigger name interpolated into a generated
//! statement must go through [`quote_ident`]; every string value through
//! [`quote_literal`]. Numeric and binary values are not escaped here, callers
//! are responsible for passing well-formed literals.

/// Quote an identifier for safe interpolation into SQL.
///
/// Wraps the name in double quotes and doubles any embedded double-quote
/// characters.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string value for safe interpolation into SQL.
///
/// Wraps the value in single quotes and doubles any embedded single-quote
/// characters.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("roads"), "\"roads\"");
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_ident("\""), "\"\"\"\"");
    }

    #[test]
    fn test_quote_ident_round_trip() {
        // Strip the wrapping quotes and undo the doubling: the original
        // identifier must come back unchanged.
        let original = "a\"b\"\"c";
        let quoted = quote_ident(original);
        let inner = &quoted[1..quoted.len() - 1];
        assert_eq!(inner.replace("\"\"", "\""), original);
    }

    #[test]
    fn test_quote_literal_plain() {
        assert_eq!(quote_literal("the_geom"), "'the_geom'");
    }

    #[test]
    fn test_quote_literal_doubles_embedded_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("'"), "''''");
    }
}

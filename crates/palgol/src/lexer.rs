//! Token tags and regular expressions for Pidgin ALGOL source.

use lexer_core::{GenericLexer, LexerSpec, TokenRule};

pub const WHITESPACE: &str = "whitespace";
pub const KEYWORD: &str = "keyword";
pub const LITERAL_INTEGER: &str = "literal_integer";
pub const SYMBOL: &str = "symbol";
pub const LITERAL_ID: &str = "literal_id";
pub const ERROR: &str = "error";

pub const KEYWORDS: &[&str] =
    &["begin", "end", "read", "if", "then", "else", "while", "do", "write"];

// Multi-character symbols must precede the single-character class so they
// win the alternation: `<=` has to match before the lone `<`.
const SYMBOL_PATTERN: &str = r"<=|>=|!=|<-|[;=≠<≤>≥←+*/-]";

const RULES: &[TokenRule] = &[
    TokenRule { tag: WHITESPACE, pattern: r"\s+" },
    TokenRule { tag: KEYWORD, pattern: r"(?:begin|end|read|if|then|else|while|do|write)\b" },
    TokenRule { tag: LITERAL_INTEGER, pattern: r"-?\d+" },
    TokenRule { tag: SYMBOL, pattern: SYMBOL_PATTERN },
    TokenRule { tag: LITERAL_ID, pattern: r"\w+" },
    TokenRule { tag: ERROR, pattern: r"." },
];

static SPEC: LexerSpec = LexerSpec { rules: RULES, skip: &[WHITESPACE], error_tag: ERROR };

#[must_use]
pub fn lexer() -> GenericLexer {
    GenericLexer::new(&SPEC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_win_over_identifiers() {
        let tokens = lexer().tokenize("begin beginner end").unwrap();
        assert_eq!(tokens[0].tag, KEYWORD);
        assert_eq!(tokens[1].tag, LITERAL_ID);
        assert_eq!(tokens[2].tag, KEYWORD);
    }

    #[test]
    fn multi_char_symbols_beat_their_prefix() {
        let tokens = lexer().tokenize("x <= y").unwrap();
        assert_eq!(tokens[1].value, "<=");
    }

    #[test]
    fn arrow_assignment_symbols() {
        let tokens = lexer().tokenize("x <- 1").unwrap();
        assert_eq!(tokens[1].value, "<-");
        let tokens = lexer().tokenize("x ← 1").unwrap();
        assert_eq!(tokens[1].value, "←");
    }
}

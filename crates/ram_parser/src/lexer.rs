//! Token tags and regular expressions for RAM assembly text.
//!
//! Mirrors the textbook instruction syntax: an optional `label:` prefix, an
//! opcode, and an address written as `=v` (literal), `v` (direct) or `*v`
//! (indirect) — or no address at all for `HALT`.

use lexer_core::{GenericLexer, LexerSpec, TokenRule};
use ram_core::Opcode;

pub const WHITESPACE: &str = "whitespace";
pub const COLON: &str = "colon";
pub const EQUALS: &str = "equals";
pub const STAR: &str = "star";
pub const LITERAL_INTEGER: &str = "literal_integer";
pub const KEYWORD: &str = "keyword";
pub const LITERAL_ID: &str = "literal_id";
pub const ERROR: &str = "error";

// The opcode alternation is a fixed, closed set — there is no plugin point
// for new instructions, so it's simplest to just spell it out once here
// rather than build it from `Opcode::ALL` at runtime.
const KEYWORD_PATTERN: &str =
    r"(?:LOAD|STORE|ADD|SUB|MULT|DIV|READ|WRITE|JUMP|JGTZ|JZERO|HALT)\b";

const RULES: &[TokenRule] = &[
    TokenRule { tag: WHITESPACE, pattern: r"\s+" },
    TokenRule { tag: COLON, pattern: r":" },
    TokenRule { tag: EQUALS, pattern: r"=" },
    TokenRule { tag: STAR, pattern: r"\*" },
    TokenRule { tag: LITERAL_INTEGER, pattern: r"-?\d+" },
    TokenRule { tag: KEYWORD, pattern: KEYWORD_PATTERN },
    TokenRule { tag: LITERAL_ID, pattern: r"\w+" },
    TokenRule { tag: ERROR, pattern: r"." },
];

static SPEC: LexerSpec = LexerSpec { rules: RULES, skip: &[WHITESPACE], error_tag: ERROR };

#[must_use]
pub fn lexer() -> GenericLexer {
    GenericLexer::new(&SPEC)
}

/// Sanity check that every [`Opcode`] appears in [`KEYWORD_PATTERN`] — a
/// debug_assert companion used by the parser's opcode table, not a public
/// API.
#[cfg(test)]
pub(crate) fn all_opcodes_are_keywords() -> bool {
    Opcode::ALL.iter().all(|op| KEYWORD_PATTERN.contains(op.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_opcode() {
        assert!(all_opcodes_are_keywords());
    }

    #[test]
    fn tokenizes_a_labeled_instruction() {
        let tokens = lexer().tokenize("loop: ADD =1").unwrap();
        let tags: Vec<_> = tokens.iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec![LITERAL_ID, COLON, KEYWORD, EQUALS, LITERAL_INTEGER]);
    }

    #[test]
    fn identifier_overlapping_a_keyword_prefix_is_not_a_keyword() {
        let tokens = lexer().tokenize("READY").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag, LITERAL_ID);
    }
}

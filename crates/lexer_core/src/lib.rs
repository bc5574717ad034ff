//! A small, language-agnostic lexing utility.
//!
//! [`GenericLexer`] turns a spec — an ordered list of `(tag, regex)` pairs —
//! into a tokenizer: it reads the input line by line and, at each position,
//! emits the token for the first spec alternative that matches, using the
//! same leftmost-first alternation priority as the reference lexer this one
//! is modeled on (this is how keywords win over identifiers: list the
//! keyword alternative first, anchored with `\b` so it doesn't also match a
//! longer identifier that merely starts with it).
//!
//! [`BufferedTokenStream`] wraps any token iterator with `peek`/`checkpoint`/
//! `rollback`/`commit`, giving a recursive-descent parser a cheap way to try
//! a parse and back out of it.

use std::collections::VecDeque;

use ram_error::{Error, Result, Span};
use regex::Regex;

/// An immutable lexical token: a tagged substring of the source with its
/// 0-indexed line and the starting column of the match within that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub tag: &'static str,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// The half-open column range `[column, column + value.len())`.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.column..self.column + self.value.chars().count()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// One alternative of a [`LexerSpec`]: a tag paired with the regex that
/// recognizes it. Priority is positional — earlier entries win ties.
#[derive(Debug, Clone, Copy)]
pub struct TokenRule {
    pub tag: &'static str,
    pub pattern: &'static str,
}

/// The full specification a [`GenericLexer`] is built from.
///
/// `skip` lists tags that are recognized but dropped from the filtered
/// stream (whitespace, typically). `error_tag` names the alternative that
/// matches any single character — it must be the last entry in `rules` so
/// every other alternative gets first refusal, and hitting it aborts
/// tokenization with a [`Error::Parse`].
pub struct LexerSpec {
    pub rules: &'static [TokenRule],
    pub skip: &'static [&'static str],
    pub error_tag: &'static str,
}

/// A regex-driven tokenizer built from a [`LexerSpec`].
///
/// Tokenization is eager: the whole input is scanned up front into a
/// `Vec<Token>` rather than produced lazily. Nothing about the grammars this
/// crate tokenizes needs streaming, and an eager pass is much simpler to
/// reason about than a suspended generator.
pub struct GenericLexer {
    regex: Regex,
    spec: &'static LexerSpec,
}

impl GenericLexer {
    /// Compile `spec` into a single alternation regex with one named group
    /// per rule, mirroring the textbook "one big `|`-joined pattern" recipe
    /// for hand-rolled tokenizers.
    #[must_use]
    pub fn new(spec: &'static LexerSpec) -> Self {
        let pattern = spec
            .rules
            .iter()
            // each rule's pattern is wrapped in its own non-capturing group
            // so internal alternation/anchors can't leak into the outer one.
            .map(|rule| format!("(?P<{}>(?:{}))", rule.tag, rule.pattern))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&pattern)
            .unwrap_or_else(|err| panic!("invalid lexer spec regex {pattern:?}: {err}"));
        Self { regex, spec }
    }

    /// Tokenize `input`, filtering out `skip` tags and failing on the first
    /// occurrence of `error_tag`.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        for (line, text) in input.split('\n').enumerate() {
            for caps in self.regex.captures_iter(text) {
                let (tag, m) = self
                    .spec
                    .rules
                    .iter()
                    .find_map(|rule| caps.name(rule.tag).map(|m| (rule.tag, m)))
                    .expect("alternation match always has exactly one named group");
                let column = text[..m.start()].chars().count();
                let value = m.as_str().to_string();

                if tag == self.spec.error_tag {
                    return Err(Error::parse(
                        format!("unexpected character {value:?}"),
                        Span::point(line, column),
                    ));
                }
                if self.spec.skip.contains(&tag) {
                    continue;
                }
                tokens.push(Token { tag, value, line, column });
            }
        }
        Ok(tokens)
    }
}

/// A buffered wrapper around a token iterator offering `peek`, nested
/// `checkpoint`/`rollback`/`commit`, and plain `next` consumption.
///
/// Checkpoints nest with stack discipline: while any checkpoint is live,
/// consumed tokens stay in `buf` so `rollback` can rewind to them; on the
/// outermost `commit` the buffer is drained.
pub struct BufferedTokenStream<I: Iterator<Item = Token>> {
    it: I,
    buf: VecDeque<Token>,
    index: usize,
    checkpoints: Vec<usize>,
}

impl<I: Iterator<Item = Token>> BufferedTokenStream<I> {
    pub fn new(it: I) -> Self {
        Self { it, buf: VecDeque::new(), index: 0, checkpoints: Vec::new() }
    }

    /// Consume and return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        if !self.checkpoints.is_empty() {
            if self.buf.len() < self.index + 1 {
                self.buf.push_back(self.it.next()?);
            }
            let token = self.buf[self.index].clone();
            self.index += 1;
            return Some(token);
        }

        if let Some(token) = self.buf.pop_front() {
            return Some(token);
        }

        self.it.next()
    }

    /// Return the `n`-th upcoming token (1-based) without consuming it.
    /// `None` signals end of input; `n` must be >= 1.
    pub fn peek(&mut self, n: usize) -> Option<&Token> {
        assert!(n >= 1, "peek(n): n must be >= 1, got {n}");
        while self.buf.len() < self.index + n {
            self.buf.push_back(self.it.next()?);
        }
        self.buf.get(self.index + n - 1)
    }

    /// Begin a nested checkpoint; consumed tokens are retained for rollback.
    pub fn checkpoint(&mut self) {
        self.checkpoints.push(self.index);
    }

    /// Rewind to the most recent checkpoint.
    pub fn rollback(&mut self) {
        self.index = self.checkpoints.pop().expect("rollback without a matching checkpoint");
    }

    /// Commit the most recent checkpoint. On the outermost commit, tokens
    /// consumed since the first checkpoint are released from the buffer.
    pub fn commit(&mut self) {
        self.checkpoints.pop().expect("commit without a matching checkpoint");
        if self.checkpoints.is_empty() {
            self.buf.drain(0..self.index);
            self.index = 0;
        }
    }
}

impl<I: Iterator<Item = Token>> Iterator for BufferedTokenStream<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGIT: TokenRule = TokenRule { tag: "digit", pattern: r"\d+" };
    const WORD: TokenRule = TokenRule { tag: "word", pattern: r"[a-zA-Z]+" };
    const WS: TokenRule = TokenRule { tag: "ws", pattern: r"\s+" };
    const ERR: TokenRule = TokenRule { tag: "error", pattern: r"." };

    static SPEC: LexerSpec =
        LexerSpec { rules: &[DIGIT, WORD, WS, ERR], skip: &["ws"], error_tag: "error" };

    #[test]
    fn tokenizes_and_skips_whitespace() {
        let lexer = GenericLexer::new(&SPEC);
        let tokens = lexer.tokenize("abc 123  def").unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["abc", "123", "def"]);
    }

    #[test]
    fn keyword_like_rule_wins_on_priority() {
        // `\b` is required here, same as the real lexer specs
        // (`palgol::lexer`, `ram_parser::lexer`): alternation priority is
        // leftmost-first, not longest-match, so a bare "begin" alternative
        // listed before `word` would match only the first five characters
        // of "beginner" and leave "ner" as a trailing `word` token.
        const KW: TokenRule = TokenRule { tag: "kw", pattern: r"begin\b" };
        static KW_SPEC: LexerSpec =
            LexerSpec { rules: &[KW, WORD, WS, ERR], skip: &["ws"], error_tag: "error" };
        let lexer = GenericLexer::new(&KW_SPEC);
        let tokens = lexer.tokenize("begin beginner").unwrap();
        assert_eq!(tokens[0].tag, "kw");
        assert_eq!(tokens[1].tag, "word");
        assert_eq!(tokens[1].value, "beginner");
    }

    #[test]
    fn error_tag_fails_tokenization() {
        let lexer = GenericLexer::new(&SPEC);
        let err = lexer.tokenize("abc $").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn lines_and_columns_are_tracked() {
        let lexer = GenericLexer::new(&SPEC);
        let tokens = lexer.tokenize("ab\ncd").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (0, 0));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 0));
    }

    #[test]
    fn stream_peek_checkpoint_rollback() {
        let toks = vec![
            Token { tag: "a", value: "a".into(), line: 0, column: 0 },
            Token { tag: "b", value: "b".into(), line: 0, column: 1 },
            Token { tag: "c", value: "c".into(), line: 0, column: 2 },
        ];
        let mut stream = BufferedTokenStream::new(toks.into_iter());
        assert_eq!(stream.peek(1).unwrap().tag, "a");
        assert_eq!(stream.peek(2).unwrap().tag, "b");

        stream.checkpoint();
        assert_eq!(stream.next_token().unwrap().tag, "a");
        assert_eq!(stream.next_token().unwrap().tag, "b");
        stream.rollback();
        assert_eq!(stream.next_token().unwrap().tag, "a");
        stream.checkpoint();
        assert_eq!(stream.next_token().unwrap().tag, "b");
        stream.commit();
        assert_eq!(stream.next_token().unwrap().tag, "c");
        assert!(stream.next_token().is_none());
    }

    proptest::proptest! {
        /// Tokenizing is total over its declared alphabet: it either
        /// produces a token stream or a clean `Error::Parse`, never a
        /// panic, for any input built from the spec's own character classes.
        #[test]
        fn tokenizing_never_panics(input in "[a-zA-Z0-9 \t\n$]{0,64}") {
            let lexer = GenericLexer::new(&SPEC);
            let _ = lexer.tokenize(&input);
        }

        /// Tokens come out in left-to-right source order: strictly
        /// increasing by line, and non-decreasing by column within a line.
        #[test]
        fn tokens_are_in_source_order(input in "[a-zA-Z0-9 \n]{0,64}") {
            let lexer = GenericLexer::new(&SPEC);
            if let Ok(tokens) = lexer.tokenize(&input) {
                for pair in tokens.windows(2) {
                    let (a, b) = (&pair[0], &pair[1]);
                    proptest::prop_assert!(a.line < b.line || (a.line == b.line && a.column < b.column));
                }
            }
        }
    }
}

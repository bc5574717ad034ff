use ram_core::Program;

/// Render a [`Program`] back into RAM assembly text.
///
/// This is just [`Program::serialize`] given a name that mirrors
/// [`crate::parser::parse`] — the two functions are meant to be read
/// together as the text ↔ model boundary of this crate.
#[must_use]
pub fn emit(program: &Program) -> String {
    program.serialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn emit_after_parse_reproduces_semantics() {
        let source = "loop: LOAD =0\n      JUMP loop\n      HALT";
        let program = parse(source).unwrap();
        let reparsed = parse(&emit(&program)).unwrap();
        assert_eq!(program, reparsed);
    }
}

use std::collections::HashMap;

use lexer_core::{BufferedTokenStream, Token};
use ram_core::{Address, Instruction, JumpTarget, Opcode, Operand, Program};
use ram_error::{Error, Result, Span};

use crate::lexer::{self, COLON, EQUALS, KEYWORD, LITERAL_ID, LITERAL_INTEGER, STAR};

type Stream = BufferedTokenStream<std::vec::IntoIter<Token>>;

/// Parse RAM assembly text into a [`Program`].
///
/// Grammar, line by line: zero or more `label:` prefixes, then an opcode,
/// then — unless the opcode is `HALT` — an address. `JUMP`/`JGTZ`/`JZERO`
/// address a label; every other opcode addresses an [`Operand`] written
/// `=v`, `*v` or bare `v`.
pub fn parse(source: &str) -> Result<Program> {
    let tokens = lexer::lexer().tokenize(source)?;
    let mut stream = BufferedTokenStream::new(tokens.into_iter());

    let mut instructions = Vec::new();
    let mut jumptable = HashMap::new();

    loop {
        // a statement may carry any number of labels, e.g. `a: b: LOAD =0`
        loop {
            let is_label = matches!(
                (stream.peek(1), stream.peek(2)),
                (Some(t1), Some(t2)) if t1.tag == LITERAL_ID && t2.tag == COLON
            );
            if !is_label {
                break;
            }
            let label = stream.next_token().expect("peeked");
            stream.next_token(); // colon
            jumptable.insert(JumpTarget::new(label.value), instructions.len());
        }

        if stream.peek(1).is_none() {
            break;
        }

        instructions.push(parse_instruction(&mut stream)?);
    }

    Program::new(instructions, jumptable)
}

fn parse_instruction(stream: &mut Stream) -> Result<Instruction> {
    let opcode_tok = expect_tag(stream, KEYWORD)?;
    let opcode: Opcode = opcode_tok.value.parse()?;

    let address = if opcode.takes_operand() {
        Some(parse_address(stream, opcode)?)
    } else {
        None
    };

    Instruction::new(opcode, address)
}

fn parse_address(stream: &mut Stream, opcode: Opcode) -> Result<Address> {
    if opcode.takes_jump_target() {
        let label = expect_tag(stream, LITERAL_ID)?;
        return Ok(Address::Label(JumpTarget::new(label.value)));
    }

    let token = next_or_eof(stream, "an operand")?;
    match token.tag {
        EQUALS => {
            let value = expect_tag(stream, LITERAL_INTEGER)?;
            Ok(Address::Operand(Operand::literal(parse_int(&value)?)))
        }
        STAR => {
            let value = expect_tag(stream, LITERAL_INTEGER)?;
            Ok(Address::Operand(Operand::indirect(parse_int(&value)?)))
        }
        LITERAL_INTEGER => Ok(Address::Operand(Operand::direct(parse_int(&token)?))),
        _ => Err(Error::parse(
            format!("expected an operand, found {:?}", token.value),
            Span::point(token.line, token.column),
        )),
    }
}

fn parse_int(token: &Token) -> Result<i64> {
    token.value.parse().map_err(|_| {
        Error::parse(format!("invalid integer literal {:?}", token.value), Span::point(token.line, token.column))
    })
}

fn expect_tag(stream: &mut Stream, tag: &'static str) -> Result<Token> {
    let token = next_or_eof(stream, tag)?;
    if token.tag != tag {
        return Err(Error::parse(
            format!("expected {tag}, found {:?}", token.value),
            Span::point(token.line, token.column),
        ));
    }
    Ok(token)
}

fn next_or_eof(stream: &mut Stream, expected: &str) -> Result<Token> {
    stream
        .next_token()
        .ok_or_else(|| Error::parse(format!("unexpected end of input, expected {expected}"), Span::point(0, 0)))
}

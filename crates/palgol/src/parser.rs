//! Recursive-descent parser for Pidgin ALGOL.

use lexer_core::{BufferedTokenStream, Token};
use ram_error::{Error, Result, Span};

use crate::ast::{Ast, BinaryOperator, Expression, Statement};
use crate::lexer::{self, KEYWORD, LITERAL_ID, LITERAL_INTEGER, SYMBOL};

type Stream = BufferedTokenStream<std::vec::IntoIter<Token>>;

/// Parse a Pidgin ALGOL program into an [`Ast`].
pub fn parse(source: &str) -> Result<Ast> {
    let tokens = lexer::lexer().tokenize(source)?;
    let mut stream = BufferedTokenStream::new(tokens.into_iter());
    let head = read_statement(&mut stream)?;
    if let Some(trailing) = stream.peek(1) {
        return Err(Error::parse(format!("unexpected trailing token {:?}", trailing.value), span_of(trailing)));
    }
    Ok(Ast { head })
}

fn span_of(token: &Token) -> Span {
    Span::new(token.line, token.column, token.value.chars().count())
}

fn peek_or_eof<'a>(stream: &'a mut Stream, expected: &str) -> Result<&'a Token> {
    if stream.peek(1).is_none() {
        return Err(Error::parse(format!("unexpected end of input, expected {expected}"), Span::point(0, 0)));
    }
    Ok(stream.peek(1).unwrap())
}

fn next_or_eof(stream: &mut Stream, expected: &str) -> Result<Token> {
    stream
        .next_token()
        .ok_or_else(|| Error::parse(format!("unexpected end of input, expected {expected}"), Span::point(0, 0)))
}

fn expect_keyword(stream: &mut Stream, keyword: &str) -> Result<Token> {
    let token = next_or_eof(stream, keyword)?;
    if token.tag != KEYWORD || token.value != keyword {
        return Err(Error::parse(format!("expected {keyword:?}, found {:?}", token.value), span_of(&token)));
    }
    Ok(token)
}

fn expect_symbol(stream: &mut Stream, symbols: &[&str]) -> Result<Token> {
    let token = next_or_eof(stream, &symbols.join(" or "))?;
    if token.tag != SYMBOL || !symbols.contains(&token.value.as_str()) {
        return Err(Error::parse(
            format!("expected one of {symbols:?}, found {:?}", token.value),
            span_of(&token),
        ));
    }
    Ok(token)
}

fn read_statement(stream: &mut Stream) -> Result<Statement> {
    let top = peek_or_eof(stream, "a statement")?;
    match (top.tag, top.value.as_str()) {
        (KEYWORD, "begin") => read_block(stream),
        (KEYWORD, "read") => read_read(stream),
        (KEYWORD, "if") => read_if(stream),
        (KEYWORD, "while") => read_while(stream),
        (KEYWORD, "write") => read_write(stream),
        (LITERAL_ID, _) => read_assignment(stream),
        _ => Err(Error::parse(format!("unexpected token {:?}", top.value), span_of(top))),
    }
}

fn read_block(stream: &mut Stream) -> Result<Statement> {
    let begin = expect_keyword(stream, "begin")?;
    let span = span_of(&begin);
    let mut statements = Vec::new();
    loop {
        let top = peek_or_eof(stream, "a statement or 'end'")?;
        if top.tag == KEYWORD && top.value == "end" {
            break;
        }
        statements.push(read_statement(stream)?);
        let top = peek_or_eof(stream, "';' or 'end'")?;
        if top.tag == SYMBOL && top.value == ";" {
            stream.next_token();
        } else {
            let top = peek_or_eof(stream, "'end'")?;
            if !(top.tag == KEYWORD && top.value == "end") {
                return Err(Error::parse(
                    format!("expected ';' or 'end', found {:?}", top.value),
                    span_of(top),
                ));
            }
        }
    }
    expect_keyword(stream, "end")?;
    Ok(Statement::Block { statements, span })
}

fn read_read(stream: &mut Stream) -> Result<Statement> {
    let token = expect_keyword(stream, "read")?;
    let span = span_of(&token);
    let variable = read_variable_expression(stream)?;
    Ok(Statement::Read { variable, span })
}

fn read_write(stream: &mut Stream) -> Result<Statement> {
    let token = expect_keyword(stream, "write")?;
    let span = span_of(&token);
    let value = read_unary_expression(stream)?;
    if !matches!(value, Expression::Variable { .. } | Expression::Literal { .. }) {
        return Err(Error::parse("write requires a variable or literal".to_string(), value.span()));
    }
    Ok(Statement::Write { value, span })
}

fn read_if(stream: &mut Stream) -> Result<Statement> {
    let token = expect_keyword(stream, "if")?;
    let span = span_of(&token);
    let condition = read_expression(stream)?;
    expect_keyword(stream, "then")?;
    let true_body = Box::new(read_statement(stream)?);
    let else_body = if matches!(peek_or_eof(stream, "statement"), Ok(t) if t.tag == KEYWORD && t.value == "else") {
        stream.next_token();
        Some(Box::new(read_statement(stream)?))
    } else {
        None
    };
    Ok(Statement::If { condition, true_body, else_body, span })
}

fn read_while(stream: &mut Stream) -> Result<Statement> {
    let token = expect_keyword(stream, "while")?;
    let span = span_of(&token);
    let condition = read_expression(stream)?;
    expect_keyword(stream, "do")?;
    let body = Box::new(read_statement(stream)?);
    Ok(Statement::While { condition, body, span })
}

fn read_assignment(stream: &mut Stream) -> Result<Statement> {
    let target = next_or_eof(stream, "a variable")?;
    if target.tag != LITERAL_ID {
        return Err(Error::parse(format!("expected a variable, found {:?}", target.value), span_of(&target)));
    }
    expect_symbol(stream, &["←", "<-"])?;
    let expression = read_expression(stream)?;
    Ok(Statement::Assignment { variable: target.value.clone(), expression, span: span_of(&target) })
}

/// Try a binary expression first, falling back to a unary one: `a` alone
/// is a valid expression, but so is `a + b`, and we can't tell which until
/// we've looked past `a`.
fn read_expression(stream: &mut Stream) -> Result<Expression> {
    stream.checkpoint();
    match read_binary_expression(stream) {
        Ok(expr) => {
            stream.commit();
            Ok(expr)
        }
        Err(_) => {
            stream.rollback();
            read_unary_expression(stream)
        }
    }
}

fn read_unary_expression(stream: &mut Stream) -> Result<Expression> {
    let top = peek_or_eof(stream, "an expression")?;
    if top.tag == SYMBOL && top.value == "-" {
        let token = stream.next_token().expect("peeked");
        let inner = read_unary_expression(stream)?;
        return Ok(Expression::UnaryNegation { span: span_of(&token), expr: Box::new(inner) });
    }
    match top.tag {
        LITERAL_ID => read_variable_expression(stream),
        LITERAL_INTEGER => read_literal_expression(stream),
        _ => Err(Error::parse(format!("unexpected token {:?}, expected an expression", top.value), span_of(top))),
    }
}

fn read_variable_expression(stream: &mut Stream) -> Result<Expression> {
    let token = next_or_eof(stream, "a variable")?;
    if token.tag != LITERAL_ID {
        return Err(Error::parse(format!("expected a variable, found {:?}", token.value), span_of(&token)));
    }
    Ok(Expression::Variable { name: token.value.clone(), span: span_of(&token) })
}

fn read_literal_expression(stream: &mut Stream) -> Result<Expression> {
    let token = next_or_eof(stream, "an integer literal")?;
    if token.tag != LITERAL_INTEGER {
        return Err(Error::parse(format!("expected an integer, found {:?}", token.value), span_of(&token)));
    }
    let value = token
        .value
        .parse()
        .map_err(|_| Error::parse(format!("invalid integer literal {:?}", token.value), span_of(&token)))?;
    Ok(Expression::Literal { value, span: span_of(&token) })
}

/// `left op right`, where `right` is itself parsed with [`read_expression`]
/// — this makes a chain like `a + b + c` parse right-associatively, as
/// `a + (b + c)`, which is fine for the additive/comparison operators this
/// language has (there is no precedence table to get wrong).
fn read_binary_expression(stream: &mut Stream) -> Result<Expression> {
    let left = read_unary_expression(stream)?;
    let token = next_or_eof(stream, "a binary operator")?;
    let operator = BinaryOperator::from_symbol(&token.value)
        .ok_or_else(|| Error::parse(format!("expected a binary operator, found {:?}", token.value), span_of(&token)))?;
    let right = read_expression(stream)?;
    let span = left.span();
    Ok(Expression::Binary { left: Box::new(left), operator, right: Box::new(right), span })
}

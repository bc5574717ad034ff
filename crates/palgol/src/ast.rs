//! The Pidgin ALGOL abstract syntax tree.

use ram_error::Span;

/// A binary operator, split into the comparison and arithmetic families
/// the compiler lowers differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Mult,
    Div,
}

impl BinaryOperator {
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
        )
    }

    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Mult | BinaryOperator::Div
        )
    }

    /// Parse from the symbol text a token carries. `<=`, `>=` and `!=` are
    /// the ASCII spellings of `≤`, `≥` and `≠`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => BinaryOperator::Equals,
            "≠" | "!=" => BinaryOperator::NotEquals,
            "<" => BinaryOperator::Lt,
            "≤" | "<=" => BinaryOperator::Le,
            ">" => BinaryOperator::Gt,
            "≥" | ">=" => BinaryOperator::Ge,
            "+" => BinaryOperator::Plus,
            "-" => BinaryOperator::Minus,
            "*" => BinaryOperator::Mult,
            "/" => BinaryOperator::Div,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "≠",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "≤",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => "≥",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Mult => "*",
            BinaryOperator::Div => "/",
        }
    }
}

/// An expression: a literal, a variable reference, a unary negation, or a
/// binary operation. Replaces the original's `Expression`/`UnaryExpression`
/// class hierarchy with a closed enum, since Rust doesn't need inheritance
/// to express "one of a fixed set of shapes."
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal { value: i64, span: Span },
    Variable { name: String, span: Span },
    UnaryNegation { expr: Box<Expression>, span: Span },
    Binary { left: Box<Expression>, operator: BinaryOperator, right: Box<Expression>, span: Span },
}

impl Expression {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal { span, .. }
            | Expression::Variable { span, .. }
            | Expression::UnaryNegation { span, .. }
            | Expression::Binary { span, .. } => *span,
        }
    }

    #[must_use]
    pub fn is_unary(&self) -> bool {
        !matches!(self, Expression::Binary { .. })
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal { value, .. } => write!(f, "{value}"),
            Expression::Variable { name, .. } => write!(f, "{name}"),
            Expression::UnaryNegation { expr, .. } => write!(f, "-{expr}"),
            Expression::Binary { left, operator, right, .. } => {
                write!(f, "{left} {} {right}", operator.as_str())
            }
        }
    }
}

/// A statement. `Read`/`Write`/`Assignment` carry pre-validated unary
/// expressions rather than raw `Expression`s, so downstream code (the
/// compiler) doesn't need to re-check "is this actually a variable?".
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block { statements: Vec<Statement>, span: Span },
    Read { variable: Expression, span: Span },
    Write { value: Expression, span: Span },
    If { condition: Expression, true_body: Box<Statement>, else_body: Option<Box<Statement>>, span: Span },
    While { condition: Expression, body: Box<Statement>, span: Span },
    Assignment { variable: String, expression: Expression, span: Span },
}

impl Statement {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Statement::Block { span, .. }
            | Statement::Read { span, .. }
            | Statement::Write { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::Assignment { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Block { statements, .. } => {
                writeln!(f, "begin")?;
                let bodies: Vec<String> = statements
                    .iter()
                    .map(|s| s.to_string().lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n"))
                    .collect();
                write!(f, "{}", bodies.join(";\n"))?;
                write!(f, "\nend")
            }
            Statement::Read { variable, .. } => write!(f, "read {variable}"),
            Statement::Write { value, .. } => write!(f, "write {value}"),
            Statement::If { condition, true_body, else_body, .. } => {
                writeln!(f, "if {condition} then")?;
                let body = true_body.to_string().lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n");
                write!(f, "{body}")?;
                if let Some(else_body) = else_body {
                    writeln!(f, "\nelse")?;
                    let body =
                        else_body.to_string().lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n");
                    write!(f, "{body}")?;
                }
                Ok(())
            }
            Statement::While { condition, body, .. } => {
                writeln!(f, "while {condition} do")?;
                let body = body.to_string().lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n");
                write!(f, "{body}")
            }
            Statement::Assignment { variable, expression, .. } => write!(f, "{variable} ← {expression}"),
        }
    }
}

/// A parsed Pidgin ALGOL program: a single top-level statement (almost
/// always a `begin ... end` block).
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub head: Statement,
}

impl std::fmt::Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.head)
    }
}

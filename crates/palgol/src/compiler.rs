//! Lowering from a Pidgin ALGOL [`Ast`] to a RAM [`Program`].
//!
//! The lowering has no optimization pass: every expression and condition
//! compiles to the same instruction shape regardless of context, and
//! labels are only merged when two constructs happen to land on the exact
//! same program counter (see [`Compiler::mark`]). What you write is, more
//! or less, what you get back out as RAM code.

use std::collections::HashMap;

use ram_core::{Address, Instruction, JumpTarget, Opcode, Operand, Program};
use ram_error::{Error, Result};

use crate::ast::{Ast, BinaryOperator, Expression, Statement};
use crate::parser;

/// How a comparison operator lowers: whether the residual needs negating
/// first, whether the conditional jump lands in the body (true) or past it
/// (false), and which RAM opcode tests the residual.
#[derive(Debug, Clone, Copy)]
struct ConditionAction {
    with_mult: bool,
    jump_to_body: bool,
    jumper: Opcode,
}

fn condition_action(operator: BinaryOperator) -> ConditionAction {
    match operator {
        BinaryOperator::Equals => {
            ConditionAction { with_mult: false, jump_to_body: true, jumper: Opcode::Jzero }
        }
        BinaryOperator::NotEquals => {
            ConditionAction { with_mult: false, jump_to_body: false, jumper: Opcode::Jzero }
        }
        BinaryOperator::Lt => {
            ConditionAction { with_mult: true, jump_to_body: true, jumper: Opcode::Jgtz }
        }
        BinaryOperator::Le => {
            ConditionAction { with_mult: false, jump_to_body: false, jumper: Opcode::Jgtz }
        }
        BinaryOperator::Gt => {
            ConditionAction { with_mult: false, jump_to_body: true, jumper: Opcode::Jgtz }
        }
        BinaryOperator::Ge => {
            ConditionAction { with_mult: true, jump_to_body: false, jumper: Opcode::Jgtz }
        }
        // Non-comparison conditions (a bare expression used as a condition)
        // are treated as an implied `≠ 0` test.
        _ => ConditionAction { with_mult: false, jump_to_body: false, jumper: Opcode::Jzero },
    }
}

fn is_zero(expr: &Expression) -> bool {
    matches!(expr, Expression::Literal { value: 0, .. })
}

/// Lowers a Pidgin ALGOL [`Ast`] into a RAM [`Program`].
///
/// A fresh `Compiler` should be used for each program: register and label
/// allocation are stateful across the whole compile.
#[derive(Default)]
pub struct Compiler {
    var_map: HashMap<String, i64>,
    jumptable: HashMap<JumpTarget, usize>,
    reverse_jumptable: HashMap<usize, JumpTarget>,
    pc: usize,
    if_counter: usize,
    while_counter: usize,
    comp_counter: usize,
}

impl Compiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&mut self, source: &str) -> Result<Program> {
        let ast = parser::parse(source)?;
        self.compile_ast(&ast)
    }

    pub fn compile_ast(&mut self, ast: &Ast) -> Result<Program> {
        self.var_map.clear();
        self.jumptable.clear();
        self.reverse_jumptable.clear();
        self.pc = 0;

        let mut instructions = self.compile_statement(&ast.head)?;
        instructions.push(Instruction::without_operand(Opcode::Halt)?);
        self.pc += 1;

        Program::new(instructions, self.jumptable.clone())
    }

    fn register_for(&mut self, name: &str) -> i64 {
        if let Some(&register) = self.var_map.get(name) {
            return register;
        }
        let register = self.var_map.len() as i64 + 1;
        self.var_map.insert(name.to_string(), register);
        register
    }

    /// Claim the next free register for a compiler-internal temporary,
    /// without binding it to a source-level variable name.
    fn reserve_register(&mut self) -> i64 {
        let register = self.var_map.len() as i64 + 1;
        self.var_map.insert(format!("<reserved {register}>"), register);
        register
    }

    fn mult_neg_one(&self) -> Instruction {
        Instruction::with_operand(Opcode::Mult, Operand::literal(-1))
            .expect("MULT accepts a literal operand")
    }

    /// Allocate (or reuse, if one was already placed at this instruction
    /// index) a jump label for the instruction about to be emitted at the
    /// current program counter.
    fn mark(&mut self, name: &str) -> JumpTarget {
        if let Some(existing) = self.reverse_jumptable.get(&self.pc) {
            return existing.clone();
        }
        let target = JumpTarget::new(name);
        self.jumptable.insert(target.clone(), self.pc);
        self.reverse_jumptable.insert(self.pc, target.clone());
        target
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<Vec<Instruction>> {
        match statement {
            Statement::Block { statements, .. } => self.compile_block(statements),
            Statement::Read { variable, .. } => {
                let instruction = self.compile_read(variable)?;
                self.pc += 1;
                Ok(vec![instruction])
            }
            Statement::Write { value, .. } => {
                let instruction = self.compile_write(value)?;
                self.pc += 1;
                Ok(vec![instruction])
            }
            Statement::If { condition, true_body, else_body, .. } => {
                self.compile_if(condition, true_body, else_body.as_deref())
            }
            Statement::While { condition, body, .. } => self.compile_while(condition, body),
            Statement::Assignment { variable, expression, .. } => {
                self.compile_assignment(variable, expression)
            }
        }
    }

    fn compile_block(&mut self, statements: &[Statement]) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();
        for statement in statements {
            instructions.extend(self.compile_statement(statement)?);
        }
        Ok(instructions)
    }

    fn compile_read(&mut self, variable: &Expression) -> Result<Instruction> {
        let Expression::Variable { name, .. } = variable else {
            return Err(Error::compile("read requires a variable"));
        };
        let register = self.register_for(name);
        Instruction::with_operand(Opcode::Read, Operand::direct(register))
    }

    fn compile_write(&mut self, value: &Expression) -> Result<Instruction> {
        match value {
            Expression::Literal { value, .. } => {
                Instruction::with_operand(Opcode::Write, Operand::literal(*value))
            }
            Expression::Variable { name, .. } => {
                let register = self.register_for(name);
                Instruction::with_operand(Opcode::Write, Operand::direct(register))
            }
            _ => Err(Error::compile("write requires a variable or literal")),
        }
    }

    /// Build the instructions that evaluate `condition` and land at
    /// `body_label` (or fall through, depending on [`ConditionAction`]).
    /// The caller still owes one more instruction — the jump to "else" or
    /// "end" — which it appends once it knows which label that is.
    fn build_condition_instructions(
        &mut self,
        condition: &Expression,
        body_label: &str,
    ) -> Result<(Vec<Instruction>, ConditionAction)> {
        let (mut instructions, action) = if let Expression::Binary { left, operator, right, span } = condition {
            if operator.is_comparison() {
                let instructions = if is_zero(right) {
                    self.compile_expression(left)?
                } else {
                    let zeroed = Expression::Binary {
                        left: left.clone(),
                        operator: BinaryOperator::Minus,
                        right: right.clone(),
                        span: *span,
                    };
                    self.compile_expression(&zeroed)?
                };
                (instructions, condition_action(*operator))
            } else {
                (self.compile_expression(condition)?, condition_action(BinaryOperator::NotEquals))
            }
        } else {
            (self.compile_expression(condition)?, condition_action(BinaryOperator::NotEquals))
        };

        if action.with_mult {
            instructions.push(self.mult_neg_one());
            self.pc += 1;
        }

        if action.jump_to_body {
            self.pc += 2; // a jump to the body, plus the jump past it we still owe
            let target = self.mark(body_label);
            instructions.push(Instruction::new(action.jumper, Some(Address::Label(target)))?);
        } else {
            self.pc += 1; // the jump past the body we still owe
        }

        Ok((instructions, action))
    }

    fn compile_if(
        &mut self,
        condition: &Expression,
        true_body: &Statement,
        else_body: Option<&Statement>,
    ) -> Result<Vec<Instruction>> {
        self.if_counter += 1;
        let ic = self.if_counter;

        let (mut cond_insts, action) =
            self.build_condition_instructions(condition, &format!("if{ic}"))?;
        let mut true_insts = self.compile_statement(true_body)?;
        let mut else_insts = Vec::new();

        if let Some(else_body) = else_body {
            self.pc += 1;
            let else_target = self.mark(&format!("else{ic}"));
            let jumper = if action.jump_to_body { Opcode::Jump } else { action.jumper };
            cond_insts.push(Instruction::new(jumper, Some(Address::Label(else_target)))?);

            else_insts = self.compile_statement(else_body)?;

            let end_target = self.mark(&format!("endif{ic}"));
            true_insts.push(Instruction::new(Opcode::Jump, Some(Address::Label(end_target)))?);
        } else {
            let end_target = self.mark(&format!("endif{ic}"));
            let jumper = if action.jump_to_body { Opcode::Jump } else { action.jumper };
            cond_insts.push(Instruction::new(jumper, Some(Address::Label(end_target)))?);
        }

        cond_insts.extend(true_insts);
        cond_insts.extend(else_insts);
        Ok(cond_insts)
    }

    fn compile_while(&mut self, condition: &Expression, body: &Statement) -> Result<Vec<Instruction>> {
        self.while_counter += 1;
        let wc = self.while_counter;

        let while_target = self.mark(&format!("while{wc}"));
        let (mut cond_insts, action) =
            self.build_condition_instructions(condition, &format!("continue{wc}"))?;

        let mut body_insts = self.compile_statement(body)?;
        body_insts.push(Instruction::new(Opcode::Jump, Some(Address::Label(while_target)))?);
        self.pc += 1;

        let end_target = self.mark(&format!("endwhile{wc}"));
        let jumper = if action.jump_to_body { Opcode::Jump } else { action.jumper };
        cond_insts.push(Instruction::new(jumper, Some(Address::Label(end_target)))?);

        cond_insts.extend(body_insts);
        Ok(cond_insts)
    }

    fn compile_assignment(&mut self, variable: &str, expression: &Expression) -> Result<Vec<Instruction>> {
        let mut instructions = self.compile_expression(expression)?;
        let register = self.register_for(variable);
        instructions.push(Instruction::with_operand(Opcode::Store, Operand::direct(register))?);
        self.pc += 1;
        Ok(instructions)
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<Vec<Instruction>> {
        match expression {
            Expression::Binary { .. } => self.compile_binary_expression(expression),
            _ => self.compile_unary_expression(expression),
        }
    }

    fn compile_unary_expression(&mut self, expression: &Expression) -> Result<Vec<Instruction>> {
        match expression {
            Expression::Literal { value, .. } => {
                self.pc += 1;
                Ok(vec![Instruction::with_operand(Opcode::Load, Operand::literal(*value))?])
            }
            Expression::Variable { name, .. } => {
                let register = self.register_for(name);
                self.pc += 1;
                Ok(vec![Instruction::with_operand(Opcode::Load, Operand::direct(register))?])
            }
            Expression::UnaryNegation { expr, .. } => self.compile_unary_negation(expr),
            Expression::Binary { .. } => Err(Error::compile("expected a unary expression")),
        }
    }

    fn compile_unary_negation(&mut self, inner: &Expression) -> Result<Vec<Instruction>> {
        if let Expression::Literal { value, .. } = inner {
            self.pc += 1;
            return Ok(vec![Instruction::with_operand(Opcode::Load, Operand::literal(-value))?]);
        }
        let mut instructions = self.compile_expression(inner)?;
        instructions.push(self.mult_neg_one());
        self.pc += 1;
        Ok(instructions)
    }

    fn compile_binary_expression(&mut self, expression: &Expression) -> Result<Vec<Instruction>> {
        let Expression::Binary { left, operator, right, .. } = expression else {
            return Err(Error::compile("expected a binary expression"));
        };

        let mut instructions = Vec::new();

        // A literal or bare variable on the right needs no instructions of
        // its own — it becomes the operand of whatever instruction applies
        // the operator. Anything more complex is evaluated first and
        // stashed in a fresh register.
        let address = match right.as_ref() {
            Expression::Literal { value, .. } => Operand::literal(*value),
            Expression::Variable { name, .. } => Operand::direct(self.register_for(name)),
            _ => {
                instructions.extend(self.compile_expression(right)?);
                let register = self.reserve_register();
                let address = Operand::direct(register);
                instructions.push(Instruction::with_operand(Opcode::Store, address)?);
                self.pc += 1;
                address
            }
        };

        instructions.extend(self.compile_expression(left)?);

        if operator.is_comparison() {
            instructions.extend(self.compile_comparison_expression(*operator, right, address)?);
        } else {
            instructions.extend(self.compile_arithmetic_expression(*operator, right, address)?);
        }

        Ok(instructions)
    }

    fn compile_comparison_expression(
        &mut self,
        operator: BinaryOperator,
        right: &Expression,
        address: Operand,
    ) -> Result<Vec<Instruction>> {
        self.comp_counter += 1;
        let cc = self.comp_counter;
        let mut instructions = Vec::new();

        if !is_zero(right) {
            instructions.push(Instruction::with_operand(Opcode::Sub, address)?);
            self.pc += 1;
        }

        let action = condition_action(operator);
        if action.with_mult {
            instructions.push(self.mult_neg_one());
            self.pc += 1;
        }

        let (load_if_taken, load_if_not_taken) =
            if action.jump_to_body { (0, 1) } else { (1, 0) };

        self.pc += 3;
        let cmp_target = self.mark(&format!("cmp{cc}"));
        instructions.push(Instruction::new(action.jumper, Some(Address::Label(cmp_target)))?);
        instructions.push(Instruction::with_operand(Opcode::Load, Operand::literal(load_if_taken))?);

        self.pc += 1;
        let endcmp_target = self.mark(&format!("endcmp{cc}"));
        instructions.push(Instruction::new(Opcode::Jump, Some(Address::Label(endcmp_target)))?);
        instructions.push(Instruction::with_operand(Opcode::Load, Operand::literal(load_if_not_taken))?);

        Ok(instructions)
    }

    fn compile_arithmetic_expression(
        &mut self,
        operator: BinaryOperator,
        right: &Expression,
        address: Operand,
    ) -> Result<Vec<Instruction>> {
        let zero_rhs = is_zero(right);
        match operator {
            BinaryOperator::Plus => {
                if zero_rhs {
                    return Ok(Vec::new());
                }
                self.pc += 1;
                Ok(vec![Instruction::with_operand(Opcode::Add, address)?])
            }
            BinaryOperator::Minus => {
                if zero_rhs {
                    return Ok(Vec::new());
                }
                self.pc += 1;
                Ok(vec![Instruction::with_operand(Opcode::Sub, address)?])
            }
            BinaryOperator::Mult => {
                self.pc += 1;
                if zero_rhs {
                    Ok(vec![Instruction::with_operand(Opcode::Load, Operand::literal(0))?])
                } else {
                    Ok(vec![Instruction::with_operand(Opcode::Mult, address)?])
                }
            }
            BinaryOperator::Div => {
                if zero_rhs {
                    return Err(Error::compile("attempt to divide by literal 0"));
                }
                self.pc += 1;
                Ok(vec![Instruction::with_operand(Opcode::Div, address)?])
            }
            _ => Err(Error::compile(format!("{} is not an arithmetic operator", operator.as_str()))),
        }
    }
}

/// Compile Pidgin ALGOL source directly to a RAM [`Program`].
pub fn compile(source: &str) -> Result<Program> {
    Compiler::new().compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ram_vm::{VecInput, VecOutput, VirtualMachine};

    struct Run {
        output: Vec<i64>,
    }

    fn run(source: &str, input: Vec<i64>) -> Run {
        let program = compile(source).unwrap();
        let mut vm = VirtualMachine::new(program, VecInput::new(input), VecOutput::new());
        vm.run().unwrap();
        Run { output: vm.output.values.clone() }
    }

    #[test]
    fn compiles_a_straight_line_program() {
        let result = run("begin read x; write x end", vec![7]);
        assert_eq!(result.output, vec![7]);
    }

    #[test]
    fn compiles_an_if_else() {
        let source = "begin read x; if x < 10 then write 1 else write 0 end";
        assert_eq!(run(source, vec![3]).output, vec![1]);
        assert_eq!(run(source, vec![30]).output, vec![0]);
    }

    #[test]
    fn compiles_a_while_loop_counting_down() {
        let source = "begin read x; while x do begin write x; x ← x - 1 end end";
        assert_eq!(run(source, vec![3]).output, vec![3, 2, 1]);
    }

    #[test]
    fn compiles_arithmetic_expressions() {
        let source = "begin read x; read y; x ← x * y + 1; write x end";
        assert_eq!(run(source, vec![3, 4]).output, vec![13]);
    }

    #[test]
    fn rejects_division_by_a_literal_zero() {
        assert!(compile("begin x ← 1 / 0; write x end").is_err());
    }

    #[test]
    fn n_to_the_n() {
        // x <- n; result <- 1; while x do begin result <- result * n; x <- x - 1 end
        let source = "begin \
            read n; \
            x ← n; \
            result ← 1; \
            while x do begin \
                result ← result * n; \
                x ← x - 1 \
            end; \
            write result \
        end";
        let result = run(source, vec![5]);
        assert_eq!(result.output, vec![3125]);
    }

    /// A tiny arithmetic-expression AST, independent of [`Expression`],
    /// used only to check the compiler against a reference evaluator
    /// (spec invariant 6) without risking the property test sharing a bug
    /// with the code it's checking.
    #[derive(Debug, Clone)]
    enum TestExpr {
        Lit(i64),
        Var(usize),
        Neg(Box<TestExpr>),
        Bin(&'static str, Box<TestExpr>, Box<TestExpr>),
    }

    const VAR_NAMES: [&str; 3] = ["a", "b", "c"];

    impl TestExpr {
        fn to_source(&self) -> String {
            match self {
                TestExpr::Lit(v) => v.to_string(),
                TestExpr::Var(i) => VAR_NAMES[*i].to_string(),
                TestExpr::Neg(inner) => format!("- {}", inner.to_source()),
                TestExpr::Bin(op, l, r) => format!("{} {op} {}", l.to_source(), r.to_source()),
            }
        }

        fn eval(&self, env: &[i64; 3]) -> i64 {
            match self {
                TestExpr::Lit(v) => *v,
                TestExpr::Var(i) => env[*i],
                TestExpr::Neg(inner) => -inner.eval(env),
                TestExpr::Bin("+", l, r) => l.eval(env) + r.eval(env),
                TestExpr::Bin("-", l, r) => l.eval(env) - r.eval(env),
                TestExpr::Bin("*", l, r) => l.eval(env) * r.eval(env),
                TestExpr::Bin(op, ..) => unreachable!("unhandled operator {op}"),
            }
        }
    }

    fn unary_expr() -> proptest::strategy::BoxedStrategy<TestExpr> {
        use proptest::prelude::*;
        let leaf = prop_oneof![(-9..9i64).prop_map(TestExpr::Lit), (0..3usize).prop_map(TestExpr::Var)];
        leaf.prop_recursive(3, 8, 1, |inner| inner.prop_map(|e| TestExpr::Neg(Box::new(e))).boxed()).boxed()
    }

    /// The grammar is right-associative with no precedence table
    /// (`expr ::= unary (op expr)?`): the left side of a binary node is
    /// always a `unary`, never a nested binary, and only the right side
    /// recurses into a full expression.
    fn arith_expr() -> proptest::strategy::BoxedStrategy<TestExpr> {
        use proptest::prelude::*;
        unary_expr()
            .prop_recursive(3, 8, 2, |inner| {
                (unary_expr(), prop_oneof![Just("+"), Just("-"), Just("*")], inner)
                    .prop_map(|(l, op, r)| TestExpr::Bin(op, Box::new(l), Box::new(r)))
                    .boxed()
            })
            .boxed()
    }

    proptest::proptest! {
        /// Invariant 6, scoped to straight-line arithmetic (no division, so
        /// no literal-zero-divisor case to special-case, and no loops): the
        /// compiled RAM program's output matches a reference evaluator over
        /// the same expression for any assignment of its three variables.
        #[test]
        fn compiler_matches_a_reference_evaluator(
            expr in arith_expr(),
            a in -9i64..9,
            b in -9i64..9,
            c in -9i64..9,
        ) {
            let source =
                format!("begin read a; read b; read c; result ← {}; write result end", expr.to_source());
            let expected = expr.eval(&[a, b, c]);

            let program = compile(&source).unwrap();
            let mut vm = VirtualMachine::new(program, VecInput::new(vec![a, b, c]), VecOutput::new());
            vm.run().unwrap();

            proptest::prop_assert_eq!(vm.output.values, vec![expected]);
        }
    }
}

// ABOUTME: Post-order tree walk over the statement list, executing against an environment chain

use crate::ast::{Expr, Stmt};
use crate::callable::{LoxFunction, NativeFunction};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Literal, Token, TokenKind};
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Interpreter<W: Write> {
    globals: Rc<Environment>,
    environment: Rc<Environment>,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let globals = Environment::new();
        globals.define("clock".to_string(), Value::Native(Rc::new(NativeFunction::Clock)));
        globals.define("printf".to_string(), Value::Native(Rc::new(NativeFunction::Printf)));
        Self {
            environment: globals.clone(),
            globals,
            out,
        }
    }

    /// Runs every statement, reporting (at most) the first runtime error to the
    /// sink and stopping there, matching the "abort the current interpret call" policy.
    pub fn interpret<D: Write>(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics<D>) {
        for stmt in statements {
            if let Err(err) = self.execute(stmt) {
                diagnostics.report_runtime(err.line(), &err.to_string());
                return;
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.out, "{value}");
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let child = Environment::with_parent(self.environment.clone());
                self.execute_block(statements, child)
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(cond)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { cond, body } => {
                while self.evaluate(cond)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::Function(decl) => {
                let function = Value::Function(Rc::new(LoxFunction::new(decl.clone())));
                self.environment.define(decl.name.lexeme.clone(), function);
                Ok(())
            }
        }
    }

    /// Runs `statements` in `env`, restoring the caller's environment on every exit path.
    fn execute_block(&mut self, statements: &[Stmt], env: Rc<Environment>) -> Result<(), RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = statements.iter().try_for_each(|s| self.execute(s));
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(Some(Literal::Number(n))) => Ok(Value::Number(*n)),
            Expr::Literal(Some(Literal::String(s))) => Ok(Value::String(s.clone())),
            Expr::Literal(None) => Ok(Value::Nil),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { op, right } => self.eval_unary(op, right),
            Expr::Binary { left, op, right } => self.eval_binary(left, op, right),
            Expr::Logical { left, op, right } => self.eval_logical(left, op, right),
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(cond)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expr::Variable(name) => self.environment.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Call { callee, paren, arguments } => self.eval_call(callee, paren, arguments),
        }
    }

    fn eval_unary(&mut self, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::OperandMustBeNumber { line: op.line }),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("parser only produces ! and - as unary operators"),
        }
    }

    fn eval_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?.is_truthy();
        match op.kind {
            TokenKind::Or if left => Ok(Value::Bool(true)),
            TokenKind::Or => Ok(Value::Bool(self.evaluate(right)?.is_truthy())),
            TokenKind::And if !left => Ok(Value::Bool(false)),
            TokenKind::And => Ok(Value::Bool(self.evaluate(right)?.is_truthy())),
            _ => unreachable!("parser only produces and/or as logical operators"),
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        let line = op.line;
        match op.kind {
            TokenKind::Comma => Ok(right),
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!("{left}{right}"))),
                _ => Err(RuntimeError::OperandsMustMatch { line }),
            },
            TokenKind::Minus => numeric_op(&left, &right, line, |a, b| a - b),
            TokenKind::Star => numeric_op(&left, &right, line, |a, b| a * b),
            TokenKind::Slash => {
                let (a, b) = as_numbers(&left, &right, line)?;
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero { line });
                }
                Ok(Value::Number(a / b))
            }
            TokenKind::Greater => numeric_cmp(&left, &right, line, |a, b| a > b),
            TokenKind::GreaterEqual => numeric_cmp(&left, &right, line, |a, b| a >= b),
            TokenKind::Less => numeric_cmp(&left, &right, line, |a, b| a < b),
            TokenKind::LessEqual => numeric_cmp(&left, &right, line, |a, b| a <= b),
            TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
            TokenKind::BangEqual => Ok(Value::Bool(left != right)),
            _ => unreachable!("parser only produces arithmetic/comparison/equality binary operators"),
        }
    }

    fn eval_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;
        if !matches!(callee, Value::Function(_) | Value::Native(_)) {
            return Err(RuntimeError::NotCallable { line: paren.line });
        }

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }

        match callee {
            Value::Function(function) => {
                if args.len() != function.arity() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: function.arity(),
                        actual: args.len(),
                        line: paren.line,
                    });
                }
                self.call_function(&function, &args)
            }
            Value::Native(native) => {
                if args.len() != native.arity() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: native.arity(),
                        actual: args.len(),
                        line: paren.line,
                    });
                }
                self.call_native(*native, &args)
            }
            _ => unreachable!("checked callable above"),
        }
    }

    /// Functions never close over their defining environment: the call frame's
    /// parent is always the global environment (see SPEC_FULL.md §3).
    fn call_function(&mut self, function: &LoxFunction, args: &[Value]) -> Result<Value, RuntimeError> {
        let call_env = Environment::with_parent(self.globals.clone());
        for (param, arg) in function.declaration.params.iter().zip(args) {
            call_env.define(param.lexeme.clone(), arg.clone());
        }
        self.execute_block(&function.declaration.body, call_env)?;
        Ok(Value::Nil)
    }

    fn call_native(&mut self, native: NativeFunction, args: &[Value]) -> Result<Value, RuntimeError> {
        match native {
            NativeFunction::Clock => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("system clock is after the Unix epoch")
                    .as_secs_f64();
                Ok(Value::Number(secs))
            }
            NativeFunction::Printf => {
                let _ = writeln!(self.out, "{}", args[0]);
                Ok(Value::Nil)
            }
        }
    }
}

fn as_numbers(left: &Value, right: &Value, line: usize) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::OperandsMustBeNumbers { line }),
    }
}

fn numeric_op(left: &Value, right: &Value, line: usize, f: impl Fn(f64, f64) -> f64) -> Result<Value, RuntimeError> {
    let (a, b) = as_numbers(left, right, line)?;
    Ok(Value::Number(f(a, b)))
}

fn numeric_cmp(left: &Value, right: &Value, line: usize, f: impl Fn(f64, f64) -> bool) -> Result<Value, RuntimeError> {
    let (a, b) = as_numbers(left, right, line)?;
    Ok(Value::Bool(f(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(src: &str) -> (String, bool) {
        let mut parse_diag = Diagnostics::new(Vec::new());
        let tokens = Lexer::new(src, &mut parse_diag).scan_tokens();
        let mut parser = Parser::new(&tokens, &mut parse_diag);
        let statements = parser.parse();
        assert!(!parse_diag.had_parse_error(), "unexpected parse error");

        let mut out = Vec::new();
        let mut interp = Interpreter::new(&mut out);
        let mut runtime_diag = Diagnostics::new(Vec::new());
        interp.interpret(&statements, &mut runtime_diag);
        (String::from_utf8(out).unwrap(), runtime_diag.had_runtime_error())
    }

    #[test]
    fn arithmetic_precedence() {
        let (out, err) = run("print 1 + 2 * 3;");
        assert!(!err);
        assert_eq!(out, "7\n");
    }

    #[test]
    fn string_number_concatenation_coerces() {
        let (out, err) = run(r#"var a = "hi"; var b = 2; print a + b;"#);
        assert!(!err);
        assert_eq!(out, "hi2\n");
    }

    #[test]
    fn for_loop_accumulates() {
        let (out, err) = run("var x = 0; for (var i = 0; i < 3; i = i + 1) { x = x + i; } print x;");
        assert!(!err);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn function_call_prints_sum() {
        let (out, err) = run("fun add(a, b) { print a + b; } add(2, 3);");
        assert!(!err);
        assert_eq!(out, "5\n");
    }

    #[test]
    fn nil_does_not_equal_false() {
        let (out, err) = run("print nil == false;");
        assert!(!err);
        assert_eq!(out, "false\n");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (out, err) = run("print 1 / 0;");
        assert!(err);
        assert_eq!(out, "");
    }

    #[test]
    fn truthiness_of_zero_and_empty_string() {
        let (out, _) = run(r#"print !0; print !""; print !0.0;"#);
        assert_eq!(out, "false\nfalse\nfalse\n");
    }

    #[test]
    fn short_circuit_or_skips_right_side() {
        let (out, _) = run(r#"true or printf("skipped");"#);
        assert_eq!(out, "");
    }

    #[test]
    fn short_circuit_and_evaluates_right_side_when_left_truthy() {
        let (out, _) = run(r#"true and printf("ran");"#);
        assert_eq!(out, "ran\n");
    }

    #[test]
    fn block_scope_does_not_leak() {
        let (out, err) = run("{ var x = 1; } print x;");
        assert!(err);
        assert_eq!(out, "");
    }

    #[test]
    fn scope_restored_after_runtime_error_inside_block() {
        let mut parse_diag = Diagnostics::new(Vec::new());
        let src = "var x = 1; { var x = 2; print 1 / 0; } print x;";
        let tokens = Lexer::new(src, &mut parse_diag).scan_tokens();
        let mut parser = Parser::new(&tokens, &mut parse_diag);
        let statements = parser.parse();

        let mut out = Vec::new();
        let mut interp = Interpreter::new(&mut out);
        let mut runtime_diag = Diagnostics::new(Vec::new());
        interp.interpret(&statements, &mut runtime_diag);
        assert!(runtime_diag.had_runtime_error());
        // the error aborts `interpret`, so the outer `print x` never runs;
        // this only demonstrates that the first block's error doesn't corrupt state for a retry.
        assert!(std::ptr::eq(
            Rc::as_ptr(&interp.environment),
            Rc::as_ptr(&interp.globals)
        ));
    }

    #[test]
    fn clock_returns_a_number() {
        let (out, err) = run("print clock() > 0;");
        assert!(!err);
        assert_eq!(out, "true\n");
    }

    #[test]
    fn calling_a_non_callable_is_a_runtime_error() {
        let (_, err) = run("var x = 1; x();");
        assert!(err);
    }

    #[test]
    fn wrong_arity_is_a_runtime_error() {
        let (_, err) = run("fun add(a, b) { print a + b; } add(1);");
        assert!(err);
    }
}

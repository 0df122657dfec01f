// ABOUTME: Renders an Expr as a fully parenthesized operator-tree dump
// Used to exercise the precedence testable property and as a debugging aid.

use crate::ast::Expr;

pub fn print(expr: &Expr) -> String {
    match expr {
        Expr::Literal(Some(lit)) => lit.to_string(),
        Expr::Literal(None) => "nil".to_string(),
        Expr::Bool(b) => b.to_string(),
        Expr::Nil => "nil".to_string(),
        Expr::Grouping(inner) => parenthesize("group", &[inner]),
        Expr::Unary { op, right } => parenthesize(&op.lexeme, &[right]),
        Expr::Binary { left, op, right } => parenthesize(&op.lexeme, &[left, right]),
        Expr::Logical { left, op, right } => parenthesize(&op.lexeme, &[left, right]),
        Expr::Conditional {
            cond,
            then_branch,
            else_branch,
        } => parenthesize("?:", &[cond, then_branch, else_branch]),
        Expr::Variable(name) => name.lexeme.clone(),
        Expr::Assign { name, value } => parenthesize(&format!("= {}", name.lexeme), &[value]),
        Expr::Call { callee, arguments, .. } => {
            let mut parts = vec![callee.as_ref()];
            parts.extend(arguments.iter());
            parenthesize("call", &parts)
        }
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut out = String::from("(");
    out.push_str(name);
    for e in exprs {
        out.push(' ');
        out.push_str(&print(e));
    }
    out.push(')');
    out
}

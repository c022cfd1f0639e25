//! Canonical source output.
//!
//! Expressions print fully parenthesised (`(a + (b * c))`, `(-x)`), so the
//! output re-parses to the same tree no matter how the input was bracketed.
//! Statements print one per line, indented with tabs.

use std::fmt::{self, Display, Formatter, Write};

use crate::ast::{
    AssignStmt, Block, Else, Expr, ForStmt, FuncDecl, IfStmt, Param, Program, Spanned, Stmt, Type,
};

/// Renders `program` as canonical source text.
pub fn print_program(program: &Program) -> String {
    program.to_string()
}

impl<T: Display> Display for Spanned<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(id) => write!(f, "{id}"),
            Expr::IntLit(v) => write!(f, "{v}"),
            // `{:?}` keeps a `.0` or an exponent so the literal stays a float
            Expr::FloatLit(v) => write!(f, "{v:?}"),
            Expr::StringLit(s) => write_quoted(f, s),
            Expr::Unary { op, operand } => write!(f, "({op}{operand})"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                f.write_char(')')
            }
        }
    }
}

fn write_quoted(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\x07' => f.write_str("\\a")?,
            '\x08' => f.write_str("\\b")?,
            '\x0B' => f.write_str("\\v")?,
            '\x0C' => f.write_str("\\f")?,
            c if c.is_ascii_control() => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn indent(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_char('\t')?;
    }
    Ok(())
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(pkg) = &self.package {
            writeln!(f, "package {pkg}")?;
        }
        for func in &self.funcs {
            f.write_char('\n')?;
            write_func(f, &func.node)?;
        }
        Ok(())
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.typ)
    }
}

fn write_func(f: &mut Formatter<'_>, func: &FuncDecl) -> fmt::Result {
    write!(f, "func {}(", func.name)?;
    write_list(f, &func.params)?;
    f.write_char(')')?;
    match func.results.as_slice() {
        [] => {}
        [one] => write!(f, " {one}")?,
        many => {
            f.write_str(" (")?;
            write_list::<Spanned<Type>>(f, many)?;
            f.write_char(')')?;
        }
    }
    f.write_char(' ')?;
    write_block(f, &func.body, 0)?;
    f.write_char('\n')
}

fn write_block(f: &mut Formatter<'_>, block: &Block, depth: usize) -> fmt::Result {
    f.write_str("{\n")?;
    for stmt in &block.stmts {
        indent(f, depth + 1)?;
        write_stmt(f, &stmt.node, depth + 1)?;
        f.write_char('\n')?;
    }
    indent(f, depth)?;
    f.write_char('}')
}

fn write_stmt(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Expr(e) => write!(f, "{e}"),
        Stmt::Assign(assign) => write_assign(f, assign),
        Stmt::If(s) => write_if(f, s, depth),
        Stmt::For(s) => write_for(f, s, depth),
        Stmt::Return(values) if values.is_empty() => f.write_str("return"),
        Stmt::Return(values) => {
            f.write_str("return ")?;
            write_list::<Spanned<Expr>>(f, values)
        }
        Stmt::Empty => f.write_char(';'),
    }
}

fn write_assign(f: &mut Formatter<'_>, assign: &AssignStmt) -> fmt::Result {
    write_list(f, &assign.targets)?;
    write!(f, " {} ", assign.op.as_str())?;
    write_list::<Spanned<Expr>>(f, &assign.values)
}

fn write_if(f: &mut Formatter<'_>, s: &IfStmt, depth: usize) -> fmt::Result {
    write!(f, "if {} ", s.cond)?;
    write_block(f, &s.then_block, depth)?;
    match &s.otherwise {
        None => Ok(()),
        Some(Else::Block(block)) => {
            f.write_str(" else ")?;
            write_block(f, block, depth)
        }
        Some(Else::If(nested)) => {
            f.write_str(" else ")?;
            write_if(f, &nested.node, depth)
        }
    }
}

fn write_for(f: &mut Formatter<'_>, s: &ForStmt, depth: usize) -> fmt::Result {
    f.write_str("for ")?;
    match (&s.init, &s.cond, &s.post) {
        (None, None, None) => {}
        (None, Some(cond), None) => write!(f, "{cond} ")?,
        (init, cond, post) => {
            if let Some(init) = init {
                write_stmt(f, &init.node, depth)?;
            }
            f.write_str("; ")?;
            if let Some(cond) = cond {
                write!(f, "{cond}")?;
            }
            f.write_str("; ")?;
            if let Some(post) = post {
                write_stmt(f, &post.node, depth)?;
                f.write_char(' ')?;
            }
        }
    }
    write_block(f, &s.body, depth)
}

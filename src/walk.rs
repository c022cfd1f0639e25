use smallvec::{Array, SmallVec};

use crate::ast::*;

// Core traits
pub trait Walk<'ast> {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V);
}

/// Every method defaults to recursing into the node's children; override the
/// ones you care about and call the matching `walk` to keep descending.
pub trait Visitor<'ast> {
    #[inline(always)]
    fn visit_program(&mut self, p: &'ast Program) {
        p.walk(self);
    }

    #[inline(always)]
    fn visit_func_decl(&mut self, f: &'ast Spanned<FuncDecl>) {
        f.node.walk(self);
    }

    #[inline(always)]
    fn visit_param(&mut self, p: &'ast Spanned<Param>) {
        p.node.walk(self);
    }

    #[inline(always)]
    fn visit_type(&mut self, _t: &'ast Spanned<Type>) {}

    #[inline(always)]
    fn visit_ident(&mut self, _id: &'ast Spanned<Ident>) {}

    #[inline(always)]
    fn visit_block(&mut self, b: &'ast Block) {
        b.walk(self);
    }

    #[inline(always)]
    fn visit_stmt(&mut self, s: &'ast Spanned<Stmt>) {
        s.node.walk(self);
    }

    #[inline(always)]
    fn visit_if(&mut self, s: &'ast IfStmt) {
        s.walk(self);
    }

    #[inline(always)]
    fn visit_expr(&mut self, e: &'ast Spanned<Expr>) {
        e.node.walk(self);
    }
}

// Spanned nodes dispatch to the visitor
macro_rules! impl_walk_for_spanned {
    ($($node:ty => $visit:ident),* $(,)?) => {
        $(
            impl<'ast> Walk<'ast> for Spanned<$node> {
                #[inline(always)]
                fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
                    v.$visit(self);
                }
            }
        )*
    };
}

impl_walk_for_spanned! {
    FuncDecl => visit_func_decl,
    Param => visit_param,
    Type => visit_type,
    Ident => visit_ident,
    Stmt => visit_stmt,
    Expr => visit_expr,
}

impl<'ast> Walk<'ast> for Spanned<IfStmt> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        v.visit_if(&self.node);
    }
}

// Utilities
impl<'ast, T: Walk<'ast>> Walk<'ast> for Vec<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        for item in self {
            item.walk(v);
        }
    }
}

impl<'ast, A> Walk<'ast> for SmallVec<A>
where
    A: Array,
    A::Item: Walk<'ast>,
{
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        for item in self {
            item.walk(v);
        }
    }
}

impl<'ast, T: Walk<'ast>> Walk<'ast> for Option<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        if let Some(x) = self {
            x.walk(v);
        }
    }
}

impl<'ast, T: Walk<'ast>> Walk<'ast> for Box<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        (**self).walk(v);
    }
}

impl<'ast> Walk<'ast> for Program {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        self.package.walk(v);
        self.funcs.walk(v);
    }
}

impl<'ast> Walk<'ast> for FuncDecl {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        self.name.walk(v);
        self.params.walk(v);
        self.results.walk(v);
        v.visit_block(&self.body);
    }
}

impl<'ast> Walk<'ast> for Param {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        self.name.walk(v);
        self.typ.walk(v);
    }
}

impl<'ast> Walk<'ast> for Block {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        self.stmts.walk(v);
    }
}

impl<'ast> Walk<'ast> for Stmt {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        match self {
            Stmt::Expr(e) => e.walk(v),
            Stmt::Assign(a) => {
                a.targets.walk(v);
                a.values.walk(v);
            }
            Stmt::If(s) => v.visit_if(s),
            Stmt::For(s) => {
                s.init.walk(v);
                s.cond.walk(v);
                s.post.walk(v);
                v.visit_block(&s.body);
            }
            Stmt::Return(values) => values.walk(v),
            Stmt::Empty => {}
        }
    }
}

impl<'ast> Walk<'ast> for IfStmt {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        self.cond.walk(v);
        v.visit_block(&self.then_block);
        match &self.otherwise {
            Some(Else::Block(b)) => v.visit_block(b),
            Some(Else::If(nested)) => nested.walk(v),
            None => {}
        }
    }
}

impl<'ast> Walk<'ast> for Expr {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        match self {
            Expr::Ident(_) | Expr::IntLit(_) | Expr::FloatLit(_) | Expr::StringLit(_) => {}
            Expr::Unary { operand, .. } => operand.walk(v),
            Expr::Binary { left, right, .. } => {
                left.walk(v);
                right.walk(v);
            }
            Expr::Call { callee, args } => {
                callee.walk(v);
                args.walk(v);
            }
        }
    }
}

/// Tallies node kinds; used by the driver's `--stats`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeCounter {
    pub funcs: usize,
    pub params: usize,
    pub blocks: usize,
    pub stmts: usize,
    pub exprs: usize,
    pub calls: usize,
    /// Deepest expression nesting seen.
    pub max_expr_depth: usize,
    depth: usize,
}

impl NodeCounter {
    pub fn count(program: &Program) -> Self {
        let mut counter = Self::default();
        counter.visit_program(program);
        counter
    }
}

impl<'ast> Visitor<'ast> for NodeCounter {
    fn visit_func_decl(&mut self, f: &'ast Spanned<FuncDecl>) {
        self.funcs += 1;
        f.node.walk(self);
    }

    fn visit_param(&mut self, p: &'ast Spanned<Param>) {
        self.params += 1;
        p.node.walk(self);
    }

    fn visit_block(&mut self, b: &'ast Block) {
        self.blocks += 1;
        b.walk(self);
    }

    fn visit_stmt(&mut self, s: &'ast Spanned<Stmt>) {
        self.stmts += 1;
        s.node.walk(self);
    }

    fn visit_expr(&mut self, e: &'ast Spanned<Expr>) {
        self.exprs += 1;
        if matches!(e.node, Expr::Call { .. }) {
            self.calls += 1;
        }
        self.depth += 1;
        self.max_expr_depth = self.max_expr_depth.max(self.depth);
        e.node.walk(self);
        self.depth -= 1;
    }
}

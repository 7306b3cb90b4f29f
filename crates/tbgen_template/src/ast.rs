//! Template syntax tree.

use serde_json::Value;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Text(String),
    Output {
        expr: Expr,
        line: usize,
    },
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Vec<Node>,
        line: usize,
    },
    For {
        targets: Vec<String>,
        iter: Expr,
        body: Vec<Node>,
        otherwise: Vec<Node>,
        line: usize,
    },
    Set {
        name: String,
        expr: Expr,
        line: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Concat,
    Add,
    Sub,
    Mul,
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Var(String),
    Literal(Value),
    List(Vec<Expr>),
    Attr(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Filter {
        expr: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Test {
        expr: Box<Expr>,
        name: String,
        negated: bool,
    },
}

impl Expr {
    /// A short source-like description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Expr::Var(name) => name.clone(),
            Expr::Attr(base, attr) => format!("{}.{attr}", base.describe()),
            Expr::Index(base, _) => format!("{}[...]", base.describe()),
            Expr::Filter { expr, name, .. } => format!("{} | {name}", expr.describe()),
            _ => "expression".to_string(),
        }
    }
}

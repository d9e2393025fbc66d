//! Expression tree and the allow-lists it is checked against

use std::fmt;

/// Parsed expression
///
/// The grammar accepts far more than the evaluator runs; every form still
/// gets a node so the allow-list check can name what it rejects.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    NoneLit,
    Name(String),
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Chained comparison: `a < b <= c`
    Compare {
        left: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Arg>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Set(Vec<Expr>),
    ListComp {
        element: Box<Expr>,
        target: String,
        iter: Box<Expr>,
        conditions: Vec<Expr>,
    },
    Assign {
        target: String,
        value: Box<Expr>,
    },
}

/// Call argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Positional(Expr),
    Keyword(String, Expr),
    Starred(Expr),
    DoubleStarred(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,
    BitXor,
    BitAnd,
    BitOr,
    LShift,
    RShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

/// Node kind, one per [`Expr`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Number,
    String,
    Boolean,
    NoneLiteral,
    Name,
    BinOp,
    UnaryOp,
    BoolOp,
    Compare,
    IfExp,
    Lambda,
    Call,
    Attribute,
    Subscript,
    Slice,
    List,
    Tuple,
    Dict,
    Set,
    ListComp,
    Assign,
}

/// Node kinds the evaluator runs
pub const ALLOWED_NODES: &[NodeKind] = &[
    NodeKind::Number,
    NodeKind::BinOp,
    NodeKind::UnaryOp,
    NodeKind::Name,
    NodeKind::Call,
    NodeKind::Subscript,
];

pub const ALLOWED_BINOPS: &[BinOp] = &[
    BinOp::Add,
    BinOp::Sub,
    BinOp::Mul,
    BinOp::Div,
    BinOp::Pow,
    BinOp::BitXor,
    BinOp::MatMul,
];

pub const ALLOWED_UNARY: &[UnaryOp] = &[UnaryOp::Neg];

impl Expr {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Number(_) => NodeKind::Number,
            Expr::Str(_) => NodeKind::String,
            Expr::Bool(_) => NodeKind::Boolean,
            Expr::NoneLit => NodeKind::NoneLiteral,
            Expr::Name(_) => NodeKind::Name,
            Expr::BinOp { .. } => NodeKind::BinOp,
            Expr::UnaryOp { .. } => NodeKind::UnaryOp,
            Expr::BoolOp { .. } => NodeKind::BoolOp,
            Expr::Compare { .. } => NodeKind::Compare,
            Expr::IfExp { .. } => NodeKind::IfExp,
            Expr::Lambda { .. } => NodeKind::Lambda,
            Expr::Call { .. } => NodeKind::Call,
            Expr::Attribute { .. } => NodeKind::Attribute,
            Expr::Subscript { .. } => NodeKind::Subscript,
            Expr::Slice { .. } => NodeKind::Slice,
            Expr::List(_) => NodeKind::List,
            Expr::Tuple(_) => NodeKind::Tuple,
            Expr::Dict(_) => NodeKind::Dict,
            Expr::Set(_) => NodeKind::Set,
            Expr::ListComp { .. } => NodeKind::ListComp,
            Expr::Assign { .. } => NodeKind::Assign,
        }
    }

    pub(crate) fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub(crate) fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub(crate) fn boolean(op: BoolOp, left: Expr, right: Expr) -> Expr {
        Expr::BoolOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl NodeKind {
    /// Phrase used in rejection messages
    pub fn describe(self) -> &'static str {
        match self {
            NodeKind::Number => "numeric literal",
            NodeKind::String => "string literal",
            NodeKind::Boolean => "boolean literal",
            NodeKind::NoneLiteral => "None literal",
            NodeKind::Name => "name",
            NodeKind::BinOp => "binary operation",
            NodeKind::UnaryOp => "unary operation",
            NodeKind::BoolOp => "boolean operation",
            NodeKind::Compare => "comparison",
            NodeKind::IfExp => "conditional expression",
            NodeKind::Lambda => "lambda",
            NodeKind::Call => "call",
            NodeKind::Attribute => "attribute access",
            NodeKind::Subscript => "subscript",
            NodeKind::Slice => "slice",
            NodeKind::List => "list display",
            NodeKind::Tuple => "tuple display",
            NodeKind::Dict => "dict display",
            NodeKind::Set => "set display",
            NodeKind::ListComp => "list comprehension",
            NodeKind::Assign => "assignment",
        }
    }
}

impl Arg {
    pub fn describe(&self) -> &'static str {
        match self {
            Arg::Positional(_) => "positional argument",
            Arg::Keyword(..) => "keyword argument",
            Arg::Starred(_) => "starred argument",
            Arg::DoubleStarred(_) => "double-starred argument",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::MatMul => "@",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        };
        write!(f, "{symbol}")
    }
}

use crate::range::IntWidth;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a basic block within its routine.
pub type BlockId = usize;

/// A routine as a control-flow graph of basic blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub blocks: Vec<BasicBlock>,
    #[serde(default)]
    pub entry: BlockId,
}

impl Routine {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: ValueType,
    /// Lower-bound annotation written on the parameter, if any.
    #[serde(default)]
    pub declared: Option<DeclaredBound>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            declared: None,
        }
    }

    pub fn declared(mut self, bound: DeclaredBound) -> Self {
        self.declared = Some(bound);
        self
    }
}

/// Static type of a value, as far as the analysis cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Integer(IntWidth),
    Sequence,
    Other,
}

/// A declared lower-bound annotation.
///
/// The index aliases describe how a value relates to a sequence; only the
/// lower bound they imply is used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclaredBound {
    Positive,
    NonNegative,
    GteNegativeOne,
    /// A valid index: `0 <= i < length`.
    IndexFor,
    /// A valid index or the length: `0 <= i <= length`.
    IndexOrHigh,
    /// The length of a sequence.
    LengthOf,
    /// A valid index or -1.
    IndexOrLow,
    /// Result of a substring search: an index or -1.
    SubstringIndexFor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
    pub terminator: Terminator,
}

impl BasicBlock {
    pub fn new(stmts: Vec<Stmt>, terminator: Terminator) -> Self {
        Self { stmts, terminator }
    }

    /// Every variable the block reads or writes, in source order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for stmt in &self.stmts {
            match stmt {
                Stmt::Assign { target, value, .. } => {
                    names.push(target.as_str());
                    value.collect_mentions(&mut names);
                }
                Stmt::Eval(expr) => expr.collect_mentions(&mut names),
                Stmt::DeclareSubrange {
                    name,
                    sequence,
                    from,
                    to,
                    ..
                } => {
                    names.push(name.as_str());
                    sequence.collect_mentions(&mut names);
                    from.collect_mentions(&mut names);
                    to.collect_mentions(&mut names);
                }
            }
        }
        match &self.terminator {
            Terminator::Branch { condition, .. } => condition.collect_mentions(&mut names),
            Terminator::Return(Some(value)) => value.collect_mentions(&mut names),
            Terminator::Goto(_) | Terminator::Return(None) => {}
        }
        names
    }
}

/// Whether `name` can name a variable: a letter, `_` or `$`, then letters,
/// digits, `_` or `$`.
///
/// Expression keys are canonical text, so a name like `a.length` would
/// collide with the length of `a`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        target: String,
        value: Expr,
        span: Span,
    },
    /// Expression evaluated for its effects.
    Eval(Expr),
    /// `name = sequence[from..to]`, a view of part of a sequence.
    DeclareSubrange {
        name: String,
        sequence: Expr,
        from: Expr,
        to: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Terminator {
    Goto(BlockId),
    Branch {
        condition: Expr,
        then_block: BlockId,
        else_block: BlockId,
    },
    Return(Option<Expr>),
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Goto(target) => vec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Return(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(i64, Span),
    Var(String, Span),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `sequence.length`
    Length {
        sequence: Box<Expr>,
        span: Span,
    },
    Call {
        target: CallTarget,
        args: Vec<Expr>,
        span: Span,
    },
    /// `sequence[index]`
    Index {
        sequence: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// Allocation of a (possibly multi-dimensional) sequence.
    NewSequence {
        dimensions: Vec<Expr>,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr, // >>> (logical shift right)
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    BitNot,
    Neg,
    Not,
}

impl UnaryOp {
    /// Whether the operator writes its operand.
    pub fn is_update(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallTarget {
    /// Binary maximum intrinsic.
    Max,
    /// Binary minimum intrinsic.
    Min,
    /// A random value in `[0, 1)`.
    RandomFraction,
    Other(String),
}

impl CallTarget {
    pub fn name(&self) -> &str {
        match self {
            CallTarget::Max => "max",
            CallTarget::Min => "min",
            CallTarget::RandomFraction => "random",
            CallTarget::Other(name) => name,
        }
    }
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) | Expr::Var(_, span) => *span,
            Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Length { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::NewSequence { span, .. } => *span,
        }
    }

    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Expr::Literal(value, _) => Some(*value),
            _ => None,
        }
    }

    /// Whether evaluating the expression may write a variable or call out.
    pub fn has_side_effects(&self) -> bool {
        match self {
            Expr::Literal(..) | Expr::Var(..) => false,
            Expr::Binary { left, right, .. } => left.has_side_effects() || right.has_side_effects(),
            Expr::Unary { op, operand, .. } => op.is_update() || operand.has_side_effects(),
            Expr::Length { sequence, .. } => sequence.has_side_effects(),
            Expr::Call { target, args, .. } => {
                matches!(target, CallTarget::Other(_) | CallTarget::RandomFraction)
                    || args.iter().any(Expr::has_side_effects)
            }
            Expr::Index {
                sequence, index, ..
            } => sequence.has_side_effects() || index.has_side_effects(),
            Expr::NewSequence { .. } => true,
        }
    }

    /// Names of variables the expression reads.
    pub fn mentions(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_mentions(&mut names);
        names
    }

    fn collect_mentions<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(..) => {}
            Expr::Var(name, _) => names.push(name),
            Expr::Binary { left, right, .. } => {
                left.collect_mentions(names);
                right.collect_mentions(names);
            }
            Expr::Unary { operand, .. } => operand.collect_mentions(names),
            Expr::Length { sequence, .. } => sequence.collect_mentions(names),
            Expr::Call { args, .. } => args.iter().for_each(|a| a.collect_mentions(names)),
            Expr::Index {
                sequence, index, ..
            } => {
                sequence.collect_mentions(names);
                index.collect_mentions(names);
            }
            Expr::NewSequence { dimensions, .. } => {
                dimensions.iter().for_each(|d| d.collect_mentions(names))
            }
        }
    }

    // Builders with synthetic spans, for hosts that construct IR directly.

    pub fn lit(value: i64) -> Expr {
        Expr::Literal(value, Span::synthetic())
    }

    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into(), Span::synthetic())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::synthetic(),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            span: Span::synthetic(),
        }
    }

    pub fn length(sequence: Expr) -> Expr {
        Expr::Length {
            sequence: Box::new(sequence),
            span: Span::synthetic(),
        }
    }

    pub fn call(target: CallTarget, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target,
            args,
            span: Span::synthetic(),
        }
    }

    pub fn index(sequence: Expr, index: Expr) -> Expr {
        Expr::Index {
            sequence: Box::new(sequence),
            index: Box::new(index),
            span: Span::synthetic(),
        }
    }

    pub fn new_sequence(dimensions: Vec<Expr>) -> Expr {
        Expr::NewSequence {
            dimensions,
            span: Span::synthetic(),
        }
    }

    /// Replaces the span of this node.
    pub fn at(mut self, at: Span) -> Expr {
        match &mut self {
            Expr::Literal(_, span) | Expr::Var(_, span) => *span = at,
            Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Length { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::NewSequence { span, .. } => *span = at,
        }
        self
    }
}

/// Canonical source-like rendering. Nested binary operands are parenthesized.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value, _) => write!(f, "{}", value),
            Expr::Var(name, _) => write!(f, "{}", name),
            Expr::Binary {
                op, left, right, ..
            } => {
                write_operand(f, left)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right)
            }
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::PreInc => write!(f, "++{}", operand),
                UnaryOp::PreDec => write!(f, "--{}", operand),
                UnaryOp::PostInc => write!(f, "{}++", operand),
                UnaryOp::PostDec => write!(f, "{}--", operand),
                UnaryOp::BitNot => {
                    write!(f, "~")?;
                    write_operand(f, operand)
                }
                UnaryOp::Neg => {
                    write!(f, "-")?;
                    write_operand(f, operand)
                }
                UnaryOp::Not => {
                    write!(f, "!")?;
                    write_operand(f, operand)
                }
            },
            Expr::Length { sequence, .. } => write!(f, "{}.length", sequence),
            Expr::Call { target, args, .. } => {
                write!(f, "{}(", target.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Index {
                sequence, index, ..
            } => write!(f, "{}[{}]", sequence, index),
            Expr::NewSequence { dimensions, .. } => {
                write!(f, "new")?;
                for dim in dimensions {
                    write!(f, "[{}]", dim)?;
                }
                Ok(())
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expr) -> fmt::Result {
    if matches!(operand, Expr::Binary { .. }) {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_canonical() {
        let e = Expr::binary(
            BinaryOp::Sub,
            Expr::length(Expr::var("a")),
            Expr::binary(BinaryOp::Add, Expr::var("i"), Expr::lit(1)),
        );
        assert_eq!(e.to_string(), "a.length - (i + 1)");
        assert_eq!(
            Expr::unary(UnaryOp::PostInc, Expr::var("i")).to_string(),
            "i++"
        );
        assert_eq!(
            Expr::call(CallTarget::Max, vec![Expr::var("a"), Expr::lit(0)]).to_string(),
            "max(a, 0)"
        );
        assert_eq!(
            Expr::new_sequence(vec![Expr::var("n"), Expr::lit(2)]).to_string(),
            "new[n][2]"
        );
    }

    #[test]
    fn test_side_effects() {
        assert!(!Expr::binary(BinaryOp::Add, Expr::var("i"), Expr::lit(1)).has_side_effects());
        assert!(Expr::unary(UnaryOp::PostDec, Expr::var("i")).has_side_effects());
        assert!(!Expr::unary(UnaryOp::Neg, Expr::var("i")).has_side_effects());
        assert!(Expr::call(CallTarget::Other("f".into()), vec![]).has_side_effects());
        assert!(!Expr::call(CallTarget::Min, vec![Expr::var("a"), Expr::var("b")]).has_side_effects());
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("i"));
        assert!(is_identifier("_tmp$1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1i"));
        assert!(!is_identifier("a.length"));
        assert!(!is_identifier("a[i]"));
    }

    #[test]
    fn test_block_names() {
        let block = BasicBlock::new(
            vec![Stmt::Assign {
                target: "i".to_string(),
                value: Expr::var("j"),
                span: Span::synthetic(),
            }],
            Terminator::Return(Some(Expr::length(Expr::var("a")))),
        );
        assert_eq!(block.names(), vec!["i", "j", "a"]);
    }

    #[test]
    fn test_mentions() {
        let e = Expr::index(
            Expr::var("a"),
            Expr::binary(BinaryOp::Sub, Expr::var("i"), Expr::length(Expr::var("b"))),
        );
        assert_eq!(e.mentions(), vec!["a", "i", "b"]);
    }

    #[test]
    fn test_successors() {
        let t = Terminator::Branch {
            condition: Expr::var("c"),
            then_block: 1,
            else_block: 2,
        };
        assert_eq!(t.successors(), vec![1, 2]);
        assert!(Terminator::Return(None).successors().is_empty());
    }

    #[test]
    fn test_routine_json_round_trip() {
        let routine = Routine {
            name: "get".to_string(),
            params: vec![Param::new("i", ValueType::Integer(IntWidth::Int))
                .declared(DeclaredBound::IndexFor)],
            blocks: vec![BasicBlock::new(
                vec![Stmt::Eval(Expr::index(Expr::var("a"), Expr::var("i")))],
                Terminator::Return(None),
            )],
            entry: 0,
        };
        let json = serde_json::to_string(&routine).unwrap();
        let back: Routine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, routine);
    }
}

//! Host intermediate representation walked by the analysis.

pub mod core;
pub mod key;

pub use self::core::{
    is_identifier, BasicBlock, BinaryOp, BlockId, CallTarget, DeclaredBound, Expr, Param,
    Routine, Stmt, Terminator, UnaryOp, ValueType,
};
pub use key::ExprKey;

//! Transfer functions for the lower-bound analysis.
//!
//! - `registry`: maps binary operators to transfer functions
//! - `arithmetic`: rules for `+ - * / % >> >>> &`
//!
//! Operators without a rule (`<<`, `|`, `^`, comparisons) are `Unknown`.

pub mod arithmetic;
pub mod registry;

pub use registry::{Operand, TFuncContext, TransferFn, TransferFunctions};

use crate::ir::BinaryOp;

/// Registers the transfer function of every supported operator.
pub fn register_all(registry: &mut TransferFunctions) {
    registry.register(BinaryOp::Add, arithmetic::tfunc_add);
    registry.register(BinaryOp::Sub, arithmetic::tfunc_sub);
    registry.register(BinaryOp::Mul, arithmetic::tfunc_mul);
    registry.register(BinaryOp::Div, arithmetic::tfunc_div);
    registry.register(BinaryOp::Rem, arithmetic::tfunc_rem);
    registry.register(BinaryOp::Shr, arithmetic::tfunc_shift_right);
    registry.register(BinaryOp::UShr, arithmetic::tfunc_shift_right);
    registry.register(BinaryOp::BitAnd, arithmetic::tfunc_bit_and);
}

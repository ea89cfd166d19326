//! Shared helpers for integration tests
// Each test target uses a different subset of these builders.
#![allow(dead_code)]

use index_lowerbound::config::AnalysisConfig;
use index_lowerbound::facts::FactProviders;
use index_lowerbound::ir::{
    BasicBlock, BinaryOp, BlockId, Expr, Param, Routine, Stmt, Terminator,
};
use index_lowerbound::span::Span;
use index_lowerbound::{analyze_routine, AnalysisReport};

pub fn var(name: &str) -> Expr {
    Expr::var(name)
}

pub fn lit(value: i64) -> Expr {
    Expr::lit(value)
}

pub fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}

/// `sequence[index]` with the index placed at `line:column`.
pub fn index_at(sequence: &str, index: Expr, line: usize, column: usize) -> Expr {
    Expr::index(var(sequence), index.at(Span::new(0, 0, line, column)))
}

pub fn assign(target: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: target.to_string(),
        value,
        span: Span::synthetic(),
    }
}

pub fn eval(expr: Expr) -> Stmt {
    Stmt::Eval(expr)
}

pub fn block(stmts: Vec<Stmt>, terminator: Terminator) -> BasicBlock {
    BasicBlock::new(stmts, terminator)
}

pub fn goto(target: BlockId) -> Terminator {
    Terminator::Goto(target)
}

pub fn ret(stmts: Vec<Stmt>) -> BasicBlock {
    BasicBlock::new(stmts, Terminator::Return(None))
}

pub fn branch(condition: Expr, then_block: BlockId, else_block: BlockId) -> Terminator {
    Terminator::Branch {
        condition,
        then_block,
        else_block,
    }
}

pub fn routine(name: &str, params: Vec<Param>, blocks: Vec<BasicBlock>) -> Routine {
    Routine {
        name: name.to_string(),
        params,
        blocks,
        entry: 0,
    }
}

/// Analyzes with the default configuration.
pub fn analyze(routine: &Routine, facts: FactProviders<'_>) -> AnalysisReport {
    analyze_routine(routine, facts, &AnalysisConfig::default())
        .unwrap_or_else(|e| panic!("analysis failed: {}", e))
}

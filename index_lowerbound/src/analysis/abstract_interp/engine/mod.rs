//! Abstract interpretation engine for lower bounds.
//!
//! This module implements the worklist fixed point over a routine's
//! control-flow graph. Each block has an in-store; a block's out-store flows
//! into its successors, refined by the branch condition where there is one,
//! and stores meeting at a block are joined with `lub`.

use super::conditional::split_store_by_condition;
use super::store::FlowStore;
use crate::analysis::classify::ExpressionClassifier;
use crate::analysis::lattice::Qualifier;
use crate::analysis::tfuncs::{register_all, Operand, TFuncContext, TransferFunctions};
use crate::config::AnalysisConfig;
use crate::diagnostics::emit_fixed_point_divergence;
use crate::error::AnalysisError;
use crate::facts::{ConstantFolder, FactProviders};
use crate::ir::{
    is_identifier, BasicBlock, BinaryOp, BlockId, Expr, ExprKey, Routine, Stmt, Terminator,
    UnaryOp, ValueType,
};
use crate::range::IntWidth;
use crate::span::Span;
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet, VecDeque};

/// A place where a non-negative value is required.
#[derive(Debug, Clone, Copy)]
pub enum CheckedSite<'e> {
    /// `sequence[index]`
    Index { access: &'e Expr, index: &'e Expr },
    /// One dimension of `new[d0][d1]...`
    Dimension {
        creation: &'e Expr,
        dimension: &'e Expr,
    },
    /// The start of `name = sequence[from..to]`
    SubrangeFrom {
        name: &'e str,
        from: &'e Expr,
        span: Span,
    },
}

/// Receives each checked site with the qualifier it has when evaluated.
pub type SiteSink<'s> = dyn FnMut(CheckedSite<'_>, Qualifier) + 's;

/// Final in-stores of a routine.
#[derive(Debug, Clone, Default)]
pub struct BlockStates {
    in_stores: HashMap<BlockId, FlowStore>,
    visits: usize,
}

impl BlockStates {
    /// In-store of `block`, or `None` if the block is unreachable.
    pub fn in_store(&self, block: BlockId) -> Option<&FlowStore> {
        self.in_stores.get(&block)
    }

    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.in_stores.contains_key(&block)
    }

    /// Reachable blocks in ascending order.
    pub fn reachable_blocks(&self) -> Vec<BlockId> {
        let mut blocks: Vec<_> = self.in_stores.keys().copied().collect();
        blocks.sort_unstable();
        blocks
    }

    /// Number of block visits the fixed point took.
    pub fn visits(&self) -> usize {
        self.visits
    }
}

/// Lower-bound inference engine.
///
/// The engine owns the transfer function registry and borrows the fact
/// providers for one or more runs. Constant questions go through a
/// [`ConstantFolder`] built from the configuration, so the overflow policy
/// and value width of `config` govern every folded range.
#[derive(Debug)]
pub struct LowerBoundEngine<'a> {
    tfuncs: TransferFunctions,
    facts: FactProviders<'a>,
    folder: ConstantFolder<'a>,
    config: AnalysisConfig,
}

impl<'a> LowerBoundEngine<'a> {
    /// Creates an engine with every transfer function registered.
    pub fn new(facts: FactProviders<'a>, config: AnalysisConfig) -> Self {
        let mut tfuncs = TransferFunctions::new();
        register_all(&mut tfuncs);

        Self {
            tfuncs,
            facts,
            folder: ConstantFolder::new(facts.constants, &config),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The host providers, with constants folded under this configuration.
    pub fn providers(&self) -> FactProviders<'_> {
        self.facts.with_constants(&self.folder)
    }

    fn classifier(&self) -> ExpressionClassifier<'_> {
        ExpressionClassifier::new(self.providers())
    }

    /// Runs the worklist to a fixed point and returns each block's in-store.
    pub fn analyze(&self, routine: &Routine) -> Result<BlockStates, AnalysisError> {
        validate(routine)?;

        let mut states = BlockStates::default();
        states
            .in_stores
            .insert(routine.entry, self.entry_store(routine));
        let mut worklist = VecDeque::from([routine.entry]);
        let mut queued = HashSet::from([routine.entry]);

        while let Some(block_id) = worklist.pop_front() {
            queued.remove(&block_id);
            if states.visits == self.config.max_block_visits {
                warn!(
                    "routine {} hit the visit bound of {} blocks",
                    routine.name, states.visits
                );
                emit_fixed_point_divergence(states.visits, &routine.name);
                return Err(AnalysisError::FixedPointDivergence {
                    routine: routine.name.clone(),
                    visits: states.visits,
                });
            }
            states.visits += 1;

            let (Some(block), Some(in_store)) =
                (routine.block(block_id), states.in_stores.get(&block_id))
            else {
                continue;
            };
            debug!("visit block {} of {}", block_id, routine.name);

            let outflow = self.transfer_block(block, in_store.clone(), &mut |_, _| {});
            for (target, store) in outflow {
                let changed = match states.in_stores.get_mut(&target) {
                    Some(existing) => existing.merge_changed(&store),
                    None => {
                        states.in_stores.insert(target, store);
                        true
                    }
                };
                debug!("merge into block {}: changed={}", target, changed);
                if changed && queued.insert(target) {
                    worklist.push_back(target);
                }
            }
        }

        debug!(
            "routine {} reached a fixed point after {} visits",
            routine.name, states.visits
        );
        Ok(states)
    }

    /// Store at routine entry: character parameters are non-negative, and
    /// declared bounds hold.
    pub fn entry_store(&self, routine: &Routine) -> FlowStore {
        let mut store = FlowStore::new();
        for param in &routine.params {
            let mut q = Qualifier::Unknown;
            if param.ty == ValueType::Integer(IntWidth::Char) {
                q = q.glb(Qualifier::NonNegative);
            }
            if let Some(bound) = param.declared {
                q = q.glb(Qualifier::from_declared(bound));
            }
            store.set(ExprKey::variable(&param.name), q);
        }
        store
    }

    /// Applies a block's statements and terminator to `store`.
    ///
    /// Returns the store flowing to each successor.
    pub fn transfer_block(
        &self,
        block: &BasicBlock,
        mut store: FlowStore,
        sink: &mut SiteSink<'_>,
    ) -> Vec<(BlockId, FlowStore)> {
        for stmt in &block.stmts {
            self.transfer_stmt(stmt, &mut store, sink);
        }
        match &block.terminator {
            Terminator::Goto(target) => vec![(*target, store)],
            Terminator::Branch {
                condition,
                then_block,
                else_block,
            } => {
                let split = split_store_by_condition(
                    &store,
                    condition,
                    &self.providers(),
                    &mut |expr: &Expr, s: &mut FlowStore| self.eval_with(expr, s, sink),
                );
                vec![
                    (*then_block, split.then_store),
                    (*else_block, split.else_store),
                ]
            }
            Terminator::Return(value) => {
                if let Some(value) = value {
                    self.eval_with(value, &mut store, sink);
                }
                Vec::new()
            }
        }
    }

    fn transfer_stmt(&self, stmt: &Stmt, store: &mut FlowStore, sink: &mut SiteSink<'_>) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let q = self.eval_with(value, store, sink);
                assign(target, q, store);
            }
            Stmt::Eval(expr) => {
                self.eval_with(expr, store, sink);
            }
            Stmt::DeclareSubrange {
                name,
                sequence,
                from,
                to,
                span,
            } => {
                self.eval_with(sequence, store, sink);
                let q = self.eval_with(from, store, sink);
                sink(
                    CheckedSite::SubrangeFrom {
                        name,
                        from,
                        span: *span,
                    },
                    q,
                );
                self.eval_with(to, store, sink);
                store.invalidate(name);
            }
        }
    }

    /// Qualifier of `expr` in `store`, applying the expression's effects.
    pub fn eval(&self, expr: &Expr, store: &mut FlowStore) -> Qualifier {
        self.eval_with(expr, store, &mut |_, _| {})
    }

    fn eval_with(&self, expr: &Expr, store: &mut FlowStore, sink: &mut SiteSink<'_>) -> Qualifier {
        let q = match expr {
            Expr::Literal(..) | Expr::Var(..) => self.classifier().classify(expr, &[]),
            Expr::Binary {
                op: BinaryOp::And | BinaryOp::Or,
                left,
                right,
                ..
            } => {
                self.eval_with(left, store, sink);
                // The right side may not run.
                let mut rhs_store = store.clone();
                self.eval_with(right, &mut rhs_store, sink);
                store.merge(&rhs_store);
                self.classifier().classify(expr, &[])
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let ql = self.eval_with(left, store, sink);
                let qr = self.eval_with(right, store, sink);
                let operands = [Operand::new(left, ql), Operand::new(right, qr)];
                let ctx = TFuncContext::new(self.providers());
                self.tfuncs
                    .infer(*op, &operands, &ctx)
                    .glb(self.classifier().classify(expr, &[]))
            }
            Expr::Unary { op, operand, .. } => {
                let q = self.eval_with(operand, store, sink);
                let result = self.classifier().classify(expr, &[q]);
                if let Expr::Var(name, _) = &**operand {
                    match op {
                        UnaryOp::PreInc | UnaryOp::PreDec => assign(name, result, store),
                        UnaryOp::PostInc => assign(name, q.promote(), store),
                        UnaryOp::PostDec => assign(name, q.demote(), store),
                        UnaryOp::BitNot | UnaryOp::Neg | UnaryOp::Not => {}
                    }
                }
                match op {
                    // The value of `i++` is the old value.
                    UnaryOp::PostInc | UnaryOp::PostDec => q.glb(result),
                    _ => result,
                }
            }
            Expr::Length { sequence, .. } => {
                self.eval_with(sequence, store, sink);
                self.classifier().classify(expr, &[])
            }
            Expr::Call { args, .. } => {
                let quals: Vec<_> = args
                    .iter()
                    .map(|arg| self.eval_with(arg, store, sink))
                    .collect();
                self.classifier().classify(expr, &quals)
            }
            Expr::Index {
                sequence, index, ..
            } => {
                self.eval_with(sequence, store, sink);
                let qi = self.eval_with(index, store, sink);
                sink(CheckedSite::Index { access: expr, index }, qi);
                self.classifier().classify(expr, &[])
            }
            Expr::NewSequence { dimensions, .. } => {
                for dimension in dimensions {
                    let qd = self.eval_with(dimension, store, sink);
                    sink(
                        CheckedSite::Dimension {
                            creation: expr,
                            dimension,
                        },
                        qd,
                    );
                }
                self.classifier().classify(expr, &[])
            }
        };

        let q = if expr.has_side_effects() {
            q
        } else {
            q.glb(store.lookup(expr))
        };
        trace!("{} : {}", expr, q);
        q
    }
}

/// `name = <value with qualifier q>`
fn assign(name: &str, q: Qualifier, store: &mut FlowStore) {
    store.invalidate(name);
    store.set(ExprKey::variable(name), q);
}

fn validate(routine: &Routine) -> Result<(), AnalysisError> {
    if routine.blocks.is_empty() {
        return Err(AnalysisError::EmptyRoutine {
            routine: routine.name.clone(),
        });
    }
    let unknown = |block: BlockId| AnalysisError::UnknownBlock {
        routine: routine.name.clone(),
        block,
    };
    if routine.block(routine.entry).is_none() {
        return Err(unknown(routine.entry));
    }
    for block in &routine.blocks {
        if let Some(target) = block
            .terminator
            .successors()
            .into_iter()
            .find(|target| routine.block(*target).is_none())
        {
            return Err(unknown(target));
        }
    }
    let invalid = routine
        .params
        .iter()
        .map(|param| param.name.as_str())
        .chain(routine.blocks.iter().flat_map(BasicBlock::names))
        .find(|name| !is_identifier(name));
    if let Some(name) = invalid {
        return Err(AnalysisError::InvalidName {
            routine: routine.name.clone(),
            name: name.to_string(),
        });
    }
    Ok(())
}

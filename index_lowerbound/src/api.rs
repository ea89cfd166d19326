//! Rust API for analyzing routines.
//!
//! This module provides the entry points hosts call: one routine in, one
//! report out.

use crate::analysis::{LowerBoundEngine, VerificationPass};
use crate::config::AnalysisConfig;
use crate::diagnostics::{AnalysisDiagnostic, CollectionGuard, DiagnosticsCollector};
use crate::error::{AnalysisError, ApiError};
use crate::facts::FactProviders;
use crate::ir::Routine;
use crate::report::AnalysisReport;
use log::info;
use std::collections::HashSet;

/// Analyzes `routine` and reports every site whose lower bound is not proven.
///
/// # Example
/// ```
/// use index_lowerbound::config::AnalysisConfig;
/// use index_lowerbound::facts::FactProviders;
/// use index_lowerbound::ir::{BasicBlock, Expr, Routine, Stmt, Terminator};
/// use index_lowerbound::analyze_routine;
///
/// let routine = Routine {
///     name: "first".to_string(),
///     params: vec![],
///     blocks: vec![BasicBlock::new(
///         vec![Stmt::Eval(Expr::index(Expr::var("a"), Expr::lit(0)))],
///         Terminator::Return(None),
///     )],
///     entry: 0,
/// };
/// let report = analyze_routine(&routine, FactProviders::none(), &AnalysisConfig::default()).unwrap();
/// assert!(report.is_safe());
/// ```
pub fn analyze_routine(
    routine: &Routine,
    facts: FactProviders<'_>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let _guard = CollectionGuard::new(config.collect_diagnostics);

    let engine = LowerBoundEngine::new(facts, config.clone());
    let states = engine.analyze(routine)?;
    let violations = VerificationPass::new(&engine).run(routine, &states);
    info!(
        "{}: {} violation(s) after {} block visits",
        routine.name,
        violations.len(),
        states.visits()
    );

    let mut report = AnalysisReport::new(&routine.name);
    report.violations = violations;
    if config.collect_diagnostics {
        report.diagnostics = unique(DiagnosticsCollector::take());
    }
    Ok(report)
}

/// Analyzes a routine given as JSON and returns the report as JSON.
pub fn analyze_routine_json(
    routine_json: &str,
    facts: FactProviders<'_>,
    config: &AnalysisConfig,
) -> Result<String, ApiError> {
    let routine: Routine = serde_json::from_str(routine_json)?;
    let report = analyze_routine(&routine, facts, config)?;
    Ok(report.to_json()?)
}

/// Drops repeats, keeping first occurrences; the fixed point revisits the
/// same expressions.
fn unique(diagnostics: Vec<AnalysisDiagnostic>) -> Vec<AnalysisDiagnostic> {
    let mut seen = HashSet::with_capacity(diagnostics.len());
    diagnostics
        .into_iter()
        .filter(|diagnostic| seen.insert(diagnostic.clone()))
        .collect()
}

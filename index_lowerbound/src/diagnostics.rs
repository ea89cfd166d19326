//! Analysis-time diagnostics for precision loss.
//!
//! The analysis sometimes knows less than a reader might expect: range
//! arithmetic gives up to everything, a literal zero divisor turns a quotient
//! into Bottom, or a call has no introduction rule. These events are not
//! errors, but hosts that want to explain a report can collect them.
//!
//! # Usage
//!
//! Collection is disabled by default. The engine enables it for the duration
//! of a run when `AnalysisConfig::collect_diagnostics` is set, and stores the
//! collected entries in the report. Direct callers can use:
//! - `DiagnosticsCollector::enable()` / `disable()`
//! - `DiagnosticsCollector::take()` to retrieve and clear collected entries

use crate::span::Span;
use serde::Serialize;
use std::cell::RefCell;

/// Reason the analysis lost precision.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticReason {
    /// Range arithmetic for the operator could not be computed precisely.
    RangeGaveUp(String),

    /// A literal zero divisor makes the quotient unreachable.
    ZeroDivisor,

    /// A call without an introduction rule.
    /// Contains the callee name.
    UnknownCall(String),

    /// The worklist did not stabilize within the visit bound.
    /// Contains the number of block visits performed.
    FixedPointDivergence(usize),
}

impl std::fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticReason::RangeGaveUp(op) => {
                write!(f, "range arithmetic for '{}' gave up", op)
            }
            DiagnosticReason::ZeroDivisor => write!(f, "division by literal zero"),
            DiagnosticReason::UnknownCall(name) => write!(f, "no rule for call to '{}'", name),
            DiagnosticReason::FixedPointDivergence(visits) => {
                write!(
                    f,
                    "fixed-point analysis didn't converge after {} block visits",
                    visits
                )
            }
        }
    }
}

/// A single precision-loss diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AnalysisDiagnostic {
    pub reason: DiagnosticReason,
    /// Source location (line, column) if known.
    pub location: Option<(usize, usize)>,
    /// Expression text associated with the diagnostic.
    pub context: Option<String>,
    /// What the value was widened or narrowed to, e.g. "everything" or "Bottom".
    pub widened_to: String,
}

impl AnalysisDiagnostic {
    pub fn new(reason: DiagnosticReason) -> Self {
        Self {
            reason,
            location: None,
            context: None,
            widened_to: "everything".to_string(),
        }
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.location = Some((line, column));
        self
    }

    /// Attaches `span`'s position unless the expression was synthesized.
    pub fn at(self, span: Span) -> Self {
        if span == Span::synthetic() {
            self
        } else {
            self.with_location(span.line, span.column)
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_widened_to(mut self, to: impl Into<String>) -> Self {
        self.widened_to = to.into();
        self
    }
}

impl std::fmt::Display for AnalysisDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lower bound note: {}", self.reason)?;
        if let Some((line, col)) = self.location {
            write!(f, " at line {}, column {}", line, col)?;
        }
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        write!(f, " -> {}", self.widened_to)
    }
}

thread_local! {
    static DIAGNOSTICS_ENABLED: RefCell<bool> = const { RefCell::new(false) };
    static DIAGNOSTICS: RefCell<Vec<AnalysisDiagnostic>> = const { RefCell::new(Vec::new()) };
}

/// Thread-local collector for analysis diagnostics.
#[derive(Debug)]
pub struct DiagnosticsCollector;

impl DiagnosticsCollector {
    pub fn enable() {
        DIAGNOSTICS_ENABLED.with(|enabled| {
            *enabled.borrow_mut() = true;
        });
    }

    pub fn disable() {
        DIAGNOSTICS_ENABLED.with(|enabled| {
            *enabled.borrow_mut() = false;
        });
    }

    pub fn is_enabled() -> bool {
        DIAGNOSTICS_ENABLED.with(|enabled| *enabled.borrow())
    }

    /// Records a diagnostic if collection is enabled.
    pub fn emit(diagnostic: AnalysisDiagnostic) {
        if Self::is_enabled() {
            DIAGNOSTICS.with(|diags| {
                diags.borrow_mut().push(diagnostic);
            });
        }
    }

    /// Takes all collected diagnostics, clearing the collection.
    pub fn take() -> Vec<AnalysisDiagnostic> {
        DIAGNOSTICS.with(|diags| std::mem::take(&mut *diags.borrow_mut()))
    }

    pub fn clear() {
        DIAGNOSTICS.with(|diags| {
            diags.borrow_mut().clear();
        });
    }

    pub fn count() -> usize {
        DIAGNOSTICS.with(|diags| diags.borrow().len())
    }
}

/// Scoped enablement: collection is on while the guard lives, and the
/// previous state is restored on drop. A guard that turns collection on owns
/// the buffer for its lifetime and leaves it empty on both ends, so an early
/// return cannot hand its entries to the next run.
#[derive(Debug)]
pub(crate) struct CollectionGuard {
    was_enabled: bool,
    owns_buffer: bool,
}

impl CollectionGuard {
    pub(crate) fn new(enable: bool) -> Self {
        let was_enabled = DiagnosticsCollector::is_enabled();
        if enable {
            DiagnosticsCollector::clear();
            DiagnosticsCollector::enable();
        }
        Self {
            was_enabled,
            owns_buffer: enable,
        }
    }
}

impl Drop for CollectionGuard {
    fn drop(&mut self) {
        if self.owns_buffer {
            DiagnosticsCollector::clear();
        }
        if !self.was_enabled {
            DiagnosticsCollector::disable();
        }
    }
}

pub fn emit_range_gave_up(operation: &str) {
    DiagnosticsCollector::emit(AnalysisDiagnostic::new(DiagnosticReason::RangeGaveUp(
        operation.to_string(),
    )));
}

pub fn emit_zero_divisor(context: &str, divisor: Span) {
    DiagnosticsCollector::emit(
        AnalysisDiagnostic::new(DiagnosticReason::ZeroDivisor)
            .at(divisor)
            .with_context(context)
            .with_widened_to("Bottom"),
    );
}

pub fn emit_unknown_call(name: &str, call: Span) {
    DiagnosticsCollector::emit(
        AnalysisDiagnostic::new(DiagnosticReason::UnknownCall(name.to_string()))
            .at(call)
            .with_context(format!("call to {}", name))
            .with_widened_to("Unknown"),
    );
}

pub fn emit_fixed_point_divergence(visits: usize, routine: &str) {
    DiagnosticsCollector::emit(
        AnalysisDiagnostic::new(DiagnosticReason::FixedPointDivergence(visits))
            .with_context(format!("routine {}", routine)),
    );
}

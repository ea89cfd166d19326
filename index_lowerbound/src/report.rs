//! Violations and per-routine reports.

use crate::analysis::lattice::Qualifier;
use crate::diagnostics::AnalysisDiagnostic;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of lower bound could not be proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A sequence index might be negative.
    UnsafeLowIndex,
    /// A dimension of a new sequence might be negative.
    NegativeSequenceLength,
    /// The start of a subrange might be negative.
    SubrangeFromNotProven,
}

impl ViolationKind {
    /// Stable message key, for hosts that localize messages.
    pub fn message_key(self) -> &'static str {
        match self {
            ViolationKind::UnsafeLowIndex => "array.access.unsafe.low",
            ViolationKind::NegativeSequenceLength => "array.length.negative",
            ViolationKind::SubrangeFromNotProven => "from.not.nonnegative",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_key())
    }
}

/// A site whose value is not proven non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Location of the offending expression.
    pub site: Span,
    pub kind: ViolationKind,
    /// Qualifier inferred for the expression.
    pub qualifier: Qualifier,
    /// Source-like rendering of the enclosing access, creation or subrange.
    pub context: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} ({})",
            self.site, self.kind, self.context, self.qualifier
        )
    }
}

/// Result of analyzing one routine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub routine: String,
    pub violations: Vec<Violation>,
    /// Precision-loss notes, when collection was enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<AnalysisDiagnostic>,
}

impl AnalysisReport {
    pub fn new(routine: impl Into<String>) -> Self {
        Self {
            routine: routine.into(),
            ..Self::default()
        }
    }

    /// Whether every checked site was proven safe.
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_safe() {
            return writeln!(f, "{}: no violations", self.routine);
        }
        writeln!(f, "{}: {} violation(s)", self.routine, self.violations.len())?;
        for violation in &self.violations {
            writeln!(f, "  {}", violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(kind: ViolationKind) -> Violation {
        Violation {
            site: Span::new(10, 15, 3, 9),
            kind,
            qualifier: Qualifier::AtLeastNegOne,
            context: "a[i - 1]".to_string(),
        }
    }

    #[test]
    fn test_violation_display() {
        let v = violation(ViolationKind::UnsafeLowIndex);
        assert_eq!(v.to_string(), "3:9: array.access.unsafe.low: a[i - 1] (GTENegativeOne)");
    }

    #[test]
    fn test_report_display() {
        let mut report = AnalysisReport::new("scan");
        assert!(report.is_safe());
        assert_eq!(report.to_string(), "scan: no violations\n");

        report.violations.push(violation(ViolationKind::UnsafeLowIndex));
        report
            .violations
            .push(violation(ViolationKind::NegativeSequenceLength));
        assert_eq!(report.violations_of(ViolationKind::UnsafeLowIndex).count(), 1);
        assert_eq!(
            report.to_string(),
            "scan: 2 violation(s)\n  3:9: array.access.unsafe.low: a[i - 1] (GTENegativeOne)\n  3:9: array.length.negative: a[i - 1] (GTENegativeOne)\n"
        );
    }

    #[test]
    fn test_report_json() {
        let mut report = AnalysisReport::new("scan");
        report.violations.push(violation(ViolationKind::SubrangeFromNotProven));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["routine"], "scan");
        assert_eq!(json["violations"][0]["kind"], "SubrangeFromNotProven");
        assert_eq!(json["violations"][0]["qualifier"], "AtLeastNegOne");
        assert_eq!(json["violations"][0]["site"]["line"], 3);
        assert!(json.get("diagnostics").is_none());
    }
}

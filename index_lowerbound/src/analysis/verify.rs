//! Reporting of unproven lower bounds.
//!
//! After the fixed point, every reachable block is walked once more from its
//! final in-store. Each index, creation dimension and subrange start whose
//! qualifier is weaker than `NonNegative` becomes a [`Violation`]. Bottom
//! sites are unreachable and never reported.

use super::abstract_interp::{BlockStates, CheckedSite, LowerBoundEngine};
use super::lattice::Qualifier;
use crate::ir::Routine;
use crate::report::{Violation, ViolationKind};
use log::debug;

#[derive(Debug)]
pub struct VerificationPass<'e, 'a> {
    engine: &'e LowerBoundEngine<'a>,
}

impl<'e, 'a> VerificationPass<'e, 'a> {
    pub fn new(engine: &'e LowerBoundEngine<'a>) -> Self {
        Self { engine }
    }

    /// Violations of `routine` in block order, then evaluation order.
    pub fn run(&self, routine: &Routine, states: &BlockStates) -> Vec<Violation> {
        let mut violations = Vec::new();
        for block_id in states.reachable_blocks() {
            let (Some(block), Some(store)) = (routine.block(block_id), states.in_store(block_id))
            else {
                continue;
            };
            self.engine
                .transfer_block(block, store.clone(), &mut |site, q| {
                    if let Some(violation) = check_site(site, q) {
                        debug!("block {}: {}", block_id, violation);
                        violations.push(violation);
                    }
                });
        }
        violations
    }
}

fn check_site(site: CheckedSite<'_>, q: Qualifier) -> Option<Violation> {
    if q.is_non_negative() {
        return None;
    }
    let (site, kind, context) = match site {
        CheckedSite::Index { access, index } => {
            (index.span(), ViolationKind::UnsafeLowIndex, access.to_string())
        }
        CheckedSite::Dimension {
            creation,
            dimension,
        } => (
            dimension.span(),
            ViolationKind::NegativeSequenceLength,
            creation.to_string(),
        ),
        CheckedSite::SubrangeFrom { name, from, span } => (
            span,
            ViolationKind::SubrangeFromNotProven,
            format!("{} from {}", name, from),
        ),
    };
    Some(Violation {
        site,
        kind,
        qualifier: q,
        context,
    })
}

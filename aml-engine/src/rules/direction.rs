//! Shared in/out classification used by RapidMovement and FlowThrough.

use crate::types::Transaction;

/// Whether a transaction represents incoming or outgoing funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    In,
    Out,
}

const IN_TYPES: &[&str] = &["credit", "incoming", "deposit", "receive", "received"];
const OUT_TYPES: &[&str] = &[
    "debit",
    "outgoing",
    "withdrawal",
    "send",
    "sent",
    "transfer_out",
];

/// Classifies a transaction by its `transaction_type`, falling back to the
/// sign of `amount` when the type is unset or unrecognized.
pub(crate) fn classify(t: &Transaction) -> Direction {
    let ty = t.transaction_type.to_lowercase();
    let ty = ty.trim();
    if IN_TYPES.contains(&ty) {
        return Direction::In;
    }
    if OUT_TYPES.contains(&ty) {
        return Direction::Out;
    }
    if t.amount.is_sign_negative() {
        Direction::Out
    } else {
        Direction::In
    }
}

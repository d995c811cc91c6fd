//! Transaction type for the ledger
//!
//! A transaction is an immutable value recording a transfer between two
//! named parties. The core performs no identity or balance validation:
//! admission control belongs to the callers at the transport boundary.

use serde::{Deserialize, Serialize};

/// A single transfer recorded in the ledger.
///
/// Field order matters: it is the order the canonical block codec
/// serializes, so it must never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Originating party
    pub sender: String,
    /// Receiving party
    pub receiver: String,
    /// Transferred amount; any JSON number, never interpreted by the core
    pub amount: f64,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_order_is_fixed() {
        let tx = Transaction::new("A", "B", 10.0);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"sender":"A","receiver":"B","amount":10.0}"#);
    }

    #[test]
    fn test_round_trip() {
        let tx = Transaction::new("alice", "bob", 2.5);
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}

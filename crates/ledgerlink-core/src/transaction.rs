//! Transaction: the opaque payload unit carried inside a block.
//!
//! The ledger attaches no economic meaning to a transaction. It only needs
//! to be canonically encodable so that it can contribute to a block digest.

use serde::{Deserialize, Serialize};

/// A single transfer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Whether the amount can be canonically encoded.
    pub fn is_encodable(&self) -> bool {
        self.amount.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_json_shape() {
        let tx = Transaction::new("A", "B", 5.0);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json, serde_json::json!({"from": "A", "to": "B", "amount": 5.0}));
    }

    #[test]
    fn test_non_finite_amount_is_not_encodable() {
        assert!(Transaction::new("A", "B", 1.5).is_encodable());
        assert!(!Transaction::new("A", "B", f64::NAN).is_encodable());
        assert!(!Transaction::new("A", "B", f64::INFINITY).is_encodable());
    }
}

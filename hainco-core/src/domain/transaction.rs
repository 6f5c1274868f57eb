//! Transaction ledger domain model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::position::TransactionType;
use super::product::fits_money_column;

/// A ledger entry as written by the point-of-sale client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Username of the staff member or admin who recorded the entry
    pub transaction_agent: String,
    #[serde(default)]
    pub transaction_description: Option<String>,
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub transaction_amount: Decimal,
    pub transaction_date: NaiveDateTime,
}

/// A ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: i64,
    #[serde(flatten)]
    pub entry: NewTransaction,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.transaction_agent.trim().is_empty() {
            return Err("transaction agent cannot be empty");
        }
        if !fits_money_column(self.transaction_amount) {
            return Err("transaction amount is too large");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(amount: Decimal) -> NewTransaction {
        NewTransaction {
            transaction_agent: "msantos".to_string(),
            transaction_description: None,
            transaction_type: TransactionType::Buy,
            transaction_amount: amount,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_transaction_amount_must_fit_column() {
        assert!(entry(Decimal::new(-12050, 2)).validate().is_ok());
        assert_eq!(
            entry(Decimal::new(-10_000_000_000, 0)).validate(),
            Err("transaction amount is too large")
        );
    }

    #[test]
    fn test_transaction_serializes_flat() {
        let tx = Transaction {
            transaction_id: 9,
            entry: entry(Decimal::new(12050, 2)),
        };
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["transaction_id"], 9);
        assert_eq!(json["transaction_type"], 2);
        assert_eq!(json["transaction_amount"], 120.5);
        assert_eq!(json["transaction_date"], "2024-03-01T12:30:00");
    }
}

//! Exchange, ledger and credit package definitions
//!
//! Every session owns exactly one [`Exchange`]. Credit movements caused by
//! bookings are recorded as immutable [`Transaction`] entries under it.

use super::{BookingId, ExchangeId, PersonId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// How a session is paid for
    pub enum ExchangeType {
        /// Learners pay `credits_cost` credits
        Paid => "PAID",
        /// Skill swap, never costs credits
        Swap => "SWAP",
    }
}

/// Economic record pairing a session with its credit cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub id: ExchangeId,
    pub session_id: SessionId,
    pub exchange_type: ExchangeType,
    pub credits_cost: i64,
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    pub fn is_credit_bearing(&self) -> bool {
        self.exchange_type == ExchangeType::Paid && self.credits_cost > 0
    }
}

#[derive(Debug, Clone)]
pub struct NewExchange {
    pub session_id: SessionId,
    pub exchange_type: ExchangeType,
    pub credits_cost: i64,
}

string_enum! {
    /// Direction of a ledger entry, seen from the person's balance
    pub enum TransactionDirection {
        Debit => "DEBIT",
        Credit => "CREDIT",
    }
}

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub exchange_id: ExchangeId,
    pub person_id: PersonId,
    pub booking_id: Option<BookingId>,

    /// Always positive; the sign comes from `direction`
    pub amount: i64,

    pub direction: TransactionDirection,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Effect on the person's balance
    pub fn signed_amount(&self) -> i64 {
        match self.direction {
            TransactionDirection::Debit => -self.amount,
            TransactionDirection::Credit => self.amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub exchange_id: ExchangeId,
    pub person_id: PersonId,
    pub booking_id: Option<BookingId>,
    pub amount: i64,
    pub direction: TransactionDirection,
}

/// Credits debited for `booking_id` that have not been credited back yet
pub fn outstanding_debit(ledger: &[Transaction], booking_id: BookingId) -> i64 {
    let net: i64 = ledger
        .iter()
        .filter(|t| t.booking_id == Some(booking_id))
        .map(Transaction::signed_amount)
        .sum();
    (-net).max(0)
}

/// Purchasable credit bundle, admin-managed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: i64,
    pub name: String,
    pub credits: i64,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCreditPackage {
    pub name: String,
    pub credits: i64,
    pub price_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(booking_id: i64, amount: i64, direction: TransactionDirection) -> Transaction {
        Transaction {
            id: 0,
            exchange_id: 1,
            person_id: 1,
            booking_id: Some(booking_id),
            amount,
            direction,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_outstanding_debit_after_refund_is_zero() {
        let ledger = vec![
            entry(1, 5, TransactionDirection::Debit),
            entry(1, 5, TransactionDirection::Credit),
            entry(2, 3, TransactionDirection::Debit),
        ];
        assert_eq!(outstanding_debit(&ledger, 1), 0);
        assert_eq!(outstanding_debit(&ledger, 2), 3);
        assert_eq!(outstanding_debit(&ledger, 9), 0);
    }

    #[test]
    fn test_swap_never_credit_bearing() {
        let exchange = Exchange {
            id: 1,
            session_id: 1,
            exchange_type: ExchangeType::Swap,
            credits_cost: 10,
            created_at: Utc::now(),
        };
        assert!(!exchange.is_credit_bearing());
    }
}

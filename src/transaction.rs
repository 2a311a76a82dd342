//! Defines the type `Transaction`, the core type of the expense tracker,
//! and the lenient normalization applied to persisted records.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// The kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// Normalize a stored `type` field.
    ///
    /// Only the exact string `"expense"` maps to [TransactionKind::Expense];
    /// every other value, including a missing field, maps to
    /// [TransactionKind::Income]. This leniency exists so that corrupted
    /// persisted data never blocks a load. Fresh user input should go
    /// through [TransactionKind::from_str] instead, which rejects unknown
    /// values.
    fn from_stored(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("expense") => TransactionKind::Expense,
            _ => TransactionKind::Income,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!(
                "expected 'income' or 'expense', got '{other}'"
            )),
        }
    }
}

/// A single recorded money movement, either an income or an expense.
///
/// Transactions are immutable once created; the only way to change the
/// record of a money movement is to delete it and add a new one. Use
/// [Transaction::new] for fresh records and [Transaction::from_stored]
/// when reviving persisted ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: String,
    name: String,
    amount: Decimal,
    #[serde(rename = "type")]
    kind: TransactionKind,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction with a freshly generated id and the
    /// current time as its timestamp.
    ///
    /// `name` is trimmed. Degenerate inputs (an empty name, a zero or
    /// negative amount) are accepted as-is; rejecting them is the
    /// responsibility of whatever collects the input.
    pub fn new(name: &str, amount: Decimal, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_owned(),
            amount,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Revive a persisted record, normalizing each field independently.
    ///
    /// Malformed fields fall back rather than fail, so a partially
    /// corrupted blob still loads:
    /// - a missing or empty `id` is replaced with a freshly generated one,
    /// - a missing or non-string `name` becomes the empty string,
    /// - an unparsable `amount` becomes zero (numeric strings are
    ///   accepted),
    /// - a `type` other than exactly `"expense"` becomes income,
    /// - an unparsable `timestamp` becomes the current time.
    pub fn from_stored(record: &Value) -> Self {
        let id = match record.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => Uuid::new_v4().to_string(),
        };

        let name = record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let amount = match record.get("amount") {
            Some(Value::Number(number)) => parse_amount(&number.to_string()),
            Some(Value::String(text)) => parse_amount(text.trim()),
            _ => Decimal::ZERO,
        };

        let timestamp = record
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|text| OffsetDateTime::parse(text, &Rfc3339).ok())
            .unwrap_or_else(OffsetDateTime::now_utc);

        Self {
            id,
            name,
            amount,
            kind: TransactionKind::from_stored(record.get("type")),
            timestamp,
        }
    }

    /// The unique id of the transaction, used to target deletions.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display label of the transaction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The amount of money moved. The direction is carried by
    /// [Transaction::kind], not by the sign.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Whether the transaction is an income or an expense.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// When the transaction was recorded.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }
}

/// Parse a decimal amount, also accepting scientific notation, which
/// JSON numbers may use.
fn parse_amount(text: &str) -> Decimal {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

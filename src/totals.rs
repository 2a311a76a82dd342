//! Derives income, expense, and balance totals from a transaction
//! sequence.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{Transaction, TransactionKind};

/// The derived totals over a transaction sequence, each rounded to two
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: Decimal,
    /// The sum of all expense amounts.
    pub expense: Decimal,
    /// `income - expense`.
    pub balance: Decimal,
}

/// Compute the totals over `transactions`.
///
/// Each sum is rounded to two decimal places once, after summing, with
/// halves rounded away from zero; the balance is rounded again after the
/// subtraction. The result depends on nothing but the input sequence.
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for transaction in transactions {
        match transaction.kind() {
            TransactionKind::Income => income += transaction.amount(),
            TransactionKind::Expense => expense += transaction.amount(),
        }
    }

    let income = round_to_cents(income);
    let expense = round_to_cents(expense);
    let balance = round_to_cents(income - expense);

    Totals {
        income,
        expense,
        balance,
    }
}

fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::invoice::{self, payment_status, Invoice};
use crate::store::{self, Store, TRANSACTIONS};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money going out (to a supplier).
    Payment,
    /// Money coming in (from a customer).
    Receipt,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Payment => write!(f, "payment"),
            TransactionKind::Receipt => write!(f, "receipt"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "payment" => Ok(TransactionKind::Payment),
            "receipt" => Ok(TransactionKind::Receipt),
            _ => Err(LedgerError::InvalidValue {
                what: "transaction kind",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    BankTransfer,
    Upi,
    Cheque,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Cash => write!(f, "cash"),
            PaymentMode::BankTransfer => write!(f, "bank_transfer"),
            PaymentMode::Upi => write!(f, "upi"),
            PaymentMode::Cheque => write!(f, "cheque"),
        }
    }
}

impl FromStr for PaymentMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cash" => Ok(PaymentMode::Cash),
            "bank_transfer" => Ok(PaymentMode::BankTransfer),
            "upi" => Ok(PaymentMode::Upi),
            "cheque" => Ok(PaymentMode::Cheque),
            _ => Err(LedgerError::InvalidValue {
                what: "payment mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub party_id: String,
    #[serde(default)]
    pub invoice_id: Option<String>,
    pub mode: PaymentMode,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// Stamped once on first save, never changed.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub fn list_transactions(store: &impl Store) -> Result<Vec<Transaction>> {
    store::load_collection(store, TRANSACTIONS)
}

/// Insert-or-replace by id. Assigns identity and creation timestamp on
/// first save. Does NOT reconcile any linked invoice; callers must run
/// `reconcile_payment` themselves after the write.
pub fn save_transaction(store: &impl Store, mut transaction: Transaction) -> Result<Transaction> {
    let mut transactions = list_transactions(store)?;

    if transaction.id.is_empty() {
        transaction.id = store::new_id();
    }

    if transaction.created_at.is_none() {
        transaction.created_at = Some(Utc::now());
    }

    match transactions.iter().position(|t| t.id == transaction.id) {
        Some(idx) => transactions[idx] = transaction.clone(),
        None => transactions.push(transaction.clone()),
    }

    store::save_collection(store, TRANSACTIONS, &transactions)?;
    Ok(transaction)
}

/// Filter-and-rewrite. Linked invoices keep their stored paid amount
/// until the caller reconciles them.
pub fn delete_transaction(store: &impl Store, id: &str) -> Result<()> {
    let transactions: Vec<Transaction> = list_transactions(store)?
        .into_iter()
        .filter(|t| t.id != id)
        .collect();
    store::save_collection(store, TRANSACTIONS, &transactions)
}

pub fn get_transaction(store: &impl Store, id: &str) -> Result<Option<Transaction>> {
    Ok(list_transactions(store)?.into_iter().find(|t| t.id == id))
}

pub fn transactions_by_party(store: &impl Store, party_id: &str) -> Result<Vec<Transaction>> {
    Ok(list_transactions(store)?
        .into_iter()
        .filter(|t| t.party_id == party_id)
        .collect())
}

pub fn transactions_by_kind(store: &impl Store, kind: TransactionKind) -> Result<Vec<Transaction>> {
    Ok(list_transactions(store)?
        .into_iter()
        .filter(|t| t.kind == kind)
        .collect())
}

pub fn transactions_by_invoice(store: &impl Store, invoice_id: &str) -> Result<Vec<Transaction>> {
    Ok(list_transactions(store)?
        .into_iter()
        .filter(|t| t.invoice_id.as_deref() == Some(invoice_id))
        .collect())
}

/// What is still owed on an invoice, floored at zero. Zero for an
/// unknown invoice id.
pub fn remaining_amount(store: &impl Store, invoice_id: &str) -> Result<f64> {
    Ok(invoice::get_invoice(store, invoice_id)?
        .map(|i| i.outstanding())
        .unwrap_or(0.0))
}

/// Recompute an invoice's paid amount from its transactions and persist
/// the result. The transaction collection is the source of truth here:
/// whatever the invoice previously recorded as paid is discarded.
///
/// Not triggered automatically by transaction writes — call this after
/// every create/update/delete of a transaction that references an invoice.
pub fn reconcile_payment(store: &impl Store, invoice: Invoice) -> Result<Invoice> {
    let paid: f64 = transactions_by_invoice(store, &invoice.id)?
        .iter()
        .map(|t| t.amount)
        .sum();

    let mut updated = invoice;
    updated.paid_amount = Some(paid);
    updated.status = payment_status(paid, updated.total);

    invoice::save_invoice(store, updated)
}

mod number;
mod quick;

pub use number::next_invoice_number;
pub use quick::{quick_invoice, DEFAULT_TAX_PERCENTAGE};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{LedgerError, Result};
use crate::party::{self, PartyRole};
use crate::product;
use crate::store::{self, Store, INVOICES};

/// Three-way payment status, always derived from paid amount vs total.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Paid,
    Partial,
    Unpaid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Paid => write!(f, "PAID"),
            InvoiceStatus::Partial => write!(f, "PARTIAL"),
            InvoiceStatus::Unpaid => write!(f, "UNPAID"),
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "paid" => Ok(InvoiceStatus::Paid),
            "partial" => Ok(InvoiceStatus::Partial),
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            _ => Err(LedgerError::InvalidValue {
                what: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// `paid` iff paid >= total, `partial` iff 0 < paid < total, else `unpaid`.
pub fn payment_status(paid: f64, total: f64) -> InvoiceStatus {
    if paid >= total {
        InvoiceStatus::Paid
    } else if paid > 0.0 {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Unpaid
    }
}

/// Signed stock change for one line item: customers take stock out,
/// suppliers bring it in.
pub fn stock_delta(role: PartyRole, qty: i64) -> i64 {
    match role {
        PartyRole::Customer => -qty,
        PartyRole::Supplier => qty,
    }
}

/// One line on an invoice. Product name, rate and tax code are
/// denormalized at time of sale and never updated afterwards.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceItem {
    #[serde(default)]
    pub id: String,
    pub product: String,
    #[serde(default)]
    pub product_id: String,
    pub qty: i64,
    pub rate: f64,
    pub amount: f64,
    #[serde(default)]
    pub tax_code: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub invoice_number: String,
    pub party_id: String,
    pub date: NaiveDate,
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax_percentage: f64,
    pub tax_amount: f64,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    /// Absent on legacy records; see `amount_paid`.
    #[serde(default)]
    pub paid_amount: Option<f64>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub delivery_by: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub way_bill_no: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub payment_term: Option<String>,
}

impl Invoice {
    /// Paid amount with the legacy default applied: records written
    /// before the field existed count as fully paid when marked `paid`,
    /// otherwise as unpaid.
    pub fn amount_paid(&self) -> f64 {
        self.paid_amount.unwrap_or(match self.status {
            InvoiceStatus::Paid => self.total,
            _ => 0.0,
        })
    }

    pub fn outstanding(&self) -> f64 {
        (self.total - self.amount_paid()).max(0.0)
    }
}

pub fn list_invoices(store: &impl Store) -> Result<Vec<Invoice>> {
    store::load_collection(store, INVOICES)
}

/// Save an invoice: assign identity and number if absent, normalize the
/// paid amount, re-derive status, and — only for a genuinely new invoice —
/// sync product stock from its line items.
///
/// Stock sync is create-only by design: editing or re-saving an existing
/// invoice never re-adjusts stock, so the stock ledger can drift from
/// invoice history when quantities are edited after the fact.
pub fn save_invoice(store: &impl Store, mut invoice: Invoice) -> Result<Invoice> {
    let mut invoices = list_invoices(store)?;
    let is_new = invoice.id.is_empty() || !invoices.iter().any(|i| i.id == invoice.id);

    if invoice.id.is_empty() {
        invoice.id = store::new_id();
    }

    if invoice.invoice_number.is_empty() {
        invoice.invoice_number = next_invoice_number(&invoices, Local::now().date_naive());
    }

    let paid = invoice.amount_paid();
    invoice.paid_amount = Some(paid);
    invoice.status = payment_status(paid, invoice.total);

    if is_new {
        sync_stock(store, &invoice)?;
    }

    match invoices.iter().position(|i| i.id == invoice.id) {
        Some(idx) => invoices[idx] = invoice.clone(),
        None => invoices.push(invoice.clone()),
    }

    store::save_collection(store, INVOICES, &invoices)?;
    Ok(invoice)
}

/// Apply the create-time stock adjustment for every line item with a
/// product reference. A missing party or product is skipped with a
/// warning, never an error.
fn sync_stock(store: &impl Store, invoice: &Invoice) -> Result<()> {
    let Some(party) = party::get_party(store, &invoice.party_id)? else {
        warn!(
            invoice_number = %invoice.invoice_number,
            party_id = %invoice.party_id,
            "stock sync skipped: party not found"
        );
        return Ok(());
    };

    for item in &invoice.items {
        if item.product_id.is_empty() {
            continue;
        }
        // adjust_stock reports a missing product as Ok(false); ignored here.
        let _ = product::adjust_stock(store, &item.product_id, stock_delta(party.role, item.qty))?;
    }

    Ok(())
}

/// Filter-and-rewrite. Stock adjustment is never reversed on delete.
pub fn delete_invoice(store: &impl Store, id: &str) -> Result<()> {
    let invoices: Vec<Invoice> = list_invoices(store)?
        .into_iter()
        .filter(|i| i.id != id)
        .collect();
    store::save_collection(store, INVOICES, &invoices)
}

pub fn get_invoice(store: &impl Store, id: &str) -> Result<Option<Invoice>> {
    Ok(list_invoices(store)?.into_iter().find(|i| i.id == id))
}

pub fn invoices_by_party(store: &impl Store, party_id: &str) -> Result<Vec<Invoice>> {
    Ok(list_invoices(store)?
        .into_iter()
        .filter(|i| i.party_id == party_id)
        .collect())
}

/// Inclusive on both ends.
pub fn invoices_by_date_range(
    store: &impl Store,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Invoice>> {
    Ok(list_invoices(store)?
        .into_iter()
        .filter(|i| i.date >= from && i.date <= to)
        .collect())
}

/// One signed stock change derived from an invoice line item.
#[derive(Debug, Clone)]
pub struct StockMovement {
    pub date: NaiveDate,
    pub change: i64,
    pub invoice_id: String,
    pub invoice_number: String,
}

/// Derive a product's change log by scanning every invoice's items,
/// sign-adjusted by the owning party's role. Invoices whose party no
/// longer exists are skipped. Newest first.
pub fn stock_history(store: &impl Store, product_id: &str) -> Result<Vec<StockMovement>> {
    let mut history = Vec::new();

    for invoice in list_invoices(store)? {
        let Some(party) = party::get_party(store, &invoice.party_id)? else {
            continue;
        };

        for item in &invoice.items {
            if item.product_id == product_id {
                history.push(StockMovement {
                    date: invoice.date,
                    change: stock_delta(party.role, item.qty),
                    invoice_id: invoice.id.clone(),
                    invoice_number: invoice.invoice_number.clone(),
                });
            }
        }
    }

    history.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_three_way() {
        assert_eq!(payment_status(226.0, 226.0), InvoiceStatus::Paid);
        assert_eq!(payment_status(300.0, 226.0), InvoiceStatus::Paid);
        assert_eq!(payment_status(100.0, 226.0), InvoiceStatus::Partial);
        assert_eq!(payment_status(0.0, 226.0), InvoiceStatus::Unpaid);
        assert_eq!(payment_status(-5.0, 226.0), InvoiceStatus::Unpaid);
    }

    #[test]
    fn stock_delta_signed_by_role() {
        assert_eq!(stock_delta(PartyRole::Customer, 6), -6);
        assert_eq!(stock_delta(PartyRole::Supplier, 6), 6);
    }

    #[test]
    fn legacy_paid_amount_defaults_by_status() {
        let mut invoice = Invoice {
            id: String::new(),
            invoice_number: String::new(),
            party_id: "p1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            items: Vec::new(),
            subtotal: 500.0,
            tax_percentage: 0.0,
            tax_amount: 0.0,
            discount: 0.0,
            total: 500.0,
            paid_amount: None,
            status: InvoiceStatus::Paid,
            delivery_by: None,
            transport: None,
            vehicle_no: None,
            way_bill_no: None,
            po_number: None,
            payment_term: None,
        };
        assert_eq!(invoice.amount_paid(), 500.0);
        assert_eq!(invoice.outstanding(), 0.0);

        invoice.status = InvoiceStatus::Unpaid;
        assert_eq!(invoice.amount_paid(), 0.0);
        assert_eq!(invoice.outstanding(), 500.0);
    }
}

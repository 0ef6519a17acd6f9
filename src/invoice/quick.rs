use chrono::Local;

use super::{save_invoice, Invoice, InvoiceItem, InvoiceStatus};
use crate::error::{LedgerError, Result};
use crate::party::{self, PartyRole};
use crate::product;
use crate::store::{self, Store};

/// Tax percentage applied when the caller does not pass one.
pub const DEFAULT_TAX_PERCENTAGE: f64 = 18.0;

/// Compose and persist a single-item invoice from a party, a product and
/// a quantity.
///
/// All validation happens before anything is written: a missing product
/// or party fails with the matching not-found error, and a customer
/// asking for more than the available stock fails with
/// `InsufficientStock` carrying the current level. On success the save
/// path assigns the identity and invoice number and performs the
/// create-time stock adjustment.
pub fn quick_invoice(
    store: &impl Store,
    party_id: &str,
    product_id: &str,
    quantity: i64,
    discount: f64,
    tax_percentage: f64,
    status: InvoiceStatus,
) -> Result<Invoice> {
    let product = product::get_product(store, product_id)?
        .ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))?;

    let party = party::get_party(store, party_id)?
        .ok_or_else(|| LedgerError::PartyNotFound(party_id.to_string()))?;

    if party.role == PartyRole::Customer && !product::has_enough_stock(store, product_id, quantity)?
    {
        return Err(LedgerError::InsufficientStock {
            product: product.name,
            stock: product.stock,
        });
    }

    let amount = product.price * quantity as f64;
    let subtotal = amount;
    let tax_amount = subtotal * tax_percentage / 100.0;
    let total = subtotal + tax_amount - discount;

    let item = InvoiceItem {
        id: store::new_id(),
        product: product.name.clone(),
        product_id: product.id.clone(),
        qty: quantity,
        rate: product.price,
        amount,
        tax_code: product.tax_code.clone(),
    };

    let invoice = Invoice {
        id: String::new(),
        invoice_number: String::new(),
        party_id: party_id.to_string(),
        date: Local::now().date_naive(),
        items: vec![item],
        subtotal,
        tax_percentage,
        tax_amount,
        discount,
        total,
        paid_amount: Some(match status {
            InvoiceStatus::Paid => total,
            _ => 0.0,
        }),
        status,
        delivery_by: None,
        transport: None,
        vehicle_no: None,
        way_bill_no: None,
        po_number: None,
        payment_term: None,
    };

    save_invoice(store, invoice)
}

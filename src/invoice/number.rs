use chrono::{Datelike, NaiveDate};

use super::Invoice;

/// Derive the next sequential invoice number for the month of `today`,
/// in the form `INV-{YY}{MM}-{NNN}`.
///
/// Scans existing numbers for the month prefix, takes the highest
/// parsable suffix and increments it. Unparsable suffixes are ignored.
/// Past 999 the number simply grows a digit. Pure over its inputs; the
/// caller is responsible for there being no concurrent allocator.
pub fn next_invoice_number(invoices: &[Invoice], today: NaiveDate) -> String {
    let prefix = format!("INV-{:02}{:02}-", today.year() % 100, today.month());

    let max = invoices
        .iter()
        .filter_map(|inv| inv.invoice_number.strip_prefix(&prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{prefix}{:03}", max + 1)
}

pub mod business;
pub mod error;
pub mod invoice;
pub mod party;
pub mod product;
pub mod store;
pub mod transaction;

pub use business::BusinessInfo;
pub use error::{LedgerError, Result};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus, StockMovement};
pub use party::{Party, PartyRole};
pub use product::Product;
pub use store::{JsonStore, MemoryStore, Store};
pub use transaction::{PaymentMode, Transaction, TransactionKind};

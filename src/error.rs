use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Party '{0}' not found")]
    PartyNotFound(String),

    #[error("Product '{0}' not found")]
    ProductNotFound(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Not enough stock available for {product}. Current stock: {stock}")]
    InsufficientStock { product: String, stock: i64 },

    #[error("Invalid {what} '{value}'")]
    InvalidValue { what: &'static str, value: String },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Failed to parse stored collection '{key}': {source}")]
    CollectionParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use bizledger::error::{LedgerError, Result};
use bizledger::invoice::{self, InvoiceStatus, DEFAULT_TAX_PERCENTAGE};
use bizledger::{business, party, product, transaction};
use bizledger::{BusinessInfo, JsonStore, Party, PaymentMode, Product, Transaction, TransactionKind};

#[derive(Parser)]
#[command(name = "bizledger")]
#[command(version, about = "Small-business ledger: parties, stock, invoices, payments", long_about = None)]
struct Cli {
    /// Path to data directory (default: ~/.bizledger or XDG data dir)
    #[arg(short = 'D', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage trading parties (customers and suppliers)
    Party {
        #[command(subcommand)]
        command: PartyCommand,
    },

    /// Manage the product catalog and stock levels
    Product {
        #[command(subcommand)]
        command: ProductCommand,
    },

    /// Show products at or below their low-stock threshold
    Stock {
        /// Only show products with zero or negative stock
        #[arg(long)]
        out: bool,
    },

    /// Manage invoices
    Invoice {
        #[command(subcommand)]
        command: InvoiceCommand,
    },

    /// Manage payment/receipt transactions
    Txn {
        #[command(subcommand)]
        command: TxnCommand,
    },

    /// Show or update the business profile
    Business {
        #[command(subcommand)]
        command: BusinessCommand,
    },
}

#[derive(Subcommand)]
enum PartyCommand {
    /// List all parties
    List,

    /// Add or update a party
    Add {
        #[arg(long)]
        name: String,

        /// "customer" or "supplier"
        #[arg(long)]
        role: String,

        #[arg(long, default_value = "")]
        mobile: String,

        #[arg(long, default_value = "")]
        address: String,

        #[arg(long)]
        tax_id: Option<String>,
    },

    /// Delete a party (referencing invoices/transactions are kept)
    Rm { id: String },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// List all products
    List,

    /// Add or update a product
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        price: f64,

        #[arg(long, default_value_t = 0)]
        stock: i64,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        cost_price: Option<f64>,

        #[arg(long)]
        unit: Option<String>,

        #[arg(long)]
        tax_code: Option<String>,

        /// Low-stock alert level (default 5 when unset)
        #[arg(long)]
        low_stock_alert: Option<i64>,
    },

    /// Delete a product (referencing invoices are kept)
    Rm { id: String },

    /// Apply a signed stock delta to a product
    Adjust {
        id: String,

        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// Show the stock movement history derived from invoices
    History { id: String },
}

#[derive(Subcommand)]
enum InvoiceCommand {
    /// List invoices, optionally filtered
    List {
        /// Filter by party id
        #[arg(long)]
        party: Option<String>,

        /// Filter invoices from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter invoices to this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Create a single-item invoice from a party, product and quantity
    Quick {
        /// Party id
        #[arg(long)]
        party: String,

        /// Product id
        #[arg(long)]
        product: String,

        #[arg(long)]
        qty: i64,

        #[arg(long, default_value_t = 0.0)]
        discount: f64,

        /// Tax percentage
        #[arg(long, default_value_t = DEFAULT_TAX_PERCENTAGE)]
        tax: f64,

        /// "paid", "partial" or "unpaid"
        #[arg(long, default_value = "unpaid")]
        status: String,
    },

    /// Delete an invoice (stock is not re-adjusted)
    Rm { id: String },

    /// Show the next invoice number for the current month
    NextNumber,
}

#[derive(Subcommand)]
enum TxnCommand {
    /// List transactions, optionally filtered
    List {
        /// Filter by party id
        #[arg(long)]
        party: Option<String>,

        /// Filter by kind ("payment" or "receipt")
        #[arg(long)]
        kind: Option<String>,

        /// Filter by linked invoice id
        #[arg(long)]
        invoice: Option<String>,
    },

    /// Record a transaction and reconcile any linked invoice
    Add {
        /// Party id
        #[arg(long)]
        party: String,

        /// "payment" or "receipt"
        #[arg(long)]
        kind: String,

        #[arg(long)]
        amount: f64,

        /// "cash", "bank_transfer", "upi" or "cheque"
        #[arg(long, default_value = "cash")]
        mode: String,

        /// Invoice id this transaction settles (triggers reconciliation)
        #[arg(long)]
        invoice: Option<String>,

        /// Transaction date (default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        reference: Option<String>,
    },

    /// Delete a transaction and reconcile any linked invoice
    Rm { id: String },
}

#[derive(Subcommand)]
enum BusinessCommand {
    /// Show the business profile
    Show,

    /// Update the business profile (unset fields keep their value)
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        tax_id: Option<String>,

        #[arg(long)]
        terms: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let store = match cli.data_dir {
        Some(dir) => JsonStore::new(dir),
        None => JsonStore::open_default()?,
    };

    match cli.command {
        Commands::Party { command } => match command {
            PartyCommand::List => cmd_party_list(&store),
            PartyCommand::Add {
                name,
                role,
                mobile,
                address,
                tax_id,
            } => cmd_party_add(&store, name, &role, mobile, address, tax_id),
            PartyCommand::Rm { id } => cmd_party_rm(&store, &id),
        },
        Commands::Product { command } => match command {
            ProductCommand::List => cmd_product_list(&store),
            ProductCommand::Add {
                name,
                price,
                stock,
                description,
                cost_price,
                unit,
                tax_code,
                low_stock_alert,
            } => cmd_product_add(
                &store,
                Product {
                    id: String::new(),
                    name,
                    description,
                    price,
                    cost_price,
                    stock,
                    unit,
                    tax_code,
                    low_stock_alert,
                },
            ),
            ProductCommand::Rm { id } => cmd_product_rm(&store, &id),
            ProductCommand::Adjust { id, delta } => cmd_product_adjust(&store, &id, delta),
            ProductCommand::History { id } => cmd_product_history(&store, &id),
        },
        Commands::Stock { out } => cmd_stock(&store, out),
        Commands::Invoice { command } => match command {
            InvoiceCommand::List { party, from, to } => cmd_invoice_list(&store, party, from, to),
            InvoiceCommand::Quick {
                party,
                product,
                qty,
                discount,
                tax,
                status,
            } => cmd_invoice_quick(&store, &party, &product, qty, discount, tax, &status),
            InvoiceCommand::Rm { id } => cmd_invoice_rm(&store, &id),
            InvoiceCommand::NextNumber => cmd_invoice_next_number(&store),
        },
        Commands::Txn { command } => match command {
            TxnCommand::List {
                party,
                kind,
                invoice,
            } => cmd_txn_list(&store, party, kind, invoice),
            TxnCommand::Add {
                party,
                kind,
                amount,
                mode,
                invoice,
                date,
                description,
                reference,
            } => cmd_txn_add(
                &store,
                &party,
                &kind,
                amount,
                &mode,
                invoice,
                date,
                description,
                reference,
            ),
            TxnCommand::Rm { id } => cmd_txn_rm(&store, &id),
        },
        Commands::Business { command } => match command {
            BusinessCommand::Show => cmd_business_show(&store),
            BusinessCommand::Set {
                name,
                address,
                phone,
                email,
                tax_id,
                terms,
            } => cmd_business_set(&store, name, address, phone, email, tax_id, terms),
        },
    }
}

// Table row structs for tabled
#[derive(Tabled)]
struct PartyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ROLE")]
    role: String,
    #[tabled(rename = "MOBILE")]
    mobile: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "STOCK")]
    stock: i64,
    #[tabled(rename = "UNIT")]
    unit: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PARTY")]
    party: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct TxnRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "MODE")]
    mode: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
}

#[derive(Tabled)]
struct MovementRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CHANGE")]
    change: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
}

fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| LedgerError::InvalidDate(s.to_string()))
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn cmd_party_list(store: &JsonStore) -> Result<()> {
    let parties = party::list_parties(store)?;

    if parties.is_empty() {
        println!("No parties recorded.");
        return Ok(());
    }

    let rows: Vec<PartyRow> = parties
        .iter()
        .map(|p| PartyRow {
            id: p.id.clone(),
            name: p.name.clone(),
            role: p.role.to_string(),
            mobile: p.mobile.clone(),
        })
        .collect();

    print_table(rows);
    Ok(())
}

fn cmd_party_add(
    store: &JsonStore,
    name: String,
    role: &str,
    mobile: String,
    address: String,
    tax_id: Option<String>,
) -> Result<()> {
    let party = party::save_party(
        store,
        Party {
            id: String::new(),
            name,
            role: role.parse()?,
            mobile,
            address,
            tax_id,
            state: None,
        },
    )?;

    println!("Saved {} ({})", party.name, party.role);
    println!("  ID: {}", party.id);
    Ok(())
}

fn cmd_party_rm(store: &JsonStore, id: &str) -> Result<()> {
    party::delete_party(store, id)?;
    println!("Deleted party {id}");
    Ok(())
}

fn product_rows(products: &[Product]) -> Vec<ProductRow> {
    products
        .iter()
        .map(|p| ProductRow {
            id: p.id.clone(),
            name: p.name.clone(),
            price: format_amount(p.price),
            stock: p.stock,
            unit: p.unit.clone().unwrap_or_default(),
        })
        .collect()
}

fn cmd_product_list(store: &JsonStore) -> Result<()> {
    let products = product::list_products(store)?;

    if products.is_empty() {
        println!("No products recorded.");
        return Ok(());
    }

    print_table(product_rows(&products));
    Ok(())
}

fn cmd_product_add(store: &JsonStore, product: Product) -> Result<()> {
    let product = product::save_product(store, product)?;

    println!("Saved {} (stock: {})", product.name, product.stock);
    println!("  ID: {}", product.id);
    Ok(())
}

fn cmd_product_rm(store: &JsonStore, id: &str) -> Result<()> {
    product::delete_product(store, id)?;
    println!("Deleted product {id}");
    Ok(())
}

fn cmd_product_adjust(store: &JsonStore, id: &str, delta: i64) -> Result<()> {
    if !product::adjust_stock(store, id, delta)? {
        return Err(LedgerError::ProductNotFound(id.to_string()));
    }

    let product = product::get_product(store, id)?
        .ok_or_else(|| LedgerError::ProductNotFound(id.to_string()))?;
    println!("Adjusted {} by {delta} (stock: {})", product.name, product.stock);
    Ok(())
}

fn cmd_product_history(store: &JsonStore, id: &str) -> Result<()> {
    let product = product::get_product(store, id)?
        .ok_or_else(|| LedgerError::ProductNotFound(id.to_string()))?;

    let history = invoice::stock_history(store, id)?;

    println!("Stock history for {}", product.name);

    if history.is_empty() {
        println!("  No movements recorded.");
        return Ok(());
    }

    let rows: Vec<MovementRow> = history
        .iter()
        .map(|m| MovementRow {
            date: m.date.to_string(),
            change: format!("{:+}", m.change),
            invoice: m.invoice_number.clone(),
        })
        .collect();

    print_table(rows);
    Ok(())
}

fn cmd_stock(store: &JsonStore, out: bool) -> Result<()> {
    let products = if out {
        product::out_of_stock(store)?
    } else {
        product::low_stock(store)?
    };

    if products.is_empty() {
        if out {
            println!("No products out of stock.");
        } else {
            println!("No products below their low-stock threshold.");
        }
        return Ok(());
    }

    print_table(product_rows(&products));
    Ok(())
}

fn cmd_invoice_list(
    store: &JsonStore,
    party_filter: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let from_date = from.as_deref().map(parse_date).transpose()?;
    let to_date = to.as_deref().map(parse_date).transpose()?;

    let invoices: Vec<_> = invoice::list_invoices(store)?
        .into_iter()
        .filter(|i| party_filter.as_deref().map_or(true, |p| i.party_id == p))
        .filter(|i| from_date.map_or(true, |d| i.date >= d))
        .filter(|i| to_date.map_or(true, |d| i.date <= d))
        .collect();

    if invoices.is_empty() {
        println!("No invoices found.");
        return Ok(());
    }

    let parties = party::list_parties(store)?;
    let party_name = |id: &str| {
        parties
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|i| InvoiceRow {
            number: i.invoice_number.clone(),
            date: i.date.to_string(),
            party: party_name(&i.party_id),
            total: format_amount(i.total),
            paid: format_amount(i.amount_paid()),
            status: i.status.to_string(),
        })
        .collect();

    print_table(rows);

    let total: f64 = invoices.iter().map(|i| i.total).sum();
    let paid: f64 = invoices.iter().map(|i| i.amount_paid()).sum();

    println!();
    println!("Total: {} invoices", invoices.len());
    println!(
        "Amount: {} / Paid: {} / Outstanding: {}",
        format_amount(total),
        format_amount(paid),
        format_amount(total - paid)
    );

    Ok(())
}

fn cmd_invoice_quick(
    store: &JsonStore,
    party_id: &str,
    product_id: &str,
    qty: i64,
    discount: f64,
    tax: f64,
    status: &str,
) -> Result<()> {
    let status: InvoiceStatus = status.parse()?;
    let invoice = invoice::quick_invoice(store, party_id, product_id, qty, discount, tax, status)?;

    println!("Created {}", invoice.invoice_number);
    println!("  Total:  {}", format_amount(invoice.total));
    println!("  Status: {}", invoice.status);
    println!("  ID:     {}", invoice.id);
    Ok(())
}

fn cmd_invoice_rm(store: &JsonStore, id: &str) -> Result<()> {
    invoice::delete_invoice(store, id)?;
    println!("Deleted invoice {id}");
    Ok(())
}

fn cmd_invoice_next_number(store: &JsonStore) -> Result<()> {
    let invoices = invoice::list_invoices(store)?;
    let number = invoice::next_invoice_number(&invoices, Local::now().date_naive());
    println!("{number}");
    Ok(())
}

fn cmd_txn_list(
    store: &JsonStore,
    party_filter: Option<String>,
    kind_filter: Option<String>,
    invoice_filter: Option<String>,
) -> Result<()> {
    let kind: Option<TransactionKind> = kind_filter.as_deref().map(str::parse).transpose()?;

    let transactions: Vec<_> = transaction::list_transactions(store)?
        .into_iter()
        .filter(|t| party_filter.as_deref().map_or(true, |p| t.party_id == p))
        .filter(|t| kind.map_or(true, |k| t.kind == k))
        .filter(|t| {
            invoice_filter
                .as_deref()
                .map_or(true, |i| t.invoice_id.as_deref() == Some(i))
        })
        .collect();

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let rows: Vec<TxnRow> = transactions
        .iter()
        .map(|t| TxnRow {
            id: t.id.clone(),
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            amount: format_amount(t.amount),
            mode: t.mode.to_string(),
            invoice: t.invoice_id.clone().unwrap_or_default(),
        })
        .collect();

    print_table(rows);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_txn_add(
    store: &JsonStore,
    party_id: &str,
    kind: &str,
    amount: f64,
    mode: &str,
    invoice_id: Option<String>,
    date: Option<String>,
    description: Option<String>,
    reference: Option<String>,
) -> Result<()> {
    if amount <= 0.0 {
        return Err(LedgerError::InvalidAmount);
    }

    let date = match date {
        Some(s) => parse_date(&s)?,
        None => Local::now().date_naive(),
    };

    let kind: TransactionKind = kind.parse()?;
    let mode: PaymentMode = mode.parse()?;

    let txn = transaction::save_transaction(
        store,
        Transaction {
            id: String::new(),
            kind,
            amount,
            date,
            party_id: party_id.to_string(),
            invoice_id: invoice_id.clone(),
            mode,
            description,
            reference,
            created_at: None,
        },
    )?;

    println!("Recorded {} of {} ({})", txn.kind, format_amount(txn.amount), txn.mode);
    println!("  ID: {}", txn.id);

    // Reconciliation is not automatic; the CLI runs it for linked invoices.
    if let Some(invoice_id) = invoice_id {
        reconcile_linked_invoice(store, &invoice_id)?;
    }

    Ok(())
}

fn cmd_txn_rm(store: &JsonStore, id: &str) -> Result<()> {
    let linked_invoice = transaction::get_transaction(store, id)?.and_then(|t| t.invoice_id);

    transaction::delete_transaction(store, id)?;
    println!("Deleted transaction {id}");

    if let Some(invoice_id) = linked_invoice {
        reconcile_linked_invoice(store, &invoice_id)?;
    }

    Ok(())
}

fn reconcile_linked_invoice(store: &JsonStore, invoice_id: &str) -> Result<()> {
    let Some(inv) = invoice::get_invoice(store, invoice_id)? else {
        return Ok(());
    };

    let inv = transaction::reconcile_payment(store, inv)?;
    println!(
        "Reconciled {}: paid {} of {} ({})",
        inv.invoice_number,
        format_amount(inv.amount_paid()),
        format_amount(inv.total),
        inv.status
    );
    Ok(())
}

fn cmd_business_show(store: &JsonStore) -> Result<()> {
    let info = business::get_business_info(store)?;

    println!("{}", info.name);
    println!("  Address: {}", info.address);
    println!("  Phone:   {}", info.phone);
    println!("  Email:   {}", info.email);
    if let Some(tax_id) = &info.tax_id {
        println!("  Tax ID:  {tax_id}");
    }
    println!("  Terms:");
    for line in info.terms_and_conditions.lines() {
        println!("    {line}");
    }
    Ok(())
}

fn cmd_business_set(
    store: &JsonStore,
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    tax_id: Option<String>,
    terms: Option<String>,
) -> Result<()> {
    let mut info: BusinessInfo = business::get_business_info(store)?;

    if let Some(name) = name {
        info.name = name;
    }
    if let Some(address) = address {
        info.address = address;
    }
    if let Some(phone) = phone {
        info.phone = phone;
    }
    if let Some(email) = email {
        info.email = email;
    }
    if let Some(tax_id) = tax_id {
        info.tax_id = Some(tax_id);
    }
    if let Some(terms) = terms {
        info.terms_and_conditions = terms;
    }

    business::save_business_info(store, &info)?;
    println!("Saved business profile for {}", info.name);
    Ok(())
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::store::{self, Store, PARTIES};

/// Whether the counterpart buys from us or sells to us. The role decides
/// the sign of stock adjustment when an invoice is created.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Customer,
    Supplier,
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyRole::Customer => write!(f, "customer"),
            PartyRole::Supplier => write!(f, "supplier"),
        }
    }
}

impl FromStr for PartyRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "customer" => Ok(PartyRole::Customer),
            "supplier" => Ok(PartyRole::Supplier),
            _ => Err(LedgerError::InvalidValue {
                what: "party role",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Party {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub role: PartyRole,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

pub fn list_parties(store: &impl Store) -> Result<Vec<Party>> {
    store::load_collection(store, PARTIES)
}

/// Insert-or-replace by id. Assigns identity at creation if absent;
/// identity is never changed afterwards.
pub fn save_party(store: &impl Store, mut party: Party) -> Result<Party> {
    let mut parties = list_parties(store)?;

    if party.id.is_empty() {
        party.id = store::new_id();
    }

    match parties.iter().position(|p| p.id == party.id) {
        Some(idx) => parties[idx] = party.clone(),
        None => parties.push(party.clone()),
    }

    store::save_collection(store, PARTIES, &parties)?;
    Ok(party)
}

/// Filter-and-rewrite. No cascade: invoices and transactions referencing
/// the party are left untouched.
pub fn delete_party(store: &impl Store, id: &str) -> Result<()> {
    let parties: Vec<Party> = list_parties(store)?
        .into_iter()
        .filter(|p| p.id != id)
        .collect();
    store::save_collection(store, PARTIES, &parties)
}

pub fn get_party(store: &impl Store, id: &str) -> Result<Option<Party>> {
    Ok(list_parties(store)?.into_iter().find(|p| p.id == id))
}

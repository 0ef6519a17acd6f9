use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::store::{Store, BUSINESS_INFO};

/// Singleton business profile. Defaults are supplied until the user
/// saves their own.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    pub terms_and_conditions: String,
}

impl Default for BusinessInfo {
    fn default() -> Self {
        Self {
            name: "My Business".to_string(),
            address: "123 Business Street, City, State, PIN".to_string(),
            phone: "9876543210".to_string(),
            email: "contact@example.com".to_string(),
            tax_id: None,
            terms_and_conditions: "1. Payment due within 30 days\n\
                 2. Goods once sold cannot be returned\n\
                 3. All disputes subject to local jurisdiction"
                .to_string(),
        }
    }
}

pub fn get_business_info(store: &impl Store) -> Result<BusinessInfo> {
    match store.read(BUSINESS_INFO)? {
        Some(payload) => {
            serde_json::from_str(&payload).map_err(|e| LedgerError::CollectionParse {
                key: BUSINESS_INFO.to_string(),
                source: e,
            })
        }
        None => Ok(BusinessInfo::default()),
    }
}

pub fn save_business_info(store: &impl Store, info: &BusinessInfo) -> Result<()> {
    let payload = serde_json::to_string_pretty(info).map_err(|e| {
        LedgerError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    store.write(BUSINESS_INFO, &payload)
}

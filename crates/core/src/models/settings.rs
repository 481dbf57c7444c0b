use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Ledger configuration: storage keys and display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Storage key of the holdings snapshot
    pub portfolio_key: String,

    /// Storage key of the transaction log snapshot
    pub transactions_key: String,

    /// Symbol prefixed to formatted amounts
    pub currency_symbol: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            portfolio_key: "portfolio".to_string(),
            transactions_key: "transactions".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl LedgerSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.portfolio_key.trim().is_empty() || self.transactions_key.trim().is_empty() {
            return Err(CoreError::Validation(
                "Storage keys must not be empty".into(),
            ));
        }
        if self.portfolio_key == self.transactions_key {
            return Err(CoreError::Validation(format!(
                "Holdings and transactions cannot share the storage key '{}'",
                self.portfolio_key
            )));
        }
        Ok(())
    }
}

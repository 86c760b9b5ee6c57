use crate::domain::model::{CatalogItem, UserId};
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_required_field,
    validate_url, Validate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub seed: Vec<SeedItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Http,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: Backend,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Per-line deadline for `purchase` calls; unset means wait indefinitely.
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    pub description: Option<String>,
}

impl From<&SeedItem> for CatalogItem {
    fn from(seed: &SeedItem) -> Self {
        let mut item = CatalogItem::new(
            seed.id.clone(),
            seed.name.clone(),
            seed.category.clone(),
            seed.price,
            seed.quantity,
        );
        item.description = seed.description.clone();
        item
    }
}

impl StorefrontConfig {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
    pub const MAX_DEADLINE_MS: u64 = 600_000;

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StoreError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.store
                .timeout_seconds
                .unwrap_or(Self::DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn line_deadline(&self) -> Option<Duration> {
        self.checkout.deadline_ms.map(Duration::from_millis)
    }

    /// Signed-in user, or `None` when unset, blank or still an unresolved `${VAR}`.
    pub fn session_user(&self) -> Option<UserId> {
        resolved("session.user_id", &self.session.user_id).map(|id| UserId(id.to_string()))
    }

    pub fn api_key(&self) -> Option<&str> {
        resolved("store.api_key", &self.store.api_key)
    }

    pub fn access_token(&self) -> Option<&str> {
        resolved("store.access_token", &self.store.access_token)
    }

    pub fn seed_items(&self) -> Vec<CatalogItem> {
        self.seed.iter().map(CatalogItem::from).collect()
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.store.backend == Backend::Http {
            let endpoint = validate_required_field("store.endpoint", &self.store.endpoint)?;
            validate_url("store.endpoint", endpoint)?;
        }

        if let Some(timeout) = self.store.timeout_seconds {
            validate_positive_number("store.timeout_seconds", timeout, 1)?;
        }

        if let Some(deadline) = self.checkout.deadline_ms {
            validate_range("checkout.deadline_ms", deadline, 1, Self::MAX_DEADLINE_MS)?;
        }

        for (index, seed) in self.seed.iter().enumerate() {
            validate_non_empty_string(&format!("seed[{}].id", index), &seed.id)?;
            validate_non_empty_string(&format!("seed[{}].name", index), &seed.name)?;
            if seed.price.is_sign_negative() {
                return Err(StoreError::InvalidConfigValueError {
                    field: format!("seed[{}].price", index),
                    value: seed.price.to_string(),
                    reason: "Price cannot be negative".to_string(),
                });
            }
        }

        let mut ids: Vec<&str> = self.seed.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(StoreError::InvalidConfigValueError {
                field: "seed".to_string(),
                value: pair[0].to_string(),
                reason: "Duplicate seed item id".to_string(),
            });
        }

        Ok(())
    }
}

/// A value still carrying `${...}` after substitution names an unset variable.
fn is_unresolved(value: &str) -> bool {
    value
        .find("${")
        .is_some_and(|start| value[start..].contains('}'))
}

fn resolved<'a>(field: &str, value: &'a Option<String>) -> Option<&'a str> {
    let value = value.as_deref()?.trim();
    if value.is_empty() {
        return None;
    }
    if is_unresolved(value) {
        tracing::warn!("{} refers to an unset environment variable, ignoring it", field);
        return None;
    }
    Some(value)
}

impl Validate for StorefrontConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

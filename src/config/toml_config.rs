use crate::core::freight::FreightRates;
use crate::core::parcel_service::ServiceSettings;
use crate::domain::model::{Address, Customer, StateCode};
use crate::utils::error::{ParcelError, Result};
use crate::utils::validation::{
    validate_non_blank, validate_positive_number, validate_postal_code, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub postal_lookup: PostalLookupConfig,
    pub origin: OriginConfig,
    pub default_customer: CustomerConfig,
    pub freight: FreightRates,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalLookupConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub origin_postal_code: String,
}

impl Default for PostalLookupConfig {
    fn default() -> Self {
        Self {
            base_url: crate::adapters::http::VIACEP_BASE_URL.to_string(),
            timeout_seconds: 5,
            origin_postal_code: "13801-005".to_string(),
        }
    }
}

/// Street number used with a looked-up origin, plus the full address used
/// when the lookup gives nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    pub number: String,
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            number: "567".to_string(),
            postal_code: "13801-005".to_string(),
            street: "Rua Ariovaldo Silveira Franco".to_string(),
            neighborhood: "Jardim 31 de Março".to_string(),
            city: "Mogi Mirim".to_string(),
            state: "SP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerConfig {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            name: "Jailson Mendes".to_string(),
            email: "jailsonmmm@gmail.com".to_string(),
            phone: "11976543211".to_string(),
            tax_id: "123.123.128-09".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "./parcels.json".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ParcelError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` with environment values. Unset
    /// variables are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ParcelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("postal_lookup.base_url", &self.postal_lookup.base_url)?;
        validate_positive_number(
            "postal_lookup.timeout_seconds",
            self.postal_lookup.timeout_seconds,
            1,
        )?;
        validate_postal_code(
            "postal_lookup.origin_postal_code",
            &self.postal_lookup.origin_postal_code,
        )?;

        validate_postal_code("origin.postal_code", &self.origin.postal_code)?;
        validate_non_blank("origin.number", &self.origin.number)?;
        validate_non_blank("origin.street", &self.origin.street)?;
        validate_non_blank("origin.city", &self.origin.city)?;
        self.origin.state.parse::<StateCode>()?;

        validate_non_blank("default_customer.name", &self.default_customer.name)?;
        validate_non_blank("default_customer.tax_id", &self.default_customer.tax_id)?;

        if self.freight.base_fee_cents < 0 {
            return Err(ParcelError::InvalidConfigValueError {
                field: "freight.base_fee_cents".to_string(),
                value: self.freight.base_fee_cents.to_string(),
                reason: "Value must not be negative".to_string(),
            });
        }
        validate_range("freight.per_km_cents", self.freight.per_km_cents, 0.0, 10_000.0)?;
        validate_range("freight.per_kg_cents", self.freight.per_kg_cents, 0.0, 100_000.0)?;
        validate_range(
            "freight.express_multiplier",
            self.freight.express_multiplier,
            1.0,
            10.0,
        )?;

        validate_non_blank("storage.data_file", &self.storage.data_file)?;
        if let Some(unresolved) = ENV_VAR.find(&self.storage.data_file) {
            return Err(ParcelError::InvalidConfigValueError {
                field: "storage.data_file".to_string(),
                value: self.storage.data_file.clone(),
                reason: format!("environment variable {} is not set", unresolved.as_str()),
            });
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.postal_lookup.timeout_seconds)
    }

    pub fn service_settings(&self) -> Result<ServiceSettings> {
        let origin = &self.origin;
        let customer = &self.default_customer;
        Ok(ServiceSettings {
            origin_postal_code: self.postal_lookup.origin_postal_code.clone(),
            origin_number: origin.number.clone(),
            fallback_origin: Address::new(
                &origin.postal_code,
                &origin.street,
                &origin.number,
                &origin.neighborhood,
                &origin.city,
                origin.state.parse()?,
            ),
            default_customer: Customer::new(
                &customer.name,
                &customer.email,
                &customer.phone,
                &customer.tax_id,
            ),
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

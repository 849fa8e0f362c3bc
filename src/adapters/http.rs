use crate::domain::ports::{PostalAddress, PostalLookup};
use crate::utils::error::{ParcelError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const VIACEP_BASE_URL: &str = "https://viacep.com.br/ws";

/// ViaCEP payload. Unknown codes come back as `{"erro": true}` (older
/// deployments send the string `"true"`).
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            Some(_) => true,
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Strips punctuation; exactly eight digits must remain.
    pub fn normalize_postal_code(postal_code: &str) -> Result<String> {
        let digits: String = postal_code.chars().filter(|c| c.is_ascii_digit()).collect();
        let only_digits_and_separators = postal_code
            .trim()
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == '.');
        if digits.len() != 8 || !only_digits_and_separators {
            return Err(ParcelError::validation(
                "postal_code",
                format!("'{}' is not an 8 digit postal code", postal_code),
            ));
        }
        Ok(digits)
    }
}

#[async_trait]
impl PostalLookup for ViaCepClient {
    async fn lookup(&self, postal_code: &str) -> Result<Option<PostalAddress>> {
        let digits = Self::normalize_postal_code(postal_code)?;
        let url = format!("{}/{}/json/", self.base_url, digits);

        tracing::debug!("Looking up postal code via {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!("Postal lookup response status: {}", status);

        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ParcelError::collaborator(
                "postal lookup",
                format!("unexpected HTTP status {}", status),
            ));
        }

        let body: ViaCepResponse = response.json().await?;
        if body.is_error() {
            return Ok(None);
        }

        Ok(Some(PostalAddress {
            postal_code: if body.cep.is_empty() {
                postal_code.to_string()
            } else {
                body.cep
            },
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_postal_code() {
        assert_eq!(
            ViaCepClient::normalize_postal_code("13801-005").unwrap(),
            "13801005"
        );
        assert_eq!(
            ViaCepClient::normalize_postal_code("13.801-005").unwrap(),
            "13801005"
        );
        assert!(ViaCepClient::normalize_postal_code("1380").is_err());
        assert!(ViaCepClient::normalize_postal_code("13801-00a5").is_err());
    }

    #[test]
    fn test_error_flag_variants() {
        let body: ViaCepResponse = serde_json::from_str(r#"{"erro": true}"#).unwrap();
        assert!(body.is_error());
        let body: ViaCepResponse = serde_json::from_str(r#"{"erro": "true"}"#).unwrap();
        assert!(body.is_error());
        let body: ViaCepResponse =
            serde_json::from_str(r#"{"cep": "13801-005", "uf": "SP"}"#).unwrap();
        assert!(!body.is_error());
    }
}

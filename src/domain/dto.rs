use crate::domain::model::{
    Address, Customer, Freight, FreightKind, Money, Parcel, ParcelDetails, ParcelId, StateCode,
    TrackingCode,
};
use crate::domain::status::ParcelStatus;
use crate::utils::error::{ParcelError, Result};
use crate::utils::validation::{validate_non_blank, validate_postal_code, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heaviest parcel accepted, in kilograms.
pub const MAX_WEIGHT_KG: f64 = 30_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRequest {
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl AddressRequest {
    pub fn to_entity(&self) -> Result<Address> {
        let state = self.state.parse::<StateCode>()?;
        Ok(Address::new(
            self.postal_code.trim(),
            self.street.trim(),
            self.number.trim(),
            self.neighborhood.trim(),
            self.city.trim(),
            state,
        ))
    }
}

impl Validate for AddressRequest {
    fn validate(&self) -> Result<()> {
        validate_postal_code("destination.postal_code", self.postal_code.trim())?;
        validate_non_blank("destination.street", &self.street)?;
        validate_non_blank("destination.number", &self.number)?;
        validate_non_blank("destination.neighborhood", &self.neighborhood)?;
        validate_non_blank("destination.city", &self.city)?;
        self.state
            .parse::<StateCode>()
            .map_err(|_| {
                ParcelError::validation(
                    "destination.state",
                    format!("unknown state code '{}'", self.state),
                )
            })
            .map(|_| ())
    }
}

/// Accepted for compatibility; creation currently binds every parcel to the
/// configured default customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateParcelRequest {
    pub description: String,
    pub weight_kg: f64,
    #[serde(default)]
    pub declared_value_cents: i64,
    #[serde(default)]
    pub freight_kind: FreightKind,
    pub destination: AddressRequest,
    #[serde(default)]
    pub customer: Option<CustomerRequest>,
}

impl CreateParcelRequest {
    pub fn details(&self) -> ParcelDetails {
        ParcelDetails {
            description: self.description.trim().to_string(),
            weight_kg: self.weight_kg,
            declared_value: Money::from_cents(self.declared_value_cents),
            freight_kind: self.freight_kind,
        }
    }
}

impl Validate for CreateParcelRequest {
    fn validate(&self) -> Result<()> {
        validate_non_blank("description", &self.description)?;
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(ParcelError::validation(
                "weight_kg",
                format!("must be a positive number, got {}", self.weight_kg),
            ));
        }
        if self.weight_kg > MAX_WEIGHT_KG {
            return Err(ParcelError::validation(
                "weight_kg",
                format!("must not exceed {} kg, got {}", MAX_WEIGHT_KG, self.weight_kg),
            ));
        }
        if self.declared_value_cents < 0 {
            return Err(ParcelError::validation(
                "declared_value_cents",
                "must not be negative",
            ));
        }
        self.destination.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResponse {
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: StateCode,
}

impl From<&Address> for AddressResponse {
    fn from(address: &Address) -> Self {
        Self {
            postal_code: address.postal_code.clone(),
            street: address.street.clone(),
            number: address.number.clone(),
            neighborhood: address.neighborhood.clone(),
            city: address.city.clone(),
            state: address.state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
}

impl From<&Customer> for CustomerResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            tax_id: customer.tax_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightResponse {
    pub kind: FreightKind,
    pub cost_cents: i64,
    pub cost: String,
    pub distance_km: f64,
    pub estimated_days: u32,
}

impl From<&Freight> for FreightResponse {
    fn from(freight: &Freight) -> Self {
        Self {
            kind: freight.kind,
            cost_cents: freight.cost.cents(),
            cost: freight.cost.to_string(),
            distance_km: freight.distance_km,
            estimated_days: freight.estimated_days,
        }
    }
}

/// Fully linked view of a parcel, as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelResponse {
    pub id: ParcelId,
    pub code: TrackingCode,
    pub description: String,
    pub weight_kg: f64,
    pub declared_value_cents: i64,
    pub status: ParcelStatus,
    pub customer: CustomerResponse,
    pub origin: AddressResponse,
    pub destination: AddressResponse,
    pub freight: Option<FreightResponse>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl ParcelResponse {
    pub fn assemble(
        parcel: &Parcel,
        customer: &Customer,
        origin: &Address,
        destination: &Address,
        freight: Option<&Freight>,
    ) -> Result<Self> {
        let id = parcel.require_id()?;
        let code = parcel
            .code
            .clone()
            .ok_or_else(|| ParcelError::persistence(format!("parcel {} has no tracking code", id)))?;

        Ok(Self {
            id,
            code,
            description: parcel.description.clone(),
            weight_kg: parcel.weight_kg,
            declared_value_cents: parcel.declared_value.cents(),
            status: parcel.status,
            customer: customer.into(),
            origin: origin.into(),
            destination: destination.into(),
            freight: freight.map(FreightResponse::from),
            cancellation_reason: parcel.cancellation_reason.clone(),
            created_at: parcel.created_at,
            updated_at: parcel.updated_at,
            delivered_at: parcel.delivered_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination() -> AddressRequest {
        AddressRequest {
            postal_code: "01310-100".to_string(),
            street: "Avenida Paulista".to_string(),
            number: "1000".to_string(),
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    fn request() -> CreateParcelRequest {
        CreateParcelRequest {
            description: "Books".to_string(),
            weight_kg: 2.5,
            declared_value_cents: 12_000,
            freight_kind: FreightKind::Standard,
            destination: destination(),
            customer: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
        let address = request().destination.to_entity().unwrap();
        assert_eq!(address.state, StateCode::SP);
        assert!(address.id.is_none());
    }

    #[test]
    fn test_malformed_destination_is_rejected() {
        let mut req = request();
        req.destination.postal_code = "0131".to_string();
        assert!(matches!(
            req.validate(),
            Err(ParcelError::ValidationError { ref field, .. }) if field == "destination.postal_code"
        ));

        let mut req = request();
        req.destination.state = "ZZ".to_string();
        assert!(req.validate().is_err());

        let mut req = request();
        req.destination.city = " ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_weight_and_value_are_checked() {
        let mut req = request();
        req.weight_kg = 0.0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.weight_kg = f64::NAN;
        assert!(req.validate().is_err());

        let mut req = request();
        req.weight_kg = 1e300;
        assert!(matches!(
            req.validate(),
            Err(ParcelError::ValidationError { ref field, .. }) if field == "weight_kg"
        ));

        let mut req = request();
        req.weight_kg = MAX_WEIGHT_KG;
        assert!(req.validate().is_ok());

        let mut req = request();
        req.declared_value_cents = -1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_from_json_uses_defaults() {
        let json = serde_json::json!({
            "description": "Shoes",
            "weight_kg": 1.0,
            "destination": {
                "postal_code": "20040-020",
                "street": "Rua da Assembleia",
                "number": "10",
                "neighborhood": "Centro",
                "city": "Rio de Janeiro",
                "state": "RJ"
            }
        });
        let req: CreateParcelRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.freight_kind, FreightKind::Standard);
        assert_eq!(req.declared_value_cents, 0);
        assert!(req.customer.is_none());
    }
}

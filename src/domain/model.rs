use crate::domain::status::{ParcelStatus, StatusEvent};
use crate::utils::error::{ParcelError, Result};
use crate::utils::validation::validate_tracking_code;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(CustomerId);
entity_id!(AddressId);
entity_id!(FreightId);
entity_id!(ParcelId);

/// Public tracking identifier: `CE` followed by digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingCode(String);

impl TrackingCode {
    pub fn parse(code: &str) -> Result<Self> {
        validate_tracking_code(code)?;
        Ok(Self(code.to_string()))
    }

    /// Issued once, on the first save of a parcel. The identity suffix keeps
    /// codes unique; the date prefix keeps them readable.
    pub fn issue(id: ParcelId, issued_at: DateTime<Utc>) -> Self {
        Self(format!("CE{}{:06}", issued_at.format("%Y%m%d"), id.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TrackingCode {
    type Error = ParcelError;

    fn try_from(value: String) -> Result<Self> {
        validate_tracking_code(&value)?;
        Ok(Self(value))
    }
}

impl From<TrackingCode> for String {
    fn from(code: TrackingCode) -> Self {
        code.0
    }
}

/// Amount in centavos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}R$ {}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    North,
    Northeast,
    CentralWest,
    Southeast,
    South,
}

/// Brazilian federative unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateCode {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

impl StateCode {
    pub const ALL: [StateCode; 27] = [
        StateCode::AC,
        StateCode::AL,
        StateCode::AP,
        StateCode::AM,
        StateCode::BA,
        StateCode::CE,
        StateCode::DF,
        StateCode::ES,
        StateCode::GO,
        StateCode::MA,
        StateCode::MT,
        StateCode::MS,
        StateCode::MG,
        StateCode::PA,
        StateCode::PB,
        StateCode::PR,
        StateCode::PE,
        StateCode::PI,
        StateCode::RJ,
        StateCode::RN,
        StateCode::RS,
        StateCode::RO,
        StateCode::RR,
        StateCode::SC,
        StateCode::SP,
        StateCode::SE,
        StateCode::TO,
    ];

    pub fn region(self) -> Region {
        use StateCode::*;
        match self {
            AC | AP | AM | PA | RO | RR | TO => Region::North,
            AL | BA | CE | MA | PB | PE | PI | RN | SE => Region::Northeast,
            DF | GO | MT | MS => Region::CentralWest,
            ES | MG | RJ | SP => Region::Southeast,
            PR | RS | SC => Region::South,
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for StateCode {
    type Err = ParcelError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        StateCode::ALL
            .into_iter()
            .find(|code| code.to_string() == wanted)
            .ok_or_else(|| ParcelError::validation("state", format!("unknown state code '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<CustomerId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
}

impl Customer {
    pub fn new(name: &str, email: &str, phone: &str, tax_id: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            tax_id: tax_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Option<AddressId>,
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: StateCode,
}

impl Address {
    pub fn new(
        postal_code: &str,
        street: &str,
        number: &str,
        neighborhood: &str,
        city: &str,
        state: StateCode,
    ) -> Self {
        Self {
            id: None,
            postal_code: postal_code.to_string(),
            street: street.to_string(),
            number: number.to_string(),
            neighborhood: neighborhood.to_string(),
            city: city.to_string(),
            state,
        }
    }

    /// Equality on the postal fields only, ignoring identity.
    pub fn same_location(&self, other: &Address) -> bool {
        self.postal_code == other.postal_code
            && self.street == other.street
            && self.number == other.number
            && self.neighborhood == other.neighborhood
            && self.city == other.city
            && self.state == other.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreightKind {
    #[default]
    Standard,
    Express,
}

impl FromStr for FreightKind {
    type Err = ParcelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(FreightKind::Standard),
            "EXPRESS" => Ok(FreightKind::Express),
            _ => Err(ParcelError::validation(
                "freight_kind",
                format!("unknown freight kind '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freight {
    pub id: Option<FreightId>,
    pub parcel_id: ParcelId,
    pub kind: FreightKind,
    pub cost: Money,
    pub distance_km: f64,
    pub estimated_days: u32,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: Option<ParcelId>,
    pub code: Option<TrackingCode>,
    pub description: String,
    pub weight_kg: f64,
    pub declared_value: Money,
    pub freight_kind: FreightKind,
    pub status: ParcelStatus,
    pub customer_id: CustomerId,
    pub origin_id: AddressId,
    pub destination_id: AddressId,
    pub freight_id: Option<FreightId>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Descriptive fields of a parcel that the caller supplies.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelDetails {
    pub description: String,
    pub weight_kg: f64,
    pub declared_value: Money,
    pub freight_kind: FreightKind,
}

impl Parcel {
    pub fn new(
        details: ParcelDetails,
        customer_id: CustomerId,
        origin_id: AddressId,
        destination_id: AddressId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            code: None,
            description: details.description,
            weight_kg: details.weight_kg,
            declared_value: details.declared_value,
            freight_kind: details.freight_kind,
            status: ParcelStatus::Pending,
            customer_id,
            origin_id,
            destination_id,
            freight_id: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn require_id(&self) -> Result<ParcelId> {
        self.id
            .ok_or_else(|| ParcelError::persistence("parcel has not been persisted yet"))
    }

    /// Applies `event`, failing when the table has no edge for it.
    pub fn apply(&mut self, event: StatusEvent) -> Result<ParcelStatus> {
        let next = self
            .status
            .transition(event)
            .ok_or_else(|| ParcelError::InvalidTransition {
                from: self.status.to_string(),
                event: event.to_string(),
            })?;

        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        if next == ParcelStatus::Delivered {
            self.delivered_at = Some(now);
        }
        Ok(next)
    }

    pub fn confirm(&mut self) -> Result<ParcelStatus> {
        self.apply(StatusEvent::Confirm)
    }

    pub fn start_transit(&mut self) -> Result<ParcelStatus> {
        self.apply(StatusEvent::StartTransit)
    }

    pub fn finish_delivery(&mut self) -> Result<ParcelStatus> {
        self.apply(StatusEvent::FinishDelivery)
    }

    pub fn cancel(&mut self, reason: &str) -> Result<ParcelStatus> {
        let status = self.apply(StatusEvent::Cancel)?;
        self.cancellation_reason = Some(reason.to_string());
        Ok(status)
    }

    /// One step forward; terminal parcels are left as they are.
    pub fn advance(&mut self) -> Result<ParcelStatus> {
        match self.status.forward_event() {
            Some(event) => self.apply(event),
            None => Ok(self.status),
        }
    }

    pub fn attach_freight(&mut self, freight_id: FreightId) -> Result<()> {
        if let Some(existing) = self.freight_id {
            return Err(ParcelError::persistence(format!(
                "freight {} is already attached to this parcel",
                existing
            )));
        }
        self.freight_id = Some(freight_id);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_parcel() -> Parcel {
        Parcel::new(
            ParcelDetails {
                description: "Books".to_string(),
                weight_kg: 1.2,
                declared_value: Money::from_cents(15_000),
                freight_kind: FreightKind::Standard,
            },
            CustomerId(1),
            AddressId(1),
            AddressId(2),
        )
    }

    #[test]
    fn test_tracking_code_issue_and_parse() {
        let issued_at = DateTime::parse_from_rfc3339("2024-03-05T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let code = TrackingCode::issue(ParcelId(42), issued_at);
        assert_eq!(code.as_str(), "CE20240305000042");
        assert!(TrackingCode::parse(code.as_str()).is_ok());
        assert!(TrackingCode::parse("XX123").is_err());
    }

    #[test]
    fn test_tracking_code_deserialize_rejects_malformed() {
        assert!(serde_json::from_str::<TrackingCode>("\"CE12\"").is_ok());
        assert!(serde_json::from_str::<TrackingCode>("\"12CE\"").is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(123_456).to_string(), "R$ 1234.56");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-R$ 2.50");
    }

    #[test]
    fn test_state_code_parse_and_region() {
        assert_eq!("sp".parse::<StateCode>().unwrap(), StateCode::SP);
        assert_eq!(StateCode::SP.region(), Region::Southeast);
        assert_eq!(StateCode::AM.region(), Region::North);
        assert!("XX".parse::<StateCode>().is_err());
    }

    #[test]
    fn test_new_parcel_is_pending() {
        let parcel = sample_parcel();
        assert_eq!(parcel.status, ParcelStatus::Pending);
        assert!(parcel.is_active());
        assert!(parcel.code.is_none());
        assert!(parcel.require_id().is_err());
    }

    #[test]
    fn test_advance_walks_lifecycle_then_stops() {
        let mut parcel = sample_parcel();
        assert_eq!(parcel.advance().unwrap(), ParcelStatus::Confirmed);
        assert_eq!(parcel.advance().unwrap(), ParcelStatus::InTransit);
        assert_eq!(parcel.advance().unwrap(), ParcelStatus::Delivered);
        assert!(parcel.delivered_at.is_some());
        assert_eq!(parcel.advance().unwrap(), ParcelStatus::Delivered);
    }

    #[test]
    fn test_direct_transitions_enforce_order() {
        let mut parcel = sample_parcel();
        assert!(matches!(
            parcel.finish_delivery(),
            Err(ParcelError::InvalidTransition { .. })
        ));
        parcel.confirm().unwrap();
        parcel.start_transit().unwrap();
        assert!(parcel.confirm().is_err());
    }

    #[test]
    fn test_cancel_records_reason_once() {
        let mut parcel = sample_parcel();
        parcel.cancel("damaged in transit").unwrap();
        assert_eq!(parcel.status, ParcelStatus::Cancelled);
        assert!(parcel.cancel("second reason").is_err());
        assert_eq!(
            parcel.cancellation_reason.as_deref(),
            Some("damaged in transit")
        );
    }

    #[test]
    fn test_freight_attached_once() {
        let mut parcel = sample_parcel();
        parcel.attach_freight(FreightId(7)).unwrap();
        assert!(parcel.attach_freight(FreightId(8)).is_err());
        assert_eq!(parcel.freight_id, Some(FreightId(7)));
    }
}

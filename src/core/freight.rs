use crate::domain::model::{Address, Freight, FreightKind, Money, Parcel};
use crate::domain::ports::FreightCalculator;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Rough road distance and delivery time for an origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    SameCity,
    SameState,
    SameRegion,
    Interregional,
}

impl DistanceBand {
    pub fn between(origin: &Address, destination: &Address) -> Self {
        if origin.state == destination.state {
            if origin.city.trim().eq_ignore_ascii_case(destination.city.trim()) {
                DistanceBand::SameCity
            } else {
                DistanceBand::SameState
            }
        } else if origin.state.region() == destination.state.region() {
            DistanceBand::SameRegion
        } else {
            DistanceBand::Interregional
        }
    }

    pub fn distance_km(self) -> f64 {
        match self {
            DistanceBand::SameCity => 15.0,
            DistanceBand::SameState => 150.0,
            DistanceBand::SameRegion => 600.0,
            DistanceBand::Interregional => 1800.0,
        }
    }

    pub fn standard_days(self) -> u32 {
        match self {
            DistanceBand::SameCity => 1,
            DistanceBand::SameState => 3,
            DistanceBand::SameRegion => 5,
            DistanceBand::Interregional => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreightRates {
    pub base_fee_cents: i64,
    pub per_km_cents: f64,
    pub per_kg_cents: f64,
    pub express_multiplier: f64,
}

impl Default for FreightRates {
    fn default() -> Self {
        Self {
            base_fee_cents: 1_500,
            per_km_cents: 5.0,
            per_kg_cents: 250.0,
            express_multiplier: 1.5,
        }
    }
}

/// Prices a parcel as `base + km × per_km + kg × per_kg`, scaled for express.
#[derive(Debug, Clone, Default)]
pub struct RateFreightCalculator {
    rates: FreightRates,
}

impl RateFreightCalculator {
    pub fn new(rates: FreightRates) -> Self {
        Self { rates }
    }

    pub fn quote(&self, kind: FreightKind, weight_kg: f64, band: DistanceBand) -> (Money, u32) {
        let distance = band.distance_km();
        let raw = self.rates.base_fee_cents as f64
            + distance * self.rates.per_km_cents
            + weight_kg * self.rates.per_kg_cents;

        match kind {
            FreightKind::Standard => (Money::from_cents(raw.round() as i64), band.standard_days()),
            FreightKind::Express => (
                Money::from_cents((raw * self.rates.express_multiplier).round() as i64),
                band.standard_days().div_ceil(2),
            ),
        }
    }
}

#[async_trait]
impl FreightCalculator for RateFreightCalculator {
    async fn calculate(
        &self,
        parcel: &Parcel,
        origin: &Address,
        destination: &Address,
    ) -> Result<Freight> {
        let parcel_id = parcel.require_id()?;
        let band = DistanceBand::between(origin, destination);
        let (cost, estimated_days) = self.quote(parcel.freight_kind, parcel.weight_kg, band);

        tracing::debug!(
            "Freight for parcel {}: {:?}, {} km, {}",
            parcel_id,
            band,
            band.distance_km(),
            cost
        );

        Ok(Freight {
            id: None,
            parcel_id,
            kind: parcel.freight_kind,
            cost,
            distance_km: band.distance_km(),
            estimated_days,
            calculated_at: Utc::now(),
        })
    }
}

pub mod freight;
pub mod parcel_service;

pub use crate::domain::dto::{AddressRequest, CreateParcelRequest, CustomerRequest, ParcelResponse};
pub use crate::domain::model::{Address, Customer, Freight, FreightKind, Money, Parcel, StateCode};
pub use crate::domain::ports::{FreightCalculator, ParcelStore, PostalLookup, Transaction, TxMode};
pub use crate::domain::status::ParcelStatus;
pub use crate::utils::error::Result;
pub use freight::{FreightRates, RateFreightCalculator};
pub use parcel_service::{ParcelService, ServiceSettings};

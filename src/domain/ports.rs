use crate::domain::model::{
    Address, AddressId, Customer, CustomerId, Freight, FreightId, Parcel, ParcelId, TrackingCode,
};
use crate::domain::status::ParcelStatus;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait CustomerRepository: Send {
    async fn save_customer(&mut self, customer: Customer) -> Result<Customer>;
    async fn find_customer_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>>;
    async fn find_customer_by_tax_id(&mut self, tax_id: &str) -> Result<Option<Customer>>;
}

#[async_trait]
pub trait AddressRepository: Send {
    async fn save_address(&mut self, address: Address) -> Result<Address>;
    async fn find_address_by_id(&mut self, id: AddressId) -> Result<Option<Address>>;
}

#[async_trait]
pub trait FreightRepository: Send {
    async fn save_freight(&mut self, freight: Freight) -> Result<Freight>;
    async fn find_freight_by_id(&mut self, id: FreightId) -> Result<Option<Freight>>;
}

/// Saving a parcel without identity assigns both its id and tracking code.
#[async_trait]
pub trait ParcelRepository: Send {
    async fn save_parcel(&mut self, parcel: Parcel) -> Result<Parcel>;
    async fn find_parcel_by_id(&mut self, id: ParcelId) -> Result<Option<Parcel>>;
    async fn find_parcel_by_code(&mut self, code: &TrackingCode) -> Result<Option<Parcel>>;
    async fn find_parcels_by_status_not_in(
        &mut self,
        statuses: &[ParcelStatus],
    ) -> Result<Vec<Parcel>>;
    async fn find_all_parcels(&mut self) -> Result<Vec<Parcel>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    ReadWrite,
    ReadOnly,
}

/// Unit of work over all four repositories. Dropping it without calling
/// `commit` discards every write made through it.
pub trait Transaction:
    CustomerRepository + AddressRepository + FreightRepository + ParcelRepository + Send
{
    fn commit(self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ParcelStore: Send + Sync {
    type Tx: Transaction;

    fn begin(&self, mode: TxMode) -> impl std::future::Future<Output = Result<Self::Tx>> + Send;
}

/// Structured address returned by a postal code lookup. `state` is the raw
/// two-letter code as the remote service sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// `Ok(None)` when the service knows nothing about `postal_code`.
    async fn lookup(&self, postal_code: &str) -> Result<Option<PostalAddress>>;
}

#[async_trait]
pub trait FreightCalculator: Send + Sync {
    /// `parcel` must already be persisted; the returned freight is not.
    async fn calculate(
        &self,
        parcel: &Parcel,
        origin: &Address,
        destination: &Address,
    ) -> Result<Freight>;
}

use crate::domain::dto::{CreateParcelRequest, ParcelResponse};
use crate::domain::model::{Address, Customer, Parcel, ParcelId, StateCode, TrackingCode};
use crate::domain::ports::{
    AddressRepository, CustomerRepository, FreightCalculator, FreightRepository, ParcelRepository,
    ParcelStore, PostalLookup, Transaction, TxMode,
};
use crate::domain::status::ParcelStatus;
use crate::utils::error::{ParcelError, Result};
use crate::utils::validation::{validate_non_blank, Validate};

/// Fixed values the creation flow falls back on.
///
/// Every parcel is currently bound to `default_customer`, whatever the
/// caller sends, and ships from `origin_postal_code`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub origin_postal_code: String,
    pub origin_number: String,
    pub fallback_origin: Address,
    pub default_customer: Customer,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            origin_postal_code: "13801-005".to_string(),
            origin_number: "567".to_string(),
            fallback_origin: Address::new(
                "13801-005",
                "Rua Ariovaldo Silveira Franco",
                "567",
                "Jardim 31 de Março",
                "Mogi Mirim",
                StateCode::SP,
            ),
            default_customer: Customer::new(
                "Jailson Mendes",
                "jailsonmmm@gmail.com",
                "11976543211",
                "123.123.128-09",
            ),
        }
    }
}

pub struct ParcelService<S, P, F> {
    store: S,
    postal_lookup: P,
    freight_calculator: F,
    settings: ServiceSettings,
}

fn persisted<T>(id: Option<T>, entity: &str) -> Result<T> {
    id.ok_or_else(|| ParcelError::persistence(format!("{} was saved without an identity", entity)))
}

/// Loads everything a parcel links to and builds its response.
async fn represent<T: Transaction>(tx: &mut T, parcel: &Parcel) -> Result<ParcelResponse> {
    let customer = tx
        .find_customer_by_id(parcel.customer_id)
        .await?
        .ok_or_else(|| dangling("customer", parcel.customer_id))?;
    let origin = tx
        .find_address_by_id(parcel.origin_id)
        .await?
        .ok_or_else(|| dangling("origin address", parcel.origin_id))?;
    let destination = tx
        .find_address_by_id(parcel.destination_id)
        .await?
        .ok_or_else(|| dangling("destination address", parcel.destination_id))?;
    let freight = match parcel.freight_id {
        Some(id) => Some(
            tx.find_freight_by_id(id)
                .await?
                .ok_or_else(|| dangling("freight", id))?,
        ),
        None => None,
    };

    ParcelResponse::assemble(parcel, &customer, &origin, &destination, freight.as_ref())
}

fn dangling(entity: &str, id: impl std::fmt::Display) -> ParcelError {
    ParcelError::persistence(format!("parcel references missing {} {}", entity, id))
}

impl<S, P, F> ParcelService<S, P, F>
where
    S: ParcelStore,
    P: PostalLookup,
    F: FreightCalculator,
{
    pub fn new(store: S, postal_lookup: P, freight_calculator: F) -> Self {
        Self {
            store,
            postal_lookup,
            freight_calculator,
            settings: ServiceSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Origin from the postal lookup, or the fallback address when the
    /// lookup errors, finds nothing, or answers with an unknown state.
    async fn resolve_origin(&self) -> Address {
        let postal_code = &self.settings.origin_postal_code;
        match self.postal_lookup.lookup(postal_code).await {
            Ok(Some(found)) => match found.state.parse::<StateCode>() {
                Ok(state) => Address::new(
                    &found.postal_code,
                    &found.street,
                    &self.settings.origin_number,
                    &found.neighborhood,
                    &found.city,
                    state,
                ),
                Err(_) => {
                    tracing::warn!(
                        "Postal lookup for {} returned unknown state '{}', using fallback origin",
                        postal_code,
                        found.state
                    );
                    self.settings.fallback_origin.clone()
                }
            },
            Ok(None) => {
                tracing::warn!("No address found for {}, using fallback origin", postal_code);
                self.settings.fallback_origin.clone()
            }
            Err(e) => {
                tracing::warn!(
                    "Postal lookup for {} failed ({}), using fallback origin",
                    postal_code,
                    e
                );
                self.settings.fallback_origin.clone()
            }
        }
    }

    pub async fn create_parcel(&self, request: &CreateParcelRequest) -> Result<ParcelResponse> {
        request.validate()?;
        let destination = request.destination.to_entity()?;
        if request.customer.is_some() {
            tracing::debug!("Caller-supplied customer ignored, binding to the default customer");
        }

        let origin = self.resolve_origin().await;

        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let origin = tx.save_address(origin).await?;
        let destination = tx.save_address(destination).await?;

        let default_customer = &self.settings.default_customer;
        let customer = match tx.find_customer_by_tax_id(&default_customer.tax_id).await? {
            Some(existing) => existing,
            None => {
                tracing::info!("Registering default customer {}", default_customer.tax_id);
                tx.save_customer(default_customer.clone()).await?
            }
        };

        let parcel = Parcel::new(
            request.details(),
            persisted(customer.id, "customer")?,
            persisted(origin.id, "origin address")?,
            persisted(destination.id, "destination address")?,
        );
        let mut parcel = tx.save_parcel(parcel).await?;

        let freight = self
            .freight_calculator
            .calculate(&parcel, &origin, &destination)
            .await?;
        let freight = tx.save_freight(freight).await?;
        parcel.attach_freight(persisted(freight.id, "freight")?)?;
        let parcel = tx.save_parcel(parcel).await?;

        let response =
            ParcelResponse::assemble(&parcel, &customer, &origin, &destination, Some(&freight))?;
        tx.commit().await?;

        tracing::info!(
            "Parcel {} created ({} to {}/{}, freight {})",
            response.code,
            origin.city,
            destination.city,
            destination.state,
            freight.cost
        );
        Ok(response)
    }

    /// Moves an active parcel one step forward. Delivered and cancelled
    /// parcels are returned unchanged.
    pub async fn advance_status(&self, code: &str) -> Result<ParcelStatus> {
        let code = TrackingCode::parse(code)?;
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let mut parcel = tx
            .find_parcel_by_code(&code)
            .await?
            .ok_or_else(|| ParcelError::not_found("parcel", &code))?;

        if !parcel.is_active() {
            tracing::debug!("Parcel {} is {}, nothing to advance", code, parcel.status);
            return Ok(parcel.status);
        }

        let previous = parcel.status;
        let status = parcel.advance()?;
        tx.save_parcel(parcel).await?;
        tx.commit().await?;

        tracing::info!("Parcel {} moved from {} to {}", code, previous, status);
        Ok(status)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<ParcelResponse> {
        let code = TrackingCode::parse(code)?;
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;

        let parcel = tx
            .find_parcel_by_code(&code)
            .await?
            .ok_or_else(|| ParcelError::not_found("parcel", &code))?;
        represent(&mut tx, &parcel).await
    }

    pub async fn cancel(&self, id: ParcelId, reason: &str) -> Result<ParcelStatus> {
        validate_non_blank("reason", reason)?;
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let parcel = tx
            .find_parcel_by_id(id)
            .await?
            .ok_or_else(|| ParcelError::not_found("parcel", id))?;
        Self::cancel_loaded(tx, parcel, reason).await
    }

    pub async fn cancel_by_code(&self, code: &str, reason: &str) -> Result<ParcelStatus> {
        let code = TrackingCode::parse(code)?;
        validate_non_blank("reason", reason)?;
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let parcel = tx
            .find_parcel_by_code(&code)
            .await?
            .ok_or_else(|| ParcelError::not_found("parcel", &code))?;
        Self::cancel_loaded(tx, parcel, reason).await
    }

    async fn cancel_loaded(mut tx: S::Tx, mut parcel: Parcel, reason: &str) -> Result<ParcelStatus> {
        if !parcel.is_active() {
            tracing::debug!("Parcel {:?} is {}, not cancelling", parcel.code, parcel.status);
            return Ok(parcel.status);
        }

        let status = parcel.cancel(reason)?;
        let code = parcel.code.clone();
        tx.save_parcel(parcel).await?;
        tx.commit().await?;

        tracing::info!("Parcel {:?} cancelled: {}", code, reason);
        Ok(status)
    }

    /// Parcels whose status is not in `excluded`, in storage order.
    pub async fn list_excluding_statuses(
        &self,
        excluded: &[ParcelStatus],
    ) -> Result<Vec<ParcelResponse>> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let parcels = tx.find_parcels_by_status_not_in(excluded).await?;

        let mut responses = Vec::with_capacity(parcels.len());
        for parcel in &parcels {
            responses.push(represent(&mut tx, parcel).await?);
        }
        Ok(responses)
    }

    pub async fn list_all(&self) -> Result<Vec<ParcelResponse>> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let parcels = tx.find_all_parcels().await?;

        let mut responses = Vec::with_capacity(parcels.len());
        for parcel in &parcels {
            responses.push(represent(&mut tx, parcel).await?);
        }
        Ok(responses)
    }
}

use crate::domain::model::{
    Address, AddressId, Customer, CustomerId, Freight, FreightId, Parcel, ParcelId, TrackingCode,
};
use crate::domain::ports::{
    AddressRepository, CustomerRepository, FreightRepository, ParcelRepository, ParcelStore,
    Transaction, TxMode,
};
use crate::domain::status::ParcelStatus;
use crate::utils::error::{ParcelError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Sequences {
    customer: u64,
    address: u64,
    freight: u64,
    parcel: u64,
}

/// Every table, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    sequences: Sequences,
    customers: Vec<Customer>,
    addresses: Vec<Address>,
    freights: Vec<Freight>,
    parcels: Vec<Parcel>,
}

/// Process-local store. Write transactions take an exclusive lock and work
/// on a private copy, so a transaction that is dropped leaves no trace and
/// concurrent writers serialize. When opened on a file, every commit writes
/// a JSON snapshot before the new state becomes visible.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` if it exists; otherwise starts empty and creates the file
    /// on the first commit.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ParcelError::persistence(format!(
                    "data file {} is corrupt: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Data file {} not found, starting empty", path.display());
                StoreState::default()
            }
            Err(e) => return Err(ParcelError::IoError(e)),
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            snapshot_path: Some(path),
        })
    }
}

impl ParcelStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self, mode: TxMode) -> Result<InMemoryTransaction> {
        let state = match mode {
            TxMode::ReadOnly => TxState::Read(Arc::clone(&self.state).read_owned().await),
            TxMode::ReadWrite => {
                let guard = Arc::clone(&self.state).write_owned().await;
                let working = (*guard).clone();
                TxState::Write { guard, working }
            }
        };

        Ok(InMemoryTransaction {
            state,
            snapshot_path: self.snapshot_path.clone(),
        })
    }
}

enum TxState {
    Read(OwnedRwLockReadGuard<StoreState>),
    Write {
        guard: OwnedRwLockWriteGuard<StoreState>,
        working: StoreState,
    },
}

pub struct InMemoryTransaction {
    state: TxState,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryTransaction {
    fn view(&self) -> &StoreState {
        match &self.state {
            TxState::Read(guard) => &**guard,
            TxState::Write { working, .. } => working,
        }
    }

    fn view_mut(&mut self) -> Result<&mut StoreState> {
        match &mut self.state {
            TxState::Read(_) => Err(ParcelError::persistence(
                "write attempted in a read-only transaction",
            )),
            TxState::Write { working, .. } => Ok(working),
        }
    }
}

async fn write_snapshot(path: &Path, state: &StoreState) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
        ParcelError::persistence(format!("cannot write {}: {}", tmp.display(), e))
    })?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        ParcelError::persistence(format!("cannot replace {}: {}", path.display(), e))
    })?;
    Ok(())
}

impl Transaction for InMemoryTransaction {
    async fn commit(self) -> Result<()> {
        match self.state {
            TxState::Read(_) => Ok(()),
            TxState::Write { mut guard, working } => {
                if let Some(path) = &self.snapshot_path {
                    write_snapshot(path, &working).await?;
                }
                *guard = working;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryTransaction {
    async fn save_customer(&mut self, mut customer: Customer) -> Result<Customer> {
        let state = self.view_mut()?;
        match customer.id {
            None => {
                if state.customers.iter().any(|c| c.tax_id == customer.tax_id) {
                    return Err(ParcelError::persistence(format!(
                        "a customer with tax id {} already exists",
                        customer.tax_id
                    )));
                }
                state.sequences.customer += 1;
                customer.id = Some(CustomerId(state.sequences.customer));
                state.customers.push(customer.clone());
            }
            Some(id) => {
                let slot = state
                    .customers
                    .iter_mut()
                    .find(|c| c.id == Some(id))
                    .ok_or_else(|| ParcelError::persistence(format!("customer {} does not exist", id)))?;
                *slot = customer.clone();
            }
        }
        Ok(customer)
    }

    async fn find_customer_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.view().customers.iter().find(|c| c.id == Some(id)).cloned())
    }

    async fn find_customer_by_tax_id(&mut self, tax_id: &str) -> Result<Option<Customer>> {
        Ok(self
            .view()
            .customers
            .iter()
            .find(|c| c.tax_id == tax_id)
            .cloned())
    }
}

#[async_trait]
impl AddressRepository for InMemoryTransaction {
    async fn save_address(&mut self, mut address: Address) -> Result<Address> {
        let state = self.view_mut()?;
        match address.id {
            None => {
                state.sequences.address += 1;
                address.id = Some(AddressId(state.sequences.address));
                state.addresses.push(address.clone());
            }
            Some(id) => {
                let slot = state
                    .addresses
                    .iter_mut()
                    .find(|a| a.id == Some(id))
                    .ok_or_else(|| ParcelError::persistence(format!("address {} does not exist", id)))?;
                *slot = address.clone();
            }
        }
        Ok(address)
    }

    async fn find_address_by_id(&mut self, id: AddressId) -> Result<Option<Address>> {
        Ok(self.view().addresses.iter().find(|a| a.id == Some(id)).cloned())
    }
}

#[async_trait]
impl FreightRepository for InMemoryTransaction {
    async fn save_freight(&mut self, mut freight: Freight) -> Result<Freight> {
        let state = self.view_mut()?;
        match freight.id {
            None => {
                state.sequences.freight += 1;
                freight.id = Some(FreightId(state.sequences.freight));
                state.freights.push(freight.clone());
            }
            Some(id) => {
                let slot = state
                    .freights
                    .iter_mut()
                    .find(|f| f.id == Some(id))
                    .ok_or_else(|| ParcelError::persistence(format!("freight {} does not exist", id)))?;
                *slot = freight.clone();
            }
        }
        Ok(freight)
    }

    async fn find_freight_by_id(&mut self, id: FreightId) -> Result<Option<Freight>> {
        Ok(self.view().freights.iter().find(|f| f.id == Some(id)).cloned())
    }
}

#[async_trait]
impl ParcelRepository for InMemoryTransaction {
    async fn save_parcel(&mut self, mut parcel: Parcel) -> Result<Parcel> {
        let state = self.view_mut()?;
        match parcel.id {
            None => {
                state.sequences.parcel += 1;
                let id = ParcelId(state.sequences.parcel);
                parcel.id = Some(id);
                parcel.code = Some(TrackingCode::issue(id, parcel.created_at));
                state.parcels.push(parcel.clone());
            }
            Some(id) => {
                let slot = state
                    .parcels
                    .iter_mut()
                    .find(|p| p.id == Some(id))
                    .ok_or_else(|| ParcelError::persistence(format!("parcel {} does not exist", id)))?;
                if slot.code != parcel.code {
                    return Err(ParcelError::persistence(format!(
                        "tracking code of parcel {} cannot change",
                        id
                    )));
                }
                *slot = parcel.clone();
            }
        }
        Ok(parcel)
    }

    async fn find_parcel_by_id(&mut self, id: ParcelId) -> Result<Option<Parcel>> {
        Ok(self.view().parcels.iter().find(|p| p.id == Some(id)).cloned())
    }

    async fn find_parcel_by_code(&mut self, code: &TrackingCode) -> Result<Option<Parcel>> {
        Ok(self
            .view()
            .parcels
            .iter()
            .find(|p| p.code.as_ref() == Some(code))
            .cloned())
    }

    async fn find_parcels_by_status_not_in(
        &mut self,
        statuses: &[ParcelStatus],
    ) -> Result<Vec<Parcel>> {
        Ok(self
            .view()
            .parcels
            .iter()
            .filter(|p| !statuses.contains(&p.status))
            .cloned()
            .collect())
    }

    async fn find_all_parcels(&mut self) -> Result<Vec<Parcel>> {
        Ok(self.view().parcels.clone())
    }
}

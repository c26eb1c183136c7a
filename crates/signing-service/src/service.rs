use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::crypto::{Algorithm, AlgorithmRegistry};
use crate::device::{Device, DeviceView, SignatureRecord};
use crate::error::ServiceError;
use crate::store::{DeviceStore, InMemoryDeviceStore};

/// Device operations offered to the transport layer.
///
/// All methods are blocking. Key generation and signing are CPU-bound, so
/// async callers should run them on `spawn_blocking`.
#[derive(Clone)]
pub struct SigningService {
    store: Arc<dyn DeviceStore>,
    registry: Arc<AlgorithmRegistry>,
}

impl SigningService {
    pub fn new(store: Arc<dyn DeviceStore>, registry: Arc<AlgorithmRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn in_memory(registry: AlgorithmRegistry) -> Self {
        Self::new(Arc::new(InMemoryDeviceStore::new()), Arc::new(registry))
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Create a device with a fresh key pair and an empty chain.
    ///
    /// A missing or empty `id` is replaced by a random UUID.
    pub fn create_device(
        &self,
        id: Option<String>,
        algorithm: Algorithm,
        label: Option<String>,
    ) -> Result<DeviceView, ServiceError> {
        if !self.registry.supports(algorithm) {
            return Err(ServiceError::UnsupportedAlgorithm(algorithm.to_string()));
        }

        let id = id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        // Cheap early exit before key generation; `create` re-checks atomically.
        if self.store.get(&id).is_ok() {
            return Err(ServiceError::AlreadyExists(id));
        }

        let key_pair = self.registry.generate(algorithm)?;
        let device = self.store.create(Device::new(id, label, key_pair))?;
        info!(device = %device.id(), %algorithm, "created signature device");
        Ok(device.view())
    }

    pub fn get_device(&self, id: &str) -> Result<DeviceView, ServiceError> {
        Ok(self.store.get(id)?.view())
    }

    pub fn list_devices(&self) -> Vec<DeviceView> {
        self.store.list().iter().map(|device| device.view()).collect()
    }

    /// Sign `data` with the device's key as the next link of its chain.
    pub fn sign_transaction(&self, id: &str, data: &str) -> Result<SignatureRecord, ServiceError> {
        let device = self.store.get(id)?;
        let signer = self.registry.signer(device.algorithm(), device.private_key())?;
        let record = device.sign(signer.as_ref(), data)?;
        drop(signer);
        self.store.update(device)?;
        Ok(record)
    }

    pub fn delete_device(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        info!(device = %id, "deleted signature device");
        Ok(())
    }

    /// Check a signature previously returned for device `id`.
    pub fn verify_signature(
        &self,
        id: &str,
        signed_data: &str,
        signature: &str,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.get(id)?.verify(signed_data, signature))
    }
}

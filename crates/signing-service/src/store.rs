use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use crate::device::Device;
use crate::error::StoreError;

/// CRUD contract over devices keyed by id.
///
/// A store only owns device lifetimes. Chain state is mutated solely through
/// [`Device::sign`], and store locks are never held across a signature.
pub trait DeviceStore: Send + Sync {
    fn create(&self, device: Device) -> Result<Arc<Device>, StoreError>;

    fn get(&self, id: &str) -> Result<Arc<Device>, StoreError>;

    /// Replace the stored record with `device`.
    ///
    /// Fails with `NotFound` unless the id still maps to this same record,
    /// so an update racing a delete never resurrects or clobbers a device.
    fn update(&self, device: Arc<Device>) -> Result<(), StoreError>;

    /// Snapshot of all devices, in no particular order.
    fn list(&self) -> Vec<Arc<Device>>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, Arc<Device>>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for InMemoryDeviceStore {
    fn create(&self, device: Device) -> Result<Arc<Device>, StoreError> {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        match devices.entry(device.id().to_string()) {
            Entry::Occupied(entry) => Err(StoreError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => Ok(Arc::clone(entry.insert(Arc::new(device)))),
        }
    }

    fn get(&self, id: &str) -> Result<Arc<Device>, StoreError> {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        devices
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn update(&self, device: Arc<Device>) -> Result<(), StoreError> {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        match devices.get_mut(device.id()) {
            Some(slot) if Arc::ptr_eq(slot, &device) => {
                *slot = device;
                Ok(())
            }
            _ => Err(StoreError::NotFound(device.id().to_string())),
        }
    }

    fn list(&self) -> Vec<Arc<Device>> {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        devices.values().cloned().collect()
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        devices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

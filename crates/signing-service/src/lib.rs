pub mod config;
pub mod crypto;
pub mod device;
pub mod error;
pub mod server;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use crypto::{Algorithm, AlgorithmRegistry, DeviceSigner, KeyGenerator, KeyPair};
pub use device::{Device, DeviceView, SignatureRecord};
pub use error::{ApiError, CryptoError, ServiceError, StoreError};
pub use server::{AppState, router, run};
pub use service::SigningService;
pub use store::{DeviceStore, InMemoryDeviceStore};

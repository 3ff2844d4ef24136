//! ShareSync Core - Domain logic and business rules for file shares
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Share`, `ShareList`, `Capability`, `OperationResult`
//! - **Repositories** - `ShareRepository`, `CapabilityRepository`
//! - **Delete claims** - `InFlightDeletes`, at most one delete per share in flight
//! - **Use cases** - `RefreshSharesUseCase`, `CreatePublicShareUseCase`,
//!   `UpdatePublicShareUseCase`, `DeleteShareUseCase`, `RefreshCapabilitiesUseCase`
//! - **Port definitions** - Traits for adapters: `IRemoteShareSource`,
//!   `ILocalShareCache`, `ICapabilityProvider`
//!
//! # Architecture
//!
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Repositories reconcile the local cache with the remote source, and
//! use cases orchestrate domain rules through the repositories.

pub mod config;
pub mod domain;
pub mod in_flight;
pub mod ports;
pub mod repository;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;

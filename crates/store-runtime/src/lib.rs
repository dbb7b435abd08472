//! # Aurelia Store Runtime
//!
//! Builds every subsystem, wires them through the event bus and serves the
//! HTTP gateway. `main.rs` is a thin wrapper around [`StoreRuntime`].
//!
//! ## Modules
//!
//! - `container/` - configuration and dependency injection
//! - `adapters/` - BaaS repositories and cross-subsystem bridges
//! - `handlers/` - runtime-owned choreography handlers
//! - `wiring/` - subscriptions and handler tasks
//!
//! ## Choreography
//!
//! ```text
//! Webhook ──→ Payments(5) ──→ Orders(4) ──OrderPaid──→ Event Bus
//!                                                         │
//!                    ┌────────────────────────────────────┼──────────────────┐
//!                    ↓                                    ↓                  │
//!              Inventory(2) ──StockChanged──→ Catalog(1)  Notifications(6) ←─┘
//!                    │                                    ↑
//!                    └──────────────LowStock──────────────┘
//! ```

pub mod adapters;
pub mod cli;
pub mod container;
pub mod handlers;
pub mod logging;
pub mod runtime;
pub mod wiring;

pub use container::{ConfigError, ContainerError, Repositories, StoreConfig, SubsystemContainer};
pub use runtime::{RuntimeError, StoreRuntime};

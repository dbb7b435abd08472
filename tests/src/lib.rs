//! # Aurelia End-to-End Flows
//!
//! Every subsystem wired the way the runtime wires it, on in-memory
//! repositories, the fake payment processor and the outbox mailer. Requests
//! go through the full gateway router; the choreography handlers run as
//! real tasks.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs                # Store fixture: router, handlers, fakes
//! └── integration/
//!     ├── checkout_flow.rs      # checkout → webhook → stock → emails
//!     ├── refund_flow.rs        # refunds and restock
//!     └── storefront_flow.rs    # fulfilment, alerts, newsletter, reviews
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p au-tests
//! cargo test -p au-tests integration::refund_flow::
//! ```

#[cfg(test)]
mod harness;

pub mod integration;

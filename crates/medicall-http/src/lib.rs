//! REST client for the MediCall CRM backend.
//!
//! [`HttpCrmApi`] implements [`medicall_core::CrmApi`] over `reqwest`, so the
//! sync controller can be pointed at a real server.

mod client;

pub use client::*;

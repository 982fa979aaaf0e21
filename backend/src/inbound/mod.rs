//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! The REST surface lives under [`http`]; the notification scheduler is driven
//! by the server binary rather than by an inbound adapter.

pub mod http;

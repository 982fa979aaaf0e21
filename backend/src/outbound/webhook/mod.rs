//! Webhook delivery adapter.

mod http_dispatcher;

pub use http_dispatcher::HttpNotificationDispatcher;

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered webhook subscriptions, one row per subscription.
    subscriptions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        callback_url -> Text,
        timeout_minutes -> Float8,
        /// `stringency` or `confirmed`.
        field -> Text,
        country -> Text,
        /// `ON_CHANGE`, `ON_TIMEOUT`, or `ON_UPDATE`.
        trigger_kind -> Text,
        occurrences -> Float8,
        last_observed_at -> Timestamptz,
    }
}

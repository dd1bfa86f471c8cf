//! Diesel table definitions; must match `backend/migrations` exactly.

diesel::table! {
    /// Primary store for items. Identifier and timestamp default in SQL.
    items (id) {
        /// Primary key, generated by `gen_random_uuid()`.
        id -> Uuid,
        /// Free-form owner identifier (max 128 characters).
        owner_id -> Varchar,
        /// Title (max 256 characters).
        title -> Varchar,
        /// Description.
        description -> Text,
        /// Cost in minor units; constrained non-negative.
        cost_cents -> Int8,
        /// Insertion timestamp.
        created_at -> Timestamptz,
    }
}

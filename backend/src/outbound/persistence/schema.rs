//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; regenerate with
//! `diesel print-schema` after schema changes.

diesel::table! {
    /// Registered accounts.
    ///
    /// `listing_ids` is the derived owned-listing index; the `owner_id`
    /// column on `listings` stays authoritative.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        password_hash -> Text,
        phone_number -> Varchar,
        age -> Int4,
        location -> Varchar,
        listing_ids -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Furniture listings, each owned by one account.
    listings (id) {
        id -> Uuid,
        furniture_name -> Varchar,
        price -> Float8,
        image -> Text,
        owner_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(listings -> users (owner_id));
diesel::allow_tables_to_appear_in_same_query!(listings, users);

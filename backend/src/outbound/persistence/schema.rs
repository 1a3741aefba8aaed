//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Geographic regions; `location` holds an IANA zone name.
    regions (id) {
        id -> Uuid,
        name -> Varchar,
        location -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Restaurants and their optional Facebook page link.
    restaurants (id) {
        id -> Uuid,
        name -> Varchar,
        address -> Varchar,
        region_id -> Uuid,
        /// Empty or NULL means the restaurant has no connected page.
        facebook_page_id -> Nullable<Varchar>,
        default_group_post_message_template -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Registered principals and their current session.
    users (id) {
        id -> Uuid,
        facebook_user_id -> Varchar,
        restaurant_ids -> Array<Uuid>,
        session_id -> Nullable<Varchar>,
        access_token -> Nullable<Text>,
        access_token_expires_at -> Nullable<Timestamptz>,
        /// JSON object mapping page id to page access token.
        page_tokens -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    offers (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Numeric,
        starts_at -> Timestamptz,
        ends_at -> Timestamptz,
        tags -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (restaurant_id, date), enforced by a unique index.
    offer_group_posts (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        date -> Date,
        message_template -> Text,
        facebook_post_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    registration_tokens (id) {
        id -> Uuid,
        token -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(restaurants -> regions (region_id));
diesel::joinable!(offers -> restaurants (restaurant_id));
diesel::joinable!(offer_group_posts -> restaurants (restaurant_id));

diesel::allow_tables_to_appear_in_same_query!(
    offer_group_posts,
    offers,
    regions,
    registration_tokens,
    restaurants,
    users,
);

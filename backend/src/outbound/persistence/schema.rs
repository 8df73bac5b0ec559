//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation. Regenerate with `diesel
//! print-schema` after a migration changes the shape of a table.

diesel::table! {
    /// Directory accounts. `email` carries a unique constraint.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        name -> Varchar,
        phone -> Nullable<Varchar>,
        role -> Varchar,
        password_digest -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Route installment schedules. `route_name` carries a unique
    /// constraint; the three installment slots are flattened into
    /// columns because the count is fixed.
    route_schedules (id) {
        id -> Uuid,
        route_name -> Varchar,
        installment1_amount -> Numeric,
        installment1_deadline -> Date,
        installment2_amount -> Numeric,
        installment2_deadline -> Date,
        installment3_amount -> Numeric,
        installment3_deadline -> Date,
        total_fee -> Numeric,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bus passes, one per user (`user_id` unique).
    passes (id) {
        id -> Uuid,
        user_id -> Uuid,
        selected_route -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Payment ledger. A partial unique index
    /// (`payments_paid_slot_unique`) forbids a second PAID row for the
    /// same (user, route, installment) slot.
    payments (id) {
        id -> Uuid,
        user_id -> Uuid,
        route_name -> Nullable<Varchar>,
        installment_number -> Nullable<Int4>,
        amount -> Numeric,
        due_date -> Date,
        payment_date -> Nullable<Date>,
        status -> Varchar,
        is_full_payment -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(passes -> users (user_id));
diesel::joinable!(payments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, route_schedules, passes, payments);

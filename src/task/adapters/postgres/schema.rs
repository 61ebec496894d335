//! Diesel schema for task persistence.

diesel::table! {
    /// Task records owned by users.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Validated task title.
        #[max_length = 200]
        title -> Varchar,
        /// Validated task description.
        #[max_length = 1000]
        description -> Varchar,
        /// Owning user identifier.
        user_id -> BigInt,
        /// Lifecycle status label.
        #[max_length = 50]
        status -> Varchar,
        /// Priority label.
        #[max_length = 50]
        priority -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp, set only for completed tasks.
        completed_at -> Nullable<Timestamptz>,
    }
}

//! Diesel schema for queue persistence.

diesel::table! {
    /// Queue rows for tasks that have not reached a terminal outcome.
    task_queue (uuid) {
        /// Task identifier.
        uuid -> Uuid,
        /// Kind of background work.
        #[max_length = 80]
        task_type -> Varchar,
        /// Optional sub-resource the task concerns.
        component_uuid -> Nullable<Uuid>,
        /// Optional owning entity of the component.
        entity_uuid -> Nullable<Uuid>,
        /// Optional submitting user.
        submitter_uuid -> Nullable<Uuid>,
        /// Worker that claimed the task, once claimed.
        worker_uuid -> Nullable<Uuid>,
        /// Queue status.
        #[max_length = 20]
        status -> Varchar,
        /// Arbitrary task metadata.
        characteristics -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only terminal history, one row per finished task.
    task_activity (uuid) {
        /// Task identifier, equal to the original queue row's.
        uuid -> Uuid,
        /// Kind of background work.
        #[max_length = 80]
        task_type -> Varchar,
        /// Terminal status.
        #[max_length = 20]
        status -> Varchar,
        /// Failure classification, set for failed tasks only.
        #[max_length = 80]
        error_type -> Nullable<Varchar>,
        /// Failure description, set for failed tasks only.
        error_message -> Nullable<Varchar>,
        /// Terminal transition timestamp.
        executed_at -> Timestamptz,
        /// Worker that executed the task, if it was claimed.
        worker_uuid -> Nullable<Uuid>,
        /// Cluster node name at transition time.
        #[max_length = 255]
        node_name -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Cluster-wide coordination flags shared by all nodes.
    coordination_properties (property_key) {
        /// Flag key.
        #[max_length = 100]
        property_key -> Varchar,
        /// Flag value.
        #[max_length = 255]
        property_value -> Varchar,
    }
}

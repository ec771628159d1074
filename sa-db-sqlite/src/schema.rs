///////////////////////////////////////////////////////////////////////
// Users
///////////////////////////////////////////////////////////////////////

table! {
    users (id) {
        id -> Text,
        username -> Text,
        social_provider -> Nullable<Text>,
        social_extra_data -> Nullable<Text>,
    }
}

///////////////////////////////////////////////////////////////////////
// Datasets
///////////////////////////////////////////////////////////////////////

table! {
    datasets (id) {
        id -> Text,
        owner_id -> Text,
        slug -> Text,
        display_name -> Text,
    }
}

joinable!(datasets -> users (owner_id));

///////////////////////////////////////////////////////////////////////
// Things
///////////////////////////////////////////////////////////////////////

table! {
    things (id) {
        id -> Text,
        dataset_id -> Text,
        submitter_id -> Nullable<Text>,
        data -> Text,
        visible -> Bool,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

joinable!(things -> datasets (dataset_id));

table! {
    places (id) {
        id -> Text,
        // WKT
        geometry -> Text,
    }
}

joinable!(places -> things (id));

table! {
    submission_sets (id) {
        id -> Text,
        place_id -> Text,
        name -> Text,
    }
}

joinable!(submission_sets -> places (place_id));

table! {
    submissions (id) {
        id -> Text,
        parent_id -> Text,
    }
}

joinable!(submissions -> things (id));
joinable!(submissions -> submission_sets (parent_id));

table! {
    attachments (id) {
        id -> Text,
        thing_id -> Text,
        name -> Text,
        file -> Text,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

joinable!(attachments -> things (thing_id));

table! {
    actions (id) {
        id -> Text,
        thing_id -> Text,
        action -> Text,
        source -> Nullable<Text>,
        created_at -> BigInt,
    }
}

joinable!(actions -> things (thing_id));

///////////////////////////////////////////////////////////////////////
// Indexes
///////////////////////////////////////////////////////////////////////

table! {
    data_indexes (id) {
        id -> Text,
        dataset_id -> Text,
        attr_name -> Text,
    }
}

table! {
    indexed_values (id) {
        id -> Text,
        index_id -> Text,
        thing_id -> Text,
        value -> Text,
    }
}

joinable!(indexed_values -> data_indexes (index_id));

///////////////////////////////////////////////////////////////////////
// Access control
///////////////////////////////////////////////////////////////////////

table! {
    api_keys (id) {
        id -> Text,
        key -> Text,
        dataset_id -> Text,
        logged_ip -> Nullable<Text>,
        last_used -> BigInt,
    }
}

table! {
    user_groups (id) {
        id -> Text,
        dataset_id -> Text,
        name -> Text,
    }
}

table! {
    group_members (group_id, user_id) {
        group_id -> Text,
        user_id -> Text,
    }
}

joinable!(group_members -> user_groups (group_id));

table! {
    // Exactly one of the scope columns is set
    data_permissions (id) {
        id -> Text,
        dataset_id -> Nullable<Text>,
        key_id -> Nullable<Text>,
        group_id -> Nullable<Text>,
        submission_set -> Text,
        can_retrieve -> Bool,
        can_create -> Bool,
        can_update -> Bool,
        can_destroy -> Bool,
        priority -> Integer,
    }
}

allow_tables_to_appear_in_same_query!(
    users,
    datasets,
    things,
    places,
    submission_sets,
    submissions,
    attachments,
    actions,
    data_indexes,
    indexed_values,
    api_keys,
    user_groups,
    group_members,
    data_permissions,
);

#![allow(clippy::extra_unused_lifetimes)]

// NOTE:
// All timestamps with the `_at` postfix and `last_used` are
// stored as unix timestamp in **milli**seconds.

use super::schema::*;

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct User {
    pub id: String,
    pub username: String,
    pub social_provider: Option<String>,
    pub social_extra_data: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = datasets)]
pub struct NewDataSet<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub slug: &'a str,
    pub display_name: &'a str,
}

#[derive(Queryable)]
pub struct DataSet {
    pub id: String,
    pub owner_id: String,
    pub slug: String,
    pub display_name: String,
}

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = things, treat_none_as_null = true)]
pub struct Thing {
    pub id: String,
    pub dataset_id: String,
    pub submitter_id: Option<String>,
    pub data: String,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = places)]
pub struct NewPlace<'a> {
    pub id: &'a str,
    pub geometry: String,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = submission_sets)]
pub struct SubmissionSet {
    pub id: String,
    pub place_id: String,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = submissions)]
pub struct NewSubmission<'a> {
    pub id: &'a str,
    pub parent_id: &'a str,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = attachments)]
pub struct Attachment {
    pub id: String,
    pub thing_id: String,
    pub name: String,
    pub file: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = actions)]
pub struct Action {
    pub id: String,
    pub thing_id: String,
    pub action: String,
    pub source: Option<String>,
    pub created_at: i64,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = data_indexes)]
pub struct DataIndex {
    pub id: String,
    pub dataset_id: String,
    pub attr_name: String,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = indexed_values)]
pub struct IndexedValue {
    pub id: String,
    pub index_id: String,
    pub thing_id: String,
    pub value: String,
}

#[derive(Queryable, Insertable, AsChangeset)]
#[diesel(table_name = api_keys, treat_none_as_null = true)]
pub struct ApiKey {
    pub id: String,
    pub key: String,
    pub dataset_id: String,
    pub logged_ip: Option<String>,
    pub last_used: i64,
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = user_groups)]
pub struct Group {
    pub id: String,
    pub dataset_id: String,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = group_members)]
pub struct NewGroupMember<'a> {
    pub group_id: &'a str,
    pub user_id: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = data_permissions)]
pub struct NewDataPermission<'a> {
    pub id: &'a str,
    pub dataset_id: Option<&'a str>,
    pub key_id: Option<&'a str>,
    pub group_id: Option<&'a str>,
    pub submission_set: &'a str,
    pub can_retrieve: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_destroy: bool,
    pub priority: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = data_permissions)]
pub struct DataPermissionChangeset<'a> {
    pub submission_set: &'a str,
    pub can_retrieve: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_destroy: bool,
    pub priority: i32,
}

#[derive(Queryable)]
pub struct DataPermission {
    pub id: String,
    pub dataset_id: Option<String>,
    pub key_id: Option<String>,
    pub group_id: Option<String>,
    pub submission_set: String,
    pub can_retrieve: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_destroy: bool,
    pub priority: i32,
}

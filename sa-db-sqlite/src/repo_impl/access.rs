use super::*;
use std::net::IpAddr;

impl<'a> PermissionRepo for DbConnection<'a> {
    fn create_permission(
        &self,
        scope: &PermissionScope,
        permission: &DataPermission,
    ) -> Result<()> {
        create_permission(&mut self.conn.borrow_mut(), scope, permission)
    }
    fn update_permission(&self, permission: &DataPermission) -> Result<()> {
        update_permission(&mut self.conn.borrow_mut(), permission)
    }
    fn delete_permission(&self, id: &str) -> Result<()> {
        delete_permission(&mut self.conn.borrow_mut(), id)
    }
    fn permissions_of(&self, scope: &PermissionScope) -> Result<Vec<DataPermission>> {
        permissions_of(&mut self.conn.borrow_mut(), scope)
    }
}

impl<'a> PermissionRepo for DbReadOnly<'a> {
    fn create_permission(
        &self,
        _scope: &PermissionScope,
        _permission: &DataPermission,
    ) -> Result<()> {
        unreachable!();
    }
    fn update_permission(&self, _permission: &DataPermission) -> Result<()> {
        unreachable!();
    }
    fn delete_permission(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
    fn permissions_of(&self, scope: &PermissionScope) -> Result<Vec<DataPermission>> {
        permissions_of(&mut self.conn.borrow_mut(), scope)
    }
}

impl<'a> ApiKeyRepo for DbConnection<'a> {
    fn create_api_key(&self, api_key: &ApiKey) -> Result<()> {
        create_api_key(&mut self.conn.borrow_mut(), api_key)
    }
    fn update_api_key(&self, api_key: &ApiKey) -> Result<()> {
        update_api_key(&mut self.conn.borrow_mut(), api_key)
    }
    fn get_api_key(&self, key: &str) -> Result<ApiKey> {
        get_api_key(&mut self.conn.borrow_mut(), key)
    }
    fn api_keys_of_dataset(&self, dataset_id: &str) -> Result<Vec<ApiKey>> {
        api_keys_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> ApiKeyRepo for DbReadOnly<'a> {
    fn create_api_key(&self, _api_key: &ApiKey) -> Result<()> {
        unreachable!();
    }
    fn update_api_key(&self, _api_key: &ApiKey) -> Result<()> {
        unreachable!();
    }
    fn get_api_key(&self, key: &str) -> Result<ApiKey> {
        get_api_key(&mut self.conn.borrow_mut(), key)
    }
    fn api_keys_of_dataset(&self, dataset_id: &str) -> Result<Vec<ApiKey>> {
        api_keys_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> GroupRepo for DbConnection<'a> {
    fn create_group(&self, group: &Group) -> Result<()> {
        create_group(&mut self.conn.borrow_mut(), group)
    }
    fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<()> {
        add_group_member(&mut self.conn.borrow_mut(), group_id, user_id)
    }
    fn get_group(&self, id: &str) -> Result<Group> {
        get_group(&mut self.conn.borrow_mut(), id)
    }
    fn groups_of_dataset(&self, dataset_id: &str) -> Result<Vec<Group>> {
        groups_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
    fn groups_of_user_in_dataset(&self, user_id: &str, dataset_id: &str) -> Result<Vec<Group>> {
        groups_of_user_in_dataset(&mut self.conn.borrow_mut(), user_id, dataset_id)
    }
    fn group_member_ids(&self, group_id: &str) -> Result<Vec<Id>> {
        group_member_ids(&mut self.conn.borrow_mut(), group_id)
    }
}

impl<'a> GroupRepo for DbReadOnly<'a> {
    fn create_group(&self, _group: &Group) -> Result<()> {
        unreachable!();
    }
    fn add_group_member(&self, _group_id: &str, _user_id: &str) -> Result<()> {
        unreachable!();
    }
    fn get_group(&self, id: &str) -> Result<Group> {
        get_group(&mut self.conn.borrow_mut(), id)
    }
    fn groups_of_dataset(&self, dataset_id: &str) -> Result<Vec<Group>> {
        groups_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
    fn groups_of_user_in_dataset(&self, user_id: &str, dataset_id: &str) -> Result<Vec<Group>> {
        groups_of_user_in_dataset(&mut self.conn.borrow_mut(), user_id, dataset_id)
    }
    fn group_member_ids(&self, group_id: &str) -> Result<Vec<Id>> {
        group_member_ids(&mut self.conn.borrow_mut(), group_id)
    }
}

///////////////////////////////////////////////////////////////////////
// Permissions
///////////////////////////////////////////////////////////////////////

fn load_permission(model: models::DataPermission) -> DataPermission {
    let models::DataPermission {
        id,
        dataset_id: _,
        key_id: _,
        group_id: _,
        submission_set,
        can_retrieve,
        can_create,
        can_update,
        can_destroy,
        priority,
    } = model;
    DataPermission {
        id: id.into(),
        submission_set,
        can_retrieve,
        can_create,
        can_update,
        can_destroy,
        priority,
    }
}

fn create_permission(
    conn: &mut SqliteConnection,
    scope: &PermissionScope,
    permission: &DataPermission,
) -> Result<()> {
    let (dataset_id, key_id, group_id) = match scope {
        PermissionScope::DataSet(id) => (Some(id.as_str()), None, None),
        PermissionScope::Key(id) => (None, Some(id.as_str()), None),
        PermissionScope::Group(id) => (None, None, Some(id.as_str())),
    };
    let new_permission = models::NewDataPermission {
        id: permission.id.as_str(),
        dataset_id,
        key_id,
        group_id,
        submission_set: &permission.submission_set,
        can_retrieve: permission.can_retrieve,
        can_create: permission.can_create,
        can_update: permission.can_update,
        can_destroy: permission.can_destroy,
        priority: permission.priority,
    };
    diesel::insert_into(schema::data_permissions::table)
        .values(&new_permission)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn update_permission(conn: &mut SqliteConnection, permission: &DataPermission) -> Result<()> {
    use schema::data_permissions::dsl;
    let changeset = models::DataPermissionChangeset {
        submission_set: &permission.submission_set,
        can_retrieve: permission.can_retrieve,
        can_create: permission.can_create,
        can_update: permission.can_update,
        can_destroy: permission.can_destroy,
        priority: permission.priority,
    };
    let count = diesel::update(dsl::data_permissions.find(permission.id.as_str()))
        .set(&changeset)
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn delete_permission(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::data_permissions::dsl;
    let count = diesel::delete(dsl::data_permissions.find(id))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn permissions_of(
    conn: &mut SqliteConnection,
    scope: &PermissionScope,
) -> Result<Vec<DataPermission>> {
    use schema::data_permissions::dsl;
    let query = dsl::data_permissions
        .order_by(dsl::priority)
        .then_order_by(dsl::id)
        .into_boxed();
    let query = match scope {
        PermissionScope::DataSet(id) => query.filter(dsl::dataset_id.eq(id.as_str())),
        PermissionScope::Key(id) => query.filter(dsl::key_id.eq(id.as_str())),
        PermissionScope::Group(id) => query.filter(dsl::group_id.eq(id.as_str())),
    };
    Ok(query
        .load::<models::DataPermission>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_permission)
        .collect())
}

///////////////////////////////////////////////////////////////////////
// API keys
///////////////////////////////////////////////////////////////////////

fn api_key_model(api_key: &ApiKey) -> models::ApiKey {
    models::ApiKey {
        id: api_key.id.to_string(),
        key: api_key.key.clone(),
        dataset_id: api_key.dataset_id.to_string(),
        logged_ip: api_key.logged_ip.map(|ip| ip.to_string()),
        last_used: api_key.last_used.as_millis(),
    }
}

fn load_api_key(model: models::ApiKey) -> Result<ApiKey> {
    let models::ApiKey {
        id,
        key,
        dataset_id,
        logged_ip,
        last_used,
    } = model;
    let logged_ip = logged_ip
        .map(|ip| {
            ip.parse::<IpAddr>()
                .map_err(|err| anyhow!("Invalid IP address '{ip}': {err}"))
        })
        .transpose()?;
    Ok(ApiKey {
        id: id.into(),
        key,
        dataset_id: dataset_id.into(),
        logged_ip,
        last_used: load_timestamp(last_used)?,
    })
}

fn create_api_key(conn: &mut SqliteConnection, api_key: &ApiKey) -> Result<()> {
    diesel::insert_into(schema::api_keys::table)
        .values(&api_key_model(api_key))
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn update_api_key(conn: &mut SqliteConnection, api_key: &ApiKey) -> Result<()> {
    use schema::api_keys::dsl;
    let count = diesel::update(dsl::api_keys.find(api_key.id.as_str()))
        .set(&api_key_model(api_key))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_api_key(conn: &mut SqliteConnection, key: &str) -> Result<ApiKey> {
    use schema::api_keys::dsl;
    let model = dsl::api_keys
        .filter(dsl::key.eq(key))
        .first::<models::ApiKey>(conn)
        .map_err(from_diesel_err)?;
    load_api_key(model)
}

fn api_keys_of_dataset(conn: &mut SqliteConnection, dataset_id: &str) -> Result<Vec<ApiKey>> {
    use schema::api_keys::dsl;
    dsl::api_keys
        .filter(dsl::dataset_id.eq(dataset_id))
        .order_by(dsl::key)
        .load::<models::ApiKey>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_api_key)
        .collect()
}

///////////////////////////////////////////////////////////////////////
// Groups
///////////////////////////////////////////////////////////////////////

fn load_group(model: models::Group) -> Group {
    let models::Group {
        id,
        dataset_id,
        name,
    } = model;
    Group {
        id: id.into(),
        dataset_id: dataset_id.into(),
        name,
    }
}

fn create_group(conn: &mut SqliteConnection, group: &Group) -> Result<()> {
    let model = models::Group {
        id: group.id.to_string(),
        dataset_id: group.dataset_id.to_string(),
        name: group.name.clone(),
    };
    diesel::insert_into(schema::user_groups::table)
        .values(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn add_group_member(conn: &mut SqliteConnection, group_id: &str, user_id: &str) -> Result<()> {
    diesel::insert_into(schema::group_members::table)
        .values(&models::NewGroupMember { group_id, user_id })
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn get_group(conn: &mut SqliteConnection, id: &str) -> Result<Group> {
    use schema::user_groups::dsl;
    let model = dsl::user_groups
        .find(id)
        .first::<models::Group>(conn)
        .map_err(from_diesel_err)?;
    Ok(load_group(model))
}

fn groups_of_dataset(conn: &mut SqliteConnection, dataset_id: &str) -> Result<Vec<Group>> {
    use schema::user_groups::dsl;
    Ok(dsl::user_groups
        .filter(dsl::dataset_id.eq(dataset_id))
        .order_by(dsl::name)
        .load::<models::Group>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_group)
        .collect())
}

fn groups_of_user_in_dataset(
    conn: &mut SqliteConnection,
    user_id: &str,
    dataset_id: &str,
) -> Result<Vec<Group>> {
    use schema::{group_members::dsl as m, user_groups::dsl as g};
    Ok(g::user_groups
        .inner_join(m::group_members)
        .filter(m::user_id.eq(user_id))
        .filter(g::dataset_id.eq(dataset_id))
        .select(schema::user_groups::all_columns)
        .order_by(g::name)
        .load::<models::Group>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_group)
        .collect())
}

fn group_member_ids(conn: &mut SqliteConnection, group_id: &str) -> Result<Vec<Id>> {
    use schema::group_members::dsl;
    Ok(dsl::group_members
        .filter(dsl::group_id.eq(group_id))
        .select(dsl::user_id)
        .load::<String>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(Id::from)
        .collect())
}

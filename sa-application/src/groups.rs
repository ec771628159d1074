use super::*;
use crate::invalidate;

/// The owner of a permission rule, given by name.
#[derive(Debug, Clone, Copy)]
pub enum PermissionTarget<'a> {
    /// Rules for everybody
    DataSet,
    Key(&'a str),
    Group(&'a str),
}

fn find_group<R: GroupRepo>(
    repo: &R,
    dataset: &DataSet,
    name: &str,
) -> std::result::Result<Group, RepoError> {
    repo.groups_of_dataset(dataset.id.as_str())?
        .into_iter()
        .find(|group| group.name == name)
        .ok_or(RepoError::NotFound)
}

fn resolve_scope<R: ApiKeyRepo + GroupRepo>(
    repo: &R,
    dataset: &DataSet,
    target: PermissionTarget,
) -> std::result::Result<PermissionScope, RepoError> {
    Ok(match target {
        PermissionTarget::DataSet => PermissionScope::DataSet(dataset.id.clone()),
        PermissionTarget::Key(key) => {
            let api_key = repo.get_api_key(key)?;
            if api_key.dataset_id != dataset.id {
                return Err(RepoError::NotFound);
            }
            PermissionScope::Key(api_key.id)
        }
        PermissionTarget::Group(name) => PermissionScope::Group(find_group(repo, dataset, name)?.id),
    })
}

pub fn create_group(
    connections: &sqlite::Connections,
    owner: &str,
    slug: &str,
    name: &str,
) -> Result<Group> {
    Ok(connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        usecases::create_group(conn, dataset.id.as_str(), name)
    })?)
}

pub fn add_group_member(
    backend: &Backend,
    owner: &str,
    slug: &str,
    group_name: &str,
    username: &str,
) -> Result<()> {
    backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let group = find_group(conn, &dataset, group_name)?;
        usecases::add_group_member(conn, group.id.as_str(), username)
    })?;
    info!("Added '{username}' to group '{group_name}' of dataset '{slug}'");
    Ok(())
}

/// Add a rule and drop all cached responses of the dataset,
/// because they are filtered by the rules.
pub fn add_permission(
    backend: &Backend,
    owner: &str,
    slug: &str,
    target: PermissionTarget,
    new_permission: usecases::NewDataPermission,
) -> Result<DataPermission> {
    let permission = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let scope = resolve_scope(conn, &dataset, target)?;
        usecases::add_permission(conn, &scope, new_permission)
    })?;
    invalidate::invalidate_dataset(backend, owner, slug)?;
    Ok(permission)
}

/// Remove all rules of a target, e.g. to revoke public access.
pub fn clear_permissions(
    backend: &Backend,
    owner: &str,
    slug: &str,
    target: PermissionTarget,
) -> Result<usize> {
    let count = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let scope = resolve_scope(conn, &dataset, target)?;
        let permissions = conn.permissions_of(&scope)?;
        for permission in &permissions {
            conn.delete_permission(permission.id.as_str())?;
        }
        Ok::<_, usecases::Error>(permissions.len())
    })?;
    invalidate::invalidate_dataset(backend, owner, slug)?;
    Ok(count)
}

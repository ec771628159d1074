use super::prelude::*;
use crate::util::validate;

pub fn create_group<R: GroupRepo>(repo: &R, dataset_id: &str, name: &str) -> Result<Group> {
    let name = name.trim();
    if name.is_empty() || name.len() > 32 {
        return Err(Error::GroupName);
    }
    let group = Group {
        id: Id::new(),
        dataset_id: dataset_id.into(),
        name: name.to_string(),
    };
    repo.create_group(&group)?;
    log::info!("Created group '{name}' in dataset {dataset_id}");
    Ok(group)
}

pub fn add_group_member<R>(repo: &R, group_id: &str, username: &str) -> Result<()>
where
    R: GroupRepo + UserRepo,
{
    let user = repo.get_user_by_username(username)?;
    match repo.add_group_member(group_id, user.id.as_str()) {
        Err(RepoError::AlreadyExists) => Err(Error::AlreadyMember),
        res => Ok(res?),
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct NewDataPermission {
    /// Name of a submission set or `*`
    pub submission_set : String,
    pub can_retrieve   : bool,
    pub can_create     : bool,
    pub can_update     : bool,
    pub can_destroy    : bool,
    pub priority       : i32,
}

/// Add a rule to a dataset, key or group.
pub fn add_permission<R: PermissionRepo>(
    repo: &R,
    scope: &PermissionScope,
    new: NewDataPermission,
) -> Result<DataPermission> {
    let NewDataPermission {
        submission_set,
        can_retrieve,
        can_create,
        can_update,
        can_destroy,
        priority,
    } = new;
    if submission_set != ANY_SUBMISSION_SET && !validate::is_valid_slug(&submission_set) {
        return Err(Error::SubmissionSetName);
    }
    let permission = DataPermission {
        id: Id::new(),
        submission_set,
        can_retrieve,
        can_create,
        can_update,
        can_destroy,
        priority,
    };
    repo.create_permission(scope, &permission)?;
    log::debug!("Added {permission:?} to {scope:?}");
    Ok(permission)
}

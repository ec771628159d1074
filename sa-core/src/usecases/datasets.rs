use super::prelude::*;
use crate::util::validate;

pub fn create_user<R: UserRepo>(repo: &R, username: &str) -> Result<User> {
    if !validate::is_valid_username(username) {
        return Err(Error::Username);
    }
    let user = User {
        id: Id::new(),
        username: username.to_string(),
        social_auth: None,
    };
    repo.create_user(&user)?;
    log::info!("Created user '{username}'");
    Ok(user)
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct NewDataSet {
    pub slug         : String,
    pub display_name : String,
}

/// Create a dataset that everybody may read and only the
/// owner may modify.
pub fn create_dataset<R>(repo: &R, owner: &User, new: NewDataSet) -> Result<DataSet>
where
    R: DataSetRepo + PermissionRepo,
{
    let NewDataSet { slug, display_name } = new;
    if !validate::is_valid_slug(&slug) {
        return Err(Error::Slug);
    }
    let dataset = DataSet {
        id: Id::new(),
        owner: owner.into(),
        slug,
        display_name,
    };
    repo.create_dataset(&dataset)?;
    repo.create_permission(
        &PermissionScope::DataSet(dataset.id.clone()),
        &DataPermission::read_only(),
    )?;
    log::info!(
        "Created dataset '{}' of '{}'",
        dataset.slug,
        dataset.owner.username
    );
    Ok(dataset)
}

pub fn update_dataset<R: DataSetRepo>(
    repo: &R,
    id: &str,
    display_name: String,
) -> Result<DataSet> {
    let dataset = DataSet {
        display_name,
        ..repo.get_dataset(id)?
    };
    repo.update_dataset(&dataset)?;
    Ok(dataset)
}

/// Delete a dataset with everything it owns.
pub fn delete_dataset<R: DataSetRepo>(repo: &R, id: &str) -> Result<DataSet> {
    let dataset = repo.get_dataset(id)?;
    repo.delete_dataset(id)?;
    log::info!(
        "Deleted dataset '{}' of '{}'",
        dataset.slug,
        dataset.owner.username
    );
    Ok(dataset)
}

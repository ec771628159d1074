use super::prelude::*;
use std::net::IpAddr;

/// Create a key with full access to the dataset.
pub fn create_api_key<R>(repo: &R, dataset_id: &str) -> Result<ApiKey>
where
    R: ApiKeyRepo + PermissionRepo,
{
    let api_key = ApiKey {
        id: Id::new(),
        key: generate_unique_api_key(),
        dataset_id: dataset_id.into(),
        logged_ip: None,
        last_used: Timestamp::now(),
    };
    repo.create_api_key(&api_key)?;
    repo.create_permission(
        &PermissionScope::Key(api_key.id.clone()),
        &DataPermission::full_access(),
    )?;
    log::info!("Created API key {} for dataset {dataset_id}", api_key.id);
    Ok(api_key)
}

pub fn get_api_key<R: ApiKeyRepo>(repo: &R, key: &str) -> Result<ApiKey> {
    Ok(repo.get_api_key(key)?)
}

/// Remember who used the key and when.
///
/// An empty address is stored as none.
pub fn log_in_api_key<R: ApiKeyRepo>(repo: &R, key: &str, ip: &str) -> Result<ApiKey> {
    let ip = ip.trim();
    let logged_ip = if ip.is_empty() {
        None
    } else {
        Some(ip.parse::<IpAddr>().map_err(|_| Error::IpAddress)?)
    };
    let api_key = ApiKey {
        logged_ip,
        last_used: Timestamp::now(),
        ..repo.get_api_key(key)?
    };
    repo.update_api_key(&api_key)?;
    Ok(api_key)
}

pub fn log_out_api_key<R: ApiKeyRepo>(repo: &R, key: &str) -> Result<ApiKey> {
    let api_key = ApiKey {
        logged_ip: None,
        ..repo.get_api_key(key)?
    };
    repo.update_api_key(&api_key)?;
    Ok(api_key)
}

#[cfg(test)]
mod tests {
    use super::{
        super::{tests::MockDb, *},
        *,
    };

    #[test]
    fn new_keys_have_full_access() {
        let db = MockDb::default();
        let api_key = create_api_key(&db, "ds").unwrap();
        assert_eq!(KEY_SIZE, api_key.key.len());
        let rules = db
            .permissions_of(&PermissionScope::Key(api_key.id.clone()))
            .unwrap();
        assert_eq!(1, rules.len());
        assert_eq!(ANY_SUBMISSION_SET, rules[0].submission_set);
        assert!(rules[0].allows(DataAction::Destroy));
        assert_eq!(api_key, get_api_key(&db, &api_key.key).unwrap());
    }

    #[test]
    fn log_in_and_out() {
        let db = MockDb::default();
        let api_key = create_api_key(&db, "ds").unwrap();
        let logged_in = log_in_api_key(&db, &api_key.key, "127.0.0.1").unwrap();
        assert_eq!(Some("127.0.0.1".parse().unwrap()), logged_in.logged_ip);
        assert!(logged_in.last_used >= api_key.last_used);
        let logged_out = log_out_api_key(&db, &api_key.key).unwrap();
        assert_eq!(None, logged_out.logged_ip);
        assert_eq!(logged_out, db.get_api_key(&api_key.key).unwrap());
    }

    #[test]
    fn empty_addresses_are_stored_as_none() {
        let db = MockDb::default();
        let api_key = create_api_key(&db, "ds").unwrap();
        assert_eq!(None, log_in_api_key(&db, &api_key.key, "").unwrap().logged_ip);
        assert!(matches!(
            log_in_api_key(&db, &api_key.key, "localhost"),
            Err(Error::IpAddress)
        ));
    }

    #[test]
    fn unknown_keys_are_not_found() {
        let db = MockDb::default();
        assert!(matches!(
            log_in_api_key(&db, "unknown", ""),
            Err(Error::Repo(RepoError::NotFound))
        ));
    }
}

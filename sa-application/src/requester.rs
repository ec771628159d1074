use super::*;
use usecases::SubmissionSetRef;

/// Permissions on places are checked against this set name.
pub const PLACES: &str = "places";

/// Who performs a request.
///
/// Anonymous requests have neither a user nor an API key.
#[derive(Debug, Clone, Default)]
pub struct Requester {
    pub user: Option<User>,
    pub api_key: Option<ApiKey>,
}

impl Requester {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user: User) -> Self {
        Self {
            user: Some(user),
            api_key: None,
        }
    }

    pub fn api_key(api_key: ApiKey) -> Self {
        Self {
            user: None,
            api_key: Some(api_key),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user.is_none() && self.api_key.is_none()
    }

    /// Owners and holders of a key of the dataset may see private
    /// data and invisible things.
    pub fn has_protected_access(&self, dataset: &DataSet) -> bool {
        self.user.as_ref().is_some_and(|u| dataset.is_owned_by(u))
            || self
                .api_key
                .as_ref()
                .is_some_and(|k| k.dataset_id == dataset.id)
    }

    pub fn may<'a, R>(
        &self,
        repo: &R,
        action: DataAction,
        dataset: &DataSet,
        set: impl Into<SubmissionSetRef<'a>>,
    ) -> std::result::Result<bool, usecases::Error>
    where
        R: PermissionRepo + GroupRepo,
    {
        usecases::check_data_permission(
            repo,
            self.user.as_ref(),
            self.api_key.as_ref(),
            &action.to_string(),
            Some(dataset),
            set,
        )
    }

    /// Like [`Self::may`] but fails with a forbidden error.
    pub fn require<'a, R>(
        &self,
        repo: &R,
        action: DataAction,
        dataset: &DataSet,
        set: impl Into<SubmissionSetRef<'a>>,
    ) -> std::result::Result<(), usecases::Error>
    where
        R: PermissionRepo + GroupRepo,
    {
        let set = set.into();
        if self.may(repo, action, dataset, set)? {
            return Ok(());
        }
        debug!(
            "Denied {action} on '{}' of dataset {}",
            set.name(),
            dataset.id
        );
        Err(usecases::Error::Forbidden)
    }
}

/// Resolve the credentials of a request.
///
/// Unknown usernames or keys fail with a not found error.
pub fn resolve_requester(
    connections: &sqlite::Connections,
    username: Option<&str>,
    api_key: Option<&str>,
) -> Result<Requester> {
    let db = connections.shared()?;
    let user = username
        .map(|username| db.get_user_by_username(username))
        .transpose()?;
    let api_key = api_key
        .map(|key| usecases::get_api_key(&db, key))
        .transpose()?;
    Ok(Requester { user, api_key })
}

/// Whether a user or key may perform an action, with the action
/// given by its name.
pub fn check_permission(
    connections: &sqlite::Connections,
    owner: &str,
    slug: &str,
    requester: &Requester,
    action: &str,
    submission_set: &str,
) -> Result<bool> {
    let db = connections.shared()?;
    let dataset = load_dataset(&db, owner, slug)?;
    Ok(usecases::check_data_permission(
        &db,
        requester.user.as_ref(),
        requester.api_key.as_ref(),
        action,
        Some(&dataset),
        submission_set,
    )?)
}

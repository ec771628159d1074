use super::prelude::*;

/// A submission set given either by name or as an entity.
#[derive(Debug, Clone, Copy)]
pub enum SubmissionSetRef<'a> {
    Name(&'a str),
    Set(&'a SubmissionSet),
}

impl<'a> SubmissionSetRef<'a> {
    pub fn name(self) -> &'a str {
        match self {
            Self::Name(name) => name,
            Self::Set(set) => &set.name,
        }
    }
}

impl<'a> From<&'a str> for SubmissionSetRef<'a> {
    fn from(from: &'a str) -> Self {
        Self::Name(from)
    }
}

impl<'a> From<&'a SubmissionSet> for SubmissionSetRef<'a> {
    fn from(from: &'a SubmissionSet) -> Self {
        Self::Set(from)
    }
}

/// Decide whether an actor may perform an action on the
/// submissions (or places) of a dataset.
///
/// The owner of the dataset may do everything. Otherwise the
/// rules of the dataset, of the API key and of the actor's groups
/// in this dataset are consulted. Each of them may grant the
/// action independently, i.e. the permissions are additive.
pub fn check_data_permission<'a, R>(
    repo: &R,
    user: Option<&User>,
    api_key: Option<&ApiKey>,
    action: &str,
    dataset: Option<&DataSet>,
    submission_set: impl Into<SubmissionSetRef<'a>>,
) -> Result<bool>
where
    R: PermissionRepo + GroupRepo,
{
    let action = action
        .parse::<DataAction>()
        .map_err(|_| Error::InvalidAction(action.to_string()))?;
    let Some(dataset) = dataset else {
        return Ok(false);
    };
    let set_name = submission_set.into().name();

    if user.is_some_and(|user| dataset.is_owned_by(user)) {
        return Ok(true);
    }

    let mut scopes = vec![PermissionScope::DataSet(dataset.id.clone())];
    if let Some(api_key) = api_key {
        if api_key.dataset_id == dataset.id {
            scopes.push(PermissionScope::Key(api_key.id.clone()));
        } else {
            log::debug!(
                "Ignoring API key {} of another dataset than {}",
                api_key.id,
                dataset.id
            );
        }
    }
    if let Some(user) = user {
        scopes.extend(
            repo.groups_of_user_in_dataset(user.id.as_str(), dataset.id.as_str())?
                .into_iter()
                .map(|group| PermissionScope::Group(group.id)),
        );
    }

    for scope in scopes {
        let rules = repo.permissions_of(&scope)?;
        if let Some(rule) = first_allowing_rule(&rules, set_name, action) {
            log::debug!(
                "{action} on '{set_name}' in dataset {} allowed by rule {} of {scope:?}",
                dataset.id,
                rule.id
            );
            return Ok(true);
        }
    }
    Ok(false)
}

fn first_allowing_rule<'r>(
    rules: &'r [DataPermission],
    set_name: &str,
    action: DataAction,
) -> Option<&'r DataPermission> {
    let mut matching: Vec<_> = rules.iter().filter(|rule| rule.matches(set_name)).collect();
    matching.sort_by_key(|rule| rule.priority);
    matching.into_iter().find(|rule| rule.allows(action))
}

#[cfg(test)]
mod tests {
    use super::{
        super::{tests::MockDb, *},
        *,
    };
    use sa_entities::builders::*;

    struct Fixture {
        db: MockDb,
        owner: User,
        dataset: DataSet,
        api_key: ApiKey,
    }

    fn fixture() -> Fixture {
        let db = MockDb::default();
        let owner = User::build().id("owner").username("owner").finish();
        let dataset = DataSet::build().id("ds").owner(&owner).slug("ds").finish();
        db.add_permission(
            PermissionScope::DataSet(dataset.id.clone()),
            DataPermission::read_only(),
        );
        let api_key = ApiKey {
            id: "k".into(),
            key: generate_unique_api_key(),
            dataset_id: dataset.id.clone(),
            logged_ip: None,
            last_used: Timestamp::now(),
        };
        db.add_permission(
            PermissionScope::Key(api_key.id.clone()),
            DataPermission::full_access(),
        );
        Fixture {
            db,
            owner,
            dataset,
            api_key,
        }
    }

    fn rule(set: &str, retrieve: bool, create: bool, priority: i32) -> DataPermission {
        DataPermission {
            submission_set: set.into(),
            can_retrieve: retrieve,
            can_create: create,
            priority,
            ..DataPermission::read_only()
        }
    }

    #[test]
    fn owner_may_do_everything() {
        let f = fixture();
        f.db.permissions.borrow_mut().clear();
        for action in ["retrieve", "create", "update", "destroy"] {
            assert!(check_data_permission(
                &f.db,
                Some(&f.owner),
                None,
                action,
                Some(&f.dataset),
                "places"
            )
            .unwrap());
        }
    }

    #[test]
    fn default_dataset_rules_allow_reading_only() {
        let f = fixture();
        let other = User::build().id("other").username("other").finish();
        for user in [None, Some(&other)] {
            for (action, allowed) in [
                ("retrieve", true),
                ("create", false),
                ("update", false),
                ("destroy", false),
            ] {
                assert_eq!(
                    allowed,
                    check_data_permission(&f.db, user, None, action, Some(&f.dataset), "places")
                        .unwrap()
                );
            }
        }
    }

    #[test]
    fn invalid_actions_are_rejected_even_for_the_owner() {
        let f = fixture();
        let err = check_data_permission(
            &f.db,
            Some(&f.owner),
            None,
            "obliterate",
            Some(&f.dataset),
            "places",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAction(action) if action == "obliterate"));
    }

    #[test]
    fn no_dataset_means_no_permission() {
        let f = fixture();
        assert!(
            !check_data_permission(&f.db, None, Some(&f.api_key), "retrieve", None, "places")
                .unwrap()
        );
    }

    #[test]
    fn specific_rules_only_apply_to_their_submission_set() {
        let f = fixture();
        f.db.permissions.borrow_mut().clear();
        f.db.add_permission(
            PermissionScope::DataSet(f.dataset.id.clone()),
            rule("comments", true, true, 0),
        );
        let check = |set| {
            check_data_permission(&f.db, None, None, "create", Some(&f.dataset), set).unwrap()
        };
        assert!(check("comments"));
        assert!(!check("places"));
    }

    #[test]
    fn key_grants_are_additive() {
        let f = fixture();
        f.db.permissions.borrow_mut().clear();
        // The dataset denies reading comments explicitly
        f.db.add_permission(
            PermissionScope::DataSet(f.dataset.id.clone()),
            rule("comments", false, false, 0),
        );
        f.db.add_permission(
            PermissionScope::Key(f.api_key.id.clone()),
            rule("comments", true, false, 0),
        );
        assert!(!check_data_permission(
            &f.db,
            None,
            None,
            "retrieve",
            Some(&f.dataset),
            "comments"
        )
        .unwrap());
        assert!(check_data_permission(
            &f.db,
            None,
            Some(&f.api_key),
            "retrieve",
            Some(&f.dataset),
            "comments"
        )
        .unwrap());
    }

    #[test]
    fn revoking_all_grants_denies() {
        let f = fixture();
        let check = || {
            check_data_permission(
                &f.db,
                None,
                Some(&f.api_key),
                "retrieve",
                Some(&f.dataset),
                "places",
            )
            .unwrap()
        };
        assert!(check());
        f.db.permissions
            .borrow_mut()
            .retain(|(scope, _)| !matches!(scope, PermissionScope::DataSet(_)));
        assert!(check());
        for (_, rule) in f.db.permissions.borrow_mut().iter_mut() {
            rule.can_retrieve = false;
        }
        assert!(!check());
    }

    #[test]
    fn keys_of_other_datasets_are_ignored() {
        let f = fixture();
        let foreign_key = ApiKey {
            dataset_id: "other-ds".into(),
            ..f.api_key.clone()
        };
        assert!(!check_data_permission(
            &f.db,
            None,
            Some(&foreign_key),
            "create",
            Some(&f.dataset),
            "places"
        )
        .unwrap());
    }

    #[test]
    fn group_rules_apply_to_members() {
        let f = fixture();
        let member = User::build().id("member").username("member").finish();
        let outsider = User::build().id("outsider").username("outsider").finish();
        let group = Group {
            id: "g".into(),
            dataset_id: f.dataset.id.clone(),
            name: "editors".into(),
        };
        f.db.create_group(&group).unwrap();
        f.db.add_group_member("g", "member").unwrap();
        f.db.add_permission(PermissionScope::Group("g".into()), rule("*", true, true, 0));
        let check = |user| {
            check_data_permission(&f.db, Some(user), None, "create", Some(&f.dataset), "places")
                .unwrap()
        };
        assert!(check(&member));
        assert!(!check(&outsider));
    }

    #[test]
    fn rules_are_evaluated_in_priority_order() {
        let rules = vec![
            DataPermission {
                id: "second".into(),
                ..rule("*", true, false, 2)
            },
            DataPermission {
                id: "first".into(),
                ..rule("comments", true, false, 1)
            },
            DataPermission {
                id: "denies".into(),
                ..rule("comments", false, false, 0)
            },
        ];
        let rule = first_allowing_rule(&rules, "comments", DataAction::Retrieve).unwrap();
        assert_eq!("first", rule.id.as_str());
        let rule = first_allowing_rule(&rules, "places", DataAction::Retrieve).unwrap();
        assert_eq!("second", rule.id.as_str());
        assert!(first_allowing_rule(&rules, "places", DataAction::Create).is_none());
    }

    #[test]
    fn submission_sets_resolve_to_their_name() {
        let f = fixture();
        f.db.permissions.borrow_mut().clear();
        f.db.add_permission(
            PermissionScope::DataSet(f.dataset.id.clone()),
            rule("comments", true, true, 0),
        );
        let set = SubmissionSet {
            id: "s".into(),
            place_id: "p".into(),
            name: "comments".into(),
        };
        assert!(
            check_data_permission(&f.db, None, None, "create", Some(&f.dataset), &set).unwrap()
        );
    }
}

use super::prelude::*;

fn new_place() -> usecases::NewPlace {
    usecases::NewPlace {
        geometry: json!("POINT (1 1)"),
        visible: true,
        submitter: None,
        data: Map::new(),
    }
}

fn create_place(fixture: &BackendFixture, requester: &Requester) -> Result<Place, AppError> {
    flows::create_place(
        &fixture.backend(),
        requester,
        "alice",
        "ds",
        new_place(),
        &Default::default(),
    )
}

fn rule(submission_set: &str) -> usecases::NewDataPermission {
    usecases::NewDataPermission {
        submission_set: submission_set.into(),
        can_retrieve: true,
        can_create: true,
        can_update: false,
        can_destroy: false,
        priority: 0,
    }
}

#[test]
fn default_permissions() {
    let fixture = BackendFixture::new();
    let bob = Requester::user(fixture.create_user("bob"));
    for requester in [Requester::anonymous(), bob] {
        assert!(flows::place_list(
            &fixture.backend(),
            &requester,
            "alice",
            "ds",
            Detail::default(),
            Page::default(),
        )
        .is_ok());
        let err = create_place(&fixture, &requester).unwrap_err();
        assert!(err.is_forbidden());
        for action in ["update", "destroy"] {
            assert!(!flows::check_permission(
                &fixture.db_connections,
                "alice",
                "ds",
                &requester,
                action,
                "places"
            )
            .unwrap());
        }
    }
    assert!(create_place(&fixture, &fixture.as_owner()).is_ok());
}

#[test]
fn invalid_actions_are_rejected() {
    let fixture = BackendFixture::new();
    let err = flows::check_permission(
        &fixture.db_connections,
        "alice",
        "ds",
        &Requester::anonymous(),
        "delete",
        "places",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::Business(crate::error::BError::Parameter(usecases::Error::InvalidAction(_)))
    ));
}

#[test]
fn specific_rule_for_comments() {
    let fixture = BackendFixture::new();
    let place = fixture.create_place(json!({}));
    flows::add_permission(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::DataSet,
        rule("comments"),
    )
    .unwrap();
    let anonymous = Requester::anonymous();
    assert!(fixture
        .create_submission(&anonymous, &place, "comments", json!({"text": "Hi"}))
        .is_ok());
    assert!(fixture
        .create_submission(&anonymous, &place, "likes", json!({}))
        .unwrap_err()
        .is_forbidden());
    assert!(create_place(&fixture, &anonymous)
        .unwrap_err()
        .is_forbidden());
}

#[test]
fn revoking_rules_denies_access() {
    let fixture = BackendFixture::new();
    let api_key = flows::create_api_key(&fixture.db_connections, "alice", "ds").unwrap();
    let anonymous = Requester::anonymous();
    let with_key = Requester::api_key(api_key.clone());
    let may_retrieve = |requester: &Requester| {
        flows::check_permission(
            &fixture.db_connections,
            "alice",
            "ds",
            requester,
            "retrieve",
            "places",
        )
        .unwrap()
    };
    let list = || {
        flows::place_list(
            &fixture.backend(),
            &anonymous,
            "alice",
            "ds",
            Detail::default(),
            Page::default(),
        )
    };
    // Cached before the rules change
    assert!(list().is_ok());

    let removed = flows::clear_permissions(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::DataSet,
    )
    .unwrap();
    assert_eq!(1, removed);
    assert!(!may_retrieve(&anonymous));
    assert!(list().unwrap_err().is_forbidden());
    assert!(may_retrieve(&with_key));
    assert!(create_place(&fixture, &with_key).is_ok());

    flows::clear_permissions(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::Key(&api_key.key),
    )
    .unwrap();
    flows::add_permission(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::Key(&api_key.key),
        usecases::NewDataPermission {
            can_retrieve: false,
            ..rule("*")
        },
    )
    .unwrap();
    assert!(!may_retrieve(&with_key));
    assert!(create_place(&fixture, &with_key).is_ok());
}

#[test]
fn revoking_rules_drops_cached_listings_of_empty_sets() {
    let fixture = BackendFixture::new();
    let comments = || {
        flows::dataset_submission_list(
            &fixture.backend(),
            &Requester::anonymous(),
            "alice",
            "ds",
            "comments",
            Detail::default(),
            Page::default(),
        )
    };
    assert_eq!(0, comments().unwrap().metadata.length);

    flows::clear_permissions(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::DataSet,
    )
    .unwrap();
    assert!(comments().unwrap_err().is_forbidden());
}

#[test]
fn group_members_gain_the_rules_of_their_group() {
    let fixture = BackendFixture::new();
    let place = fixture.create_place(json!({}));
    let bob = Requester::user(fixture.create_user("bob"));
    let carol = Requester::user(fixture.create_user("carol"));
    flows::create_group(&fixture.db_connections, "alice", "ds", "moderators").unwrap();
    flows::add_group_member(&fixture.backend(), "alice", "ds", "moderators", "bob").unwrap();
    let err = flows::add_group_member(&fixture.backend(), "alice", "ds", "moderators", "bob")
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Business(crate::error::BError::Parameter(usecases::Error::AlreadyMember))
    ));
    flows::add_permission(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::Group("moderators"),
        rule("comments"),
    )
    .unwrap();
    assert!(fixture
        .create_submission(&bob, &place, "comments", json!({}))
        .is_ok());
    assert!(fixture
        .create_submission(&carol, &place, "comments", json!({}))
        .unwrap_err()
        .is_forbidden());
}

#[test]
fn keys_of_other_datasets_grant_nothing() {
    let fixture = BackendFixture::new();
    flows::create_dataset(
        &fixture.db_connections,
        "alice",
        usecases::NewDataSet {
            slug: "other".into(),
            display_name: "Other".into(),
        },
    )
    .unwrap();
    let api_key = flows::create_api_key(&fixture.db_connections, "alice", "other").unwrap();
    let err = create_place(&fixture, &Requester::api_key(api_key.clone())).unwrap_err();
    assert!(err.is_forbidden());
    let err = flows::add_permission(
        &fixture.backend(),
        "alice",
        "ds",
        flows::PermissionTarget::Key(&api_key.key),
        rule("*"),
    )
    .unwrap_err();
    assert!(err.is_not_found());
}

//! Reverse routing.
//!
//! Both the cache-key engine and the serializers build URL paths
//! from named routes. The output for a given route and arguments
//! never changes, otherwise cached entries could not be found
//! again when they need to be invalidated.

use strum::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Route {
    #[strum(serialize = "user-detail")]
    UserDetail,
    #[strum(serialize = "dataset-list")]
    DataSetList,
    #[strum(serialize = "dataset-detail")]
    DataSetDetail,
    #[strum(serialize = "place-list")]
    PlaceList,
    #[strum(serialize = "place-detail")]
    PlaceDetail,
    #[strum(serialize = "place-attachment-list")]
    PlaceAttachmentList,
    #[strum(serialize = "submission-list")]
    SubmissionList,
    #[strum(serialize = "submission-detail")]
    SubmissionDetail,
    #[strum(serialize = "dataset-submission-list")]
    DataSetSubmissionList,
    #[strum(serialize = "action-list")]
    ActionList,
    #[strum(serialize = "apikey-list")]
    ApiKeyList,

    #[strum(serialize = "v1:dataset_collection_by_user")]
    V1DataSetCollectionByUser,
    #[strum(serialize = "v1:dataset_instance_by_user")]
    V1DataSetInstanceByUser,
    #[strum(serialize = "v1:place_collection_by_dataset")]
    V1PlaceCollectionByDataSet,
    #[strum(serialize = "v1:place_instance_by_dataset")]
    V1PlaceInstanceByDataSet,
    #[strum(serialize = "v1:tabular_place_collection_by_dataset")]
    V1TabularPlaceCollectionByDataSet,
    #[strum(serialize = "v1:submission_collection_by_dataset")]
    V1SubmissionCollectionByDataSet,
    #[strum(serialize = "v1:submission_instance_by_dataset")]
    V1SubmissionInstanceByDataSet,
    #[strum(serialize = "v1:tabular_submission_collection_by_dataset")]
    V1TabularSubmissionCollectionByDataSet,
    #[strum(serialize = "v1:all_submissions_by_dataset")]
    V1AllSubmissionsByDataSet,
    #[strum(serialize = "v1:tabular_all_submissions_by_dataset")]
    V1TabularAllSubmissionsByDataSet,
    #[strum(serialize = "v1:activity_collection_by_dataset")]
    V1ActivityCollectionByDataSet,

    // Deprecated v1 paths without the trailing slash
    #[strum(serialize = "v1:dataset_collection_by_user_1")]
    V1DataSetCollectionByUser1,
    #[strum(serialize = "v1:dataset_instance_by_user_1")]
    V1DataSetInstanceByUser1,
    #[strum(serialize = "v1:place_collection_by_dataset_1")]
    V1PlaceCollectionByDataSet1,
    #[strum(serialize = "v1:place_instance_by_dataset_1")]
    V1PlaceInstanceByDataSet1,
    #[strum(serialize = "v1:submission_collection_by_dataset_1")]
    V1SubmissionCollectionByDataSet1,
    #[strum(serialize = "v1:submission_instance_by_dataset_1")]
    V1SubmissionInstanceByDataSet1,
    #[strum(serialize = "v1:all_submissions_by_dataset_1")]
    V1AllSubmissionsByDataSet1,
    #[strum(serialize = "v1:activity_collection_by_dataset_1")]
    V1ActivityCollectionByDataSet1,
}

impl Route {
    /// The path template with one `{}` per positional argument.
    pub const fn template(self) -> &'static str {
        use Route::*;
        match self {
            UserDetail => "/api/v2/{}",
            DataSetList => "/api/v2/{}/datasets",
            DataSetDetail => "/api/v2/{}/datasets/{}",
            PlaceList => "/api/v2/{}/datasets/{}/places",
            PlaceDetail => "/api/v2/{}/datasets/{}/places/{}",
            PlaceAttachmentList => "/api/v2/{}/datasets/{}/places/{}/attachments",
            SubmissionList => "/api/v2/{}/datasets/{}/places/{}/{}",
            SubmissionDetail => "/api/v2/{}/datasets/{}/places/{}/{}/{}",
            DataSetSubmissionList => "/api/v2/{}/datasets/{}/{}",
            ActionList => "/api/v2/{}/datasets/{}/actions",
            ApiKeyList => "/api/v2/{}/datasets/{}/keys",

            V1DataSetCollectionByUser => "/api/v1/{}/datasets/",
            V1DataSetInstanceByUser => "/api/v1/{}/datasets/{}/",
            V1PlaceCollectionByDataSet => "/api/v1/{}/datasets/{}/places/",
            V1PlaceInstanceByDataSet => "/api/v1/{}/datasets/{}/places/{}/",
            V1TabularPlaceCollectionByDataSet => "/api/v1/{}/datasets/{}/places/table/",
            V1SubmissionCollectionByDataSet => "/api/v1/{}/datasets/{}/places/{}/{}/",
            V1SubmissionInstanceByDataSet => "/api/v1/{}/datasets/{}/places/{}/{}/{}/",
            V1TabularSubmissionCollectionByDataSet => "/api/v1/{}/datasets/{}/places/{}/{}/table/",
            V1AllSubmissionsByDataSet => "/api/v1/{}/datasets/{}/{}/",
            V1TabularAllSubmissionsByDataSet => "/api/v1/{}/datasets/{}/{}/table/",
            V1ActivityCollectionByDataSet => "/api/v1/{}/datasets/{}/activity/",

            V1DataSetCollectionByUser1 => "/api/v1/{}/datasets",
            V1DataSetInstanceByUser1 => "/api/v1/{}/datasets/{}",
            V1PlaceCollectionByDataSet1 => "/api/v1/{}/datasets/{}/places",
            V1PlaceInstanceByDataSet1 => "/api/v1/{}/datasets/{}/places/{}",
            V1SubmissionCollectionByDataSet1 => "/api/v1/{}/datasets/{}/places/{}/{}",
            V1SubmissionInstanceByDataSet1 => "/api/v1/{}/datasets/{}/places/{}/{}/{}",
            V1AllSubmissionsByDataSet1 => "/api/v1/{}/datasets/{}/{}",
            V1ActivityCollectionByDataSet1 => "/api/v1/{}/datasets/{}/activity",
        }
    }

    pub fn arity(self) -> usize {
        self.template().matches("{}").count()
    }

    pub fn is_deprecated(self) -> bool {
        let name: &'static str = self.into();
        name.ends_with("_1")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReverseError {
    #[error("Route {route} expects {expected} arguments, got {given}")]
    Arity {
        route: Route,
        expected: usize,
        given: usize,
    },
    #[error("Invalid path segment {0:?}")]
    Segment(String),
}

/// Produce the canonical path of a named route.
pub fn reverse(route: Route, args: &[&str]) -> Result<String, ReverseError> {
    let expected = route.arity();
    if args.len() != expected {
        return Err(ReverseError::Arity {
            route,
            expected,
            given: args.len(),
        });
    }
    if let Some(arg) = args.iter().find(|arg| arg.is_empty() || arg.contains('/')) {
        return Err(ReverseError::Segment((*arg).to_string()));
    }
    let mut parts = route.template().split("{}");
    let mut path = String::with_capacity(route.template().len() + 16 * expected);
    // `split` yields exactly one more part than there are placeholders
    path.push_str(parts.next().unwrap_or_default());
    for (arg, part) in args.iter().zip(parts) {
        path.push_str(arg);
        path.push_str(part);
    }
    Ok(path)
}

/// Join the configured base URL with a path produced by [`reverse`].
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn reverse_current_routes() {
        assert_eq!(
            "/api/v2/alice/datasets/ds/places/42",
            reverse(Route::PlaceDetail, &["alice", "ds", "42"]).unwrap()
        );
        assert_eq!(
            "/api/v2/alice/datasets/ds/places/42/comments",
            reverse(Route::SubmissionList, &["alice", "ds", "42", "comments"]).unwrap()
        );
    }

    #[test]
    fn reverse_deprecated_routes() {
        assert_eq!(
            "/api/v1/alice/datasets/ds/",
            reverse(Route::V1DataSetInstanceByUser, &["alice", "ds"]).unwrap()
        );
        assert_eq!(
            "/api/v1/alice/datasets/ds",
            reverse(Route::V1DataSetInstanceByUser1, &["alice", "ds"]).unwrap()
        );
        assert!(Route::V1DataSetInstanceByUser1.is_deprecated());
        assert!(!Route::V1DataSetInstanceByUser.is_deprecated());
    }

    #[test]
    fn reject_wrong_number_of_arguments() {
        assert_eq!(
            Err(ReverseError::Arity {
                route: Route::DataSetDetail,
                expected: 2,
                given: 1,
            }),
            reverse(Route::DataSetDetail, &["alice"])
        );
    }

    #[test]
    fn reject_invalid_segments() {
        assert!(reverse(Route::UserDetail, &[""]).is_err());
        assert!(reverse(Route::UserDetail, &["a/b"]).is_err());
    }

    #[test]
    fn every_route_can_be_reversed() {
        for route in Route::iter() {
            let args = vec!["x"; route.arity()];
            let path = reverse(route, &args).unwrap();
            assert!(path.starts_with("/api/"));
            assert!(!path.contains("{}"));
        }
    }

    #[test]
    fn join_base_url() {
        assert_eq!(
            "http://example.com/api/v2/alice",
            absolute_url("http://example.com/", "/api/v2/alice")
        );
    }
}

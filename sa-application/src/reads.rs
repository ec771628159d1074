//! Read paths with cached responses.
//!
//! Responses are filtered by the permissions of the requester.
//! Only anonymous responses are shared through the cache, all
//! other requesters get a freshly computed response.

use super::*;
use crate::{
    requester::{Requester, PLACES},
    serializers::{self, Detail, Serializer},
};
use sa_boundary as json;
use sa_core::{
    cache::{ActivityCache, CacheKeys, DataSetCache, ALL_SUBMISSIONS},
    routes::{absolute_url, reverse, Route},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Starts with 1
    pub page: usize,
    pub page_size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Drop the parts of a representation that the requester may not see.
pub(crate) fn restrict(requester: &Requester, dataset: &DataSet, detail: Detail) -> Detail {
    if requester.has_protected_access(dataset) {
        return detail;
    }
    Detail {
        include_private: false,
        include_invisible: false,
        ..detail
    }
}

fn path(route: Route, args: &[&str]) -> Result<String> {
    Ok(reverse(route, args).map_err(sa_core::cache::Error::from)?)
}

/// The cache key of an anonymous response.
fn response_key(prefix: &str, detail: Detail, page: Option<Page>) -> String {
    let detail = Detail {
        include_private: false,
        include_invisible: false,
        ..detail
    };
    let page_params = page.map(|p| (p.page.to_string(), p.page_size.to_string()));
    let mut params: Vec<(&str, &str)> = detail.params();
    if let Some((page, page_size)) = &page_params {
        params.push(("page", page.as_str()));
        params.push(("page_size", page_size.as_str()));
    }
    CacheKeys::key_with_params(prefix, &params)
}

/// `dataset` is the owner and slug of the dataset that the
/// response belongs to, if any.
fn cached<T, F>(
    backend: &Backend,
    requester: &Requester,
    dataset: Option<(&str, &str)>,
    prefix: &str,
    key: &str,
    compute: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    if !requester.is_anonymous() {
        return compute();
    }
    match dataset {
        Some(dataset) => {
            DataSetCache::cached_response(&backend.cache, dataset, prefix, key, compute)
        }
        None => backend.cache.cached_response(prefix, key, compute),
    }
}

fn serializer<'a, R: Db>(
    backend: &Backend<'a>,
    db: &'a R,
    requester: &'a Requester,
    dataset: &DataSet,
    detail: Detail,
) -> Serializer<'a, R> {
    let detail = restrict(requester, dataset, detail);
    Serializer::new(db, backend.cache, backend.base_url, requester, detail)
}

fn visible(thing: &Thing, detail: Detail) -> bool {
    thing.visible || detail.include_invisible
}

pub fn dataset_detail(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
) -> Result<Value> {
    let prefix = path(Route::DataSetDetail, &[owner, slug])?;
    let key = response_key(&prefix, Detail::default(), None);
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        serializer(backend, &db, requester, &dataset, Detail::default()).dataset(&dataset)
    })
}

pub fn dataset_list(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    page: Page,
) -> Result<json::Paginated<Value>> {
    let prefix = path(Route::DataSetList, &[owner])?;
    let key = response_key(&prefix, Detail::default(), Some(page));
    cached(backend, requester, None, &prefix, &key, || {
        let db = backend.connections.shared()?;
        let user = db.get_user_by_username(owner)?;
        let mut datasets = vec![];
        for dataset in db.datasets_of_owner(user.id.as_str())? {
            datasets.push(
                serializer(backend, &db, requester, &dataset, Detail::default())
                    .dataset(&dataset)?,
            );
        }
        let url = absolute_url(backend.base_url, &prefix);
        Ok(serializers::paginate(datasets, page.page, page.page_size, &url))
    })
}

pub fn place_detail(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    place_id: &str,
    detail: Detail,
) -> Result<Value> {
    let prefix = path(Route::PlaceDetail, &[owner, slug, place_id])?;
    let key = response_key(&prefix, detail, None);
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        requester.require(&db, DataAction::Retrieve, &dataset, PLACES)?;
        let detail = restrict(requester, &dataset, detail);
        let place = db.get_place(place_id)?;
        if place.thing.dataset_id != dataset.id || !visible(&place.thing, detail) {
            return Err(RepoError::NotFound.into());
        }
        serializer(backend, &db, requester, &dataset, detail).place(&dataset, &place)
    })
}

pub fn place_list(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    detail: Detail,
    page: Page,
) -> Result<json::Paginated<Value>> {
    let prefix = path(Route::PlaceList, &[owner, slug])?;
    let key = response_key(&prefix, detail, Some(page));
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        requester.require(&db, DataAction::Retrieve, &dataset, PLACES)?;
        let detail = restrict(requester, &dataset, detail);
        let serializer = serializer(backend, &db, requester, &dataset, detail);
        let places = db
            .places_of_dataset(dataset.id.as_str())?
            .into_iter()
            .filter(|place| visible(&place.thing, detail))
            .map(|place| serializer.place(&dataset, &place))
            .collect::<Result<Vec<_>>>()?;
        let url = absolute_url(backend.base_url, &prefix);
        Ok(serializers::paginate(places, page.page, page.page_size, &url))
    })
}

/// The submissions of one set of a place, or of all its sets.
#[allow(clippy::too_many_arguments)]
pub fn submission_list(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    place_id: &str,
    set_name: &str,
    detail: Detail,
    page: Page,
) -> Result<json::Paginated<Value>> {
    let prefix = path(Route::SubmissionList, &[owner, slug, place_id, set_name])?;
    let key = response_key(&prefix, detail, Some(page));
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        let place = db.get_place(place_id)?;
        if place.thing.dataset_id != dataset.id {
            return Err(RepoError::NotFound.into());
        }
        if set_name != ALL_SUBMISSIONS {
            requester.require(&db, DataAction::Retrieve, &dataset, set_name)?;
        }
        let detail = restrict(requester, &dataset, detail);
        let serializer = serializer(backend, &db, requester, &dataset, detail);
        let mut submissions = vec![];
        for set in db.submission_sets_of_place(place_id)? {
            if set_name != ALL_SUBMISSIONS && set.name != set_name {
                continue;
            }
            if !requester.may(&db, DataAction::Retrieve, &dataset, &set)? {
                continue;
            }
            for submission in db.submissions_of_set(set.id.as_str())? {
                if visible(&submission.thing, detail) {
                    submissions.push(serializer.submission(&dataset, &set, &submission)?);
                }
            }
        }
        let url = absolute_url(backend.base_url, &prefix);
        Ok(serializers::paginate(submissions, page.page, page.page_size, &url))
    })
}

#[allow(clippy::too_many_arguments)]
pub fn submission_detail(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    place_id: &str,
    set_name: &str,
    id: &str,
    detail: Detail,
) -> Result<Value> {
    let prefix = path(Route::SubmissionDetail, &[owner, slug, place_id, set_name, id])?;
    let key = response_key(&prefix, detail, None);
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        let submission = db.get_submission(id)?;
        let set = db.get_submission_set(submission.parent_id.as_str())?;
        let detail = restrict(requester, &dataset, detail);
        if submission.thing.dataset_id != dataset.id
            || set.place_id != place_id
            || (set_name != ALL_SUBMISSIONS && set.name != set_name)
            || !visible(&submission.thing, detail)
        {
            return Err(RepoError::NotFound.into());
        }
        requester.require(&db, DataAction::Retrieve, &dataset, &set)?;
        serializer(backend, &db, requester, &dataset, detail).submission(&dataset, &set, &submission)
    })
}

fn dataset_submissions<R: Db>(
    db: &R,
    serializer: &Serializer<R>,
    requester: &Requester,
    dataset: &DataSet,
    set_name: &str,
    detail: Detail,
) -> Result<Vec<Value>> {
    if set_name != ALL_SUBMISSIONS {
        requester.require(db, DataAction::Retrieve, dataset, set_name)?;
    }
    let filter = (set_name != ALL_SUBMISSIONS).then_some(set_name);
    let mut submissions = vec![];
    for (set, submission) in db.submissions_of_dataset(dataset.id.as_str(), filter)? {
        if !visible(&submission.thing, detail) {
            continue;
        }
        if !requester.may(db, DataAction::Retrieve, dataset, &set)? {
            continue;
        }
        submissions.push(serializer.submission(dataset, &set, &submission)?);
    }
    Ok(submissions)
}

/// The submissions of all places of a dataset.
pub fn dataset_submission_list(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    set_name: &str,
    detail: Detail,
    page: Page,
) -> Result<json::Paginated<Value>> {
    let prefix = path(Route::DataSetSubmissionList, &[owner, slug, set_name])?;
    let key = response_key(&prefix, detail, Some(page));
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        let detail = restrict(requester, &dataset, detail);
        let serializer = serializer(backend, &db, requester, &dataset, detail);
        let submissions =
            dataset_submissions(&db, &serializer, requester, &dataset, set_name, detail)?;
        let url = absolute_url(backend.base_url, &prefix);
        Ok(serializers::paginate(submissions, page.page, page.page_size, &url))
    })
}

/// All submissions of a dataset as CSV.
pub fn tabular_dataset_submissions(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    set_name: &str,
) -> Result<String> {
    let prefix = path(Route::DataSetSubmissionList, &[owner, slug, set_name])?;
    let key = CacheKeys::key_with_params(
        &response_key(&prefix, Detail::default(), None),
        &[("format", "csv")],
    );
    cached(backend, requester, Some((owner, slug)), &prefix, &key, || {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        let detail = restrict(requester, &dataset, Detail::default());
        let serializer = serializer(backend, &db, requester, &dataset, detail);
        let submissions =
            dataset_submissions(&db, &serializer, requester, &dataset, set_name, detail)?;
        serializers::to_csv(&submissions)
    })
}

/// The activity stream of a dataset, newest first.
pub fn action_list(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    limit: Option<usize>,
    page: Page,
) -> Result<json::Paginated<Value>> {
    let prefix = path(Route::ActionList, &[owner, slug])?;
    let limit_param = limit.map(|limit| limit.to_string());
    let key = CacheKeys::key_with_params(
        &response_key(&prefix, Detail::default(), Some(page)),
        &[("limit", limit_param.as_deref().unwrap_or("none"))],
    );
    let compute = || -> Result<json::Paginated<Value>> {
        let db = backend.connections.shared()?;
        let dataset = load_dataset(&db, owner, slug)?;
        let serializer = serializer(backend, &db, requester, &dataset, Detail::default());
        let mut actions = vec![];
        for action in db.actions_of_dataset(dataset.id.as_str(), limit)? {
            if let Some(action) = serializer.action(&dataset, &action)? {
                actions.push(action);
            }
        }
        let url = absolute_url(backend.base_url, &prefix);
        Ok(serializers::paginate(actions, page.page, page.page_size, &url))
    };
    if !requester.is_anonymous() {
        return compute();
    }
    ActivityCache::cached_activity(&backend.cache, &key, compute)
}

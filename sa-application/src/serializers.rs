//! JSON representations of the entities.
//!
//! The blob of a thing is exploded into the top level of its
//! representation, URLs are absolute and everything embedded is
//! filtered by the permissions of the requester.

use super::*;
use crate::{
    error::AppError,
    requester::{Requester, PLACES},
};
use sa_boundary as json;
use sa_core::{
    blob::DataBlobProcessor,
    cache::{self, CacheKeys, DataSetCache, PlaceCache, ThingCache},
    routes::{absolute_url, reverse, Route},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// What a representation contains besides the public fields.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detail {
    /// Blob keys that start with `private`
    pub include_private     : bool,
    pub include_invisible   : bool,
    /// Embed the submissions instead of summaries
    pub include_submissions : bool,
}

impl Detail {
    /// Variant parameters for cache keys.
    pub fn params(&self) -> Vec<(&'static str, &'static str)> {
        let flag = |on: bool| if on { "on" } else { "off" };
        vec![
            ("include_private", flag(self.include_private)),
            ("include_invisible", flag(self.include_invisible)),
            ("include_submissions", flag(self.include_submissions)),
        ]
    }
}

pub struct Serializer<'a, R> {
    repo: &'a R,
    keys: CacheKeys<'a>,
    base_url: &'a str,
    requester: &'a Requester,
    detail: Detail,
}

impl<'a, R: Db> Serializer<'a, R> {
    pub fn new(
        repo: &'a R,
        keys: CacheKeys<'a>,
        base_url: &'a str,
        requester: &'a Requester,
        detail: Detail,
    ) -> Self {
        Self {
            repo,
            keys,
            base_url,
            requester,
            detail,
        }
    }

    pub fn url(&self, route: Route, args: &[&str]) -> Result<String> {
        let path = reverse(route, args).map_err(cache::Error::from)?;
        Ok(absolute_url(self.base_url, &path))
    }

    fn explode<T: Serialize>(&self, processor: &DataBlobProcessor, repr: &T) -> Result<Value> {
        let Value::Object(map) = serde_json::to_value(repr)? else {
            return Err(AppError::Other(anyhow::anyhow!(
                "Representation is not an object"
            )));
        };
        let map = processor
            .explode(map, self.detail.include_private)
            .map_err(usecases::Error::from)?;
        Ok(Value::Object(map))
    }

    fn submitter(&self, thing: &Thing) -> Result<Option<json::User>> {
        let Some(id) = &thing.submitter_id else {
            return Ok(None);
        };
        match self.repo.get_user(id.as_str()) {
            Ok(user) => Ok(Some(json::User::from(&user))),
            Err(RepoError::NotFound) => {
                warn!("Submitter {id} of {} does not exist", thing.id);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn attachments(&self, thing: &Thing) -> Result<Vec<json::Attachment>> {
        let mut all: usecases::ThingAttachments = ThingCache::get_attachments(
            &self.keys,
            thing.dataset_id.as_str(),
            |dataset_id| usecases::calculate_attachments(self.repo, dataset_id).map_err(AppError::from),
        )?;
        Ok(all
            .remove(thing.id.as_str())
            .unwrap_or_default()
            .into_iter()
            .map(|a| json::Attachment {
                name: a.name,
                file: a.file,
                created_datetime: a.created_datetime,
                updated_datetime: a.updated_datetime,
            })
            .collect())
    }

    fn may_retrieve(&self, dataset: &DataSet, set_name: &str) -> Result<bool> {
        Ok(self
            .requester
            .may(self.repo, DataAction::Retrieve, dataset, set_name)?)
    }

    pub fn place(&self, dataset: &DataSet, place: &Place) -> Result<Value> {
        let (owner, slug) = (dataset.owner.username.as_str(), dataset.slug.as_str());
        let id = place.id().as_str();
        let submission_sets = if self.detail.include_submissions {
            json::SubmissionSets::Detailed(self.detailed_submission_sets(dataset, place)?)
        } else {
            json::SubmissionSets::Summary(self.submission_set_summaries(dataset, place)?)
        };
        let thing = &place.thing;
        let repr = json::Place {
            url: self.url(Route::PlaceDetail, &[owner, slug, id])?,
            id: id.to_string(),
            geometry: place.geometry.to_wkt(),
            dataset: self.url(Route::DataSetDetail, &[owner, slug])?,
            attachments: self.attachments(thing)?,
            submitter: self.submitter(thing)?,
            data: thing.data.as_str().to_string(),
            visible: thing.visible,
            created_datetime: thing.created_at.to_rfc3339(),
            updated_datetime: thing.updated_at.to_rfc3339(),
            submission_sets: Some(submission_sets),
        };
        self.explode(&DataBlobProcessor::for_places(), &repr)
    }

    fn submission_set_summaries(
        &self,
        dataset: &DataSet,
        place: &Place,
    ) -> Result<BTreeMap<String, json::CollectionSummary>> {
        let (owner, slug) = (dataset.owner.username.as_str(), dataset.slug.as_str());
        let place_id = place.id().as_str();
        let mut all: usecases::PlaceSubmissionSets = PlaceCache::get_submission_sets(
            &self.keys,
            dataset.id.as_str(),
            &[],
            |dataset_id| {
                usecases::calculate_submission_sets(self.repo, dataset_id).map_err(AppError::from)
            },
        )?;
        let mut summaries = BTreeMap::new();
        for (name, length) in all.remove(place_id).unwrap_or_default() {
            if !self.may_retrieve(dataset, &name)? {
                continue;
            }
            let url = self.url(Route::SubmissionList, &[owner, slug, place_id, &name])?;
            summaries.insert(name, json::CollectionSummary { length, url });
        }
        Ok(summaries)
    }

    fn detailed_submission_sets(
        &self,
        dataset: &DataSet,
        place: &Place,
    ) -> Result<BTreeMap<String, Vec<Value>>> {
        let mut sets = BTreeMap::new();
        for set in self.repo.submission_sets_of_place(place.id().as_str())? {
            if !self.may_retrieve(dataset, &set.name)? {
                continue;
            }
            let submissions = self
                .repo
                .submissions_of_set(set.id.as_str())?
                .into_iter()
                .filter(|s| self.detail.include_invisible || s.thing.visible)
                .map(|s| self.submission(dataset, &set, &s))
                .collect::<Result<Vec<_>>>()?;
            if !submissions.is_empty() {
                sets.insert(set.name, submissions);
            }
        }
        Ok(sets)
    }

    pub fn submission(
        &self,
        dataset: &DataSet,
        set: &SubmissionSet,
        submission: &Submission,
    ) -> Result<Value> {
        let (owner, slug) = (dataset.owner.username.as_str(), dataset.slug.as_str());
        let place_id = set.place_id.as_str();
        let id = submission.id().as_str();
        let thing = &submission.thing;
        let repr = json::Submission {
            url: self.url(Route::SubmissionDetail, &[owner, slug, place_id, &set.name, id])?,
            id: id.to_string(),
            dataset: self.url(Route::DataSetDetail, &[owner, slug])?,
            set: set.name.clone(),
            place: self.url(Route::PlaceDetail, &[owner, slug, place_id])?,
            attachments: self.attachments(thing)?,
            submitter: self.submitter(thing)?,
            data: thing.data.as_str().to_string(),
            visible: thing.visible,
            created_datetime: thing.created_at.to_rfc3339(),
            updated_datetime: thing.updated_at.to_rfc3339(),
        };
        self.explode(&DataBlobProcessor::for_submissions(), &repr)
    }

    pub fn dataset(&self, dataset: &DataSet) -> Result<Value> {
        let (owner, slug) = (dataset.owner.username.as_str(), dataset.slug.as_str());
        let mut all: usecases::DataSetSubmissionSets = DataSetCache::get_submission_sets(
            &self.keys,
            dataset.owner.id.as_str(),
            &[],
            |owner_id| {
                usecases::calculate_dataset_submission_sets(self.repo, owner_id)
                    .map_err(AppError::from)
            },
        )?;
        let mut submission_sets = BTreeMap::new();
        for (name, length) in all.remove(dataset.id.as_str()).unwrap_or_default() {
            if !self.may_retrieve(dataset, &name)? {
                continue;
            }
            let url = self.url(Route::DataSetSubmissionList, &[owner, slug, &name])?;
            submission_sets.insert(name, json::CollectionSummary { length, url });
        }
        let repr = json::DataSet {
            url: self.url(Route::DataSetDetail, &[owner, slug])?,
            id: dataset.id.to_string(),
            slug: dataset.slug.clone(),
            display_name: dataset.display_name.clone(),
            owner: dataset.owner.username.clone(),
            keys: json::Link {
                url: self.url(Route::ApiKeyList, &[owner, slug])?,
            },
            places: json::CollectionSummary {
                length: self.repo.count_places_of_dataset(dataset.id.as_str())?,
                url: self.url(Route::PlaceList, &[owner, slug])?,
            },
            submission_sets,
        };
        Ok(serde_json::to_value(repr)?)
    }

    /// An entry of the activity stream.
    ///
    /// Actions on things that the requester may not see are skipped.
    pub fn action(&self, dataset: &DataSet, action: &Action) -> Result<Option<Value>> {
        let thing_id = action.thing_id.as_str();
        let (thing, kind) = match self.repo.get_thing(thing_id) {
            Ok(found) => found,
            Err(RepoError::NotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if !(thing.visible || self.detail.include_invisible) {
            return Ok(None);
        }
        let (target_type, target) = match kind {
            ThingKind::Place => {
                if !self.may_retrieve(dataset, PLACES)? {
                    return Ok(None);
                }
                let place = self.repo.get_place(thing_id)?;
                ("place".to_string(), self.place(dataset, &place)?)
            }
            ThingKind::Submission => {
                let submission = self.repo.get_submission(thing_id)?;
                let set = self
                    .repo
                    .get_submission_set(submission.parent_id.as_str())?;
                if !self.may_retrieve(dataset, &set.name)? {
                    return Ok(None);
                }
                let target = self.submission(dataset, &set, &submission)?;
                (set.name, target)
            }
        };
        let repr = json::Action {
            id: action.id.to_string(),
            action: action.action.to_string(),
            target_type,
            target,
            created_datetime: action.created_at.to_rfc3339(),
        };
        Ok(Some(serde_json::to_value(repr)?))
    }
}

/// Split results into pages of a fixed size, starting with page 1.
pub fn paginate<T>(
    results: Vec<T>,
    page: usize,
    page_size: usize,
    url: &str,
) -> json::Paginated<T> {
    let length = results.len();
    let page_size = page_size.max(1);
    let num_pages = length.div_ceil(page_size).max(1);
    let page = page.clamp(1, num_pages);
    let link = |page: usize| format!("{url}?page={page}");
    let results = results
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    json::Paginated {
        metadata: json::Metadata {
            length,
            next: (page < num_pages).then(|| link(page + 1)),
            previous: (page > 1).then(|| link(page - 1)),
            page,
            num_pages,
        },
        results,
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
    }
}

/// Render representations as CSV with one column per key.
pub fn to_csv(rows: &[Value]) -> Result<String> {
    let header: BTreeSet<&str> = rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(&header)?;
    for row in rows {
        writer.write_record(header.iter().map(|column| cell(row.get(column))))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Failed to flush CSV: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// The datasets that a key grants access to.
///
/// Keys belong to exactly one dataset, but clients of the first API
/// version expect a list.
pub fn api_key_datasets<R: DataSetRepo>(repo: &R, api_key: &ApiKey) -> Result<Vec<DataSet>> {
    Ok(vec![repo.get_dataset(api_key.dataset_id.as_str())?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paginate_results() {
        let page = paginate((1..=25).collect(), 2, 10, "http://sa/api/v2/a/datasets/ds/places");
        assert_eq!(25, page.metadata.length);
        assert_eq!(3, page.metadata.num_pages);
        assert_eq!((11..=20).collect::<Vec<_>>(), page.results);
        assert_eq!(
            Some("http://sa/api/v2/a/datasets/ds/places?page=3"),
            page.metadata.next.as_deref()
        );
        assert_eq!(
            Some("http://sa/api/v2/a/datasets/ds/places?page=1"),
            page.metadata.previous.as_deref()
        );
    }

    #[test]
    fn paginate_empty_results() {
        let page = paginate(Vec::<u8>::new(), 5, 10, "/x");
        assert_eq!(1, page.metadata.page);
        assert_eq!(1, page.metadata.num_pages);
        assert!(page.metadata.next.is_none());
        assert!(page.metadata.previous.is_none());
    }

    #[test]
    fn csv_columns_are_the_union_of_all_keys() {
        let csv = to_csv(&[
            json!({"id": "1", "comment": "Nice, really"}),
            json!({"id": "2", "rating": 5, "visible": true, "nothing": null}),
        ])
        .unwrap();
        let mut lines = csv.lines();
        assert_eq!(Some("comment,id,nothing,rating,visible"), lines.next());
        assert_eq!(Some("\"Nice, really\",1,,,"), lines.next());
        assert_eq!(Some(",2,,5,true"), lines.next());
        assert_eq!(None, lines.next());
    }

    #[test]
    fn detail_params_name_every_flag() {
        let detail = Detail {
            include_private: true,
            ..Default::default()
        };
        assert_eq!(
            vec![
                ("include_private", "on"),
                ("include_invisible", "off"),
                ("include_submissions", "off"),
            ],
            detail.params()
        );
    }
}

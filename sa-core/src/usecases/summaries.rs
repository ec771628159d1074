//! Aggregates that the serializers embed and the cache keeps
//! between requests.

use super::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of visible submissions per set name.
pub type SetLengths = BTreeMap<String, usize>;

/// [`SetLengths`] by place id.
pub type PlaceSubmissionSets = BTreeMap<String, SetLengths>;

/// [`SetLengths`] by dataset id.
pub type DataSetSubmissionSets = BTreeMap<String, SetLengths>;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub name             : String,
    pub file             : String,
    pub created_datetime : String,
    pub updated_datetime : String,
}

/// Attachments by thing id.
pub type ThingAttachments = BTreeMap<String, Vec<AttachmentSummary>>;

pub fn calculate_submission_sets<R: SubmissionRepo>(
    repo: &R,
    dataset_id: &str,
) -> Result<PlaceSubmissionSets> {
    let mut summaries = PlaceSubmissionSets::new();
    for count in repo.count_visible_submissions(dataset_id)? {
        if count.length == 0 {
            continue;
        }
        summaries
            .entry(count.place_id.into())
            .or_default()
            .insert(count.set_name, count.length);
    }
    Ok(summaries)
}

/// The set lengths of all datasets of an owner.
pub fn calculate_dataset_submission_sets<R>(
    repo: &R,
    owner_id: &str,
) -> Result<DataSetSubmissionSets>
where
    R: DataSetRepo + SubmissionRepo,
{
    let mut summaries = DataSetSubmissionSets::new();
    for dataset in repo.datasets_of_owner(owner_id)? {
        let mut lengths = SetLengths::new();
        for count in repo.count_visible_submissions(dataset.id.as_str())? {
            *lengths.entry(count.set_name).or_default() += count.length;
        }
        lengths.retain(|_, length| *length > 0);
        summaries.insert(dataset.id.into(), lengths);
    }
    Ok(summaries)
}

pub fn calculate_attachments<R: AttachmentRepo>(
    repo: &R,
    dataset_id: &str,
) -> Result<ThingAttachments> {
    let mut attachments = ThingAttachments::new();
    for a in repo.attachments_of_dataset(dataset_id)? {
        attachments
            .entry(a.thing_id.into())
            .or_default()
            .push(AttachmentSummary {
                created_datetime: a.created_at.to_rfc3339(),
                updated_datetime: a.updated_at.to_rfc3339(),
                name: a.name,
                file: a.file,
            });
    }
    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::{
        super::{tests::MockDb, *},
        *,
    };
    use sa_entities::builders::*;

    fn fixture() -> MockDb {
        let db = MockDb::default();
        let owner = User::build().id("u1").username("alice").finish();
        db.create_dataset(&DataSet::build().id("ds").owner(&owner).slug("ds").finish())
            .unwrap();
        for place_id in ["p1", "p2"] {
            db.create_place(&Place::build().id(place_id).dataset("ds").finish())
                .unwrap();
        }
        for (set_id, place_id, name) in [
            ("s1", "p1", "comments"),
            ("s2", "p1", "likes"),
            ("s3", "p2", "comments"),
        ] {
            db.create_submission_set(&SubmissionSet {
                id: set_id.into(),
                place_id: place_id.into(),
                name: name.into(),
            })
            .unwrap();
        }
        for (id, set_id, visible) in [
            ("c1", "s1", true),
            ("c2", "s1", true),
            ("c3", "s1", false),
            ("l1", "s2", false),
            ("c4", "s3", true),
        ] {
            db.create_submission(
                &Submission::build()
                    .id(id)
                    .dataset("ds")
                    .parent(set_id)
                    .visible(visible)
                    .finish(),
            )
            .unwrap();
        }
        db
    }

    #[test]
    fn count_visible_submissions_per_place() {
        let db = fixture();
        let summaries = calculate_submission_sets(&db, "ds").unwrap();
        assert_eq!(2, summaries.len());
        assert_eq!(Some(&2), summaries["p1"].get("comments"));
        // Sets without visible submissions are omitted
        assert_eq!(None, summaries["p1"].get("likes"));
        assert_eq!(Some(&1), summaries["p2"].get("comments"));
    }

    #[test]
    fn count_visible_submissions_per_dataset() {
        let db = fixture();
        let summaries = calculate_dataset_submission_sets(&db, "u1").unwrap();
        assert_eq!(Some(&3), summaries["ds"].get("comments"));
        assert_eq!(None, summaries["ds"].get("likes"));
    }

    #[test]
    fn group_attachments_by_thing() {
        let db = fixture();
        let now = Timestamp::now();
        for (id, thing_id) in [("a1", "p1"), ("a2", "p1"), ("a3", "c1")] {
            db.create_attachment(&Attachment {
                id: id.into(),
                thing_id: thing_id.into(),
                name: id.into(),
                file: format!("attachments/{id}.jpg"),
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        }
        let attachments = calculate_attachments(&db, "ds").unwrap();
        assert_eq!(2, attachments["p1"].len());
        assert_eq!("attachments/a3.jpg", attachments["c1"][0].file);
    }
}

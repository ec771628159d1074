use super::prelude::*;
use serde_json::Value;

/// Bring the indexed values of a thing in line with its data
/// blob and the indexes that are currently defined for its dataset.
pub fn index_thing<R>(repo: &R, thing: &Thing) -> Result<()>
where
    R: DataIndexRepo + IndexedValueRepo,
{
    let blob = thing.data.parse()?;
    let indexes = repo.data_indexes_of_dataset(thing.dataset_id.as_str())?;
    let mut existing = repo.indexed_values_of_thing(thing.id.as_str())?;

    for index in &indexes {
        let current = existing
            .iter()
            .position(|v| v.index_id == index.id)
            .map(|pos| existing.swap_remove(pos));
        match (current, index.extract(&blob)) {
            (None, Some(value)) => {
                repo.create_indexed_value(&IndexedValue {
                    id: Id::new(),
                    index_id: index.id.clone(),
                    thing_id: thing.id.clone(),
                    value,
                })?;
            }
            (Some(current), Some(value)) if current.value != value => {
                repo.update_indexed_value(&IndexedValue { value, ..current })?;
            }
            (Some(current), None) => {
                repo.delete_indexed_value(current.id.as_str())?;
            }
            _ => {}
        }
    }
    // Values of indexes that vanished or duplicates
    for stale in existing {
        log::debug!("Deleting stale indexed value {} of {}", stale.id, thing.id);
        repo.delete_indexed_value(stale.id.as_str())?;
    }
    Ok(())
}

/// Define a new index and fill it with the values of all
/// things of the dataset.
pub fn add_data_index<R>(repo: &R, dataset_id: &str, attr_name: &str) -> Result<DataIndex>
where
    R: DataIndexRepo + IndexedValueRepo + ThingRepo,
{
    let attr_name = attr_name.trim();
    if attr_name.is_empty() || attr_name.len() > 100 {
        return Err(Error::AttributeName);
    }
    let index = DataIndex {
        id: Id::new(),
        dataset_id: dataset_id.into(),
        attr_name: attr_name.to_string(),
    };
    repo.create_data_index(&index)?;
    let things = repo.things_of_dataset(dataset_id)?;
    let mut count = 0;
    for thing in &things {
        let blob = thing.data.parse()?;
        if let Some(value) = index.extract(&blob) {
            repo.create_indexed_value(&IndexedValue {
                id: Id::new(),
                index_id: index.id.clone(),
                thing_id: thing.id.clone(),
                value,
            })?;
            count += 1;
        }
    }
    log::info!(
        "Indexed '{}' of {count} out of {} things in dataset {dataset_id}",
        index.attr_name,
        things.len()
    );
    Ok(index)
}

pub fn remove_data_index<R: DataIndexRepo>(repo: &R, index_id: &str) -> Result<DataIndex> {
    let index = repo.get_data_index(index_id)?;
    repo.delete_data_index(index_id)?;
    log::info!(
        "Removed index '{}' of dataset {}",
        index.attr_name,
        index.dataset_id
    );
    Ok(index)
}

/// All things of a dataset whose indexed attribute equals the value.
///
/// Without an index for the attribute nothing matches.
pub fn filter_by_index<R>(
    repo: &R,
    dataset_id: &str,
    attr_name: &str,
    value: &Value,
) -> Result<Vec<Thing>>
where
    R: DataIndexRepo + IndexedValueRepo + ThingRepo,
{
    let Some(index) = repo
        .data_indexes_of_dataset(dataset_id)?
        .into_iter()
        .find(|i| i.attr_name == attr_name)
    else {
        log::debug!("No index for '{attr_name}' in dataset {dataset_id}");
        return Ok(vec![]);
    };
    let value = indexed_value_string(value);
    repo.thing_ids_by_indexed_value(index.id.as_str(), &value)?
        .into_iter()
        .map(|id| Ok(repo.get_thing(id.as_str())?.0))
        .collect()
}

/// The typed value of an attribute, read from the blob.
pub fn indexed_value(thing: &Thing, attr_name: &str) -> Result<Value> {
    thing
        .data
        .parse()?
        .remove(attr_name)
        .ok_or_else(|| Error::AttributeNotFound(attr_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        super::{tests::MockDb, *},
        *,
    };
    use sa_entities::builders::*;
    use serde_json::json;

    fn values_of(db: &MockDb, thing_id: &str) -> Vec<(String, String)> {
        let mut values: Vec<_> = db
            .indexed_values_of_thing(thing_id)
            .unwrap()
            .into_iter()
            .map(|v| {
                let index = db.get_data_index(v.index_id.as_str()).unwrap();
                (index.attr_name, v.value)
            })
            .collect();
        values.sort();
        values
    }

    fn place(db: &MockDb, id: &str, data: Value) -> Place {
        let place = Place::build()
            .id(id)
            .dataset("ds")
            .data(&data.to_string())
            .finish();
        db.create_place(&place).unwrap();
        place
    }

    #[test]
    fn adding_an_index_backfills_existing_things() {
        let db = MockDb::default();
        place(&db, "p1", json!({"index1": "value1", "index2": 2}));
        place(&db, "p2", json!({"other": true}));
        add_data_index(&db, "ds", "index2").unwrap();
        assert_eq!(vec![("index2".to_string(), "2".to_string())], values_of(&db, "p1"));
        assert!(values_of(&db, "p2").is_empty());
    }

    #[test]
    fn reject_empty_attribute_names() {
        let db = MockDb::default();
        assert!(matches!(
            add_data_index(&db, "ds", " "),
            Err(Error::AttributeName)
        ));
    }

    #[test]
    fn saving_reconciles_the_indexed_values() {
        let db = MockDb::default();
        add_data_index(&db, "ds", "index1").unwrap();
        add_data_index(&db, "ds", "index2").unwrap();
        let mut p = place(&db, "p1", json!({"index1": "value1", "index2": 2}));
        index_thing(&db, &p.thing).unwrap();
        assert_eq!(
            vec![
                ("index1".to_string(), "value1".to_string()),
                ("index2".to_string(), "2".to_string())
            ],
            values_of(&db, "p1")
        );
        let index2_value_id = db.indexed_values.borrow()[1].id.clone();

        p.thing.data = json!({"index2": 3, "index3": "x"}).to_string().into();
        index_thing(&db, &p.thing).unwrap();
        assert_eq!(
            vec![("index2".to_string(), "3".to_string())],
            values_of(&db, "p1")
        );
        // Updated in place
        assert_eq!(index2_value_id, db.indexed_values.borrow()[0].id);
    }

    #[test]
    fn values_of_removed_indexes_disappear() {
        let db = MockDb::default();
        let index = add_data_index(&db, "ds", "index1").unwrap();
        place(&db, "p1", json!({"index1": "value1"}));
        index_thing(&db, &db.get_place("p1").unwrap().thing).unwrap();
        remove_data_index(&db, index.id.as_str()).unwrap();
        assert!(values_of(&db, "p1").is_empty());
        assert!(db.indexed_values.borrow().is_empty());
    }

    #[test]
    fn deleting_a_thing_deletes_its_values() {
        let db = MockDb::default();
        add_data_index(&db, "ds", "index1").unwrap();
        let p = place(&db, "p1", json!({"index1": "value1"}));
        index_thing(&db, &p.thing).unwrap();
        db.delete_thing("p1").unwrap();
        assert!(db.indexed_values.borrow().is_empty());
    }

    #[test]
    fn filter_matches_numbers_and_strings_alike() {
        let db = MockDb::default();
        add_data_index(&db, "ds", "index2").unwrap();
        for (id, data) in [
            ("p1", json!({"index2": 2})),
            ("p2", json!({"index2": "2"})),
            ("p3", json!({"index2": 3})),
        ] {
            let p = place(&db, id, data);
            index_thing(&db, &p.thing).unwrap();
        }
        let mut ids: Vec<_> = filter_by_index(&db, "ds", "index2", &json!(2))
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        ids.sort();
        assert_eq!(vec![Id::from("p1"), Id::from("p2")], ids);
        assert!(filter_by_index(&db, "ds", "unindexed", &json!(2))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn read_the_typed_value() {
        let p = Place::build()
            .data(r#"{"index1": "value1", "index2": 2}"#)
            .finish();
        assert_eq!(json!(2), indexed_value(&p.thing, "index2").unwrap());
        assert_eq!(json!("value1"), indexed_value(&p.thing, "index1").unwrap());
        assert!(matches!(
            indexed_value(&p.thing, "index3"),
            Err(Error::AttributeNotFound(name)) if name == "index3"
        ));
    }
}

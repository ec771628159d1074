use super::*;
use std::collections::BTreeMap;

impl<'a> ThingRepo for DbConnection<'a> {
    fn get_thing(&self, id: &str) -> Result<(Thing, ThingKind)> {
        get_thing(&mut self.conn.borrow_mut(), id)
    }
    fn things_of_dataset(&self, dataset_id: &str) -> Result<Vec<Thing>> {
        things_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
    fn delete_thing(&self, id: &str) -> Result<()> {
        delete_thing(&mut self.conn.borrow_mut(), id)
    }
}

impl<'a> ThingRepo for DbReadOnly<'a> {
    fn get_thing(&self, id: &str) -> Result<(Thing, ThingKind)> {
        get_thing(&mut self.conn.borrow_mut(), id)
    }
    fn things_of_dataset(&self, dataset_id: &str) -> Result<Vec<Thing>> {
        things_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
    fn delete_thing(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
}

impl<'a> PlaceRepo for DbConnection<'a> {
    fn create_place(&self, place: &Place) -> Result<()> {
        create_place(&mut self.conn.borrow_mut(), place)
    }
    fn update_place(&self, place: &Place) -> Result<()> {
        update_place(&mut self.conn.borrow_mut(), place)
    }
    fn get_place(&self, id: &str) -> Result<Place> {
        get_place(&mut self.conn.borrow_mut(), id)
    }
    fn places_of_dataset(&self, dataset_id: &str) -> Result<Vec<Place>> {
        places_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
    fn count_places_of_dataset(&self, dataset_id: &str) -> Result<usize> {
        count_places_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> PlaceRepo for DbReadOnly<'a> {
    fn create_place(&self, _place: &Place) -> Result<()> {
        unreachable!();
    }
    fn update_place(&self, _place: &Place) -> Result<()> {
        unreachable!();
    }
    fn get_place(&self, id: &str) -> Result<Place> {
        get_place(&mut self.conn.borrow_mut(), id)
    }
    fn places_of_dataset(&self, dataset_id: &str) -> Result<Vec<Place>> {
        places_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
    fn count_places_of_dataset(&self, dataset_id: &str) -> Result<usize> {
        count_places_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> SubmissionSetRepo for DbConnection<'a> {
    fn create_submission_set(&self, set: &SubmissionSet) -> Result<()> {
        create_submission_set(&mut self.conn.borrow_mut(), set)
    }
    fn get_submission_set(&self, id: &str) -> Result<SubmissionSet> {
        get_submission_set(&mut self.conn.borrow_mut(), id)
    }
    fn try_get_submission_set_by_name(
        &self,
        place_id: &str,
        name: &str,
    ) -> Result<Option<SubmissionSet>> {
        try_get_submission_set_by_name(&mut self.conn.borrow_mut(), place_id, name)
    }
    fn submission_sets_of_place(&self, place_id: &str) -> Result<Vec<SubmissionSet>> {
        submission_sets_of_place(&mut self.conn.borrow_mut(), place_id)
    }
}

impl<'a> SubmissionSetRepo for DbReadOnly<'a> {
    fn create_submission_set(&self, _set: &SubmissionSet) -> Result<()> {
        unreachable!();
    }
    fn get_submission_set(&self, id: &str) -> Result<SubmissionSet> {
        get_submission_set(&mut self.conn.borrow_mut(), id)
    }
    fn try_get_submission_set_by_name(
        &self,
        place_id: &str,
        name: &str,
    ) -> Result<Option<SubmissionSet>> {
        try_get_submission_set_by_name(&mut self.conn.borrow_mut(), place_id, name)
    }
    fn submission_sets_of_place(&self, place_id: &str) -> Result<Vec<SubmissionSet>> {
        submission_sets_of_place(&mut self.conn.borrow_mut(), place_id)
    }
}

impl<'a> SubmissionRepo for DbConnection<'a> {
    fn create_submission(&self, submission: &Submission) -> Result<()> {
        create_submission(&mut self.conn.borrow_mut(), submission)
    }
    fn update_submission(&self, submission: &Submission) -> Result<()> {
        update_submission(&mut self.conn.borrow_mut(), submission)
    }
    fn get_submission(&self, id: &str) -> Result<Submission> {
        get_submission(&mut self.conn.borrow_mut(), id)
    }
    fn submissions_of_set(&self, set_id: &str) -> Result<Vec<Submission>> {
        submissions_of_set(&mut self.conn.borrow_mut(), set_id)
    }
    fn submissions_of_dataset(
        &self,
        dataset_id: &str,
        set_name: Option<&str>,
    ) -> Result<Vec<(SubmissionSet, Submission)>> {
        submissions_of_dataset(&mut self.conn.borrow_mut(), dataset_id, set_name)
    }
    fn count_visible_submissions(&self, dataset_id: &str) -> Result<Vec<SubmissionSetCount>> {
        count_visible_submissions(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> SubmissionRepo for DbReadOnly<'a> {
    fn create_submission(&self, _submission: &Submission) -> Result<()> {
        unreachable!();
    }
    fn update_submission(&self, _submission: &Submission) -> Result<()> {
        unreachable!();
    }
    fn get_submission(&self, id: &str) -> Result<Submission> {
        get_submission(&mut self.conn.borrow_mut(), id)
    }
    fn submissions_of_set(&self, set_id: &str) -> Result<Vec<Submission>> {
        submissions_of_set(&mut self.conn.borrow_mut(), set_id)
    }
    fn submissions_of_dataset(
        &self,
        dataset_id: &str,
        set_name: Option<&str>,
    ) -> Result<Vec<(SubmissionSet, Submission)>> {
        submissions_of_dataset(&mut self.conn.borrow_mut(), dataset_id, set_name)
    }
    fn count_visible_submissions(&self, dataset_id: &str) -> Result<Vec<SubmissionSetCount>> {
        count_visible_submissions(&mut self.conn.borrow_mut(), dataset_id)
    }
}

///////////////////////////////////////////////////////////////////////
// Things
///////////////////////////////////////////////////////////////////////

fn thing_model(thing: &Thing) -> models::Thing {
    models::Thing {
        id: thing.id.to_string(),
        dataset_id: thing.dataset_id.to_string(),
        submitter_id: thing.submitter_id.as_ref().map(ToString::to_string),
        data: thing.data.to_string(),
        visible: thing.visible,
        created_at: thing.created_at.as_millis(),
        updated_at: thing.updated_at.as_millis(),
    }
}

fn load_thing(model: models::Thing) -> Result<Thing> {
    let models::Thing {
        id,
        dataset_id,
        submitter_id,
        data,
        visible,
        created_at,
        updated_at,
    } = model;
    Ok(Thing {
        id: id.into(),
        dataset_id: dataset_id.into(),
        submitter_id: submitter_id.map(Into::into),
        data: data.into(),
        visible,
        created_at: load_timestamp(created_at)?,
        updated_at: load_timestamp(updated_at)?,
    })
}

fn insert_thing(conn: &mut SqliteConnection, thing: &Thing) -> QueryResult<()> {
    diesel::insert_into(schema::things::table)
        .values(&thing_model(thing))
        .execute(conn)?;
    Ok(())
}

fn update_thing(conn: &mut SqliteConnection, thing: &Thing) -> QueryResult<usize> {
    use schema::things::dsl;
    diesel::update(dsl::things.find(thing.id.as_str()))
        .set(&thing_model(thing))
        .execute(conn)
}

fn get_thing(conn: &mut SqliteConnection, id: &str) -> Result<(Thing, ThingKind)> {
    use schema::{places::dsl as p, things::dsl as t};
    let model = t::things
        .find(id)
        .first::<models::Thing>(conn)
        .map_err(from_diesel_err)?;
    let is_place = diesel::select(diesel::dsl::exists(p::places.find(id)))
        .get_result::<bool>(conn)
        .map_err(from_diesel_err)?;
    let kind = if is_place {
        ThingKind::Place
    } else {
        ThingKind::Submission
    };
    Ok((load_thing(model)?, kind))
}

fn things_of_dataset(conn: &mut SqliteConnection, dataset_id: &str) -> Result<Vec<Thing>> {
    use schema::things::dsl;
    dsl::things
        .filter(dsl::dataset_id.eq(dataset_id))
        .order_by(dsl::created_at)
        .load::<models::Thing>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_thing)
        .collect()
}

// The database cascades into the place or submission row
// and everything that depends on it.
fn delete_thing(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::things::dsl;
    let count = diesel::delete(dsl::things.find(id))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

///////////////////////////////////////////////////////////////////////
// Places
///////////////////////////////////////////////////////////////////////

fn load_place((thing, geometry): (models::Thing, String)) -> Result<Place> {
    let geometry = geometry.parse::<Geometry>().map_err(|err| {
        log::warn!("Invalid geometry of place '{}': {err}", thing.id);
        anyhow!(err)
    })?;
    Ok(Place {
        thing: load_thing(thing)?,
        geometry,
    })
}

fn create_place(conn: &mut SqliteConnection, place: &Place) -> Result<()> {
    let new_place = models::NewPlace {
        id: place.id().as_str(),
        geometry: place.geometry.to_wkt(),
    };
    conn.transaction::<_, DieselError, _>(|conn| {
        insert_thing(conn, &place.thing)?;
        diesel::insert_into(schema::places::table)
            .values(&new_place)
            .execute(conn)?;
        Ok(())
    })
    .map_err(from_diesel_err)
}

fn update_place(conn: &mut SqliteConnection, place: &Place) -> Result<()> {
    use schema::places::dsl;
    let count = conn
        .transaction::<_, DieselError, _>(|conn| {
            if update_thing(conn, &place.thing)? == 0 {
                return Ok(0);
            }
            diesel::update(dsl::places.find(place.id().as_str()))
                .set(dsl::geometry.eq(place.geometry.to_wkt()))
                .execute(conn)
        })
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_place(conn: &mut SqliteConnection, id: &str) -> Result<Place> {
    use schema::{places::dsl as p, things::dsl as t};
    let row = t::things
        .inner_join(p::places)
        .filter(t::id.eq(id))
        .select((schema::things::all_columns, p::geometry))
        .first::<(models::Thing, String)>(conn)
        .map_err(from_diesel_err)?;
    load_place(row)
}

fn places_of_dataset(conn: &mut SqliteConnection, dataset_id: &str) -> Result<Vec<Place>> {
    use schema::{places::dsl as p, things::dsl as t};
    t::things
        .inner_join(p::places)
        .filter(t::dataset_id.eq(dataset_id))
        .select((schema::things::all_columns, p::geometry))
        .order_by(t::created_at)
        .load::<(models::Thing, String)>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_place)
        .collect()
}

fn count_places_of_dataset(conn: &mut SqliteConnection, dataset_id: &str) -> Result<usize> {
    use schema::{places::dsl as p, things::dsl as t};
    let count = p::places
        .inner_join(t::things)
        .filter(t::dataset_id.eq(dataset_id))
        .count()
        .get_result::<i64>(conn)
        .map_err(from_diesel_err)?;
    Ok(count as usize)
}

///////////////////////////////////////////////////////////////////////
// Submission sets
///////////////////////////////////////////////////////////////////////

fn load_submission_set(model: models::SubmissionSet) -> SubmissionSet {
    let models::SubmissionSet { id, place_id, name } = model;
    SubmissionSet {
        id: id.into(),
        place_id: place_id.into(),
        name,
    }
}

fn create_submission_set(conn: &mut SqliteConnection, set: &SubmissionSet) -> Result<()> {
    let model = models::SubmissionSet {
        id: set.id.to_string(),
        place_id: set.place_id.to_string(),
        name: set.name.clone(),
    };
    diesel::insert_into(schema::submission_sets::table)
        .values(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn get_submission_set(conn: &mut SqliteConnection, id: &str) -> Result<SubmissionSet> {
    use schema::submission_sets::dsl;
    let model = dsl::submission_sets
        .find(id)
        .first::<models::SubmissionSet>(conn)
        .map_err(from_diesel_err)?;
    Ok(load_submission_set(model))
}

fn try_get_submission_set_by_name(
    conn: &mut SqliteConnection,
    place_id: &str,
    name: &str,
) -> Result<Option<SubmissionSet>> {
    use schema::submission_sets::dsl;
    Ok(dsl::submission_sets
        .filter(dsl::place_id.eq(place_id))
        .filter(dsl::name.eq(name))
        .first::<models::SubmissionSet>(conn)
        .optional()
        .map_err(from_diesel_err)?
        .map(load_submission_set))
}

fn submission_sets_of_place(
    conn: &mut SqliteConnection,
    place_id: &str,
) -> Result<Vec<SubmissionSet>> {
    use schema::submission_sets::dsl;
    Ok(dsl::submission_sets
        .filter(dsl::place_id.eq(place_id))
        .order_by(dsl::name)
        .load::<models::SubmissionSet>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_submission_set)
        .collect())
}

///////////////////////////////////////////////////////////////////////
// Submissions
///////////////////////////////////////////////////////////////////////

fn load_submission((thing, parent_id): (models::Thing, String)) -> Result<Submission> {
    Ok(Submission {
        thing: load_thing(thing)?,
        parent_id: parent_id.into(),
    })
}

fn create_submission(conn: &mut SqliteConnection, submission: &Submission) -> Result<()> {
    let new_submission = models::NewSubmission {
        id: submission.id().as_str(),
        parent_id: submission.parent_id.as_str(),
    };
    conn.transaction::<_, DieselError, _>(|conn| {
        insert_thing(conn, &submission.thing)?;
        diesel::insert_into(schema::submissions::table)
            .values(&new_submission)
            .execute(conn)?;
        Ok(())
    })
    .map_err(from_diesel_err)
}

fn update_submission(conn: &mut SqliteConnection, submission: &Submission) -> Result<()> {
    use schema::submissions::dsl;
    let count = conn
        .transaction::<_, DieselError, _>(|conn| {
            if update_thing(conn, &submission.thing)? == 0 {
                return Ok(0);
            }
            diesel::update(dsl::submissions.find(submission.id().as_str()))
                .set(dsl::parent_id.eq(submission.parent_id.as_str()))
                .execute(conn)
        })
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_submission(conn: &mut SqliteConnection, id: &str) -> Result<Submission> {
    use schema::{submissions::dsl as s, things::dsl as t};
    let row = t::things
        .inner_join(s::submissions)
        .filter(t::id.eq(id))
        .select((schema::things::all_columns, s::parent_id))
        .first::<(models::Thing, String)>(conn)
        .map_err(from_diesel_err)?;
    load_submission(row)
}

fn submissions_of_set(conn: &mut SqliteConnection, set_id: &str) -> Result<Vec<Submission>> {
    use schema::{submissions::dsl as s, things::dsl as t};
    t::things
        .inner_join(s::submissions)
        .filter(s::parent_id.eq(set_id))
        .select((schema::things::all_columns, s::parent_id))
        .order_by(t::created_at)
        .load::<(models::Thing, String)>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_submission)
        .collect()
}

fn submissions_of_dataset(
    conn: &mut SqliteConnection,
    dataset_id: &str,
    set_name: Option<&str>,
) -> Result<Vec<(SubmissionSet, Submission)>> {
    use schema::{submission_sets::dsl as ss, submissions::dsl as s, things::dsl as t};
    let mut query = s::submissions
        .inner_join(t::things)
        .inner_join(ss::submission_sets)
        .filter(t::dataset_id.eq(dataset_id))
        .select((
            schema::submission_sets::all_columns,
            schema::things::all_columns,
            s::parent_id,
        ))
        .order_by(t::created_at)
        .into_boxed();
    if let Some(set_name) = set_name {
        query = query.filter(ss::name.eq(set_name));
    }
    query
        .load::<(models::SubmissionSet, models::Thing, String)>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(|(set, thing, parent_id)| {
            Ok((load_submission_set(set), load_submission((thing, parent_id))?))
        })
        .collect()
}

fn count_visible_submissions(
    conn: &mut SqliteConnection,
    dataset_id: &str,
) -> Result<Vec<SubmissionSetCount>> {
    use schema::{submission_sets::dsl as ss, submissions::dsl as s, things::dsl as t};
    let rows = s::submissions
        .inner_join(t::things)
        .inner_join(ss::submission_sets)
        .filter(t::dataset_id.eq(dataset_id))
        .filter(t::visible.eq(true))
        .select((ss::place_id, ss::name))
        .load::<(String, String)>(conn)
        .map_err(from_diesel_err)?;
    let mut lengths = BTreeMap::<(String, String), usize>::new();
    for key in rows {
        *lengths.entry(key).or_default() += 1;
    }
    Ok(lengths
        .into_iter()
        .map(|((place_id, set_name), length)| SubmissionSetCount {
            place_id: place_id.into(),
            set_name,
            length,
        })
        .collect())
}

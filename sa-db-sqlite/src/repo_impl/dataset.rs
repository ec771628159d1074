use super::*;

impl<'a> DataSetRepo for DbConnection<'a> {
    fn create_dataset(&self, dataset: &DataSet) -> Result<()> {
        create_dataset(&mut self.conn.borrow_mut(), dataset)
    }
    fn update_dataset(&self, dataset: &DataSet) -> Result<()> {
        update_dataset(&mut self.conn.borrow_mut(), dataset)
    }
    fn delete_dataset(&self, id: &str) -> Result<()> {
        delete_dataset(&mut self.conn.borrow_mut(), id)
    }
    fn get_dataset(&self, id: &str) -> Result<DataSet> {
        get_dataset(&mut self.conn.borrow_mut(), id)
    }
    fn get_dataset_by_slug(&self, owner_username: &str, slug: &str) -> Result<DataSet> {
        get_dataset_by_slug(&mut self.conn.borrow_mut(), owner_username, slug)
    }
    fn datasets_of_owner(&self, owner_id: &str) -> Result<Vec<DataSet>> {
        datasets_of_owner(&mut self.conn.borrow_mut(), owner_id)
    }
}

impl<'a> DataSetRepo for DbReadOnly<'a> {
    fn create_dataset(&self, _dataset: &DataSet) -> Result<()> {
        unreachable!();
    }
    fn update_dataset(&self, _dataset: &DataSet) -> Result<()> {
        unreachable!();
    }
    fn delete_dataset(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
    fn get_dataset(&self, id: &str) -> Result<DataSet> {
        get_dataset(&mut self.conn.borrow_mut(), id)
    }
    fn get_dataset_by_slug(&self, owner_username: &str, slug: &str) -> Result<DataSet> {
        get_dataset_by_slug(&mut self.conn.borrow_mut(), owner_username, slug)
    }
    fn datasets_of_owner(&self, owner_id: &str) -> Result<Vec<DataSet>> {
        datasets_of_owner(&mut self.conn.borrow_mut(), owner_id)
    }
}

fn load_dataset((model, username): (models::DataSet, String)) -> DataSet {
    let models::DataSet {
        id,
        owner_id,
        slug,
        display_name,
    } = model;
    DataSet {
        id: id.into(),
        owner: Owner {
            id: owner_id.into(),
            username,
        },
        slug,
        display_name,
    }
}

fn create_dataset(conn: &mut SqliteConnection, dataset: &DataSet) -> Result<()> {
    let new_dataset = models::NewDataSet {
        id: dataset.id.as_str(),
        owner_id: dataset.owner.id.as_str(),
        slug: &dataset.slug,
        display_name: &dataset.display_name,
    };
    diesel::insert_into(schema::datasets::table)
        .values(&new_dataset)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn update_dataset(conn: &mut SqliteConnection, dataset: &DataSet) -> Result<()> {
    use schema::datasets::dsl;
    let count = diesel::update(dsl::datasets.find(dataset.id.as_str()))
        .set((
            dsl::slug.eq(&dataset.slug),
            dsl::display_name.eq(&dataset.display_name),
        ))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn delete_dataset(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::datasets::dsl;
    let count = diesel::delete(dsl::datasets.find(id))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_dataset(conn: &mut SqliteConnection, id: &str) -> Result<DataSet> {
    use schema::{datasets::dsl as d, users::dsl as u};
    let row = d::datasets
        .inner_join(u::users)
        .filter(d::id.eq(id))
        .select((schema::datasets::all_columns, u::username))
        .first::<(models::DataSet, String)>(conn)
        .map_err(from_diesel_err)?;
    Ok(load_dataset(row))
}

fn get_dataset_by_slug(
    conn: &mut SqliteConnection,
    owner_username: &str,
    slug: &str,
) -> Result<DataSet> {
    use schema::{datasets::dsl as d, users::dsl as u};
    let row = d::datasets
        .inner_join(u::users)
        .filter(u::username.eq(owner_username))
        .filter(d::slug.eq(slug))
        .select((schema::datasets::all_columns, u::username))
        .first::<(models::DataSet, String)>(conn)
        .map_err(from_diesel_err)?;
    Ok(load_dataset(row))
}

fn datasets_of_owner(conn: &mut SqliteConnection, owner_id: &str) -> Result<Vec<DataSet>> {
    use schema::{datasets::dsl as d, users::dsl as u};
    Ok(d::datasets
        .inner_join(u::users)
        .filter(d::owner_id.eq(owner_id))
        .select((schema::datasets::all_columns, u::username))
        .order_by(d::slug)
        .load::<(models::DataSet, String)>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_dataset)
        .collect())
}

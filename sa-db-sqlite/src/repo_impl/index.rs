use super::*;

impl<'a> DataIndexRepo for DbConnection<'a> {
    fn create_data_index(&self, index: &DataIndex) -> Result<()> {
        create_data_index(&mut self.conn.borrow_mut(), index)
    }
    fn delete_data_index(&self, id: &str) -> Result<()> {
        delete_data_index(&mut self.conn.borrow_mut(), id)
    }
    fn get_data_index(&self, id: &str) -> Result<DataIndex> {
        get_data_index(&mut self.conn.borrow_mut(), id)
    }
    fn data_indexes_of_dataset(&self, dataset_id: &str) -> Result<Vec<DataIndex>> {
        data_indexes_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> DataIndexRepo for DbReadOnly<'a> {
    fn create_data_index(&self, _index: &DataIndex) -> Result<()> {
        unreachable!();
    }
    fn delete_data_index(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
    fn get_data_index(&self, id: &str) -> Result<DataIndex> {
        get_data_index(&mut self.conn.borrow_mut(), id)
    }
    fn data_indexes_of_dataset(&self, dataset_id: &str) -> Result<Vec<DataIndex>> {
        data_indexes_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> IndexedValueRepo for DbConnection<'a> {
    fn create_indexed_value(&self, value: &IndexedValue) -> Result<()> {
        create_indexed_value(&mut self.conn.borrow_mut(), value)
    }
    fn update_indexed_value(&self, value: &IndexedValue) -> Result<()> {
        update_indexed_value(&mut self.conn.borrow_mut(), value)
    }
    fn delete_indexed_value(&self, id: &str) -> Result<()> {
        delete_indexed_value(&mut self.conn.borrow_mut(), id)
    }
    fn indexed_values_of_thing(&self, thing_id: &str) -> Result<Vec<IndexedValue>> {
        indexed_values_of_thing(&mut self.conn.borrow_mut(), thing_id)
    }
    fn indexed_values_of_index(&self, index_id: &str) -> Result<Vec<IndexedValue>> {
        indexed_values_of_index(&mut self.conn.borrow_mut(), index_id)
    }
    fn thing_ids_by_indexed_value(&self, index_id: &str, value: &str) -> Result<Vec<Id>> {
        thing_ids_by_indexed_value(&mut self.conn.borrow_mut(), index_id, value)
    }
}

impl<'a> IndexedValueRepo for DbReadOnly<'a> {
    fn create_indexed_value(&self, _value: &IndexedValue) -> Result<()> {
        unreachable!();
    }
    fn update_indexed_value(&self, _value: &IndexedValue) -> Result<()> {
        unreachable!();
    }
    fn delete_indexed_value(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
    fn indexed_values_of_thing(&self, thing_id: &str) -> Result<Vec<IndexedValue>> {
        indexed_values_of_thing(&mut self.conn.borrow_mut(), thing_id)
    }
    fn indexed_values_of_index(&self, index_id: &str) -> Result<Vec<IndexedValue>> {
        indexed_values_of_index(&mut self.conn.borrow_mut(), index_id)
    }
    fn thing_ids_by_indexed_value(&self, index_id: &str, value: &str) -> Result<Vec<Id>> {
        thing_ids_by_indexed_value(&mut self.conn.borrow_mut(), index_id, value)
    }
}

fn load_data_index(model: models::DataIndex) -> DataIndex {
    let models::DataIndex {
        id,
        dataset_id,
        attr_name,
    } = model;
    DataIndex {
        id: id.into(),
        dataset_id: dataset_id.into(),
        attr_name,
    }
}

fn load_indexed_value(model: models::IndexedValue) -> IndexedValue {
    let models::IndexedValue {
        id,
        index_id,
        thing_id,
        value,
    } = model;
    IndexedValue {
        id: id.into(),
        index_id: index_id.into(),
        thing_id: thing_id.into(),
        value,
    }
}

fn create_data_index(conn: &mut SqliteConnection, index: &DataIndex) -> Result<()> {
    let model = models::DataIndex {
        id: index.id.to_string(),
        dataset_id: index.dataset_id.to_string(),
        attr_name: index.attr_name.clone(),
    };
    diesel::insert_into(schema::data_indexes::table)
        .values(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn delete_data_index(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::data_indexes::dsl;
    let count = diesel::delete(dsl::data_indexes.find(id))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_data_index(conn: &mut SqliteConnection, id: &str) -> Result<DataIndex> {
    use schema::data_indexes::dsl;
    let model = dsl::data_indexes
        .find(id)
        .first::<models::DataIndex>(conn)
        .map_err(from_diesel_err)?;
    Ok(load_data_index(model))
}

fn data_indexes_of_dataset(
    conn: &mut SqliteConnection,
    dataset_id: &str,
) -> Result<Vec<DataIndex>> {
    use schema::data_indexes::dsl;
    Ok(dsl::data_indexes
        .filter(dsl::dataset_id.eq(dataset_id))
        .order_by(dsl::attr_name)
        .load::<models::DataIndex>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_data_index)
        .collect())
}

fn create_indexed_value(conn: &mut SqliteConnection, value: &IndexedValue) -> Result<()> {
    let model = models::IndexedValue {
        id: value.id.to_string(),
        index_id: value.index_id.to_string(),
        thing_id: value.thing_id.to_string(),
        value: value.value.clone(),
    };
    diesel::insert_into(schema::indexed_values::table)
        .values(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn update_indexed_value(conn: &mut SqliteConnection, value: &IndexedValue) -> Result<()> {
    use schema::indexed_values::dsl;
    let count = diesel::update(dsl::indexed_values.find(value.id.as_str()))
        .set(dsl::value.eq(&value.value))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn delete_indexed_value(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::indexed_values::dsl;
    let count = diesel::delete(dsl::indexed_values.find(id))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn indexed_values_of_thing(
    conn: &mut SqliteConnection,
    thing_id: &str,
) -> Result<Vec<IndexedValue>> {
    use schema::indexed_values::dsl;
    Ok(dsl::indexed_values
        .filter(dsl::thing_id.eq(thing_id))
        .load::<models::IndexedValue>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_indexed_value)
        .collect())
}

fn indexed_values_of_index(
    conn: &mut SqliteConnection,
    index_id: &str,
) -> Result<Vec<IndexedValue>> {
    use schema::indexed_values::dsl;
    Ok(dsl::indexed_values
        .filter(dsl::index_id.eq(index_id))
        .load::<models::IndexedValue>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_indexed_value)
        .collect())
}

fn thing_ids_by_indexed_value(
    conn: &mut SqliteConnection,
    index_id: &str,
    value: &str,
) -> Result<Vec<Id>> {
    use schema::indexed_values::dsl;
    Ok(dsl::indexed_values
        .filter(dsl::index_id.eq(index_id))
        .filter(dsl::value.eq(value))
        .select(dsl::thing_id)
        .load::<String>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(Id::from)
        .collect())
}

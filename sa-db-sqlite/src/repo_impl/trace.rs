use super::*;

impl<'a> AttachmentRepo for DbConnection<'a> {
    fn create_attachment(&self, attachment: &Attachment) -> Result<()> {
        create_attachment(&mut self.conn.borrow_mut(), attachment)
    }
    fn delete_attachment(&self, id: &str) -> Result<()> {
        delete_attachment(&mut self.conn.borrow_mut(), id)
    }
    fn get_attachment(&self, id: &str) -> Result<Attachment> {
        get_attachment(&mut self.conn.borrow_mut(), id)
    }
    fn attachments_of_thing(&self, thing_id: &str) -> Result<Vec<Attachment>> {
        attachments_of_thing(&mut self.conn.borrow_mut(), thing_id)
    }
    fn attachments_of_dataset(&self, dataset_id: &str) -> Result<Vec<Attachment>> {
        attachments_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> AttachmentRepo for DbReadOnly<'a> {
    fn create_attachment(&self, _attachment: &Attachment) -> Result<()> {
        unreachable!();
    }
    fn delete_attachment(&self, _id: &str) -> Result<()> {
        unreachable!();
    }
    fn get_attachment(&self, id: &str) -> Result<Attachment> {
        get_attachment(&mut self.conn.borrow_mut(), id)
    }
    fn attachments_of_thing(&self, thing_id: &str) -> Result<Vec<Attachment>> {
        attachments_of_thing(&mut self.conn.borrow_mut(), thing_id)
    }
    fn attachments_of_dataset(&self, dataset_id: &str) -> Result<Vec<Attachment>> {
        attachments_of_dataset(&mut self.conn.borrow_mut(), dataset_id)
    }
}

impl<'a> ActionRepo for DbConnection<'a> {
    fn create_action(&self, action: &Action) -> Result<()> {
        create_action(&mut self.conn.borrow_mut(), action)
    }
    fn actions_of_dataset(&self, dataset_id: &str, limit: Option<usize>) -> Result<Vec<Action>> {
        actions_of_dataset(&mut self.conn.borrow_mut(), dataset_id, limit)
    }
    fn actions_of_thing(&self, thing_id: &str) -> Result<Vec<Action>> {
        actions_of_thing(&mut self.conn.borrow_mut(), thing_id)
    }
}

impl<'a> ActionRepo for DbReadOnly<'a> {
    fn create_action(&self, _action: &Action) -> Result<()> {
        unreachable!();
    }
    fn actions_of_dataset(&self, dataset_id: &str, limit: Option<usize>) -> Result<Vec<Action>> {
        actions_of_dataset(&mut self.conn.borrow_mut(), dataset_id, limit)
    }
    fn actions_of_thing(&self, thing_id: &str) -> Result<Vec<Action>> {
        actions_of_thing(&mut self.conn.borrow_mut(), thing_id)
    }
}

///////////////////////////////////////////////////////////////////////
// Attachments
///////////////////////////////////////////////////////////////////////

fn load_attachment(model: models::Attachment) -> Result<Attachment> {
    let models::Attachment {
        id,
        thing_id,
        name,
        file,
        created_at,
        updated_at,
    } = model;
    Ok(Attachment {
        id: id.into(),
        thing_id: thing_id.into(),
        name,
        file,
        created_at: load_timestamp(created_at)?,
        updated_at: load_timestamp(updated_at)?,
    })
}

fn create_attachment(conn: &mut SqliteConnection, attachment: &Attachment) -> Result<()> {
    let model = models::Attachment {
        id: attachment.id.to_string(),
        thing_id: attachment.thing_id.to_string(),
        name: attachment.name.clone(),
        file: attachment.file.clone(),
        created_at: attachment.created_at.as_millis(),
        updated_at: attachment.updated_at.as_millis(),
    };
    diesel::insert_into(schema::attachments::table)
        .values(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn delete_attachment(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use schema::attachments::dsl;
    let count = diesel::delete(dsl::attachments.find(id))
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_attachment(conn: &mut SqliteConnection, id: &str) -> Result<Attachment> {
    use schema::attachments::dsl;
    let model = dsl::attachments
        .find(id)
        .first::<models::Attachment>(conn)
        .map_err(from_diesel_err)?;
    load_attachment(model)
}

fn attachments_of_thing(conn: &mut SqliteConnection, thing_id: &str) -> Result<Vec<Attachment>> {
    use schema::attachments::dsl;
    dsl::attachments
        .filter(dsl::thing_id.eq(thing_id))
        .order_by(dsl::created_at)
        .load::<models::Attachment>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_attachment)
        .collect()
}

fn attachments_of_dataset(
    conn: &mut SqliteConnection,
    dataset_id: &str,
) -> Result<Vec<Attachment>> {
    use schema::{attachments::dsl as a, things::dsl as t};
    a::attachments
        .inner_join(t::things)
        .filter(t::dataset_id.eq(dataset_id))
        .select(schema::attachments::all_columns)
        .order_by(a::created_at)
        .load::<models::Attachment>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_attachment)
        .collect()
}

///////////////////////////////////////////////////////////////////////
// Actions
///////////////////////////////////////////////////////////////////////

fn load_action(model: models::Action) -> Result<Action> {
    let models::Action {
        id,
        thing_id,
        action,
        source,
        created_at,
    } = model;
    let action = action
        .parse::<ActionKind>()
        .map_err(|err| anyhow!("Invalid action '{action}': {err}"))?;
    Ok(Action {
        id: id.into(),
        thing_id: thing_id.into(),
        action,
        source,
        created_at: load_timestamp(created_at)?,
    })
}

fn create_action(conn: &mut SqliteConnection, action: &Action) -> Result<()> {
    let model = models::Action {
        id: action.id.to_string(),
        thing_id: action.thing_id.to_string(),
        action: action.action.to_string(),
        source: action.source.clone(),
        created_at: action.created_at.as_millis(),
    };
    diesel::insert_into(schema::actions::table)
        .values(&model)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn actions_of_dataset(
    conn: &mut SqliteConnection,
    dataset_id: &str,
    limit: Option<usize>,
) -> Result<Vec<Action>> {
    use schema::{actions::dsl as a, things::dsl as t};
    let mut query = a::actions
        .inner_join(t::things)
        .filter(t::dataset_id.eq(dataset_id))
        .select(schema::actions::all_columns)
        .order_by(a::created_at.desc())
        .into_boxed();
    if let Some(limit) = limit {
        query = query.limit(limit as i64);
    }
    query
        .load::<models::Action>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_action)
        .collect()
}

fn actions_of_thing(conn: &mut SqliteConnection, thing_id: &str) -> Result<Vec<Action>> {
    use schema::actions::dsl;
    dsl::actions
        .filter(dsl::thing_id.eq(thing_id))
        .order_by(dsl::created_at.desc())
        .load::<models::Action>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_action)
        .collect()
}

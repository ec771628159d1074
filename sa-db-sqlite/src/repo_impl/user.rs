use super::*;

impl<'a> UserRepo for DbConnection<'a> {
    fn create_user(&self, user: &User) -> Result<()> {
        create_user(&mut self.conn.borrow_mut(), user)
    }
    fn update_user(&self, user: &User) -> Result<()> {
        update_user(&mut self.conn.borrow_mut(), user)
    }
    fn get_user(&self, id: &str) -> Result<User> {
        get_user(&mut self.conn.borrow_mut(), id)
    }
    fn get_user_by_username(&self, username: &str) -> Result<User> {
        get_user_by_username(&mut self.conn.borrow_mut(), username)
    }
    fn all_users(&self) -> Result<Vec<User>> {
        all_users(&mut self.conn.borrow_mut())
    }
}

impl<'a> UserRepo for DbReadOnly<'a> {
    fn create_user(&self, _user: &User) -> Result<()> {
        unreachable!();
    }
    fn update_user(&self, _user: &User) -> Result<()> {
        unreachable!();
    }
    fn get_user(&self, id: &str) -> Result<User> {
        get_user(&mut self.conn.borrow_mut(), id)
    }
    fn get_user_by_username(&self, username: &str) -> Result<User> {
        get_user_by_username(&mut self.conn.borrow_mut(), username)
    }
    fn all_users(&self) -> Result<Vec<User>> {
        all_users(&mut self.conn.borrow_mut())
    }
}

fn to_model(user: &User) -> Result<models::User> {
    let (social_provider, social_extra_data) = match &user.social_auth {
        Some(SocialAuth {
            provider,
            extra_data,
        }) => (
            Some(provider.clone()),
            Some(serde_json::to_string(extra_data).map_err(|err| anyhow!(err))?),
        ),
        None => (None, None),
    };
    Ok(models::User {
        id: user.id.to_string(),
        username: user.username.clone(),
        social_provider,
        social_extra_data,
    })
}

pub(super) fn load_user(model: models::User) -> Result<User> {
    let models::User {
        id,
        username,
        social_provider,
        social_extra_data,
    } = model;
    let social_auth = match social_provider {
        Some(provider) => {
            let extra_data = match social_extra_data {
                Some(json) => serde_json::from_str(&json).map_err(|err| {
                    log::warn!("Invalid social auth data of user '{username}': {err}");
                    anyhow!(err)
                })?,
                None => serde_json::Value::Null,
            };
            Some(SocialAuth {
                provider,
                extra_data,
            })
        }
        None => None,
    };
    Ok(User {
        id: id.into(),
        username,
        social_auth,
    })
}

fn create_user(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    diesel::insert_into(schema::users::table)
        .values(&to_model(user)?)
        .execute(conn)
        .map_err(from_diesel_err)?;
    Ok(())
}

fn update_user(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    use schema::users::dsl;
    let count = diesel::update(dsl::users.find(user.id.as_str()))
        .set(&to_model(user)?)
        .execute(conn)
        .map_err(from_diesel_err)?;
    single_row(count)
}

fn get_user(conn: &mut SqliteConnection, id: &str) -> Result<User> {
    use schema::users::dsl;
    let model = dsl::users
        .find(id)
        .first::<models::User>(conn)
        .map_err(from_diesel_err)?;
    load_user(model)
}

fn get_user_by_username(conn: &mut SqliteConnection, username: &str) -> Result<User> {
    use schema::users::dsl;
    let model = dsl::users
        .filter(dsl::username.eq(username))
        .first::<models::User>(conn)
        .map_err(from_diesel_err)?;
    load_user(model)
}

fn all_users(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    use schema::users::dsl;
    dsl::users
        .order_by(dsl::username)
        .load::<models::User>(conn)
        .map_err(from_diesel_err)?
        .into_iter()
        .map(load_user)
        .collect()
}

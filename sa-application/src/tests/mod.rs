mod permissions;

pub mod prelude {
    use sa_core::cache::CacheKeys;
    use std::time::Duration;

    pub use sa_core::{
        db::*,
        entities::*,
        repositories::{Error as RepoError, *},
        usecases,
    };
    pub use sa_gateways::cache::InMemoryCache;
    pub use serde_json::{json, Map, Value};

    pub mod sqlite {
        pub use super::super::super::sqlite::*;
    }

    pub use crate::{
        error::AppError,
        prelude::{self as flows, Page, Requester},
        serializers::Detail,
        Backend,
    };

    pub const BASE_URL: &str = "http://sa.test";

    pub fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    pub struct BackendFixture {
        pub db_connections: sqlite::Connections,
        pub cache: InMemoryCache,
        pub owner: User,
        pub dataset: DataSet,
    }

    impl BackendFixture {
        pub fn new() -> Self {
            let _ = env_logger::builder().is_test(true).try_init();
            let db_connections = sqlite::Connections::init(":memory:", 1).unwrap();
            sa_db_sqlite::run_embedded_database_migrations(db_connections.exclusive().unwrap())
                .unwrap();
            let owner = flows::create_user(&db_connections, "alice").unwrap();
            let dataset = flows::create_dataset(
                &db_connections,
                "alice",
                usecases::NewDataSet {
                    slug: "ds".into(),
                    display_name: "Neighborhood".into(),
                },
            )
            .unwrap();
            Self {
                db_connections,
                cache: InMemoryCache::new(),
                owner,
                dataset,
            }
        }

        pub fn backend(&self) -> Backend<'_> {
            Backend {
                connections: &self.db_connections,
                cache: CacheKeys::new(&self.cache, Duration::from_secs(300)),
                base_url: BASE_URL,
            }
        }

        pub fn as_owner(&self) -> Requester {
            Requester::user(self.owner.clone())
        }

        pub fn create_user(&self, username: &str) -> User {
            flows::create_user(&self.db_connections, username).unwrap()
        }

        pub fn create_place(&self, data: Value) -> Place {
            flows::create_place(
                &self.backend(),
                &self.as_owner(),
                "alice",
                "ds",
                usecases::NewPlace {
                    geometry: json!("POINT (7.4 46.9)"),
                    visible: true,
                    submitter: None,
                    data: object(data),
                },
                &Default::default(),
            )
            .unwrap()
        }

        pub fn create_submission(
            &self,
            requester: &Requester,
            place: &Place,
            set_name: &str,
            data: Value,
        ) -> Result<usecases::StoredSubmission, AppError> {
            flows::create_submission(
                &self.backend(),
                requester,
                "alice",
                "ds",
                usecases::NewSubmission {
                    place_id: place.id().clone(),
                    set_name: set_name.into(),
                    visible: true,
                    submitter: None,
                    data: object(data),
                },
                &Default::default(),
            )
        }

        pub fn actions(&self) -> Vec<Action> {
            self.db_connections
                .shared()
                .unwrap()
                .actions_of_dataset(self.dataset.id.as_str(), None)
                .unwrap()
        }

        pub fn place_exists(&self, id: &str) -> bool {
            match self.db_connections.shared().unwrap().get_place(id) {
                Ok(_) => true,
                Err(RepoError::NotFound) => false,
                Err(err) => panic!("{err}"),
            }
        }
    }
}

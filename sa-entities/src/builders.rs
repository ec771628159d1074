pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::{dataset_builder::*, place_builder::*, submission_builder::*, user_builder::*};

pub mod user_builder {

    use super::*;
    use crate::{id::*, user::*};

    #[derive(Debug)]
    pub struct UserBuild {
        user: User,
    }

    impl UserBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.user.id = id.into();
            self
        }
        pub fn username(mut self, username: &str) -> Self {
            self.user.username = username.into();
            self
        }
        pub fn social_auth(mut self, provider: &str, extra_data: serde_json::Value) -> Self {
            self.user.social_auth = Some(SocialAuth {
                provider: provider.into(),
                extra_data,
            });
            self
        }
        pub fn finish(self) -> User {
            self.user
        }
    }

    impl Builder for User {
        type Build = UserBuild;
        fn build() -> UserBuild {
            UserBuild {
                user: User {
                    id: Id::new(),
                    username: "".into(),
                    social_auth: None,
                },
            }
        }
    }
}

pub mod dataset_builder {

    use super::*;
    use crate::{dataset::*, id::*, user::*};

    #[derive(Debug)]
    pub struct DataSetBuild {
        dataset: DataSet,
    }

    impl DataSetBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.dataset.id = id.into();
            self
        }
        pub fn owner(mut self, owner: &User) -> Self {
            self.dataset.owner = owner.into();
            self
        }
        pub fn slug(mut self, slug: &str) -> Self {
            self.dataset.slug = slug.into();
            self
        }
        pub fn display_name(mut self, name: &str) -> Self {
            self.dataset.display_name = name.into();
            self
        }
        pub fn finish(self) -> DataSet {
            self.dataset
        }
    }

    impl Builder for DataSet {
        type Build = DataSetBuild;
        fn build() -> DataSetBuild {
            DataSetBuild {
                dataset: DataSet {
                    id: Id::new(),
                    owner: Owner {
                        id: Id::new(),
                        username: "".into(),
                    },
                    slug: "".into(),
                    display_name: "".into(),
                },
            }
        }
    }
}

fn default_thing() -> crate::thing::Thing {
    use crate::{id::*, thing::*, time::*};
    let now = Timestamp::now();
    Thing {
        id: Id::new(),
        dataset_id: Id::default(),
        submitter_id: None,
        data: DataBlob::default(),
        visible: true,
        created_at: now,
        updated_at: now,
    }
}

pub mod place_builder {

    use super::*;
    use crate::{geometry::*, thing::*};

    #[derive(Debug)]
    pub struct PlaceBuild {
        place: Place,
    }

    impl PlaceBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.place.thing.id = id.into();
            self
        }
        pub fn dataset(mut self, dataset_id: &str) -> Self {
            self.place.thing.dataset_id = dataset_id.into();
            self
        }
        pub fn data(mut self, data: &str) -> Self {
            self.place.thing.data = data.into();
            self
        }
        pub fn visible(mut self, visible: bool) -> Self {
            self.place.thing.visible = visible;
            self
        }
        pub fn geometry(mut self, wkt: &str) -> Self {
            self.place.geometry = wkt.parse().unwrap();
            self
        }
        pub fn finish(self) -> Place {
            self.place
        }
    }

    impl Builder for Place {
        type Build = PlaceBuild;
        fn build() -> PlaceBuild {
            PlaceBuild {
                place: Place {
                    thing: default_thing(),
                    geometry: Geometry::Point(Coord { x: 0.0, y: 0.0 }),
                },
            }
        }
    }
}

pub mod submission_builder {

    use super::*;
    use crate::{id::*, thing::*};

    #[derive(Debug)]
    pub struct SubmissionBuild {
        submission: Submission,
    }

    impl SubmissionBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.submission.thing.id = id.into();
            self
        }
        pub fn dataset(mut self, dataset_id: &str) -> Self {
            self.submission.thing.dataset_id = dataset_id.into();
            self
        }
        pub fn parent(mut self, submission_set_id: &str) -> Self {
            self.submission.parent_id = submission_set_id.into();
            self
        }
        pub fn data(mut self, data: &str) -> Self {
            self.submission.thing.data = data.into();
            self
        }
        pub fn visible(mut self, visible: bool) -> Self {
            self.submission.thing.visible = visible;
            self
        }
        pub fn finish(self) -> Submission {
            self.submission
        }
    }

    impl Builder for Submission {
        type Build = SubmissionBuild;
        fn build() -> SubmissionBuild {
            SubmissionBuild {
                submission: Submission {
                    thing: default_thing(),
                    parent_id: Id::default(),
                },
            }
        }
    }
}

use crate::api::error::ApiErr;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use entity::entities::{
    company, follow,
    prelude::{Company, Follow, User},
    user,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, Database, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
};
use uuid::Uuid;

/// Umbrella error for tests, so `?` works on both repo and handler results.
#[derive(Debug)]
pub enum TestErr {
    Db(DbErr),
    Api(ApiErr),
}

impl From<DbErr> for TestErr {
    fn from(err: DbErr) -> TestErr {
        TestErr::Db(err)
    }
}

impl From<ApiErr> for TestErr {
    fn from(err: ApiErr) -> TestErr {
        TestErr::Api(err)
    }
}

/// What to do for a given table when building test data.
pub enum Operation<T> {
    /// Table exists but stays empty.
    Migration,
    /// Produce models without touching the database.
    Create(T),
    /// Produce models and insert them.
    Insert(T),
}

#[derive(Debug, Default)]
pub struct TestData {
    pub users: Option<Vec<user::Model>>,
    pub companies: Option<Vec<company::Model>>,
    pub follows: Option<Vec<follow::Model>>,
}

/// Builder for an in-memory sqlite database populated with predictable
/// fixtures (`username1`, `email1`, ...). Follow pairs are 1-based indices
/// into the requested users.
#[derive(Default)]
pub struct TestDataBuilder {
    users: Option<Operation<usize>>,
    companies: Option<Operation<usize>>,
    follows: Option<Operation<Vec<(usize, usize)>>>,
}

impl TestDataBuilder {
    pub fn new() -> TestDataBuilder {
        TestDataBuilder::default()
    }

    pub fn users(mut self, operation: Operation<usize>) -> TestDataBuilder {
        self.users = Some(operation);
        self
    }

    pub fn companies(mut self, operation: Operation<usize>) -> TestDataBuilder {
        self.companies = Some(operation);
        self
    }

    pub fn follows(mut self, operation: Operation<Vec<(usize, usize)>>) -> TestDataBuilder {
        self.follows = Some(operation);
        self
    }

    pub async fn build(self) -> Result<(DatabaseConnection, TestData), TestErr> {
        let connection = Database::connect("sqlite::memory:").await?;
        Migrator::up(&connection, None).await?;

        let mut data = TestData::default();

        if let Some(operation) = self.users {
            match operation {
                Operation::Migration => {}
                Operation::Create(count) => data.users = Some(user_models(count)),
                Operation::Insert(count) => {
                    let models = user_models(count);
                    User::insert_many(
                        models
                            .iter()
                            .cloned()
                            .map(|mdl| mdl.into_active_model().reset_all()),
                    )
                    .exec(&connection)
                    .await?;
                    data.users = Some(models);
                }
            }
        }

        if let Some(operation) = self.companies {
            match operation {
                Operation::Migration => {}
                Operation::Create(count) => data.companies = Some(company_models(count)),
                Operation::Insert(count) => {
                    let models = company_models(count);
                    Company::insert_many(
                        models
                            .iter()
                            .cloned()
                            .map(|mdl| mdl.into_active_model().reset_all()),
                    )
                    .exec(&connection)
                    .await?;
                    data.companies = Some(models);
                }
            }
        }

        if let Some(operation) = self.follows {
            match operation {
                Operation::Migration => {}
                Operation::Create(pairs) => {
                    data.follows = Some(follow_models(&data, &pairs));
                }
                Operation::Insert(pairs) => {
                    let models = follow_models(&data, &pairs);
                    if !models.is_empty() {
                        Follow::insert_many(
                            models
                                .iter()
                                .cloned()
                                .map(|mdl| mdl.into_active_model().reset_all()),
                        )
                        .exec(&connection)
                        .await?;
                    }
                    data.follows = Some(models);
                }
            }
        }

        Ok((connection, data))
    }

    /// Turn optional model fixtures into active models ready for insertion.
    pub fn activate_models<E, A>(models: &Option<Vec<E::Model>>) -> Vec<A>
    where
        E: EntityTrait,
        A: ActiveModelTrait<Entity = E>,
        E::Model: Clone + IntoActiveModel<A>,
    {
        models
            .as_ref()
            .unwrap()
            .iter()
            .cloned()
            .map(|mdl| mdl.into_active_model().reset_all())
            .collect()
    }
}

fn user_models(count: usize) -> Vec<user::Model> {
    (1..=count)
        .map(|num| user::Model {
            id: Uuid::new_v4(),
            username: format!("username{num}"),
            email: format!("email{num}"),
            password: format!("password{num}"),
            bio: None,
            image: None,
            verified: false,
            verification_token: None,
            reset_token: None,
            reset_expires: None,
            created_at: test_timestamp(num),
        })
        .collect()
}

fn company_models(count: usize) -> Vec<company::Model> {
    (1..=count)
        .map(|num| company::Model {
            id: Uuid::new_v4(),
            legal_id: format!("legal{num}"),
            name: format!("company{num}"),
            email: format!("company-email{num}"),
            password: format!("password{num}"),
            sectors: "technology".to_owned(),
            size: None,
            location: None,
            website: None,
            phone: None,
            description: None,
            image: None,
            verified: false,
            verification_token: None,
            reset_token: None,
            reset_expires: None,
            created_at: test_timestamp(num),
        })
        .collect()
}

fn follow_models(data: &TestData, pairs: &[(usize, usize)]) -> Vec<follow::Model> {
    let users = data
        .users
        .as_ref()
        .expect("follow fixtures require user fixtures");

    pairs
        .iter()
        .enumerate()
        .map(|(num, (follower, followed))| follow::Model {
            user_id: users[follower - 1].id,
            followed_id: users[followed - 1].id,
            created_at: test_timestamp(num + 1),
        })
        .collect()
}

/// Deterministic, strictly increasing timestamps for fixture ordering.
fn test_timestamp(num: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 10)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::seconds(num as i64)
}

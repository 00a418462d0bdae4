use crate::repo::company::{create_company, empty_company_table};
use crate::repo::follow::{create_follow, empty_follow_table};
use crate::repo::user::{create_user, empty_user_table};
use anyhow::Result;
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use cder::DatabaseSeeder;
use entity::entities::*;
use rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DbErr, DeleteResult};

/// Populate the database from the yaml fixtures. Fixture ids are fixed so
/// the follow fixtures can reference users across files.
pub async fn populate_seeds(db: &DatabaseConnection) -> Result<()> {
    let mut seeder = DatabaseSeeder::new();

    seed_user(&mut seeder, db).await?;
    seed_company(&mut seeder, db).await?;
    seed_follow(&mut seeder, db).await
}

pub async fn empty_all_tables(db: &DatabaseConnection) -> Result<DeleteResult, DbErr> {
    empty_follow_table(db).await?;
    empty_company_table(db).await?;
    empty_user_table(db).await
}

async fn seed_user(seeder: &mut DatabaseSeeder, db: &DatabaseConnection) -> Result<()> {
    seeder
        .populate_async(
            "src/seed/fixtures/user.yml",
            |model: user::Model| async move {
                let mut active_model: user::ActiveModel = model.into();
                if active_model.image.as_ref().is_none() {
                    active_model.image.take();
                }
                if active_model.bio.as_ref().is_none() {
                    active_model.bio.take();
                }

                let salt = SaltString::generate(&mut OsRng);
                let hashed_password = Argon2::default()
                    .hash_password(active_model.password.as_ref().as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|err| anyhow::anyhow!("password hash failed: {err}"))?;

                active_model.password = Set(hashed_password);
                active_model = active_model.reset_all();

                // Fixture ids are fixed, so a rerun against a populated
                // database fails here and the caller decides what to do.
                let res = create_user(db, active_model).await?;

                Ok(res.last_insert_id)
            },
        )
        .await?;

    Ok(())
}

async fn seed_company(seeder: &mut DatabaseSeeder, db: &DatabaseConnection) -> Result<()> {
    seeder
        .populate_async(
            "src/seed/fixtures/company.yml",
            |model: company::Model| async move {
                let mut active_model: company::ActiveModel = model.into();

                let salt = SaltString::generate(&mut OsRng);
                let hashed_password = Argon2::default()
                    .hash_password(active_model.password.as_ref().as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|err| anyhow::anyhow!("password hash failed: {err}"))?;

                active_model.password = Set(hashed_password);
                active_model = active_model.reset_all();

                let res = create_company(db, active_model).await?;

                Ok(res.last_insert_id)
            },
        )
        .await?;

    Ok(())
}

async fn seed_follow(seeder: &mut DatabaseSeeder, db: &DatabaseConnection) -> Result<()> {
    seeder
        .populate_async(
            "src/seed/fixtures/follow.yml",
            |model: follow::Model| async move {
                let mut active_model: follow::ActiveModel = model.into();
                active_model = active_model.reset_all();

                let res = create_follow(db, active_model).await?;

                Ok(format!("{:?}", res.last_insert_id))
            },
        )
        .await?;

    Ok(())
}

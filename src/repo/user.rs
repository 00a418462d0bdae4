use crate::middleware::auth::create_token;
use entity::entities::{prelude::User, user};
use sea_orm::{
    prelude::Uuid, query::*, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait,
    FromQueryResult, InsertResult, QueryFilter,
};
use serde::Serialize;

/// Fetch `user` for the provided `email`.
/// Returns optional `user` on success, otherwise returns an `database error`.
pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

/// Fetch `user` for the provided `username`.
/// Returns optional `user` on success, otherwise returns an `database error`.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
}

/// Fetch `user` for the provided `id`.
/// Returns optional `user` on success, otherwise returns an `database error`.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<user::Model>, DbErr> {
    User::find_by_id(id).one(db).await
}

/// Fetch `user` with a fresh JWT for the provided `id`.
/// Returns optional `user` on success, otherwise returns an `database error`.
pub async fn get_user_with_token_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<UserWithToken>, DbErr> {
    User::find_by_id(id)
        .into_model::<UserWithToken>()
        .one(db)
        .await
}

/// Fetch `user` holding the provided email verification token.
pub async fn get_user_by_verification_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::VerificationToken.eq(token))
        .one(db)
        .await
}

/// Fetch `user` holding the provided password reset token.
pub async fn get_user_by_reset_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::ResetToken.eq(token))
        .one(db)
        .await
}

/// Insert `user` for the provided `ActiveModel`. Reject models with existing
/// username or email (unique on database level).
/// Returns `InsertResult` with last inserted id on success, otherwise
/// returns an `database error`.
pub async fn create_user(
    db: &DatabaseConnection,
    user: user::ActiveModel,
) -> Result<InsertResult<user::ActiveModel>, DbErr> {
    User::insert(user).exec(db).await
}

/// Update `user` for the provided `ActiveModel`.
/// Returns `user` on success, otherwise returns an `database error`.
pub async fn update_user(
    db: &DatabaseConnection,
    user: user::ActiveModel,
) -> Result<user::Model, DbErr> {
    User::update(user).exec(db).await
}

/// Fetch the public profile (no password, email or tokens) for the provided id.
/// Returns optional `profile` on success, otherwise returns an `database error`.
pub async fn get_public_profile_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<PublicProfile>, DbErr> {
    User::find_by_id(id)
        .into_model::<PublicProfile>()
        .one(db)
        .await
}

/// Fetch public profiles for a set of ids, e.g. to expand the endpoints of
/// a page of follow edges.
/// Returns vec of `profiles` on success, otherwise returns an `database error`.
pub async fn get_public_profiles_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<Vec<PublicProfile>, DbErr> {
    User::find()
        .filter(user::Column::Id.is_in(ids))
        .into_model::<PublicProfile>()
        .all(db)
        .await
}

/// Delete all existing `user` records from database.
/// Returns `DeleteResult` with affected rows count on success, otherwise
/// returns an `database error`.
pub async fn empty_user_table(db: &DatabaseConnection) -> Result<DeleteResult, DbErr> {
    User::delete_many().exec(db).await
}

/// Struct describing data about current user
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserWithToken {
    pub id: Uuid,
    pub token: String,
    pub email: String,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub verified: bool,
}

/// The subset of account fields safe to embed in anyone's response.
#[derive(Clone, Debug, Default, PartialEq, FromQueryResult, Eq, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl FromQueryResult for UserWithToken {
    fn from_query_result(res: &sea_orm::QueryResult, pre: &str) -> Result<Self, sea_orm::DbErr> {
        let id: Uuid = res.try_get(pre, "id")?;

        Ok(Self {
            id,
            token: create_token(&id).unwrap(),
            email: res.try_get(pre, "email")?,
            username: res.try_get(pre, "username")?,
            bio: res.try_get(pre, "bio")?,
            image: res.try_get(pre, "image")?,
            verified: res.try_get(pre, "verified")?,
        })
    }
}

impl From<user::Model> for UserWithToken {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            token: create_token(&model.id).unwrap(),
            email: model.email,
            username: model.username,
            bio: model.bio,
            image: model.image,
            verified: model.verified,
        }
    }
}

impl From<user::Model> for PublicProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            bio: model.bio,
            image: model.image,
        }
    }
}


#[cfg(test)]
mod test_get_user_by_username {
    use super::get_user_by_username;
    use crate::tests::{
        Operation::{Insert, Migration},
        TestData, TestDataBuilder, TestErr,
    };

    #[tokio::test]
    async fn get_existing_user() -> Result<(), TestErr> {
        let (connection, TestData { users, .. }) =
            TestDataBuilder::new().users(Insert(5)).build().await?;
        let expected = users.unwrap().into_iter().nth(2).unwrap();

        let result = get_user_by_username(&connection, "username3").await?;
        assert_eq!(result, Some(expected));

        Ok(())
    }

    #[tokio::test]
    async fn get_non_existing_user() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new().users(Migration).build().await?;

        let result = get_user_by_username(&connection, "username3").await?;
        assert_eq!(result, None);

        Ok(())
    }
}




#[cfg(test)]
mod test_account_tokens {
    use super::{get_user_by_reset_token, get_user_by_verification_token, update_user};
    use crate::tests::{Operation::Insert, TestData, TestDataBuilder, TestErr};
    use entity::entities::user;
    use sea_orm::Set;

    #[tokio::test]
    async fn verification_token_roundtrip() -> Result<(), TestErr> {
        let (connection, TestData { users, .. }) =
            TestDataBuilder::new().users(Insert(1)).build().await?;
        let model = users.unwrap().into_iter().next().unwrap();

        let mut active: user::ActiveModel = model.clone().into();
        active.verification_token = Set(Some("token123".to_owned()));
        update_user(&connection, active).await?;

        let found = get_user_by_verification_token(&connection, "token123").await?;
        assert_eq!(found.map(|usr| usr.id), Some(model.id));

        let missing = get_user_by_reset_token(&connection, "token123").await?;
        assert_eq!(missing, None);

        Ok(())
    }
}

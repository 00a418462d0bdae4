use super::error::ApiErr;
use crate::middleware::auth::{
    check_passwords, create_token, generate_account_token, hash_password, Token,
};
use crate::repo::user::{
    create_user, get_user_by_email, get_user_by_id, get_user_by_reset_token,
    get_user_by_username, get_user_by_verification_token, get_user_with_token_by_id,
    update_user as repo_update_user, UserWithToken,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Duration;
use entity::entities::user;
use sea_orm::{prelude::Uuid, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

/// Axum handler for user registration. Hashes the password, stores the
/// account unverified and issues an email verification token. The mailer is
/// an external collaborator; until it is wired up the token goes to the logs.
pub async fn register_user(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterUserDto>,
) -> Result<Json<RegisteredDto>, ApiErr> {
    if get_user_by_email(&db, &payload.email).await?.is_some()
        || get_user_by_username(&db, &payload.username).await?.is_some()
    {
        return Err(ApiErr::UserExist);
    }

    let hashed_password = hash_password(&payload.password).map_err(|_| ApiErr::PasswordHash)?;
    let verification_token = generate_account_token();

    let user_model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        username: Set(payload.username),
        password: Set(hashed_password),
        verified: Set(false),
        verification_token: Set(Some(verification_token.clone())),
        ..Default::default()
    };

    let user_res = create_user(&db, user_model).await?;
    let current_user = get_user_by_id(&db, user_res.last_insert_id)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    tracing::info!(
        "verification token issued for {}: {verification_token}",
        current_user.email
    );

    Ok(Json(RegisteredDto {
        status: "success".to_owned(),
        message: "User registered. Please verify your email.".to_owned(),
        user: current_user.into(),
    }))
}

/// Axum handler marking an account as verified via its emailed token.
pub async fn verify_user(
    State(db): State<DatabaseConnection>,
    Path(token): Path<String>,
) -> Result<Json<MessageDto>, ApiErr> {
    let user = get_user_by_verification_token(&db, &token)
        .await?
        .ok_or(ApiErr::InvalidToken)?;

    let mut user_model: user::ActiveModel = user.into();
    user_model.verified = Set(true);
    user_model.verification_token = Set(None);
    repo_update_user(&db, user_model).await?;

    Ok(Json(MessageDto {
        status: "success".to_owned(),
        message: "Account verified".to_owned(),
    }))
}

/// Axum handler for user login. Unknown email and wrong password map to
/// distinct statuses (404 / 400).
pub async fn login_user(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginUserDto>,
) -> Result<Json<LoginDto>, ApiErr> {
    let current_user = get_user_by_email(&db, &payload.email)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    check_passwords(&payload.password, &current_user.password)
        .map_err(|_| ApiErr::WrongPassword)?;

    let token = create_token(&current_user.id).map_err(|_| ApiErr::TokenCreation)?;

    Ok(Json(LoginDto {
        status: "success".to_owned(),
        message: "User logged in".to_owned(),
        user: current_user.into(),
        token,
    }))
}

/// Axum handler returning the logged in user with a fresh token.
pub async fn get_current_user(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
) -> Result<Json<UserDto>, ApiErr> {
    let current_user = get_user_with_token_by_id(&db, token.id)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    let user_dto = UserDto { user: current_user };
    Ok(Json(user_dto))
}

/// Axum handler for partial profile update of the logged in user. A new
/// password is re-hashed before storage.
pub async fn update_user(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    Json(payload): Json<UpdateUserDto>,
) -> Result<Json<RegisteredDto>, ApiErr> {
    let user_before = get_user_by_id(&db, token.id)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    let mut user_model: user::ActiveModel = user_before.into();

    if let Some(email) = payload.email {
        user_model.email = Set(email);
    }
    if let Some(username) = payload.username {
        user_model.username = Set(username);
    }
    if payload.bio.is_some() {
        user_model.bio = Set(payload.bio);
    }
    if payload.image.is_some() {
        user_model.image = Set(payload.image);
    }
    if let Some(password) = payload.password {
        let hashed_password = hash_password(&password).map_err(|_| ApiErr::PasswordHash)?;
        user_model.password = Set(hashed_password);
    }

    let current_user = repo_update_user(&db, user_model).await?;

    Ok(Json(RegisteredDto {
        status: "success".to_owned(),
        message: "Profile updated".to_owned(),
        user: current_user.into(),
    }))
}

/// Axum handler issuing a password reset token, valid for one hour.
pub async fn request_password_reset(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<PasswordResetRequestDto>,
) -> Result<Json<MessageDto>, ApiErr> {
    let user = get_user_by_email(&db, &payload.email)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    let reset_token = generate_account_token();
    let email = user.email.clone();

    let mut user_model: user::ActiveModel = user.into();
    user_model.reset_token = Set(Some(reset_token.clone()));
    user_model.reset_expires = Set(Some(chrono::Utc::now().naive_utc() + Duration::hours(1)));
    repo_update_user(&db, user_model).await?;

    tracing::info!("password reset token issued for {email}: {reset_token}");

    Ok(Json(MessageDto {
        status: "success".to_owned(),
        message: "Password reset email sent".to_owned(),
    }))
}

/// Axum handler completing a password reset. The token must exist and must
/// not be past its expiry.
pub async fn reset_password(
    State(db): State<DatabaseConnection>,
    Path(token): Path<String>,
    Json(payload): Json<PasswordResetDto>,
) -> Result<Json<MessageDto>, ApiErr> {
    let user = get_user_by_reset_token(&db, &token)
        .await?
        .ok_or(ApiErr::InvalidToken)?;

    match user.reset_expires {
        Some(expires) if expires >= chrono::Utc::now().naive_utc() => {}
        Some(_) => return Err(ApiErr::TokenExpired),
        None => return Err(ApiErr::InvalidToken),
    }

    let hashed_password = hash_password(&payload.password).map_err(|_| ApiErr::PasswordHash)?;

    let mut user_model: user::ActiveModel = user.into();
    user_model.password = Set(hashed_password);
    user_model.reset_token = Set(None);
    user_model.reset_expires = Set(None);
    repo_update_user(&db, user_model).await?;

    Ok(Json(MessageDto {
        status: "success".to_owned(),
        message: "Password updated".to_owned(),
    }))
}

/// Account fields the owner may see about themselves.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub verified: bool,
}

impl From<user::Model> for CurrentUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            bio: model.bio,
            image: model.image,
            verified: model.verified,
        }
    }
}

/// Struct describing JSON object with the current user and a fresh token.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub user: UserWithToken,
}

/// Struct describing JSON object returned by registration and update.
#[derive(Debug, PartialEq, Serialize)]
pub struct RegisteredDto {
    pub status: String,
    pub message: String,
    pub user: CurrentUser,
}

/// Struct describing JSON object returned on login.
#[derive(Debug, PartialEq, Serialize)]
pub struct LoginDto {
    pub status: String,
    pub message: String,
    pub user: CurrentUser,
    pub token: String,
}

/// Plain confirmation envelope.
#[derive(Debug, PartialEq, Serialize)]
pub struct MessageDto {
    pub status: String,
    pub message: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterUserDto {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginUserDto {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PasswordResetRequestDto {
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PasswordResetDto {
    pub password: String,
}

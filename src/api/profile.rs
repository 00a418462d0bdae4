use super::error::ApiErr;
use crate::middleware::auth::Token;
use crate::repo::{
    follow::{count_follows_by_followed, count_follows_by_follower, follow_this_user},
    user::{get_public_profile_by_id, PublicProfile},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use entity::entities::follow;
use sea_orm::{prelude::Uuid, DatabaseConnection};
use serde::Serialize;

/// Axum handler for viewing an account's public profile. The mutual status
/// (seen from the logged in viewer) lets the client render "follows you" /
/// "following" badges.
pub async fn get_profile(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileDto>, ApiErr> {
    let user = get_public_profile_by_id(&db, user_id)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    let status = follow_this_user(&db, token.id, user_id).await?;

    Ok(Json(ProfileDto {
        status: "success".to_owned(),
        user,
        following: status.following,
        follower: status.follower,
    }))
}

/// Axum handler for an account's follow counters. The target defaults to the
/// logged in user. The id segment is parsed by hand so a malformed value is
/// a client error rather than a silent fallback to the viewer.
pub async fn get_counters(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    maybe_id: Option<Path<String>>,
) -> Result<Json<CountersDto>, ApiErr> {
    let user_id = match maybe_id {
        Some(Path(raw)) => raw.parse().map_err(|_| ApiErr::InvalidParam)?,
        None => token.id,
    };

    get_public_profile_by_id(&db, user_id)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    let following = count_follows_by_follower(&db, user_id).await?;
    let followed = count_follows_by_followed(&db, user_id).await?;

    Ok(Json(CountersDto {
        status: "success".to_owned(),
        user_id,
        following,
        followed,
    }))
}

/// Struct describing JSON object for the profile view.
#[derive(Debug, PartialEq, Serialize)]
pub struct ProfileDto {
    pub status: String,
    pub user: PublicProfile,
    pub following: Option<follow::Model>,
    pub follower: Option<follow::Model>,
}

/// Struct describing JSON object with follow counters.
#[derive(Debug, PartialEq, Serialize)]
pub struct CountersDto {
    pub status: String,
    pub user_id: Uuid,
    pub following: u64,
    pub followed: u64,
}

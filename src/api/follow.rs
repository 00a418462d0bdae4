use super::error::ApiErr;
use crate::middleware::auth::Token;
use crate::repo::{
    follow::{
        create_follow, delete_follow, follow_user_ids, get_follow, get_follows_page_by_followed,
        get_follows_page_by_follower,
    },
    user::{get_public_profile_by_id, get_public_profiles_by_ids, PublicProfile},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use entity::entities::follow;
use sea_orm::{entity::prelude::DateTime, prelude::Uuid, ActiveValue::Set, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ITEMS_PER_PAGE: u64 = 5;

/// Axum handler for creating a follow edge from the logged in user to the
/// account given in the body. Distinct failures get distinct codes: 404 for a
/// missing target, 409 for an existing edge, 422 for a self-follow.
pub async fn save_follow(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    Json(payload): Json<SaveFollowDto>,
) -> Result<Json<FollowSavedDto>, ApiErr> {
    let actor_id = token.id;

    if actor_id == payload.followed {
        return Err(ApiErr::SelfFollow);
    }

    let identity = get_public_profile_by_id(&db, actor_id)
        .await?
        .ok_or(ApiErr::UserNotExist)?;
    get_public_profile_by_id(&db, payload.followed)
        .await?
        .ok_or(ApiErr::UserNotExist)?;

    let follow_model = follow::ActiveModel {
        user_id: Set(actor_id),
        followed_id: Set(payload.followed),
        ..Default::default()
    };

    // Both endpoints were checked above, so a failed execution here is the
    // pair constraint firing.
    create_follow(&db, follow_model).await.map_err(|err| match err {
        DbErr::Exec(_) => ApiErr::DuplicateFollow,
        other => ApiErr::Db(other),
    })?;

    let follow = get_follow(&db, actor_id, payload.followed)
        .await?
        .ok_or(ApiErr::FollowNotExist)?;

    Ok(Json(FollowSavedDto {
        status: "success".to_owned(),
        identity,
        follow,
    }))
}

/// Axum handler for removing the follow edge from the logged in user to the
/// account given in the path. Deleting an edge that never existed is 404.
pub async fn unfollow(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    Path(followed_id): Path<Uuid>,
) -> Result<Json<UnfollowDto>, ApiErr> {
    let delete_result = delete_follow(&db, token.id, followed_id).await?;

    if delete_result.rows_affected == 0 {
        return Err(ApiErr::FollowNotExist);
    }

    Ok(Json(UnfollowDto {
        status: "success".to_owned(),
        message: "Follow removed".to_owned(),
    }))
}

/// Axum handler listing who a user follows. Both path parameters are
/// optional: the target defaults to the logged in user, the page to 1.
/// Each row expands both endpoints to public profiles; the response also
/// carries the **viewer's** own relationship sets so the client can render
/// per-row follow markers.
pub async fn following(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    maybe_params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<FollowingListDto>, ApiErr> {
    let params = maybe_params.map(|Path(prm)| prm).unwrap_or_default();
    let (target, page) = listing_params(&params, token.id)?;

    let (edges, total) = get_follows_page_by_follower(&db, target, page, ITEMS_PER_PAGE).await?;
    let profiles = edge_profiles(&db, &edges).await?;

    let follows = edges
        .iter()
        .filter_map(|edge| {
            Some(FollowingEntry {
                user: profiles.get(&edge.user_id)?.clone(),
                followed: profiles.get(&edge.followed_id)?.clone(),
                created_at: edge.created_at,
            })
        })
        .collect();

    let relationships = follow_user_ids(&db, token.id).await;

    Ok(Json(FollowingListDto {
        status: "success".to_owned(),
        message: "Accounts this user is following".to_owned(),
        follows,
        total,
        pages: page_count(total),
        user_following: relationships.following,
        user_follow_me: relationships.followers,
    }))
}

/// Axum handler listing who follows a user. Symmetric to `following`, but
/// only the follower side of each edge is expanded to a profile.
pub async fn followers(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    maybe_params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<FollowersListDto>, ApiErr> {
    let params = maybe_params.map(|Path(prm)| prm).unwrap_or_default();
    let (target, page) = listing_params(&params, token.id)?;

    let (edges, total) = get_follows_page_by_followed(&db, target, page, ITEMS_PER_PAGE).await?;
    let follower_ids = edges.iter().map(|edge| edge.user_id).collect();
    let profiles: HashMap<Uuid, PublicProfile> = get_public_profiles_by_ids(&db, follower_ids)
        .await?
        .into_iter()
        .map(|profile| (profile.id, profile))
        .collect();

    let follows = edges
        .iter()
        .filter_map(|edge| {
            Some(FollowerEntry {
                user: profiles.get(&edge.user_id)?.clone(),
                followed: edge.followed_id,
                created_at: edge.created_at,
            })
        })
        .collect();

    let relationships = follow_user_ids(&db, token.id).await;

    Ok(Json(FollowersListDto {
        status: "success".to_owned(),
        message: "Accounts following this user".to_owned(),
        follows,
        total,
        pages: page_count(total),
        user_following: relationships.following,
        user_follow_me: relationships.followers,
    }))
}

/// Resolve the optional `:id` / `:page` path segments of the listing routes.
fn listing_params(
    params: &HashMap<String, String>,
    actor_id: Uuid,
) -> Result<(Uuid, u64), ApiErr> {
    let target = match params.get("id") {
        Some(raw) => raw.parse().map_err(|_| ApiErr::InvalidParam)?,
        None => actor_id,
    };
    let page = match params.get("page") {
        Some(raw) => raw.parse::<u64>().map_err(|_| ApiErr::InvalidParam)?.max(1),
        None => 1,
    };

    Ok((target, page))
}

fn page_count(total: u64) -> u64 {
    (total + ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE
}

/// Public profiles for both endpoints of a page of edges, keyed by id.
async fn edge_profiles(
    db: &DatabaseConnection,
    edges: &[follow::Model],
) -> Result<HashMap<Uuid, PublicProfile>, ApiErr> {
    let mut ids: Vec<Uuid> = edges
        .iter()
        .flat_map(|edge| [edge.user_id, edge.followed_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let profiles = get_public_profiles_by_ids(db, ids)
        .await?
        .into_iter()
        .map(|profile| (profile.id, profile))
        .collect();

    Ok(profiles)
}

/// Struct describing JSON object from the follow creation request.
#[derive(Debug, Deserialize)]
pub struct SaveFollowDto {
    pub followed: Uuid,
}

/// Struct describing JSON object, returned on follow creation.
#[derive(Debug, PartialEq, Serialize)]
pub struct FollowSavedDto {
    pub status: String,
    pub identity: PublicProfile,
    pub follow: follow::Model,
}

/// Struct describing JSON object, returned on unfollow.
#[derive(Debug, PartialEq, Serialize)]
pub struct UnfollowDto {
    pub status: String,
    pub message: String,
}

/// One row of a following listing, both endpoints expanded.
#[derive(Debug, PartialEq, Serialize)]
pub struct FollowingEntry {
    pub user: PublicProfile,
    pub followed: PublicProfile,
    pub created_at: DateTime,
}

/// One row of a followers listing, only the follower side expanded.
#[derive(Debug, PartialEq, Serialize)]
pub struct FollowerEntry {
    pub user: PublicProfile,
    pub followed: Uuid,
    pub created_at: DateTime,
}

/// Struct describing JSON object for the following listing.
#[derive(Debug, PartialEq, Serialize)]
pub struct FollowingListDto {
    pub status: String,
    pub message: String,
    pub follows: Vec<FollowingEntry>,
    pub total: u64,
    pub pages: u64,
    pub user_following: Vec<Uuid>,
    pub user_follow_me: Vec<Uuid>,
}

/// Struct describing JSON object for the followers listing.
#[derive(Debug, PartialEq, Serialize)]
pub struct FollowersListDto {
    pub status: String,
    pub message: String,
    pub follows: Vec<FollowerEntry>,
    pub total: u64,
    pub pages: u64,
    pub user_following: Vec<Uuid>,
    pub user_follow_me: Vec<Uuid>,
}



#[cfg(test)]
mod test_following {
    use super::{following, save_follow, SaveFollowDto};
    use crate::middleware::auth::Token;
    use crate::tests::{
        Operation::{Insert, Migration},
        TestData, TestDataBuilder, TestErr,
    };
    use axum::{
        extract::{Path, State},
        Extension, Json,
    };
    use std::collections::HashMap;

    #[tokio::test]
    async fn follow_then_list() -> Result<(), TestErr> {
        let (connection, TestData { users, .. }) = TestDataBuilder::new()
            .users(Insert(2))
            .follows(Migration)
            .build()
            .await?;
        let users = users.unwrap();
        let token = Token {
            exp: 35,
            id: users[0].id,
        };

        save_follow(
            State(connection.clone()),
            Extension(token.clone()),
            Json(SaveFollowDto {
                followed: users[1].id,
            }),
        )
        .await?;

        let result = following(State(connection), Extension(token), None).await?;
        let Json(result) = result;

        assert_eq!(result.follows.len(), 1);
        assert_eq!(result.follows[0].followed.id, users[1].id);
        assert_eq!(result.follows[0].followed.username, users[1].username);
        assert_eq!(result.total, 1);
        assert_eq!(result.pages, 1);
        assert!(result.user_following.contains(&users[1].id));
        assert!(result.user_follow_me.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn paginated_listing() -> Result<(), TestErr> {
        let pairs: Vec<(usize, usize)> = (2..=13).map(|other| (1, other)).collect();
        let (connection, TestData { users, .. }) = TestDataBuilder::new()
            .users(Insert(13))
            .follows(Insert(pairs))
            .build()
            .await?;
        let users = users.unwrap();
        let token = Token {
            exp: 35,
            id: users[0].id,
        };

        let params = |page: &str| {
            HashMap::from([
                ("id".to_owned(), users[0].id.to_string()),
                ("page".to_owned(), page.to_owned()),
            ])
        };

        let Json(page1) = following(
            State(connection.clone()),
            Extension(token.clone()),
            Some(Path(params("1"))),
        )
        .await?;
        assert_eq!(page1.follows.len(), 5);
        assert_eq!(page1.total, 12);
        assert_eq!(page1.pages, 3);

        let Json(page3) = following(
            State(connection.clone()),
            Extension(token.clone()),
            Some(Path(params("3"))),
        )
        .await?;
        assert_eq!(page3.follows.len(), 2);

        // Past the end: empty page, not an error.
        let Json(page4) =
            following(State(connection), Extension(token), Some(Path(params("4")))).await?;
        assert!(page4.follows.is_empty());
        assert_eq!(page4.pages, 3);

        Ok(())
    }
}

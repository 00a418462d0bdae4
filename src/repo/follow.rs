use entity::entities::{follow, prelude::Follow};
use sea_orm::{
    prelude::Uuid, query::*, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait,
    InsertResult, PaginatorTrait, QueryFilter,
};
use serde::Serialize;

/// Insert `follow` edge for the provided `ActiveModel`. The composite primary
/// key on `(user_id, followed_id)` rejects a second edge for the same pair, so
/// concurrent duplicate follows fail here instead of racing past each other.
/// Returns `InsertResult` on success, otherwise returns an `database error`.
pub async fn create_follow(
    db: &DatabaseConnection,
    follow: follow::ActiveModel,
) -> Result<InsertResult<follow::ActiveModel>, DbErr> {
    Follow::insert(follow).exec(db).await
}

/// Fetch the `follow` edge for the provided pair.
/// Returns optional `follow` on success, otherwise returns an `database error`.
pub async fn get_follow(
    db: &DatabaseConnection,
    user_id: Uuid,
    followed_id: Uuid,
) -> Result<Option<follow::Model>, DbErr> {
    Follow::find_by_id((user_id, followed_id)).one(db).await
}

/// Delete the `follow` edge for the provided pair. A `rows_affected` of zero
/// means the edge never existed.
/// Returns `DeleteResult` on success, otherwise returns an `database error`.
pub async fn delete_follow(
    db: &DatabaseConnection,
    user_id: Uuid,
    followed_id: Uuid,
) -> Result<DeleteResult, DbErr> {
    Follow::delete_many()
        .filter(follow::Column::UserId.eq(user_id))
        .filter(follow::Column::FollowedId.eq(followed_id))
        .exec(db)
        .await
}

/// Fetch all edges where the provided user is the follower.
/// Returns vec of `follows` on success, otherwise returns an `database error`.
pub async fn get_follows_by_follower(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<follow::Model>, DbErr> {
    Follow::find()
        .filter(follow::Column::UserId.eq(user_id))
        .all(db)
        .await
}

/// Fetch all edges where the provided user is the followed party.
/// Returns vec of `follows` on success, otherwise returns an `database error`.
pub async fn get_follows_by_followed(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<follow::Model>, DbErr> {
    Follow::find()
        .filter(follow::Column::FollowedId.eq(user_id))
        .all(db)
        .await
}

/// Count edges where the provided user is the follower.
pub async fn count_follows_by_follower(db: &DatabaseConnection, user_id: Uuid) -> Result<u64, DbErr> {
    Follow::find()
        .filter(follow::Column::UserId.eq(user_id))
        .count(db)
        .await
}

/// Count edges where the provided user is the followed party.
pub async fn count_follows_by_followed(db: &DatabaseConnection, user_id: Uuid) -> Result<u64, DbErr> {
    Follow::find()
        .filter(follow::Column::FollowedId.eq(user_id))
        .count(db)
        .await
}

/// Fetch one page of edges where the provided user is the follower, plus the
/// total count for pagination. Pages are 1-indexed; a page past the end yields
/// an empty vec, not an error. Ordered oldest first.
pub async fn get_follows_page_by_follower(
    db: &DatabaseConnection,
    user_id: Uuid,
    page: u64,
    per_page: u64,
) -> Result<(Vec<follow::Model>, u64), DbErr> {
    let query = Follow::find()
        .filter(follow::Column::UserId.eq(user_id))
        .order_by_asc(follow::Column::CreatedAt);

    let total = query.clone().count(db).await?;
    let follows = query
        .limit(per_page)
        .offset(page_offset(page, per_page))
        .all(db)
        .await?;

    Ok((follows, total))
}

/// Fetch one page of edges where the provided user is the followed party,
/// plus the total count. Same paging policy as `get_follows_page_by_follower`.
pub async fn get_follows_page_by_followed(
    db: &DatabaseConnection,
    user_id: Uuid,
    page: u64,
    per_page: u64,
) -> Result<(Vec<follow::Model>, u64), DbErr> {
    let query = Follow::find()
        .filter(follow::Column::FollowedId.eq(user_id))
        .order_by_asc(follow::Column::CreatedAt);

    let total = query.clone().count(db).await?;
    let follows = query
        .limit(per_page)
        .offset(page_offset(page, per_page))
        .all(db)
        .await?;

    Ok((follows, total))
}

/// Saturating offset for a 1-indexed page. Capped at `i64::MAX` because SQL
/// OFFSET is a signed bigint.
fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(per_page)
        .min(i64::MAX as u64)
}

/// Both relationship sets of an account: who it follows and who follows it.
/// Used to annotate listings with the viewer's own perspective; never stored.
pub async fn follow_user_ids(db: &DatabaseConnection, actor_id: Uuid) -> Relationships {
    match fetch_relationships(db, actor_id).await {
        Ok(relationships) => relationships,
        Err(err) => {
            // Best-effort contract: the sets only decorate responses, so a
            // failed lookup degrades to empty sets instead of failing the
            // request.
            tracing::warn!("relationship lookup failed for {actor_id}: {err}");
            Relationships::default()
        }
    }
}

async fn fetch_relationships(
    db: &DatabaseConnection,
    actor_id: Uuid,
) -> Result<Relationships, DbErr> {
    let following = Follow::find()
        .select_only()
        .column(follow::Column::FollowedId)
        .filter(follow::Column::UserId.eq(actor_id))
        .into_tuple::<Uuid>()
        .all(db)
        .await?;

    let followers = Follow::find()
        .select_only()
        .column(follow::Column::UserId)
        .filter(follow::Column::FollowedId.eq(actor_id))
        .into_tuple::<Uuid>()
        .all(db)
        .await?;

    Ok(Relationships {
        following,
        followers,
    })
}

/// Pairwise relationship state between two accounts: does the actor follow
/// the other one, and does the other one follow the actor.
pub async fn follow_this_user(
    db: &DatabaseConnection,
    actor_id: Uuid,
    other_id: Uuid,
) -> Result<MutualStatus, DbErr> {
    let following = get_follow(db, actor_id, other_id).await?;
    let follower = get_follow(db, other_id, actor_id).await?;

    Ok(MutualStatus {
        following,
        follower,
    })
}

/// Delete all existing `follow` records from database.
/// Returns `DeleteResult` with affected rows count on success, otherwise
/// returns an `database error`.
pub async fn empty_follow_table(db: &DatabaseConnection) -> Result<DeleteResult, DbErr> {
    Follow::delete_many().exec(db).await
}

/// Derived relationship sets of a single account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Relationships {
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
}

/// Result of the pairwise mutual query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MutualStatus {
    pub following: Option<follow::Model>,
    pub follower: Option<follow::Model>,
}

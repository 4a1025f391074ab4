use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use super::models::{Avatar, NewAvatar, NewProfile, Profile, ProfileView, UpdateProfile, alt_from_src};
use crate::auth::{CurrentUser, User};
use crate::schema::{avatars, profiles};
use crate::utils::types::{ApiResult, ImageInput, Pool};
use crate::utils::{AppError, ValidatedJson};

/// The user's profile, created on first access.
pub async fn profile_for(
    conn: &mut AsyncPgConnection,
    user: &User,
) -> Result<(Profile, Option<Avatar>), AppError> {
    let email = Some(user.email.as_str()).filter(|email| !email.is_empty());

    diesel::insert_into(profiles::table)
        .values(NewProfile {
            user_id: user.id,
            email,
        })
        .on_conflict(profiles::user_id)
        .do_nothing()
        .execute(conn)
        .await?;

    let res = profiles::table
        .left_join(avatars::table)
        .filter(profiles::user_id.eq(user.id))
        .select((Profile::as_select(), Option::<Avatar>::as_select()))
        .first(conn)
        .await?;

    Ok(res)
}

pub async fn get_profile(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<ProfileView> {
    let mut conn = pool.get().await?;

    let (profile, avatar) = profile_for(&mut conn, &user).await?;

    Ok(Json(ProfileView::new(profile, avatar)))
}

pub async fn update_profile(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfile>,
) -> ApiResult<ProfileView> {
    let mut conn = pool.get().await?;

    let view = conn
        .transaction::<ProfileView, AppError, _>(move |conn| {
            Box::pin(async move {
                let (profile, avatar) = profile_for(conn, &user).await?;
                if payload.is_empty() {
                    return Ok(ProfileView::new(profile, avatar));
                }

                let profile = diesel::update(profiles::table.find(profile.id))
                    .set(&payload)
                    .returning(Profile::as_returning())
                    .get_result(conn)
                    .await?;

                tracing::debug!(user = %user.id, "profile updated");

                Ok(ProfileView::new(profile, avatar))
            })
        })
        .await?;

    Ok(Json(view))
}

/// Points the profile at a new avatar image and drops the previous one.
pub async fn update_avatar(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<ImageInput>,
) -> ApiResult<ProfileView> {
    let mut conn = pool.get().await?;

    let view = conn
        .transaction::<ProfileView, AppError, _>(move |conn| {
            Box::pin(async move {
                let (profile, previous) = profile_for(conn, &user).await?;

                let alt = payload
                    .alt
                    .clone()
                    .unwrap_or_else(|| alt_from_src(&payload.src));

                let avatar = diesel::insert_into(avatars::table)
                    .values(NewAvatar {
                        src: &payload.src,
                        alt: &alt,
                    })
                    .returning(Avatar::as_returning())
                    .get_result(conn)
                    .await?;

                let profile = diesel::update(profiles::table.find(profile.id))
                    .set(profiles::avatar_id.eq(avatar.id))
                    .returning(Profile::as_returning())
                    .get_result(conn)
                    .await?;

                if let Some(previous) = previous {
                    diesel::delete(avatars::table.find(previous.id))
                        .execute(conn)
                        .await?;
                }

                tracing::debug!(user = %user.id, avatar = avatar.id, "avatar replaced");

                Ok(ProfileView::new(profile, Some(avatar)))
            })
        })
        .await?;

    Ok(Json(view))
}

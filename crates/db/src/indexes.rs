use mongodb::{Database, IndexModel};
use tracing::info;

use crate::models::{Admin, Invite, InviteAttempt, RegisteredUser};

/// The invite code and actor keys are the `_id` of their documents, so
/// uniqueness is enforced by the primary key; these are lookup indexes.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Invites
    create_indexes(
        db,
        Invite::COLLECTION,
        vec![
            index(bson::doc! { "created_by": 1, "created_at": -1 }),
            index(bson::doc! { "is_active": 1, "expires_at": 1 }),
            index(bson::doc! { "used_by.uid": 1 }),
        ],
    )
    .await?;

    // Rate-limit attempts
    create_indexes(
        db,
        InviteAttempt::COLLECTION,
        vec![index(bson::doc! { "locked_until": 1 })],
    )
    .await?;

    // Admins
    create_indexes(db, Admin::COLLECTION, vec![index(bson::doc! { "email": 1 })]).await?;

    // Registered users
    create_indexes(
        db,
        RegisteredUser::COLLECTION,
        vec![
            index(bson::doc! { "email": 1 }),
            index(bson::doc! { "invite_code": 1 }),
        ],
    )
    .await?;

    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}

use crate::{
    db::DbPool,
    entities::notification::{self, Entity as NotificationEntity},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Read-state over the notification inbox. Rows are created by the
/// assignment dispatcher; the only mutation here is the recipient
/// marking them read.
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Unread notifications for a user, newest first.
    #[instrument(skip(self))]
    pub async fn list_unread(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let db = &*self.db_pool;
        NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Marks every unread notification for the user read, stamping
    /// `read_at` with one shared timestamp. Idempotent: a second call
    /// finds nothing unread and changes nothing.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let unread = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .all(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let now = Utc::now();
        let count = unread.len() as u64;
        for model in unread {
            let mut active: notification::ActiveModel = model.into();
            active.is_read = Set(true);
            active.read_at = Set(Some(now));
            active
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        if count > 0 {
            info!(user_id = %user_id, count, "notifications marked read");
        }
        Ok(count)
    }

    /// Full inbox for a user, paginated, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<notification::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let notifications = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((notifications, total))
    }

    #[instrument(skip(self))]
    pub async fn count_unread(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> (NotificationService, Arc<DbPool>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let db = Arc::new(db);
        (NotificationService::new(db.clone()), db)
    }

    async fn seed_user(db: &DbPool) -> Uuid {
        user::ActiveModel {
            username: Set("reader".into()),
            email: Set("reader@example.com".into()),
            password_hash: Set("x".into()),
            full_name: Set("Reader".into()),
            role: Set("user".into()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn seed_notification(db: &DbPool, user_id: Uuid, title: &str) {
        notification::ActiveModel {
            user_id: Set(user_id),
            notification_type: Set("Assignment".into()),
            title: Set(title.into()),
            message: Set("m".into()),
            is_read: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn mark_all_read_empties_unread_and_is_idempotent() {
        let (service, db) = setup().await;
        let user_id = seed_user(&db).await;
        seed_notification(&db, user_id, "one").await;
        seed_notification(&db, user_id, "two").await;

        assert_eq!(service.list_unread(user_id).await.unwrap().len(), 2);

        let affected = service.mark_all_read(user_id).await.unwrap();
        assert_eq!(affected, 2);
        assert!(service.list_unread(user_id).await.unwrap().is_empty());

        // Second call is a no-op with the same end state.
        let affected = service.mark_all_read(user_id).await.unwrap();
        assert_eq!(affected, 0);
        assert!(service.list_unread(user_id).await.unwrap().is_empty());

        let (all, total) = service.list_for_user(user_id, 1, 20).await.unwrap();
        assert_eq!(total, 2);
        assert!(all.iter().all(|n| n.is_read && n.read_at.is_some()));
    }

    #[tokio::test]
    async fn unread_count_tracks_read_state() {
        let (service, db) = setup().await;
        let user_id = seed_user(&db).await;
        seed_notification(&db, user_id, "one").await;
        assert_eq!(service.count_unread(user_id).await.unwrap(), 1);
        service.mark_all_read(user_id).await.unwrap();
        assert_eq!(service.count_unread(user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unread_listing_is_scoped_to_the_user() {
        let (service, db) = setup().await;
        let user_id = seed_user(&db).await;
        let other = user::ActiveModel {
            username: Set("other".into()),
            email: Set("other@example.com".into()),
            password_hash: Set("x".into()),
            full_name: Set("Other".into()),
            role: Set("user".into()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*db)
        .await
        .unwrap();
        seed_notification(&db, user_id, "mine").await;
        seed_notification(&db, other.id, "theirs").await;

        let unread = service.list_unread(user_id).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "mine");
    }
}

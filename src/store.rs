//! Document collections over SQLite.
//!
//! Every collection is a table of `(id, sort_key, body)` rows where `body` is
//! the JSON encoding of one whole aggregate. Callers read and write whole
//! documents; there is no field-level patching.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::{error::StoreError, models::WorkoutSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    WorkoutPlans,
    WorkoutSessions,
    DiaryEntries,
    Exercises,
    CoachMessages,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::WorkoutPlans,
        Collection::WorkoutSessions,
        Collection::DiaryEntries,
        Collection::Exercises,
        Collection::CoachMessages,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Self::WorkoutPlans => "workout_plans",
            Self::WorkoutSessions => "workout_sessions",
            Self::DiaryEntries => "diary_entries",
            Self::Exercises => "exercises",
            Self::CoachMessages => "coach_messages",
        }
    }
}

/// An aggregate stored as one row of a collection.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Value of the collection's declared sort field, encoded so that
    /// lexicographic order matches the field's natural order.
    fn sort_key(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Fixed-width RFC 3339 so timestamps sort correctly as text.
pub fn timestamp_key(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts a new document; fails if the id already exists.
    pub async fn insert<T: Document>(&self, doc: &T) -> Result<(), StoreError> {
        let table = T::COLLECTION.table();
        sqlx::query(&format!(
            "INSERT INTO {table} (id, sort_key, body) VALUES (?1, ?2, ?3)"
        ))
        .bind(doc.id())
        .bind(doc.sort_key())
        .bind(serde_json::to_string(doc)?)
        .execute(&self.pool)
        .await?;

        debug!(collection = table, id = doc.id(), "inserted document");
        Ok(())
    }

    /// Inserts or fully replaces the document with the same id.
    pub async fn put<T: Document>(&self, doc: &T) -> Result<(), StoreError> {
        let table = T::COLLECTION.table();
        sqlx::query(&format!(
            "INSERT INTO {table} (id, sort_key, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET sort_key = excluded.sort_key, body = excluded.body"
        ))
        .bind(doc.id())
        .bind(doc.sort_key())
        .bind(serde_json::to_string(doc)?)
        .execute(&self.pool)
        .await?;

        debug!(collection = table, id = doc.id(), "stored document");
        Ok(())
    }

    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let body: Option<String> = sqlx::query_scalar(&format!(
            "SELECT body FROM {} WHERE id = ?",
            T::COLLECTION.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
    }

    /// Removes the document if present. Returns whether a row was deleted.
    pub async fn delete<T: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let res = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = ?",
            T::COLLECTION.table()
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    pub async fn clear(&self, collection: Collection) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        clear_in(&mut conn, collection).await
    }

    pub async fn bulk_insert<T: Document>(&self, docs: &[T]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        insert_many(&mut tx, docs).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Every document in insertion order.
    pub async fn all<T: Document>(&self) -> Result<Vec<T>, StoreError> {
        let bodies: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT body FROM {} ORDER BY rowid",
            T::COLLECTION.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    /// Every document ordered by the collection's sort field.
    pub async fn ordered<T: Document>(&self, order: Order) -> Result<Vec<T>, StoreError> {
        let dir = match order {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        };
        let bodies: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT body FROM {} ORDER BY sort_key {dir}, rowid {dir}",
            T::COLLECTION.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        decode_all(bodies)
    }

    pub async fn count(&self, collection: Collection) -> Result<i64, StoreError> {
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", collection.table()))
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    //
    // Active session draft
    //

    pub async fn load_active_session(&self) -> Result<Option<WorkoutSession>, StoreError> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM active_session WHERE slot = 0")
                .fetch_optional(&self.pool)
                .await?;

        Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
    }

    pub async fn save_active_session(&self, session: &WorkoutSession) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO active_session (slot, body) VALUES (0, ?1)
             ON CONFLICT(slot) DO UPDATE SET body = excluded.body",
        )
        .bind(serde_json::to_string(session)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_active_session(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM active_session")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub(crate) async fn clear_in(
    conn: &mut SqliteConnection,
    collection: Collection,
) -> Result<(), StoreError> {
    sqlx::query(&format!("DELETE FROM {}", collection.table()))
        .execute(&mut *conn)
        .await?;
    debug!(collection = collection.table(), "cleared collection");
    Ok(())
}

pub(crate) async fn insert_many<T: Document>(
    conn: &mut SqliteConnection,
    docs: &[T],
) -> Result<(), StoreError> {
    let sql = format!(
        "INSERT INTO {} (id, sort_key, body) VALUES (?1, ?2, ?3)",
        T::COLLECTION.table()
    );
    for doc in docs {
        sqlx::query(&sql)
            .bind(doc.id())
            .bind(doc.sort_key())
            .bind(serde_json::to_string(doc)?)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn decode_all<T: Document>(bodies: Vec<String>) -> Result<Vec<T>, StoreError> {
    bodies
        .iter()
        .map(|b| serde_json::from_str(b).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::{
        db,
        models::{CoachMessage, DiaryEntry, WorkoutPlan},
        types::Role,
    };

    async fn store() -> Store {
        Store::new(db::open_in_memory().await.unwrap())
    }

    fn message(content: &str, secs: i64) -> CoachMessage {
        CoachMessage {
            id: crate::utils::new_id(),
            role: Role::User,
            content: content.to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_get_put_delete() {
        let store = store().await;
        let mut plan = WorkoutPlan::new("Push Pull Legs");
        store.insert(&plan).await.unwrap();

        let loaded: WorkoutPlan = store.get(&plan.id).await.unwrap().unwrap();
        assert_eq!(loaded, plan);

        plan.name = "PPL".into();
        store.put(&plan).await.unwrap();
        let loaded: WorkoutPlan = store.get(&plan.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "PPL");

        assert!(store.delete::<WorkoutPlan>(&plan.id).await.unwrap());
        assert!(!store.delete::<WorkoutPlan>(&plan.id).await.unwrap());
        assert!(store.get::<WorkoutPlan>(&plan.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let store = store().await;
        let plan = WorkoutPlan::new("A");
        store.insert(&plan).await.unwrap();
        assert!(store.insert(&plan).await.is_err());
    }

    #[tokio::test]
    async fn ordered_scan_follows_sort_field() {
        let store = store().await;
        let late = message("late", 30);
        let early = message("early", 10);
        let middle = message("middle", 20);
        store
            .bulk_insert(&[late.clone(), early.clone(), middle.clone()])
            .await
            .unwrap();

        let asc: Vec<CoachMessage> = store.ordered(Order::Asc).await.unwrap();
        let names: Vec<_> = asc.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(names, ["early", "middle", "late"]);

        let desc: Vec<CoachMessage> = store.ordered(Order::Desc).await.unwrap();
        assert_eq!(desc[0].content, "late");

        let all: Vec<CoachMessage> = store.all().await.unwrap();
        assert_eq!(all[0].content, "late");
    }

    #[tokio::test]
    async fn clear_and_count() {
        let store = store().await;
        store
            .bulk_insert(&[message("a", 1), message("b", 2)])
            .await
            .unwrap();
        assert_eq!(store.count(Collection::CoachMessages).await.unwrap(), 2);

        store.clear(Collection::CoachMessages).await.unwrap();
        assert_eq!(store.count(Collection::CoachMessages).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn diary_dates_are_unique() {
        let store = store().await;
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        store.insert(&DiaryEntry::new(date)).await.unwrap();
        assert!(store.insert(&DiaryEntry::new(date)).await.is_err());
    }

    #[tokio::test]
    async fn active_session_slot_holds_one_draft() {
        let store = store().await;
        assert!(store.load_active_session().await.unwrap().is_none());

        let mut session = WorkoutSession::new("plan", "day", "Push", Vec::new());
        store.save_active_session(&session).await.unwrap();
        session.day_name = "Pull".into();
        store.save_active_session(&session).await.unwrap();

        let loaded = store.load_active_session().await.unwrap().unwrap();
        assert_eq!(loaded.day_name, "Pull");

        store.clear_active_session().await.unwrap();
        assert!(store.load_active_session().await.unwrap().is_none());
    }
}

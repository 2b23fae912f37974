use crate::domain::{
    models::session::{assemble_sessions, LiveSession, SessionRow, SlotRef, SlotRow},
    ports::SessionRepository,
    services::catalog::list_bookable,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use chrono::NaiveDate;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn slot_exists(&self, slot: &SlotRef) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM session_slots WHERE session_id = ? AND slot_date = ? AND time_label = ?")
            .bind(&slot.session_id).bind(slot.date).bind(&slot.time)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepo {
    async fn create(&self, session: &LiveSession) -> Result<LiveSession, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("INSERT INTO live_sessions (id, session_name, created_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.session_name)
            .bind(session.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for slot in SlotRow::from_session(session) {
            sqlx::query(
                r#"INSERT INTO session_slots (session_id, slot_date, time_label, capacity, booked, position)
                   VALUES (?, ?, ?, ?, ?, ?)"#
            )
                .bind(&slot.session_id)
                .bind(slot.slot_date)
                .bind(&slot.time_label)
                .bind(slot.capacity)
                .bind(slot.booked)
                .bind(slot.position)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(session.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LiveSession>, AppError> {
        let Some(row) = sqlx::query_as::<_, SessionRow>("SELECT * FROM live_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)? else {
            return Ok(None);
        };

        let slots = sqlx::query_as::<_, SlotRow>("SELECT * FROM session_slots WHERE session_id = ? ORDER BY position ASC")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(assemble_sessions(vec![row], slots).pop())
    }

    async fn list(&self) -> Result<Vec<LiveSession>, AppError> {
        let rows = sqlx::query_as::<_, SessionRow>("SELECT * FROM live_sessions ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let slots = sqlx::query_as::<_, SlotRow>("SELECT * FROM session_slots ORDER BY session_id, position ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(assemble_sessions(rows, slots))
    }

    async fn find_bookable_sessions(&self, today: NaiveDate) -> Result<Vec<LiveSession>, AppError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM live_sessions WHERE id IN (SELECT DISTINCT session_id FROM session_slots WHERE slot_date >= ?)"
        )
            .bind(today)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let slots = sqlx::query_as::<_, SlotRow>(
            "SELECT * FROM session_slots WHERE session_id IN (SELECT DISTINCT session_id FROM session_slots WHERE slot_date >= ?) ORDER BY session_id, position ASC"
        )
            .bind(today)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(list_bookable(assemble_sessions(rows, slots), today))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Slots first: the write lock is held before bookings are counted
        sqlx::query("DELETE FROM session_slots WHERE session_id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;

        let bookings = sqlx::query("SELECT COUNT(*) as count FROM session_bookings WHERE session_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .get::<i64, _>("count");
        if bookings > 0 {
            return Err(AppError::Conflict("Cannot delete session with existing bookings".into()));
        }

        let result = sqlx::query("DELETE FROM live_sessions WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Session not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn reserve_slot(&self, slot: &SlotRef) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE session_slots
               SET booked = CASE WHEN capacity IS NULL THEN booked ELSE booked + 1 END
               WHERE session_id = ? AND slot_date = ? AND time_label = ?
                 AND (capacity IS NULL OR booked < capacity)"#
        )
            .bind(&slot.session_id)
            .bind(slot.date)
            .bind(&slot.time)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            if self.slot_exists(slot).await? {
                return Err(AppError::Capacity("Selected time slot is fully booked".into()));
            }
            return Err(AppError::NotFound("Time slot not found".into()));
        }
        Ok(())
    }

    async fn release_slot(&self, slot: &SlotRef) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE session_slots
               SET booked = CASE WHEN capacity IS NULL THEN booked ELSE MAX(booked - 1, 0) END
               WHERE session_id = ? AND slot_date = ? AND time_label = ?"#
        )
            .bind(&slot.session_id)
            .bind(slot.date)
            .bind(&slot.time)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Time slot not found".into()));
        }
        Ok(())
    }

    async fn heal_slot_counter(&self, slot: &SlotRef) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE session_slots SET booked = 1 WHERE session_id = ? AND slot_date = ? AND time_label = ? AND capacity > 0 AND booked = 0"
        )
            .bind(&slot.session_id)
            .bind(slot.date)
            .bind(&slot.time)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}

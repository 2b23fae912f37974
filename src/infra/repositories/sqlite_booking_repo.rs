use crate::domain::{models::{booking::SessionBooking, session::SlotRef}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_booking(&self, booking: &SessionBooking) -> Result<SessionBooking, AppError> {
        sqlx::query_as::<_, SessionBooking>(
            "INSERT INTO session_bookings (id, session_id, session_name, session_date, time_slot, name, email, mobile, status, booked_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.session_id).bind(&booking.session_name).bind(booking.session_date)
            .bind(&booking.time_slot).bind(&booking.name).bind(&booking.email).bind(&booking.mobile)
            .bind(&booking.status).bind(booking.booked_at).bind(booking.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_booking(&self, booking: &SessionBooking, expected: &SlotRef) -> Result<SessionBooking, AppError> {
        let updated = sqlx::query_as::<_, SessionBooking>(
            "UPDATE session_bookings SET session_id=?, session_name=?, session_date=?, time_slot=?, name=?, email=?, mobile=?, updated_at=?
             WHERE id=? AND session_id=? AND session_date=? AND time_slot=?
             RETURNING *"
        )
            .bind(&booking.session_id).bind(&booking.session_name).bind(booking.session_date).bind(&booking.time_slot)
            .bind(&booking.name).bind(&booking.email).bind(&booking.mobile).bind(booking.updated_at)
            .bind(&booking.id).bind(&expected.session_id).bind(expected.date).bind(&expected.time)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        if let Some(updated) = updated {
            return Ok(updated);
        }
        if self.find_by_id(&booking.id).await?.is_some() {
            return Err(AppError::Conflict("Booking was changed by another edit; reload and try again".into()));
        }
        Err(AppError::NotFound("Booking not found".into()))
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<SessionBooking>, AppError> {
        sqlx::query_as::<_, SessionBooking>("SELECT * FROM session_bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<SessionBooking>, AppError> {
        sqlx::query_as::<_, SessionBooking>("SELECT * FROM session_bookings ORDER BY booked_at DESC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<SessionBooking>, AppError> {
        sqlx::query_as::<_, SessionBooking>("SELECT * FROM session_bookings WHERE session_id = ? ORDER BY session_date ASC, time_slot ASC").bind(session_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}

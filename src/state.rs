use std::sync::Arc;
use crate::domain::ports::{BookingRepository, SessionRepository};
use crate::domain::services::booking_manager::BookingManager;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session_repo: Arc<dyn SessionRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub booking_manager: Arc<BookingManager>,
}

impl AppState {
    pub fn new(
        config: Config,
        session_repo: Arc<dyn SessionRepository>,
        booking_repo: Arc<dyn BookingRepository>,
    ) -> Self {
        let booking_manager = Arc::new(BookingManager::new(
            session_repo.clone(),
            booking_repo.clone(),
            config.timezone,
        ));

        Self {
            config,
            session_repo,
            booking_repo,
            booking_manager,
        }
    }
}

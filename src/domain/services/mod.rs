pub mod booking_manager;
pub mod catalog;
pub mod validation;

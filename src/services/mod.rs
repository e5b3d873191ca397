pub mod ai;
pub mod booking;
pub mod calendar;
pub mod conversation;
pub mod datetime;
pub mod dispatch;
pub mod messaging;
pub mod sessions;
pub mod voice;

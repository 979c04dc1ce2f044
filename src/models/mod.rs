pub mod application;
pub mod email_outbox;
pub mod job;
pub mod opleiding;
pub mod user;

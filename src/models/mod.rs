// Data models for DraftDesk Backend

pub mod auth;
pub mod content;
pub mod resume;
pub mod user;

pub mod root;
pub mod auth;
pub mod profile;
pub mod applications;
pub mod rooms;
pub mod maintenance;
pub mod announcements;
pub mod notifications;
pub mod messages;
pub mod admin;
pub mod reports;

pub mod controller;
pub mod location;
pub mod models;
pub mod notification;
pub mod prefs;
pub mod query;
pub mod ui;

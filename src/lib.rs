//! IronLog: workout plans, session logging with personal-record detection,
//! a mood/goals diary and a coaching chat, all kept in one local SQLite file.

pub mod catalog;
pub mod coach;
pub mod config;
pub mod db;
pub mod diary;
pub mod error;
pub mod export;
pub mod models;
pub mod plans;
pub mod pr;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

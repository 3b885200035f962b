pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod models;
pub mod store;

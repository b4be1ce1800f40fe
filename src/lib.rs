pub mod api;
pub mod config;
pub mod models;
pub mod db;
pub mod dosing;
pub mod adherence;

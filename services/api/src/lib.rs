pub mod adapters;
pub mod config;
pub mod error;
pub mod password;
pub mod token;
pub mod web;

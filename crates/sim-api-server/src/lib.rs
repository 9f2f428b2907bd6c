pub mod config;
pub mod database;
pub mod document;
pub mod domain;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod nlp;
pub mod personas;
pub mod services;
pub mod state;
pub mod tools;
pub mod utils;

//! NextPress - A lightweight blog CMS
//!
//! This library provides the REST API, the persistence layer and the
//! server-rendered public site. The binaries in `src/bin` and `src/main.rs`
//! are thin wrappers around it.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
pub mod utils;

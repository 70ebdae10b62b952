//! Core library for ytmusic-csv-import
pub mod config;
pub mod error;
pub mod models;
pub mod api;
pub mod ingest;
pub mod matcher;
pub mod importer;
pub mod report;
pub mod util;

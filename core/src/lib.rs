//! Core of the fitlog tracker: free-text parsers, the SQLite store, and the
//! recorders and reports built on top of them.

pub mod db;
pub mod models;
pub mod parse;
pub mod record;
pub mod report;

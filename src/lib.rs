pub mod app;
pub mod browser;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod maya;
pub mod output;
pub mod rank;
pub mod store;

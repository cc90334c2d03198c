pub mod acquire;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod inat;
pub mod layout;
pub mod ledger;
pub mod output;
pub mod pipeline;

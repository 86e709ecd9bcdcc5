//! Terminal process monitor: samples per-process memory, CPU, disk I/O and
//! priority, ranks them, and keeps a short rolling history of system memory.

pub mod action;
pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod format;
pub mod history;
pub mod logging;
pub mod pipeline;
pub mod rank;
pub mod system;
pub mod ui;
pub mod worker;

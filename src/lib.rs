#![doc(test(attr(deny(warnings))))]

//! Kharcha Core tracks expenses across accounts, materialises recurring
//! expenses and raises budget alerts, with JSON persistence and a small
//! script-driven command shell.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kharcha Core tracing initialized.");
    });
}

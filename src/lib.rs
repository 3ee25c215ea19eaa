//! Telemetry monitor for the DevKit IoT sensor board
//!
//! The `bluetooth` module decodes raw GATT characteristic values into typed
//! readings and talks to the board over BlueZ. Decoded readings are applied to
//! a [`board::Board`], which keeps the latest values and a bounded history
//! per sensor.

pub mod bluetooth;
pub mod board;
pub mod config;
pub mod history;
pub mod models;
pub mod shutdown;
pub mod utils;

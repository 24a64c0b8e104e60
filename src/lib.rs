// src/lib.rs

//! MangaUpdates release monitor and Discord bot

pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

#[cfg(feature = "discord")]
pub mod discord;

#[cfg(feature = "keep-alive")]
pub mod keep_alive;

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod assistant;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;

pub use chat::{ChatService, PollPolicy, Turn};
pub use client::{ChatClient, ClientError};
pub use config::Config;
pub use error::{ChatError, Result};

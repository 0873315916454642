//! Inbound SMTP transaction handling.
//!
//! The [`smtp`] module holds the MAIL FROM executor together with the
//! session state, reply channel and sender filter contracts it drives.
//! Process-wide settings live in [`config`].

pub mod config;
pub mod logging;
pub mod smtp;

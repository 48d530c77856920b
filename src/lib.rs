//! Tray Alert: balloon alerts from a hidden Windows notification-area icon
//!
//! [`alert::send_alert`] loads an icon, creates a hidden message window,
//! adds a GUID-addressed tray icon to it and shows a balloon. All OS calls
//! go through [`shell::Shell`]; [`win32::Win32Shell`] is the real one.

pub mod alert;
pub mod config;
pub mod error;
pub mod guid;
pub mod icon;
pub mod notify_icon;
pub mod pump;
pub mod shell;
pub mod text;
pub mod window;

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
mod testing;

pub use alert::{ActiveAlert, AlertRequest, send_alert};
pub use config::AlertConfig;
pub use error::AlertError;
pub use shell::{IconSource, Shell};

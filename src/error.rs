//! Error types for tray-alert

use thiserror::Error;

use crate::guid::Guid;
use crate::shell::{IconSource, NotifyAction, WindowHandle};

/// Alert errors: terminal for the operation that raised them
/// `code` is the HRESULT derived from GetLastError
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("LoadImage({icon}) → not found (HRESULT {code:#010X})")]
    IconNotFound { icon: IconSource, code: u32 },

    #[error("RegisterClassEx(\"{class}\") failed (HRESULT {code:#010X})")]
    RegistrationFailed { class: String, code: u32 },

    #[error("CreateWindowEx(\"{class}\") failed (HRESULT {code:#010X})")]
    WindowCreationFailed { class: String, code: u32 },

    #[error("Shell_NotifyIcon({action}) → rejected")]
    ShellNotifyIcon { action: NotifyAction },

    #[error("NotifyIcon({window:?}) → window already owns tray icon {owner}")]
    WindowHasIcon { window: WindowHandle, owner: Guid },
}

//! OS boundary: handles, notify-icon request records and the [`Shell`] trait

use std::fmt;
use std::ops::BitOr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AlertError;
use crate::guid::Guid;
use crate::text::{INFO_LEN, INFO_TITLE_LEN, TIP_LEN};

/// Opaque handle of the hidden message window (HWND value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Opaque handle of a loaded icon (HICON value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub isize);

/// Where an icon is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// Icon resource compiled into the running executable
    Resource(u16),
    /// External `.ico` file
    File(PathBuf),
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconSource::Resource(id) => write!(f, "resource #{id}"),
            IconSource::File(path) => write!(f, "\"{}\"", path.display()),
        }
    }
}

/// All digits → resource id, anything else → file path
impl FromStr for IconSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty icon source".to_string());
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            s.parse::<u16>()
                .map(IconSource::Resource)
                .map_err(|e| format!("resource id {s}: {e}"))
        } else {
            Ok(IconSource::File(PathBuf::from(s)))
        }
    }
}

/// Window message as delivered to the window procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

/// Shell_NotifyIcon operation (NIM_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    Add,
    Modify,
    Delete,
}

impl NotifyAction {
    /// NIM_* value
    pub const fn code(self) -> u32 {
        match self {
            NotifyAction::Add => 0,
            NotifyAction::Modify => 1,
            NotifyAction::Delete => 2,
        }
    }
}

impl fmt::Display for NotifyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotifyAction::Add => "NIM_ADD",
            NotifyAction::Modify => "NIM_MODIFY",
            NotifyAction::Delete => "NIM_DELETE",
        })
    }
}

/// NIF_* flags: which request fields are valid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyFlags(u32);

impl NotifyFlags {
    pub const MESSAGE: Self = Self(0x0000_0001);
    pub const ICON: Self = Self(0x0000_0002);
    pub const TIP: Self = Self(0x0000_0004);
    pub const INFO: Self = Self(0x0000_0010);
    pub const GUID: Self = Self(0x0000_0020);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for NotifyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// NIIF_* balloon flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoFlags(u32);

impl InfoFlags {
    pub const NONE: Self = Self(0x0000_0000);
    pub const USER: Self = Self(0x0000_0004);
    pub const LARGE_ICON: Self = Self(0x0000_0020);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InfoFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One Shell_NotifyIcon request (mirrors NOTIFYICONDATAW)
///
/// Text fields are NUL-terminated UTF-16 with the Win32 field widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyIconData {
    pub window: WindowHandle,
    pub guid: Guid,
    pub flags: NotifyFlags,
    pub callback_message: u32,
    pub icon: Option<IconHandle>,
    pub tip: [u16; TIP_LEN],
    pub info: [u16; INFO_LEN],
    pub info_title: [u16; INFO_TITLE_LEN],
    pub info_flags: InfoFlags,
    pub balloon_icon: Option<IconHandle>,
}

impl NotifyIconData {
    /// Identity-only request: {window, guid} addressed by GUID
    pub fn new(window: WindowHandle, guid: Guid) -> Self {
        Self {
            window,
            guid,
            flags: NotifyFlags::GUID,
            callback_message: 0,
            icon: None,
            tip: [0; TIP_LEN],
            info: [0; INFO_LEN],
            info_title: [0; INFO_TITLE_LEN],
            info_flags: InfoFlags::NONE,
            balloon_icon: None,
        }
    }
}

/// Every shell and windowing call the crate makes
///
/// `win32::Win32Shell` talks to the OS; tests use a recording fake.
pub trait Shell {
    /// LoadImage with default size
    fn load_icon(&self, source: &IconSource) -> Result<IconHandle, AlertError>;

    fn destroy_icon(&self, icon: IconHandle);

    /// RegisterClassEx bound to the crate's window procedure
    /// "Already registered" counts as success
    fn register_class(&self, class_name: &str) -> Result<(), AlertError>;

    /// CreateWindowEx off-screen + ShowWindow
    fn create_window(&self, class_name: &str, title: &str) -> Result<WindowHandle, AlertError>;

    fn destroy_window(&self, window: WindowHandle);

    /// Shell_NotifyIcon, returns false if the shell rejected the request
    fn notify_icon(&self, action: NotifyAction, data: &NotifyIconData) -> bool;

    /// PostQuitMessage
    fn post_quit(&self, exit_code: i32);

    /// DefWindowProc
    fn default_window_proc(&self, window: WindowHandle, message: Message) -> isize;
}

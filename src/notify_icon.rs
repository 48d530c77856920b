//! Notify-icon lifecycle: add / modify / delete one tray entry addressed by GUID

use std::rc::Rc;
use tracing::{debug, info};

use crate::error::AlertError;
use crate::guid::Guid;
use crate::shell::{
    IconHandle, InfoFlags, NotifyAction, NotifyFlags, NotifyIconData, Shell, WindowHandle,
};
use crate::text::to_field;
use crate::window::{self, ClickHandler, WM_NOTIFY_ICON};

/// One active tray icon
/// Removed from the tray by `dispose` or on drop
pub struct NotifyIcon<'s, S: Shell> {
    shell: &'s S,
    window: WindowHandle,
    guid: Guid,
    active: bool,
}

impl<'s, S: Shell> NotifyIcon<'s, S> {
    /// Add a tray icon to `window` with the logging click handler
    pub fn new(shell: &'s S, window: WindowHandle) -> Result<Self, AlertError> {
        Self::with_click_handler(shell, window, Rc::new(log_click))
    }

    /// Add a tray icon to `window`; `on_click` runs on left-click
    /// A window carries at most one icon: clicks cannot be told apart otherwise
    pub fn with_click_handler(
        shell: &'s S,
        window: WindowHandle,
        on_click: ClickHandler,
    ) -> Result<Self, AlertError> {
        if let Some(owner) = window::click_handler_owner(window) {
            return Err(AlertError::WindowHasIcon { window, owner });
        }
        let guid = Guid::new_random();

        let mut data = NotifyIconData::new(window, guid);
        data.flags = data.flags | NotifyFlags::MESSAGE;
        data.callback_message = WM_NOTIFY_ICON;
        if !shell.notify_icon(NotifyAction::Add, &data) {
            return Err(AlertError::ShellNotifyIcon {
                action: NotifyAction::Add,
            });
        }

        window::set_click_handler(window, guid, on_click);
        info!(window = ?window, guid = %guid, "Tray icon added");

        Ok(Self {
            shell,
            window,
            guid,
            active: true,
        })
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Fresh request carrying only the identity
    fn data(&self) -> NotifyIconData {
        NotifyIconData::new(self.window, self.guid)
    }

    fn modify(&self, data: &NotifyIconData) -> Result<(), AlertError> {
        if self.shell.notify_icon(NotifyAction::Modify, data) {
            Ok(())
        } else {
            Err(AlertError::ShellNotifyIcon {
                action: NotifyAction::Modify,
            })
        }
    }

    /// Hover text, truncated to 127 UTF-16 units
    pub fn set_tooltip(&self, tooltip: &str) -> Result<(), AlertError> {
        let mut data = self.data();
        data.flags = data.flags | NotifyFlags::TIP;
        data.tip = to_field(tooltip);
        self.modify(&data)?;
        debug!(guid = %self.guid, tooltip, "Tooltip set");
        Ok(())
    }

    /// Tray image
    pub fn set_icon(&self, icon: IconHandle) -> Result<(), AlertError> {
        let mut data = self.data();
        data.flags = data.flags | NotifyFlags::ICON;
        data.icon = Some(icon);
        self.modify(&data)?;
        debug!(guid = %self.guid, icon = ?icon, "Icon set");
        Ok(())
    }

    fn info_data(&self, title: &str, text: &str) -> NotifyIconData {
        let mut data = self.data();
        data.flags = data.flags | NotifyFlags::INFO;
        data.info_title = to_field(title);
        data.info = to_field(text);
        data
    }

    /// Balloon with title (≤63 units) and body (≤255 units)
    pub fn show_notification(&self, title: &str, text: &str) -> Result<(), AlertError> {
        self.modify(&self.info_data(title, text))?;
        info!(guid = %self.guid, title, "Notification shown");
        Ok(())
    }

    /// Balloon rendered with `icon` at large size
    pub fn show_notification_with_icon(
        &self,
        title: &str,
        text: &str,
        icon: IconHandle,
    ) -> Result<(), AlertError> {
        let mut data = self.info_data(title, text);
        data.info_flags = InfoFlags::USER | InfoFlags::LARGE_ICON;
        data.balloon_icon = Some(icon);
        self.modify(&data)?;
        info!(guid = %self.guid, title, icon = ?icon, "Notification shown");
        Ok(())
    }

    /// Remove the tray entry
    pub fn dispose(mut self) {
        self.release();
    }

    /// Dispose in place; later calls and the drop are no-ops
    pub(crate) fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        window::clear_click_handler(self.window, self.guid);

        // Already-removed entry: shell no-ops, not an error
        if self.shell.notify_icon(NotifyAction::Delete, &self.data()) {
            info!(guid = %self.guid, "Tray icon removed");
        } else {
            debug!(guid = %self.guid, "Tray icon already absent");
        }
    }
}

impl<S: Shell> Drop for NotifyIcon<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn log_click(window: WindowHandle) {
    info!(window = ?window, "User has clicked the notify icon");
}

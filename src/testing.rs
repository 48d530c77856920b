//! Recording fake of [`Shell`] for unit tests

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::error::AlertError;
use crate::guid::Guid;
use crate::shell::{
    IconHandle, IconSource, Message, NotifyAction, NotifyIconData, Shell, WindowHandle,
};

/// One recorded shell call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    LoadIcon(IconSource),
    DestroyIcon(IconHandle),
    RegisterClass(String),
    CreateWindow { class: String, title: String },
    DestroyWindow(WindowHandle),
    NotifyIcon(NotifyAction, Box<NotifyIconData>),
    PostQuit(i32),
    DefaultWindowProc(WindowHandle, Message),
}

/// Fake shell: records calls and keeps a model of the tray
#[derive(Debug, Default)]
pub struct RecordingShell {
    pub(crate) calls: RefCell<Vec<Call>>,
    pub(crate) tray: RefCell<HashSet<(WindowHandle, Guid)>>,
    pub(crate) next_handle: Cell<isize>,
    /// Resource ids that LoadImage reports missing
    pub missing_resources: Vec<u16>,
    pub fail_register: bool,
    pub fail_create: bool,
    /// Shell_NotifyIcon operation to reject
    pub reject: Option<NotifyAction>,
    /// DefWindowProc result
    pub default_result: isize,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Notify-icon requests only
    pub fn notify_calls(&self) -> Vec<(NotifyAction, NotifyIconData)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::NotifyIcon(action, data) => Some((*action, (**data).clone())),
                _ => None,
            })
            .collect()
    }

    /// Tray entries currently added and not deleted
    pub fn active_tray_icons(&self) -> usize {
        self.tray.borrow().len()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_handle(&self) -> isize {
        let handle = self.next_handle.get() + 0x100;
        self.next_handle.set(handle);
        handle
    }
}

impl Shell for RecordingShell {
    fn load_icon(&self, source: &IconSource) -> Result<IconHandle, AlertError> {
        self.record(Call::LoadIcon(source.clone()));
        match source {
            IconSource::Resource(id) if self.missing_resources.contains(id) => {
                Err(AlertError::IconNotFound {
                    icon: source.clone(),
                    code: 0x8007_0716,
                })
            }
            IconSource::File(path) if !path.extension().is_some_and(|e| e == "ico") => {
                Err(AlertError::IconNotFound {
                    icon: source.clone(),
                    code: 0x8007_0002,
                })
            }
            _ => Ok(IconHandle(self.next_handle())),
        }
    }

    fn destroy_icon(&self, icon: IconHandle) {
        self.record(Call::DestroyIcon(icon));
    }

    fn register_class(&self, class_name: &str) -> Result<(), AlertError> {
        self.record(Call::RegisterClass(class_name.to_string()));
        if self.fail_register {
            return Err(AlertError::RegistrationFailed {
                class: class_name.to_string(),
                code: 0x8007_0057,
            });
        }
        Ok(())
    }

    fn create_window(&self, class_name: &str, title: &str) -> Result<WindowHandle, AlertError> {
        self.record(Call::CreateWindow {
            class: class_name.to_string(),
            title: title.to_string(),
        });
        if self.fail_create {
            return Err(AlertError::WindowCreationFailed {
                class: class_name.to_string(),
                code: 0x8007_0008,
            });
        }
        Ok(WindowHandle(self.next_handle()))
    }

    fn destroy_window(&self, window: WindowHandle) {
        self.record(Call::DestroyWindow(window));
    }

    fn notify_icon(&self, action: NotifyAction, data: &NotifyIconData) -> bool {
        self.record(Call::NotifyIcon(action, Box::new(data.clone())));
        if self.reject == Some(action) {
            return false;
        }
        let key = (data.window, data.guid);
        let mut tray = self.tray.borrow_mut();
        match action {
            NotifyAction::Add => tray.insert(key),
            NotifyAction::Modify => tray.contains(&key),
            NotifyAction::Delete => tray.remove(&key),
        }
    }

    fn post_quit(&self, exit_code: i32) {
        self.record(Call::PostQuit(exit_code));
    }

    fn default_window_proc(&self, window: WindowHandle, message: Message) -> isize {
        self.record(Call::DefaultWindowProc(window, message));
        self.default_result
    }
}

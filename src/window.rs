//! Hidden message window: creation, click-handler registry, message routing

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, info};

use crate::error::AlertError;
use crate::guid::Guid;
use crate::shell::{Message, Shell, WindowHandle};

// Win32 message ids (kept here so routing builds off Windows too)
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_USER: u32 = 0x0400;
pub const WM_APP: u32 = 0x8000;
pub const NIN_BALLOONUSERCLICK: u32 = WM_USER + 5;

/// Callback message the tray icon sends to its window
pub const WM_NOTIFY_ICON: u32 = WM_APP + 1;

/// Invoked with the window whose tray icon was left-clicked
pub type ClickHandler = Rc<dyn Fn(WindowHandle)>;

thread_local! {
    /// Window → (owning icon GUID, click handler), one tray icon per window
    static CLICK_HANDLERS: RefCell<HashMap<WindowHandle, (Guid, ClickHandler)>> =
        RefCell::new(HashMap::new());

    /// Handles that saw WM_DESTROY, until their HiddenWindow consumes the mark
    static DESTROYED: RefCell<HashSet<WindowHandle>> = RefCell::new(HashSet::new());
}

/// Associate `owner`'s click handler with a window
/// Returns false (registry unchanged) if another icon already owns the window
pub fn set_click_handler(window: WindowHandle, owner: Guid, handler: ClickHandler) -> bool {
    CLICK_HANDLERS.with(|handlers| match handlers.borrow_mut().entry(window) {
        Entry::Occupied(entry) if entry.get().0 != owner => false,
        Entry::Occupied(mut entry) => {
            entry.insert((owner, handler));
            true
        }
        Entry::Vacant(entry) => {
            entry.insert((owner, handler));
            true
        }
    })
}

/// Remove the window's handler if `owner` registered it
pub fn clear_click_handler(window: WindowHandle, owner: Guid) {
    CLICK_HANDLERS.with(|handlers| {
        let mut handlers = handlers.borrow_mut();
        if handlers.get(&window).is_some_and(|(guid, _)| *guid == owner) {
            handlers.remove(&window);
        }
    });
}

pub fn has_click_handler(window: WindowHandle) -> bool {
    CLICK_HANDLERS.with(|handlers| handlers.borrow().contains_key(&window))
}

/// GUID of the icon whose handler is registered for `window`
pub fn click_handler_owner(window: WindowHandle) -> Option<Guid> {
    CLICK_HANDLERS.with(|handlers| handlers.borrow().get(&window).map(|(guid, _)| *guid))
}

fn click_handler(window: WindowHandle) -> Option<ClickHandler> {
    CLICK_HANDLERS.with(|handlers| {
        handlers
            .borrow()
            .get(&window)
            .map(|(_, handler)| Rc::clone(handler))
    })
}

fn mark_destroyed(window: WindowHandle) {
    DESTROYED.with(|destroyed| {
        destroyed.borrow_mut().insert(window);
    });
}

/// Forget the mark; true if the window had been destroyed
fn take_destroyed(window: WindowHandle) -> bool {
    DESTROYED.with(|destroyed| destroyed.borrow_mut().remove(&window))
}

/// LOWORD of lParam: notify-icon sub-event
fn sub_event(lparam: isize) -> u32 {
    (lparam as usize & 0xFFFF) as u32
}

/// Route one window message
/// Handled messages return 0; the rest return DefWindowProc's result
pub fn dispatch<S: Shell>(shell: &S, window: WindowHandle, message: Message) -> isize {
    match message.id {
        WM_NOTIFY_ICON => {
            match sub_event(message.lparam) {
                NIN_BALLOONUSERCLICK => info!("User has clicked the balloon message"),
                WM_LBUTTONDOWN => match click_handler(window) {
                    // Registry borrow released before the handler runs
                    Some(handler) => handler(window),
                    None => debug!(window = ?window, "Icon clicked, no handler"),
                },
                _ => {}
            }
            0
        }
        WM_DESTROY => {
            mark_destroyed(window);
            shell.post_quit(0);
            0
        }
        _ => shell.default_window_proc(window, message),
    }
}

/// Register the hidden window's class (idempotent)
pub fn register_class<S: Shell>(shell: &S, class_name: &str) -> Result<(), AlertError> {
    shell.register_class(class_name)?;
    debug!(class = class_name, "Window class registered");
    Ok(())
}

/// Invisible top-level window used as a message target
/// Destroyed on drop
pub struct HiddenWindow<'s, S: Shell> {
    shell: &'s S,
    handle: WindowHandle,
    destroyed: bool,
}

impl<'s, S: Shell> HiddenWindow<'s, S> {
    /// Register class + create window
    pub fn create(shell: &'s S, class_name: &str, title: &str) -> Result<Self, AlertError> {
        register_class(shell, class_name)?;
        let handle = shell.create_window(class_name, title)?;
        // Handle values are reused; a stale mark must not cover the new window
        take_destroyed(handle);
        info!(window = ?handle, class = class_name, "Hidden window created");
        Ok(Self {
            shell,
            handle,
            destroyed: false,
        })
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// True once destroyed by us or by the system (WM_DESTROY seen)
    pub fn is_destroyed(&self) -> bool {
        self.destroyed || DESTROYED.with(|destroyed| destroyed.borrow().contains(&self.handle))
    }

    /// DestroyWindow unless already gone; later calls are no-ops
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if take_destroyed(self.handle) {
            debug!(window = ?self.handle, "Hidden window already destroyed by the system");
            return;
        }
        self.shell.destroy_window(self.handle);
        // Our own DestroyWindow delivered WM_DESTROY and marked it
        take_destroyed(self.handle);
        debug!(window = ?self.handle, "Hidden window destroyed");
    }
}

impl<S: Shell> Drop for HiddenWindow<'_, S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

//! Win32 implementation of [`Shell`]

use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;
use tracing::debug;
use windows::Win32::Foundation::{
    ERROR_CLASS_ALREADY_EXISTS, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM,
};
use windows::Win32::Graphics::Gdi::{COLOR_WINDOW, HBRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    NIM_ADD, NIM_DELETE, NIM_MODIFY, NOTIFY_ICON_DATA_FLAGS, NOTIFY_ICON_INFOTIP_FLAGS,
    NOTIFY_ICON_MESSAGE, NOTIFYICONDATAW, Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW, CS_VREDRAW, CreateWindowExW, DefWindowProcW, DestroyIcon, DestroyWindow, HICON,
    IDC_ARROW, IMAGE_ICON, LR_DEFAULTSIZE, LR_LOADFROMFILE, LoadCursorW, LoadImageW,
    PostQuitMessage, RegisterClassExW, SW_SHOW, ShowWindow, WINDOW_EX_STYLE, WNDCLASSEXW,
    WS_THICKFRAME,
};
use windows::core::{GUID, PCWSTR};

use crate::error::AlertError;
use crate::shell::{
    IconHandle, IconSource, Message, NotifyAction, NotifyIconData, Shell, WindowHandle,
};
use crate::text::to_wide;
use crate::window;

/// Shell backed by user32/shell32
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Shell;

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn hicon(icon: IconHandle) -> HICON {
    HICON(icon.0 as *mut c_void)
}

/// GetLastError as HRESULT bits
fn last_error_code() -> u32 {
    unsafe { GetLastError() }.to_hresult().0 as u32
}

fn module_instance() -> windows::core::Result<HINSTANCE> {
    unsafe { GetModuleHandleW(None) }.map(HINSTANCE::from)
}

fn to_native(action: NotifyAction) -> NOTIFY_ICON_MESSAGE {
    match action {
        NotifyAction::Add => NIM_ADD,
        NotifyAction::Modify => NIM_MODIFY,
        NotifyAction::Delete => NIM_DELETE,
    }
}

/// Window procedure for every window of our class
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = Message {
        id: msg,
        wparam: wparam.0,
        lparam: lparam.0,
    };
    LRESULT(window::dispatch(
        &Win32Shell,
        WindowHandle(hwnd.0 as isize),
        message,
    ))
}

impl Shell for Win32Shell {
    fn load_icon(&self, source: &IconSource) -> Result<IconHandle, AlertError> {
        let not_found = |code: u32| AlertError::IconNotFound {
            icon: source.clone(),
            code,
        };

        let loaded = match source {
            IconSource::Resource(id) => {
                let instance = module_instance().map_err(|e| not_found(e.code().0 as u32))?;
                // MAKEINTRESOURCE
                let name = PCWSTR(usize::from(*id) as *const u16);
                unsafe { LoadImageW(Some(instance), name, IMAGE_ICON, 0, 0, LR_DEFAULTSIZE) }
            }
            IconSource::File(path) => {
                let wide: Vec<u16> = path.as_os_str().encode_wide().chain(Some(0)).collect();
                unsafe {
                    LoadImageW(
                        None,
                        PCWSTR(wide.as_ptr()),
                        IMAGE_ICON,
                        0,
                        0,
                        LR_DEFAULTSIZE | LR_LOADFROMFILE,
                    )
                }
            }
        };

        loaded
            .map(|handle| IconHandle(handle.0 as isize))
            .map_err(|e| not_found(e.code().0 as u32))
    }

    fn destroy_icon(&self, icon: IconHandle) {
        if let Err(e) = unsafe { DestroyIcon(hicon(icon)) } {
            debug!("DestroyIcon failed: {e}");
        }
    }

    fn register_class(&self, class_name: &str) -> Result<(), AlertError> {
        let failed = |code: u32| AlertError::RegistrationFailed {
            class: class_name.to_string(),
            code,
        };

        let instance = module_instance().map_err(|e| failed(e.code().0 as u32))?;
        let class = to_wide(class_name);

        let wcex = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: instance,
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as usize as *mut c_void),
            lpszClassName: PCWSTR(class.as_ptr()),
            ..Default::default()
        };

        if unsafe { RegisterClassExW(&wcex) } == 0 {
            let err = unsafe { GetLastError() };
            if err == ERROR_CLASS_ALREADY_EXISTS {
                debug!(class = class_name, "Window class already registered");
                return Ok(());
            }
            return Err(failed(err.to_hresult().0 as u32));
        }
        Ok(())
    }

    fn create_window(&self, class_name: &str, title: &str) -> Result<WindowHandle, AlertError> {
        let failed = |code: u32| AlertError::WindowCreationFailed {
            class: class_name.to_string(),
            code,
        };

        let instance = module_instance().map_err(|e| failed(e.code().0 as u32))?;
        let class = to_wide(class_name);
        let title = to_wide(title);

        // Off-screen, zero-sized: only a message target
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class.as_ptr()),
                PCWSTR(title.as_ptr()),
                WS_THICKFRAME,
                -100,
                -100,
                0,
                0,
                None,
                None,
                Some(instance),
                None,
            )
        }
        .map_err(|e| failed(e.code().0 as u32))?;

        let _ = unsafe { ShowWindow(hwnd, SW_SHOW) };
        Ok(WindowHandle(hwnd.0 as isize))
    }

    fn destroy_window(&self, window: WindowHandle) {
        // Fails if the OS already destroyed it (WM_CLOSE → DefWindowProc)
        if let Err(e) = unsafe { DestroyWindow(hwnd(window)) } {
            debug!("DestroyWindow failed: {e}");
        }
    }

    fn notify_icon(&self, action: NotifyAction, data: &NotifyIconData) -> bool {
        let nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: hwnd(data.window),
            uFlags: NOTIFY_ICON_DATA_FLAGS(data.flags.bits()),
            uCallbackMessage: data.callback_message,
            hIcon: data.icon.map(hicon).unwrap_or_default(),
            szTip: data.tip,
            szInfo: data.info,
            szInfoTitle: data.info_title,
            dwInfoFlags: NOTIFY_ICON_INFOTIP_FLAGS(data.info_flags.bits()),
            guidItem: GUID::from_u128(data.guid.to_u128()),
            hBalloonIcon: data.balloon_icon.map(hicon).unwrap_or_default(),
            ..Default::default()
        };
        unsafe { Shell_NotifyIconW(to_native(action), &nid) }.as_bool()
    }

    fn post_quit(&self, exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) };
    }

    fn default_window_proc(&self, window: WindowHandle, message: Message) -> isize {
        unsafe {
            DefWindowProcW(
                hwnd(window),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        }
        .0
    }
}

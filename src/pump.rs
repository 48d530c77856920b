//! Linger loop: pump the alert window's messages, then release the alert
//!
//! The console control handler runs on its own thread. It raises
//! [`SHUTDOWN_REQUESTED`]; on console close it then holds the process open
//! until the main thread reports [`ALERT_RELEASED`], so the tray entry is
//! deleted before Windows terminates us.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Shutdown requested via signal (Ctrl-C, console close, etc.)
pub static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Tray entry, window and icon are gone
pub static ALERT_RELEASED: AtomicBool = AtomicBool::new(false);

/// Windows kills the process 5s after CTRL_CLOSE_EVENT
pub const CLOSE_GRACE: Duration = Duration::from_millis(4500);

/// Upper bound for collecting the WM_QUIT our own DestroyWindow posts
pub const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Why the message loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// WM_QUIT with its exit code
    Quit(i32),
    Shutdown,
    Deadline,
}

pub fn mark_released() {
    ALERT_RELEASED.store(true, Ordering::SeqCst);
}

/// Poll `flag` every 10ms until set or `timeout` elapses; returns the flag
pub fn wait_for(flag: &AtomicBool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !flag.load(Ordering::SeqCst) {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
    true
}

/// Console-close path: raise `shutdown`, then hold until `released`
/// Returns false if the grace period ran out first
pub fn shutdown_and_wait(shutdown: &AtomicBool, released: &AtomicBool, grace: Duration) -> bool {
    shutdown.store(true, Ordering::SeqCst);
    wait_for(released, grace)
}

#[cfg(windows)]
pub use self::native::{ctrl_handler, linger, run_message_loop};

#[cfg(windows)]
mod native {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};
    use tracing::{debug, info, warn};
    use windows::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT, CTRL_CLOSE_EVENT};
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, MSG, MWMO_INPUTAVAILABLE, MsgWaitForMultipleObjectsEx, PM_REMOVE,
        PeekMessageW, QS_ALLINPUT, TranslateMessage, WM_QUIT,
    };
    use windows::core::BOOL;

    use super::{
        ALERT_RELEASED, CLOSE_GRACE, DRAIN_TIMEOUT, LoopExit, SHUTDOWN_REQUESTED, mark_released,
        shutdown_and_wait,
    };
    use crate::alert::ActiveAlert;
    use crate::win32::Win32Shell;

    /// Console control handler: signal shutdown via atomic flag
    pub unsafe extern "system" fn ctrl_handler(ctrl_type: u32) -> BOOL {
        match ctrl_type {
            x if x == CTRL_C_EVENT || x == CTRL_BREAK_EVENT => {
                // Signal main loop to exit gracefully
                SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
                BOOL(1)
            }
            x if x == CTRL_CLOSE_EVENT => {
                // Terminal closing - process terminates after handler returns
                // Keep it alive until the tray icon is deleted
                if !shutdown_and_wait(&SHUTDOWN_REQUESTED, &ALERT_RELEASED, CLOSE_GRACE) {
                    warn!("Console closing before the alert was released");
                }
                BOOL(1)
            }
            _ => BOOL(0),
        }
    }

    /// Pump this thread's messages until WM_QUIT, `shutdown` or `deadline`
    pub fn run_message_loop(shutdown: &AtomicBool, deadline: Instant) -> LoopExit {
        let mut msg = MSG::default();

        loop {
            // Check shutdown flag (set by ctrl_handler)
            if shutdown.load(Ordering::SeqCst) {
                info!("Shutdown requested");
                return LoopExit::Shutdown;
            }
            let now = Instant::now();
            if now >= deadline {
                return LoopExit::Deadline;
            }

            // Wait for message OR 16ms timeout
            let wait_ms = (deadline - now).as_millis().min(16) as u32;
            unsafe {
                MsgWaitForMultipleObjectsEx(None, wait_ms, QS_ALLINPUT, MWMO_INPUTAVAILABLE);
            }

            while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
                if msg.message == WM_QUIT {
                    return LoopExit::Quit(msg.wParam.0 as i32);
                }
                unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }
    }

    /// Keep `alert` up for `duration`, then release it
    ///
    /// After the loop ends the tray entry is deleted and the window destroyed;
    /// the WM_QUIT that destroy posts is drained before the icon is freed.
    /// Raises [`ALERT_RELEASED`] last.
    pub fn linger(mut alert: ActiveAlert<'_, Win32Shell>, duration: Duration) -> LoopExit {
        let exit = run_message_loop(&SHUTDOWN_REQUESTED, Instant::now() + duration);
        debug!(?exit, "Message loop ended");

        let window_alive = !alert.window().is_destroyed();
        alert.close();
        if window_alive {
            let never = AtomicBool::new(false);
            match run_message_loop(&never, Instant::now() + DRAIN_TIMEOUT) {
                LoopExit::Quit(_) => debug!("Destroy drained"),
                other => warn!(?other, "No WM_QUIT after destroying the window"),
            }
        }

        drop(alert);
        mark_released();
        exit
    }
}

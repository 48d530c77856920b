//! Alert sender: icon → hidden window → tray icon → tooltip → balloon

use tracing::{info, warn};

use crate::config::AlertConfig;
use crate::error::AlertError;
use crate::icon::{self, Icon};
use crate::notify_icon::NotifyIcon;
use crate::shell::{IconSource, Shell};
use crate::window::HiddenWindow;

/// One alert to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    /// Tooltip text
    pub title: String,
    /// Balloon body
    pub message: String,
    pub icon: IconSource,
}

impl AlertRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>, icon: IconSource) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            icon,
        }
    }
}

/// Resources of a shown alert
/// Field order = drop order: tray entry, then window, then icon
pub struct ActiveAlert<'s, S: Shell> {
    notify_icon: NotifyIcon<'s, S>,
    window: HiddenWindow<'s, S>,
    icon: Icon<'s, S>,
}

impl<'s, S: Shell> ActiveAlert<'s, S> {
    pub fn notify_icon(&self) -> &NotifyIcon<'s, S> {
        &self.notify_icon
    }

    pub fn window(&self) -> &HiddenWindow<'s, S> {
        &self.window
    }

    pub fn icon(&self) -> &Icon<'s, S> {
        &self.icon
    }

    /// Delete the tray entry, then destroy the window
    /// The icon is freed on drop
    pub fn close(&mut self) {
        self.notify_icon.release();
        self.window.destroy();
    }
}

/// Show one alert
///
/// Icon, window and tray-icon failures abort with the error before anything
/// later in the sequence is requested. Tooltip and balloon failures are
/// logged and the alert stays up.
pub fn send_alert<'s, S: Shell>(
    shell: &'s S,
    request: &AlertRequest,
    config: &AlertConfig,
) -> Result<ActiveAlert<'s, S>, AlertError> {
    let icon = icon::load(shell, &request.icon)?;
    let window = HiddenWindow::create(shell, &config.class_name, &config.window_title)?;
    let notify_icon = NotifyIcon::new(shell, window.handle())?;

    if config.show_tray_icon
        && let Err(e) = notify_icon.set_icon(icon.handle())
    {
        warn!("Set tray icon failed: {e}");
    }

    if let Err(e) = notify_icon.set_tooltip(&request.title) {
        warn!("Set tooltip failed: {e}");
    }

    if let Err(e) =
        notify_icon.show_notification_with_icon(&config.balloon_title, &request.message, icon.handle())
    {
        warn!("Show notification failed: {e}");
    }

    info!(title = %request.title, icon = %request.icon, "Alert sent");

    Ok(ActiveAlert {
        notify_icon,
        window,
        icon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{InfoFlags, NotifyAction, NotifyFlags};
    use crate::testing::{Call, RecordingShell};
    use crate::text::from_field;

    fn build_request() -> AlertRequest {
        AlertRequest::new("Build", "Compilation finished", IconSource::Resource(42))
    }

    #[test]
    fn test_build_scenario() {
        let shell = RecordingShell::new();
        let alert = send_alert(&shell, &build_request(), &AlertConfig::default())
            .expect("send failed");

        let calls = shell.notify_calls();
        assert_eq!(calls.len(), 3);

        let (action, add) = &calls[0];
        assert_eq!(*action, NotifyAction::Add);
        assert_eq!(add.window, alert.window().handle());

        let (action, tip) = &calls[1];
        assert_eq!(*action, NotifyAction::Modify);
        assert!(tip.flags.contains(NotifyFlags::TIP));
        assert_eq!(from_field(&tip.tip), "Build");

        let (action, balloon) = &calls[2];
        assert_eq!(*action, NotifyAction::Modify);
        assert!(balloon.flags.contains(NotifyFlags::INFO));
        assert_eq!(from_field(&balloon.info_title), "QR");
        assert_eq!(from_field(&balloon.info), "Compilation finished");
        assert_eq!(balloon.info_flags, InfoFlags::USER | InfoFlags::LARGE_ICON);
        assert_eq!(balloon.balloon_icon, Some(alert.icon().handle()));
    }

    #[test]
    fn test_one_icon_during_zero_after() {
        let shell = RecordingShell::new();
        {
            let _alert = send_alert(&shell, &build_request(), &AlertConfig::default())
                .expect("send failed");
            assert_eq!(shell.active_tray_icons(), 1);
        }
        assert_eq!(shell.active_tray_icons(), 0);
    }

    #[test]
    fn test_release_order() {
        let shell = RecordingShell::new();
        let alert = send_alert(&shell, &build_request(), &AlertConfig::default())
            .expect("send failed");
        let window = alert.window().handle();
        let icon = alert.icon().handle();
        drop(alert);

        let calls = shell.calls();
        let tail = &calls[calls.len() - 3..];
        assert!(matches!(tail[0], Call::NotifyIcon(NotifyAction::Delete, _)));
        assert_eq!(tail[1], Call::DestroyWindow(window));
        assert_eq!(tail[2], Call::DestroyIcon(icon));
    }

    #[test]
    fn test_missing_icon_aborts_before_window() {
        let shell = RecordingShell {
            missing_resources: vec![42],
            ..RecordingShell::new()
        };
        let result = send_alert(&shell, &build_request(), &AlertConfig::default());

        assert!(matches!(result, Err(AlertError::IconNotFound { .. })));
        assert_eq!(shell.calls(), vec![Call::LoadIcon(IconSource::Resource(42))]);
        assert_eq!(shell.active_tray_icons(), 0);
    }

    #[test]
    fn test_window_failure_aborts_before_tray() {
        let shell = RecordingShell {
            fail_create: true,
            ..RecordingShell::new()
        };
        let result = send_alert(&shell, &build_request(), &AlertConfig::default());

        assert!(matches!(result, Err(AlertError::WindowCreationFailed { .. })));
        assert!(shell.notify_calls().is_empty());
    }

    #[test]
    fn test_tray_failure_aborts() {
        let shell = RecordingShell {
            reject: Some(NotifyAction::Add),
            ..RecordingShell::new()
        };
        let result = send_alert(&shell, &build_request(), &AlertConfig::default());

        assert!(matches!(
            result,
            Err(AlertError::ShellNotifyIcon {
                action: NotifyAction::Add
            })
        ));
        assert_eq!(shell.notify_calls().len(), 1);
    }

    #[test]
    fn test_balloon_failure_not_fatal() {
        let shell = RecordingShell {
            reject: Some(NotifyAction::Modify),
            ..RecordingShell::new()
        };
        let alert = send_alert(&shell, &build_request(), &AlertConfig::default());
        assert!(alert.is_ok());
    }

    #[test]
    fn test_configured_title_and_tray_icon() {
        let shell = RecordingShell::new();
        let config = AlertConfig {
            balloon_title: "Alerts".to_string(),
            show_tray_icon: true,
            ..AlertConfig::default()
        };
        let alert = send_alert(&shell, &build_request(), &config).expect("send failed");

        let calls = shell.notify_calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[1].1.flags.contains(NotifyFlags::ICON));
        assert_eq!(calls[1].1.icon, Some(alert.icon().handle()));
        assert_eq!(from_field(&calls[3].1.info_title), "Alerts");
    }

    #[test]
    fn test_window_uses_configured_class() {
        let shell = RecordingShell::new();
        let _alert = send_alert(&shell, &build_request(), &AlertConfig::default())
            .expect("send failed");
        assert!(shell
            .calls()
            .contains(&Call::RegisterClass("TrayAlertWindow".to_string())));
    }

    #[test]
    fn test_close_releases_tray_then_window() {
        let shell = RecordingShell::new();
        let mut alert = send_alert(&shell, &build_request(), &AlertConfig::default())
            .expect("send failed");
        let window = alert.window().handle();
        let icon = alert.icon().handle();

        alert.close();
        let calls = shell.calls();
        let tail = &calls[calls.len() - 2..];
        assert!(matches!(tail[0], Call::NotifyIcon(NotifyAction::Delete, _)));
        assert_eq!(tail[1], Call::DestroyWindow(window));
        assert_eq!(shell.active_tray_icons(), 0);
        assert!(alert.window().is_destroyed());

        // Drop only frees the icon
        let before = shell.calls().len();
        drop(alert);
        assert_eq!(shell.calls()[before..], [Call::DestroyIcon(icon)]);
    }
}

use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tray_alert::config::ConfigUpdate;
use tray_alert::{AlertConfig, AlertRequest, IconSource};

const CONFIG_FLAGS: [&str; 4] = [
    "set_balloon_title",
    "set_linger",
    "set_show_tray_icon",
    "reset_config",
];

#[derive(Parser)]
#[command(about, version, name = env!("CARGO_BIN_NAME"))]
struct Args {
    /// Tooltip text of the tray icon
    #[arg(required_unless_present_any = CONFIG_FLAGS, requires = "message")]
    title: Option<String>,

    /// Balloon body
    #[arg(required_unless_present_any = CONFIG_FLAGS)]
    message: Option<String>,

    /// Icon resource id (digits) or .ico file path
    #[arg(short, long, default_value = "1")]
    icon: IconSource,

    /// Seconds to keep the alert up (0 = remove immediately)
    #[arg(short, long)]
    linger: Option<u64>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Save the balloon title shown on every alert
    #[arg(long, value_name = "TITLE")]
    set_balloon_title: Option<String>,

    /// Save the default linger in seconds
    #[arg(long, value_name = "SECS")]
    set_linger: Option<u64>,

    /// Save whether the tray shows the icon image
    #[arg(long, value_name = "BOOL")]
    set_show_tray_icon: Option<bool>,

    /// Remove all saved settings (applied before any --set-*)
    #[arg(long)]
    reset_config: bool,
}

impl Args {
    fn config_update(&self) -> ConfigUpdate {
        ConfigUpdate {
            reset: self.reset_config,
            balloon_title: self.set_balloon_title.clone(),
            linger: self.set_linger.map(Duration::from_secs),
            show_tray_icon: self.set_show_tray_icon,
        }
    }
}

/// RUST_LOG if set, otherwise `info` (`debug` with --verbose)
fn log_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose))
        .init();

    let update = args.config_update();
    if !update.is_empty() {
        store_config(&update)?;
        info!(?update, "Settings saved");
    }

    let (Some(title), Some(message)) = (args.title, args.message) else {
        return Ok(());
    };

    let mut config = AlertConfig::load();
    if let Some(secs) = args.linger {
        config.linger = Duration::from_secs(secs);
    }

    let request = AlertRequest::new(title, message, args.icon);
    info!(icon = %request.icon, linger = ?config.linger, "Sending alert");

    run(&request, &config)
}

#[cfg(windows)]
fn store_config(update: &ConfigUpdate) -> anyhow::Result<()> {
    tray_alert::config::store(update).map_err(|e| anyhow::anyhow!("Save settings: {e}"))
}

#[cfg(not(windows))]
fn store_config(_update: &ConfigUpdate) -> anyhow::Result<()> {
    anyhow::bail!("settings live in the Windows registry")
}

#[cfg(windows)]
fn run(request: &AlertRequest, config: &AlertConfig) -> anyhow::Result<()> {
    use tray_alert::pump;
    use tray_alert::win32::Win32Shell;
    use windows::Win32::System::Console::SetConsoleCtrlHandler;

    // Install before the icon exists so a console close always waits for it
    unsafe { SetConsoleCtrlHandler(Some(pump::ctrl_handler), true) }
        .map_err(|e| anyhow::anyhow!("SetConsoleCtrlHandler: {e}"))?;

    let shell = Win32Shell;
    // Any failure here is fatal: main returns the error, process exits non-zero
    let alert = tray_alert::send_alert(&shell, request, config)
        .inspect_err(|_| pump::mark_released())
        .map_err(|e| anyhow::anyhow!("send_alert: {e}"))?;

    let exit = pump::linger(alert, config.linger);
    info!(?exit, "Alert removed");
    Ok(())
}

#[cfg(not(windows))]
fn run(request: &AlertRequest, _config: &AlertConfig) -> anyhow::Result<()> {
    anyhow::bail!("cannot show \"{}\": tray alerts need Windows", request.title)
}

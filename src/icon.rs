//! Icon loading: embedded resource or external .ico file

use std::path::Path;
use tracing::debug;

use crate::error::AlertError;
use crate::shell::{IconHandle, IconSource, Shell};

/// Loaded icon, destroyed on drop
pub struct Icon<'s, S: Shell> {
    shell: &'s S,
    handle: IconHandle,
    source: IconSource,
}

impl<'s, S: Shell> Icon<'s, S> {
    pub fn handle(&self) -> IconHandle {
        self.handle
    }

    pub fn source(&self) -> &IconSource {
        &self.source
    }
}

impl<S: Shell> Drop for Icon<'_, S> {
    fn drop(&mut self) {
        self.shell.destroy_icon(self.handle);
        debug!(source = %self.source, "Icon destroyed");
    }
}

/// Load icon at default size
pub fn load<'s, S: Shell>(shell: &'s S, source: &IconSource) -> Result<Icon<'s, S>, AlertError> {
    let handle = shell.load_icon(source)?;
    debug!(source = %source, handle = ?handle, "Icon loaded");
    Ok(Icon {
        shell,
        handle,
        source: source.clone(),
    })
}

/// Load icon compiled into the executable
pub fn load_from_resource<S: Shell>(shell: &S, id: u16) -> Result<Icon<'_, S>, AlertError> {
    load(shell, &IconSource::Resource(id))
}

/// Load icon from an .ico file
pub fn load_from_file<'s, S: Shell>(
    shell: &'s S,
    path: impl AsRef<Path>,
) -> Result<Icon<'s, S>, AlertError> {
    load(shell, &IconSource::File(path.as_ref().to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingShell};
    use std::path::PathBuf;

    #[test]
    fn test_load_from_resource() {
        let shell = RecordingShell::new();
        let icon = load_from_resource(&shell, 42).expect("load failed");
        assert_eq!(icon.source(), &IconSource::Resource(42));
        assert_eq!(shell.calls(), vec![Call::LoadIcon(IconSource::Resource(42))]);
    }

    #[test]
    fn test_missing_resource_is_icon_not_found() {
        let shell = RecordingShell {
            missing_resources: vec![7],
            ..RecordingShell::new()
        };
        let err = load_from_resource(&shell, 7).err().expect("expected failure");
        assert!(matches!(
            err,
            AlertError::IconNotFound {
                icon: IconSource::Resource(7),
                ..
            }
        ));
    }

    #[test]
    fn test_unreadable_file_is_icon_not_found() {
        let shell = RecordingShell::new();
        let err = load_from_file(&shell, "missing.txt").err().expect("expected failure");
        assert!(matches!(err, AlertError::IconNotFound { .. }));
    }

    #[test]
    fn test_drop_destroys_handle() {
        let shell = RecordingShell::new();
        let handle = {
            let icon = load_from_file(&shell, "alert.ico").expect("load failed");
            icon.handle()
        };
        assert_eq!(
            shell.calls(),
            vec![
                Call::LoadIcon(IconSource::File(PathBuf::from("alert.ico"))),
                Call::DestroyIcon(handle),
            ]
        );
    }
}

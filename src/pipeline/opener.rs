//! Browser command selection for the HTML report

use std::path::Path;

use crate::process::Invocation;

/// Supported platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    /// Get the current platform
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        return Platform::MacOS;

        #[cfg(target_os = "windows")]
        return Platform::Windows;

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        return Platform::Linux;
    }
}

/// Build the invocation that opens `report`
///
/// A configured browser command line wins; otherwise the platform's
/// default opener is used.
pub fn open_invocation(
    browser: Option<&[String]>,
    platform: Platform,
    report: &Path,
    cwd: &Path,
) -> Invocation {
    let target = report.display().to_string();
    match browser {
        Some([program, args @ ..]) => Invocation::new(program.as_str(), cwd)
            .args(args.iter().cloned())
            .arg(target),
        _ => match platform {
            Platform::Linux => Invocation::new("xdg-open", cwd).arg(target),
            Platform::MacOS => Invocation::new("open", cwd).arg(target),
            // `start` treats the first quoted argument as a window title
            Platform::Windows => Invocation::new("cmd", cwd).args(["/C", "start", ""]).arg(target),
        },
    }
}

//! Administrator privilege check and self-elevation.
//!
//! Toggling an interface through `netsh` needs an elevated process. When the
//! current one is not elevated it relaunches itself with the "runas" verb and
//! the caller is expected to exit.

use crate::error::PrivilegeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Already running with administrator rights.
    Elevated,
    /// An elevated copy was started; this instance should exit.
    Relaunched,
    /// Platform has no elevation concept we act on.
    NotApplicable,
}

/// Make sure the process runs elevated, relaunching if it does not.
///
/// # Errors
///
/// Returns an error if the elevated relaunch could not be started.
pub fn ensure_elevated() -> Result<Elevation, PrivilegeError> {
    imp::ensure_elevated()
}

/// Quote one argument for a Windows command line.
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}

/// Join arguments into a single command-line string for relaunching.
pub fn join_args<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| quote_arg(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(windows)]
mod imp {
    use super::{join_args, Elevation};
    use crate::error::PrivilegeError;
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Shell::{IsUserAnAdmin, ShellExecuteW};
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    pub fn ensure_elevated() -> Result<Elevation, PrivilegeError> {
        if unsafe { IsUserAnAdmin() }.as_bool() {
            return Ok(Elevation::Elevated);
        }

        tracing::info!("requesting administrator privileges");
        let exe = std::env::current_exe()
            .map_err(|e| PrivilegeError::RelaunchFailed(e.to_string()))?;
        let params = join_args(std::env::args().skip(1));

        let exe = HSTRING::from(exe.as_os_str());
        let params = HSTRING::from(params);
        let verb = HSTRING::from("runas");
        let result = unsafe {
            ShellExecuteW(
                HWND::default(),
                &verb,
                &exe,
                &params,
                PCWSTR::null(),
                SW_SHOWNORMAL,
            )
        };

        // ShellExecuteW reports success with a value greater than 32.
        if result.0 as isize > 32 {
            Ok(Elevation::Relaunched)
        } else {
            Err(PrivilegeError::RelaunchFailed(format!(
                "ShellExecuteW returned {}",
                result.0 as isize
            )))
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use super::Elevation;
    use crate::error::PrivilegeError;

    pub fn ensure_elevated() -> Result<Elevation, PrivilegeError> {
        Ok(Elevation::NotApplicable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_args_are_left_alone() {
        assert_eq!(quote_arg("run"), "run");
        assert_eq!(quote_arg("--dry-run"), "--dry-run");
    }

    #[test]
    fn args_with_spaces_or_quotes_are_quoted() {
        assert_eq!(quote_arg("C:\\Program Files"), "\"C:\\Program Files\"");
        assert_eq!(quote_arg("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_arg(""), "\"\"");
    }

    #[test]
    fn join_preserves_order() {
        assert_eq!(join_args(["run", "--console", "a b"]), "run --console \"a b\"");
    }

    #[cfg(not(windows))]
    #[test]
    fn non_windows_needs_no_elevation() {
        assert_eq!(ensure_elevated().unwrap(), Elevation::NotApplicable);
    }
}

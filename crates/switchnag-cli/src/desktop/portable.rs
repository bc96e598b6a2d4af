use std::sync::mpsc;
use std::time::Duration;

use notify_rust::{Notification, Timeout};
use switchnag_core::{NotifyError, ReplySlot};

use super::{ToastSpec, SUBMIT_PREFIX};

pub const ACTIONS_SUPPORTED: bool = cfg!(not(target_os = "macos"));

fn build(spec: &ToastSpec) -> Notification {
    let mut notification = Notification::new();
    notification
        .appname(&spec.app_name)
        .summary(&spec.text)
        .body("Next thing?")
        .timeout(timeout_for(spec.duration));
    for choice in &spec.choices {
        notification.action(&format!("{SUBMIT_PREFIX}{choice}"), &format!("Okay: {choice}"));
    }
    notification
}

#[cfg(not(target_os = "macos"))]
pub fn watch(spec: ToastSpec, replies: ReplySlot, shown: mpsc::Sender<Result<(), NotifyError>>) {
    let handle = match build(&spec).show() {
        Ok(handle) => handle,
        Err(e) => {
            let _ = shown.send(Err(NotifyError::ShowFailed(e.to_string())));
            return;
        }
    };
    let _ = shown.send(Ok(()));

    handle.wait_for_action(|action| {
        super::answer(&replies, spec.generation, action, super::activation_for(action));
    });
}

#[cfg(target_os = "macos")]
pub fn watch(spec: ToastSpec, _replies: ReplySlot, shown: mpsc::Sender<Result<(), NotifyError>>) {
    let result = build(&spec)
        .show()
        .map(|_| ())
        .map_err(|e| NotifyError::ShowFailed(e.to_string()));
    let _ = shown.send(result);
}

fn timeout_for(duration: Duration) -> Timeout {
    if duration.is_zero() {
        Timeout::Never
    } else {
        Timeout::Milliseconds(u32::try_from(duration.as_millis()).unwrap_or(u32::MAX))
    }
}

//! WinRT toasts with a text input, through the `windows` crate.

use std::sync::mpsc;

use switchnag_core::escalation::{NEXT_THING_INPUT, SUBMIT_ACTION};
use switchnag_core::{Activation, NotifyError, ReplySlot};
use windows::core::{IInspectable, Interface, HSTRING};
use windows::Data::Xml::Dom::XmlDocument;
use windows::Foundation::{IPropertyValue, TypedEventHandler};
use windows::UI::Notifications::{
    ToastActivatedEventArgs, ToastDismissedEventArgs, ToastNotification, ToastNotificationManager,
};
use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_MULTITHREADED};

use super::{ToastSpec, CLOSED_ACTION, SUBMIT_PREFIX};

pub const ACTIONS_SUPPORTED: bool = true;

/// Unpackaged processes post toasts under PowerShell's AppUserModelID.
const APP_ID: &str =
    r"{1AC14E77-02E7-4E5D-B744-2EB1AE5198B7}\WindowsPowerShell\v1.0\powershell.exe";

/// Toasts take at most five buttons; one is "Okay".
const MAX_CHOICES: usize = 4;

pub fn watch(spec: ToastSpec, replies: ReplySlot, shown: mpsc::Sender<Result<(), NotifyError>>) {
    let (done_tx, done_rx) = mpsc::channel();
    let toast = match show(&spec, &replies, done_tx) {
        Ok(toast) => toast,
        Err(e) => {
            let _ = shown.send(Err(NotifyError::ShowFailed(e.to_string())));
            return;
        }
    };
    let _ = shown.send(Ok(()));

    // Handlers stay registered only while the toast is referenced.
    let _ = done_rx.recv();
    drop(toast);
}

fn show(
    spec: &ToastSpec,
    replies: &ReplySlot,
    done: mpsc::Sender<()>,
) -> windows::core::Result<ToastNotification> {
    // Fails harmlessly if this thread already joined an apartment.
    let _ = unsafe { RoInitialize(RO_INIT_MULTITHREADED) };

    let doc = XmlDocument::new()?;
    doc.LoadXml(&HSTRING::from(toast_xml(spec)))?;
    let toast = ToastNotification::CreateToastNotification(&doc)?;
    let generation = spec.generation;

    let activated_replies = replies.clone();
    let activated_done = done.clone();
    toast.Activated(&TypedEventHandler::<ToastNotification, IInspectable>::new(
        move |_, args| {
            match args.as_ref().map(|args| activation_from(args)) {
                Some(Ok((action, activation))) => {
                    super::answer(&activated_replies, generation, &action, activation)
                }
                Some(Err(e)) => tracing::warn!(generation, error = %e, "unreadable toast activation"),
                None => tracing::debug!(generation, "toast activated without arguments"),
            }
            let _ = activated_done.send(());
            Ok(())
        },
    ))?;

    let dismissed_replies = replies.clone();
    toast.Dismissed(&TypedEventHandler::<ToastNotification, ToastDismissedEventArgs>::new(
        move |_, _| {
            super::answer(
                &dismissed_replies,
                generation,
                CLOSED_ACTION,
                Some(Activation::dismissed()),
            );
            let _ = done.send(());
            Ok(())
        },
    ))?;

    ToastNotificationManager::CreateToastNotifierWithId(&HSTRING::from(APP_ID))?.Show(&toast)?;
    Ok(toast)
}

/// The "Okay" button submits whatever was typed; choice buttons carry their
/// own answer.
fn activation_from(args: &IInspectable) -> windows::core::Result<(String, Option<Activation>)> {
    let args: ToastActivatedEventArgs = args.cast()?;
    let action = args.Arguments()?.to_string();
    if action != SUBMIT_ACTION {
        let activation = super::activation_for(&action);
        return Ok((action, activation));
    }

    let thing = match args.UserInput()?.Lookup(&HSTRING::from(NEXT_THING_INPUT)) {
        Ok(value) => value.cast::<IPropertyValue>()?.GetString()?.to_string(),
        Err(_) => String::new(),
    };
    Ok((action, Some(Activation::submit(thing))))
}

fn toast_xml(spec: &ToastSpec) -> String {
    let scenario = if spec.duration.is_zero() {
        r#" scenario="reminder""#
    } else {
        ""
    };

    let mut actions = format!(
        r#"<input id="{NEXT_THING_INPUT}" type="text" placeHolderContent="Next thing?"/><action content="Okay" arguments="{SUBMIT_ACTION}" activationType="foreground"/>"#
    );
    for choice in spec.choices.iter().take(MAX_CHOICES) {
        let choice = escape(choice);
        actions.push_str(&format!(
            r#"<action content="{choice}" arguments="{SUBMIT_PREFIX}{choice}" activationType="foreground"/>"#
        ));
    }

    format!(
        r#"<toast launch="open" activationType="foreground"{scenario}><visual><binding template="ToastGeneric"><text>{}</text><text>Next thing?</text><text placement="attribution">{}</text></binding></visual><actions>{actions}</actions></toast>"#,
        escape(&spec.text),
        escape(&spec.app_name),
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

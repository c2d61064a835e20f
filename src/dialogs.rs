//! Modal dialogs used before and around mirroring.

use sdl2::messagebox::{
    show_message_box, show_simple_message_box, ButtonData, ClickedButton, MessageBoxButtonFlag,
    MessageBoxColorScheme, MessageBoxFlag,
};
use sdl2::video::Window;

/// Blocking user prompts.
pub trait Prompter {
    /// Show an error and wait for it to be dismissed.
    fn error(&self, title: &str, message: &str);

    /// Ask a yes/no question. Dismissing the dialog counts as "no".
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Let the user pick one of `options`. `None` means cancelled.
    fn choose(&self, title: &str, message: &str, options: &[String]) -> Option<usize>;
}

impl<P: Prompter + ?Sized> Prompter for &P {
    fn error(&self, title: &str, message: &str) {
        (**self).error(title, message)
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        (**self).confirm(title, message)
    }

    fn choose(&self, title: &str, message: &str, options: &[String]) -> Option<usize> {
        (**self).choose(title, message, options)
    }
}

const CANCEL_ID: i32 = -1;

/// Native message boxes through SDL.
///
/// SDL message boxes work before the video subsystem is initialized, so
/// these can report startup failures too. If a box cannot be shown at all
/// the message goes to stderr and the answer is "no"/cancel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdlPrompter;

impl SdlPrompter {
    fn ask(
        flags: MessageBoxFlag,
        buttons: &[ButtonData<'_>],
        title: &str,
        message: &str,
    ) -> Option<i32> {
        match show_message_box(
            flags,
            buttons,
            title,
            message,
            None::<&Window>,
            None::<MessageBoxColorScheme>,
        ) {
            Ok(ClickedButton::CustomButton(button)) => Some(button.button_id),
            Ok(ClickedButton::CloseButton) => None,
            Err(e) => {
                log::error!("Could not show dialog '{}': {}", title, e);
                eprintln!("{}: {}", title, message);
                None
            }
        }
    }
}

impl Prompter for SdlPrompter {
    fn error(&self, title: &str, message: &str) {
        if let Err(e) =
            show_simple_message_box(MessageBoxFlag::ERROR, title, message, None::<&Window>)
        {
            log::error!("Could not show dialog '{}': {}", title, e);
            eprintln!("{}: {}", title, message);
        }
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        let buttons = [
            ButtonData {
                flags: MessageBoxButtonFlag::RETURNKEY_DEFAULT,
                button_id: 1,
                text: "Yes",
            },
            ButtonData {
                flags: MessageBoxButtonFlag::ESCAPEKEY_DEFAULT,
                button_id: 0,
                text: "No",
            },
        ];
        Self::ask(MessageBoxFlag::INFORMATION, &buttons, title, message) == Some(1)
    }

    fn choose(&self, title: &str, message: &str, options: &[String]) -> Option<usize> {
        let mut buttons: Vec<ButtonData<'_>> = options
            .iter()
            .enumerate()
            .map(|(i, label)| ButtonData {
                flags: if i == 0 {
                    MessageBoxButtonFlag::RETURNKEY_DEFAULT
                } else {
                    MessageBoxButtonFlag::NOTHING
                },
                button_id: i as i32,
                text: label.as_str(),
            })
            .collect();
        buttons.push(ButtonData {
            flags: MessageBoxButtonFlag::ESCAPEKEY_DEFAULT,
            button_id: CANCEL_ID,
            text: "Cancel",
        });

        match Self::ask(MessageBoxFlag::INFORMATION, &buttons, title, message) {
            Some(id) if id >= 0 => usize::try_from(id).ok().filter(|&i| i < options.len()),
            _ => None,
        }
    }
}

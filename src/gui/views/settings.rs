use crate::core::{
    dialog::{Choice, DialogKind},
    events::{ClearOutcome, Notice},
    settings::{Entry, EntryKey, SettingsController, SettingsList},
};
use crate::gui::widgets::text;
use iced::widget::{button, column, container, row, Space};
use iced::{theme, Alignment, Command, Element, Length};
use std::thread;
use std::time::Duration;

/// How long a notice stays up, like a short Android toast.
const NOTICE_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub enum Message {
    EntryPressed(EntryKey),
    Answer(Choice),
    ClearFinished(ClearOutcome),
    /// Carries the generation of the notice it was scheduled for
    NoticeExpired(u64),
}

pub struct Settings {
    controller: SettingsController,
    notice: Option<Notice>,
    notice_generation: u64,
}

impl Settings {
    pub fn new(controller: SettingsController) -> Self {
        Self {
            controller,
            notice: None,
            notice_generation: 0,
        }
    }

    pub fn controller(&self) -> &SettingsController {
        &self.controller
    }

    pub fn refresh(&mut self) {
        self.controller.refresh();
    }

    pub fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::EntryPressed(key) => {
                self.controller.activate(key);
                Command::none()
            }
            Message::Answer(choice) => match self.controller.answer(choice) {
                Some(handle) => Command::perform(handle.outcome(), Message::ClearFinished),
                None => Command::none(),
            },
            Message::ClearFinished(outcome) => {
                self.notice_generation += 1;
                self.notice = Some(Notice::from(outcome));
                let generation = self.notice_generation;
                Command::perform(expire_after(NOTICE_DURATION), move |()| {
                    Message::NoticeExpired(generation)
                })
            }
            Message::NoticeExpired(generation) => {
                if generation == self.notice_generation {
                    self.notice = None;
                }
                Command::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = match self.controller.dialog() {
            Some(workflow) => confirm_dialog(workflow.kind()),
            None => entry_list(self.controller.list()),
        };

        match self.notice {
            Some(notice) => column![content, notice_banner(notice)]
                .spacing(20)
                .into(),
            None => content,
        }
    }
}

/// Resolves after `d`, without blocking the executor.
async fn expire_after(d: Duration) {
    let (tx, rx) = futures::channel::oneshot::channel();
    let spawned = thread::Builder::new()
        .name("notice-timer".to_string())
        .spawn(move || {
            thread::sleep(d);
            if tx.send(()).is_err() {
                debug!("Notice timer outlived its notice");
            }
        });
    if let Err(e) = spawned {
        warn!("Notice timer not started, expiring now: {e}");
    }
    if rx.await.is_err() {
        debug!("Notice timer dropped, expiring now");
    }
}

fn entry_list(list: &SettingsList) -> Element<'_, Message> {
    list.entries()
        .iter()
        .fold(column![].spacing(10), |col, entry| col.push(entry_button(entry)))
        .width(Length::Fill)
        .into()
}

fn entry_button(entry: &Entry) -> Element<'_, Message> {
    let style = match entry.key {
        EntryKey::Status => theme::Button::Destructive,
        _ => theme::Button::Secondary,
    };
    button(column![text(entry.title).size(20), text(entry.summary).size(14)].spacing(4))
        .width(Length::Fill)
        .padding(10)
        .style(style)
        .on_press(Message::EntryPressed(entry.key))
        .into()
}

fn confirm_dialog<'a>(kind: DialogKind) -> Element<'a, Message> {
    let title = row![text(kind.icon()).size(24), text(kind.title()).size(24)]
        .spacing(10)
        .align_items(Alignment::Center);

    let buttons = row![
        Space::with_width(Length::Fill),
        button(text("No"))
            .padding([5, 10])
            .style(theme::Button::Secondary)
            .on_press(Message::Answer(Choice::No)),
        button(text("Yes"))
            .padding([5, 10])
            .style(theme::Button::Destructive)
            .on_press(Message::Answer(Choice::Yes)),
    ]
    .spacing(10);

    container(column![title, text(kind.message()), buttons].spacing(20))
        .padding(20)
        .width(Length::Fill)
        .style(theme::Container::Box)
        .into()
}

fn notice_banner<'a>(notice: Notice) -> Element<'a, Message> {
    container(text(notice).size(16))
        .padding(10)
        .width(Length::Fill)
        .center_x()
        .style(theme::Container::Box)
        .into()
}

#[allow(clippy::unwrap_used, reason = "tests")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adb::PackId;
    use crate::core::availability::{AppInspector, InspectError};
    use crate::core::capability::HostCapabilities;
    use crate::core::dispatch::{DispatchError, Dispatcher, Handoff};
    use crate::core::events::{EventStore, StoreError};
    use crate::core::settings::{Collaborators, Targets};
    use std::sync::Arc;

    struct Reachable;
    impl AppInspector for Reachable {
        fn is_installed(&self, _: &PackId) -> Result<bool, InspectError> {
            Ok(true)
        }
        fn has_read_permission(&self, _: &PackId) -> Result<bool, InspectError> {
            Ok(true)
        }
        fn is_enabled(&self, _: &PackId) -> Result<bool, InspectError> {
            Ok(true)
        }
    }
    impl Dispatcher for Reachable {
        fn dispatch(&self, _: &Handoff) -> Result<(), DispatchError> {
            Ok(())
        }
    }
    impl EventStore for Reachable {
        fn delete_all_events(&self) -> Result<i64, StoreError> {
            Ok(1)
        }
    }

    fn view() -> Settings {
        let controller = SettingsController::new(
            Collaborators {
                inspector: Box::new(Reachable),
                dispatcher: Box::new(Reachable),
                store: Arc::new(Reachable),
            },
            Targets {
                target: PackId::new("com.fsck.k9").unwrap(),
                extension: PackId::new("de.cketti.smartwatch.k9").unwrap(),
                developer_email: "ck@cketti.de".to_string(),
                more_apps_uri: "https://example.org/apps".to_string(),
            },
            HostCapabilities {
                supports_history: Some(true),
            },
        );
        Settings::new(controller)
    }

    #[test]
    fn finished_clear_shows_one_notice() {
        let mut s = view();
        let _ = s.update(Message::ClearFinished(ClearOutcome::Success));
        assert_eq!(s.notice, Some(Notice::Cleared));
        assert_eq!(s.notice_generation, 1);

        let _ = s.update(Message::NoticeExpired(1));
        assert_eq!(s.notice, None);
    }

    #[test]
    fn stale_timer_keeps_the_newer_notice() {
        let mut s = view();
        let _ = s.update(Message::ClearFinished(ClearOutcome::Success));
        let _ = s.update(Message::ClearFinished(ClearOutcome::NothingToDelete));
        assert_eq!(s.notice, Some(Notice::ClearFailed));

        let _ = s.update(Message::NoticeExpired(1));
        assert_eq!(s.notice, Some(Notice::ClearFailed));

        let _ = s.update(Message::NoticeExpired(2));
        assert_eq!(s.notice, None);
    }

    #[test]
    fn dismiss_without_prompt_changes_nothing() {
        let mut s = view();
        let entries = s.controller().list().clone();
        let _ = s.update(Message::Answer(Choice::Dismiss));
        assert!(s.controller().dialog().is_none());
        assert_eq!(s.controller().list(), &entries);
        assert_eq!(s.notice, None);
        assert_eq!(s.notice_generation, 0);
    }

    #[test]
    fn dismiss_closes_the_prompt_without_a_notice() {
        let mut s = view();
        let _ = s.update(Message::EntryPressed(EntryKey::Clear));
        assert!(s.controller().dialog().is_some());
        let _ = s.update(Message::Answer(Choice::Dismiss));
        assert!(s.controller().dialog().is_none());
        assert_eq!(s.notice, None);
    }
}

pub mod views;
pub mod widgets;

use crate::core::availability::AdbInspector;
use crate::core::config::Config;
use crate::core::dialog::Choice;
use crate::core::dispatch::DeviceDispatcher;
use crate::core::events::AdbEventStore;
use crate::core::settings::{Collaborators, SettingsController};
use crate::core::theme::string_to_theme;
use crate::core::utils::NAME;

use views::settings::{Message as SettingsMessage, Settings as SettingsView};
use widgets::navigation_menu::nav_menu;

use iced::widget::{column, container, scrollable};
use iced::{
    keyboard, window::Settings as Window, Application, Command, Element, Length, Settings,
    Subscription,
};
use std::sync::Arc;

pub struct K9WatchSettings {
    theme: iced::Theme,
    device_serial: String,
    settings_view: SettingsView,
}

#[derive(Debug, Clone)]
pub enum Message {
    RefreshButtonPressed,
    SettingsAction(SettingsMessage),
}

/// Collaborators that reach the phone through ADB.
fn device_collaborators(config: &Config, device_serial: &str) -> Collaborators {
    let ext = &config.extension;
    Collaborators {
        inspector: Box::new(AdbInspector {
            device_serial: device_serial.to_string(),
            extension: ext.package.clone(),
            read_permission: ext.read_permission.clone(),
            provider_component: ext.provider_component.clone(),
        }),
        dispatcher: Box::new(DeviceDispatcher {
            device_serial: device_serial.to_string(),
        }),
        store: Arc::new(AdbEventStore {
            device_serial: device_serial.to_string(),
            extension: ext.package.clone(),
            provider: ext.event_provider.clone(),
        }),
    }
}

impl Application for K9WatchSettings {
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Message = Message;
    type Flags = Config;

    fn new(config: Config) -> (Self, Command<Message>) {
        let device_serial = config.device_serial();
        let controller = SettingsController::new(
            device_collaborators(&config, &device_serial),
            config.targets(),
            config.host,
        );
        info!("{:-^65}", "-");
        info!(
            "DEVICE: {} | K-9 Mail: {}",
            if device_serial.is_empty() {
                "default"
            } else {
                device_serial.as_str()
            },
            controller.status()
        );
        info!("{:-^65}", "-");
        (
            Self {
                theme: string_to_theme(&config.general.theme).to_iced(),
                device_serial,
                settings_view: SettingsView::new(controller),
            },
            Command::none(),
        )
    }

    fn theme(&self) -> iced::Theme {
        self.theme.clone()
    }

    fn title(&self) -> String {
        String::from("K-9 Mail for SmartWatch: Settings")
    }

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::RefreshButtonPressed => {
                self.settings_view.refresh();
                Command::none()
            }
            Message::SettingsAction(msg) => self
                .settings_view
                .update(msg)
                .map(Message::SettingsAction),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let navigation_container = nav_menu(
            &self.device_serial,
            self.settings_view.controller().status(),
        );

        let main_container = container(scrollable(
            self.settings_view.view().map(Message::SettingsAction),
        ))
        .padding(10)
        .width(Length::Fill)
        .height(Length::Fill);

        column![navigation_container, main_container]
            .width(Length::Fill)
            .into()
    }

    /// Escape closes an open prompt without answering it.
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::SettingsAction(
                SettingsMessage::Answer(Choice::Dismiss),
            )),
            _ => None,
        })
    }
}

impl K9WatchSettings {
    pub fn start() -> iced::Result {
        Self::run(Settings {
            id: Some(String::from(NAME)),
            window: Window {
                size: iced::Size {
                    width: 640.0,
                    height: 560.0,
                },
                resizable: true,
                decorations: true,
                ..iced::window::Settings::default()
            },
            default_text_size: iced::Pixels(16.0),
            ..Settings::with_flags(Config::load_configuration_file())
        })
    }
}

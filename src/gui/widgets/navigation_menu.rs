use crate::core::availability::AvailabilityStatus;
use crate::core::utils::NAME;
use crate::gui::{widgets::text, Message};
use iced::widget::{button, container, row, tooltip, Space};
use iced::{theme, Alignment, Element, Length};

pub fn nav_menu<'a>(device_serial: &str, status: AvailabilityStatus) -> Element<'a, Message> {
    let refresh_btn = button(text("Refresh"))
        .padding([5, 10])
        .style(theme::Button::Primary)
        .on_press(Message::RefreshButtonPressed);

    let refresh_tooltip = tooltip(
        refresh_btn,
        "Check K-9 Mail again",
        tooltip::Position::Bottom,
    )
    .style(theme::Container::Box)
    .gap(4);

    let device_text = if device_serial.is_empty() {
        text("default device")
    } else {
        text(device_serial)
    };

    let row = row![
        text(NAME).size(22),
        text(format!("v{}", env!("CARGO_PKG_VERSION"))).size(14),
        Space::with_width(Length::Fill),
        device_text.size(14),
        text(format!("K-9 Mail: {status}")).size(14),
        refresh_tooltip,
    ]
    .width(Length::Fill)
    .align_items(Alignment::Center)
    .spacing(10);

    container(row)
        .width(Length::Fill)
        .padding(10)
        .style(theme::Container::Box)
        .into()
}

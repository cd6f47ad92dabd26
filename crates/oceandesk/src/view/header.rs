//! Header bar above each screen.

use iced::widget::{Space, button, container, row, text};
use iced::{Alignment, Element, Length};

use oceandesk_core::Status;

use crate::message::{Message, Screen};
use crate::style::widgets::{header_style, palette, secondary_button_style};
use crate::view::common::heading;

/// Renders the screen title, a load indicator and the refresh button.
pub fn view_header(screen: Screen, status: Status) -> Element<'static, Message> {
    let indicator = match status {
        Status::Loading => Some(("\u{25CF} Syncing", palette::current().accent_yellow)),
        Status::Failed => Some(("\u{25CF} Offline", palette::current().accent_red)),
        Status::Idle | Status::Ready => None,
    };

    let mut bar = row![heading(screen.label())]
        .spacing(12)
        .align_y(Alignment::Center);

    if let Some((label, color)) = indicator {
        bar = bar.push(text(label).size(12).color(color));
    }

    bar = bar.push(Space::new().width(Length::Fill));

    // Chat has nothing to refetch.
    if screen != Screen::Agent {
        let refresh = button(text("\u{21BB} Refresh").size(13))
            .padding([6, 12])
            .style(secondary_button_style)
            .on_press_maybe((status != Status::Loading).then_some(Message::Refresh));
        bar = bar.push(refresh);
    }

    container(bar)
        .width(Length::Fill)
        .padding([12, 20])
        .style(header_style)
        .into()
}

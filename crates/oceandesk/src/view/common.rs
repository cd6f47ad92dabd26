//! Small building blocks shared by the screens.

use iced::widget::{Text, container, row, text};
use iced::{Element, Font, Length, font};

use oceandesk_core::Status;

use crate::message::Message;
use crate::style::widgets::{error_banner_style, palette};

pub const BOLD: Font = Font {
    weight: font::Weight::Bold,
    ..Font::DEFAULT
};

pub const SEMIBOLD: Font = Font {
    weight: font::Weight::Semibold,
    ..Font::DEFAULT
};

/// Section title.
pub fn heading(label: impl Into<String>) -> Text<'static> {
    text(label.into())
        .size(18)
        .font(BOLD)
        .style(|_theme| text::Style {
            color: Some(palette::current().text_primary),
        })
}

/// Small uppercase caption.
pub fn caption(label: impl Into<String>) -> Text<'static> {
    text(label.into().to_uppercase())
        .size(11)
        .font(BOLD)
        .style(|_theme| text::Style {
            color: Some(palette::current().text_muted),
        })
}

/// Secondary text.
pub fn muted<'a>(label: impl Into<String>) -> Text<'a> {
    text(label.into()).size(13).style(|_theme| text::Style {
        color: Some(palette::current().text_secondary),
    })
}

/// Centered placeholder for an empty or loading collection.
pub fn placeholder(status: Status, empty_label: &str) -> Element<'static, Message> {
    let label = match status {
        Status::Idle | Status::Loading => "Loading…".to_owned(),
        Status::Failed => "Could not load data.".to_owned(),
        Status::Ready => empty_label.to_owned(),
    };

    container(muted(label))
        .width(Length::Fill)
        .padding(32)
        .center_x(Length::Fill)
        .into()
}

/// Banner over last-known data after a failed request.
pub fn error_banner(error: &str) -> Element<'static, Message> {
    container(
        row![
            text("\u{26A0}").size(14),
            text(format!("Showing last known data. {error}")).size(13),
        ]
        .spacing(8),
    )
    .width(Length::Fill)
    .padding([8, 12])
    .style(error_banner_style)
    .into()
}

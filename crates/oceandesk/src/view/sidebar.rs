//! Navigation sidebar.

use iced::widget::{Column, Space, button, column, container, row, text};
use iced::{Alignment, Element, Length};

use crate::message::{Message, Screen};
use crate::style::widgets::palette::{self, ThemeMode};
use crate::style::widgets::{
    nav_button_selected_style, nav_button_style, secondary_button_style, sidebar_style,
};
use crate::view::common::{BOLD, caption};

/// Counters shown next to the screen names.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidebarBadges {
    /// Emails in the inbox.
    pub emails: usize,
    /// Prompts with unsaved edits.
    pub dirty_prompts: usize,
    /// Drafts with unsaved edits.
    pub dirty_drafts: usize,
    /// A chat turn is in flight.
    pub agent_thinking: bool,
}

/// Renders the sidebar with one entry per screen.
pub fn view_sidebar(
    current: Screen,
    badges: SidebarBadges,
    theme_mode: ThemeMode,
) -> Element<'static, Message> {
    let brand = container(
        column![
            text("\u{1F30A} Ocean AI")
                .size(20)
                .font(BOLD)
                .style(|_theme| text::Style {
                    color: Some(palette::current().primary),
                }),
            caption("Email agent dashboard"),
        ]
        .spacing(4),
    )
    .padding([20, 16]);

    let entries: Vec<Element<'static, Message>> = Screen::ALL
        .iter()
        .map(|&screen| view_entry(screen, current == screen, badge_for(screen, badges)))
        .collect();

    let theme_label = match theme_mode {
        ThemeMode::Dark => "\u{2600} Light mode",
        ThemeMode::Light => "\u{263E} Dark mode",
    };
    let theme_toggle = button(text(theme_label).size(13))
        .width(Length::Fill)
        .padding([8, 12])
        .style(secondary_button_style)
        .on_press(Message::ToggleTheme);

    let content = column![
        brand,
        Column::with_children(entries).spacing(4).padding([0, 8]),
        Space::new().height(Length::Fill),
        container(theme_toggle).padding(12),
    ];

    container(content)
        .width(Length::Fixed(220.0))
        .height(Length::Fill)
        .style(sidebar_style)
        .into()
}

fn badge_for(screen: Screen, badges: SidebarBadges) -> Option<String> {
    let count = match screen {
        Screen::Inbox => badges.emails,
        Screen::Prompts => badges.dirty_prompts,
        Screen::Drafts => badges.dirty_drafts,
        Screen::Agent => return badges.agent_thinking.then(|| "…".to_owned()),
    };
    (count > 0).then(|| count.to_string())
}

fn view_entry(screen: Screen, selected: bool, badge: Option<String>) -> Element<'static, Message> {
    let icon = match screen {
        Screen::Inbox => "\u{1F4E5}",
        Screen::Prompts => "\u{1F9E0}",
        Screen::Agent => "\u{1F4AC}",
        Screen::Drafts => "\u{1F4DD}",
    };

    let mut content = row![text(icon).size(16), text(screen.label()).size(14)]
        .spacing(10)
        .align_y(Alignment::Center);

    if let Some(badge) = badge {
        content = content.push(Space::new().width(Length::Fill));
        content = content.push(text(badge).size(11).font(BOLD).style(|_theme| text::Style {
            color: Some(palette::current().text_muted),
        }));
    }

    button(content.width(Length::Fill))
        .width(Length::Fill)
        .padding([10, 12])
        .style(if selected {
            nav_button_selected_style
        } else {
            nav_button_style
        })
        .on_press(Message::NavigateTo(screen))
        .into()
}

//! Container style functions with theme support.

use iced::widget::container;
use iced::{Background, Border, Color};

use super::palette;
use super::shadows;
use super::shadows::radius;

/// Window background.
pub fn app_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.background)),
        text_color: Some(p.text_primary),
        ..Default::default()
    }
}

/// Header bar with a bottom border.
pub fn header_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.surface)),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::NONE.into(),
        },
        ..Default::default()
    }
}

/// Navigation sidebar.
pub fn sidebar_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.surface)),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::NONE.into(),
        },
        ..Default::default()
    }
}

/// List panel (emails, drafts).
pub fn panel_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.surface)),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::NONE.into(),
        },
        ..Default::default()
    }
}

/// Raised card.
pub fn card_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.surface_elevated)),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::LARGE.into(),
        },
        shadow: shadows::medium(),
        ..Default::default()
    }
}

/// Card with unsaved edits.
pub fn dirty_card_style(theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        border: Border {
            color: p.accent_yellow,
            width: 1.0,
            radius: radius::LARGE.into(),
        },
        ..card_style(theme)
    }
}

/// Error banner shown above last-known data.
pub fn error_banner_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();
    let red = p.accent_red;

    container::Style {
        background: Some(Background::Color(Color::from_rgba(red.r, red.g, red.b, 0.12))),
        text_color: Some(red),
        border: Border {
            color: red,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        ..Default::default()
    }
}

/// Colored pill for a category label.
pub fn badge_style(color: Color) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(Background::Color(Color::from_rgba(
            color.r, color.g, color.b, 0.16,
        ))),
        text_color: Some(color),
        border: Border {
            color,
            width: 1.0,
            radius: radius::LARGE.into(),
        },
        ..Default::default()
    }
}

/// Chat bubble of the user.
pub fn user_bubble_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.user_bubble)),
        text_color: Some(Color::WHITE),
        border: Border {
            radius: radius::BUBBLE.into(),
            ..Default::default()
        },
        shadow: shadows::subtle(),
        ..Default::default()
    }
}

/// Chat bubble of the agent.
pub fn agent_bubble_style(_theme: &iced::Theme) -> container::Style {
    let p = palette::current();

    container::Style {
        background: Some(Background::Color(p.agent_bubble)),
        text_color: Some(p.text_primary),
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::BUBBLE.into(),
        },
        shadow: shadows::subtle(),
        ..Default::default()
    }
}

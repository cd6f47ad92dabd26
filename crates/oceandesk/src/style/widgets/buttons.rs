//! Button style functions with theme support.

use iced::widget::button;
use iced::{Background, Border, Color};

use super::palette;
use super::shadows;
use super::shadows::radius;

/// Primary action button with a glow.
pub fn primary_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(p.primary)),
        text_color: p.text_on_primary,
        border: Border {
            color: p.primary_light,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::glow(p.primary),
        snap: false,
    };

    match status {
        button::Status::Active => base,
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(p.primary_light)),
            shadow: shadows::glow_strong(p.primary),
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(p.primary_dark)),
            shadow: shadows::subtle(),
            ..base
        },
        button::Status::Disabled => button::Style {
            background: Some(Background::Color(p.border_medium)),
            text_color: p.text_muted,
            border: Border {
                color: p.border_medium,
                ..base.border
            },
            shadow: shadows::none(),
            ..base
        },
    }
}

/// Outlined secondary button.
pub fn secondary_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(p.surface)),
        text_color: p.text_primary,
        border: Border {
            color: p.border_medium,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::none(),
        snap: false,
    };

    match status {
        button::Status::Active => base,
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(p.hover)),
            border: Border {
                color: p.primary,
                ..base.border
            },
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(p.selected)),
            ..base
        },
        button::Status::Disabled => button::Style {
            text_color: p.text_muted,
            border: Border {
                color: p.border_subtle,
                ..base.border
            },
            ..base
        },
    }
}

/// Destructive action button.
pub fn danger_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(Color::TRANSPARENT)),
        text_color: p.accent_red,
        border: Border {
            color: p.accent_red,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::none(),
        snap: false,
    };

    match status {
        button::Status::Active => base,
        button::Status::Hovered | button::Status::Pressed => button::Style {
            background: Some(Background::Color(p.accent_red)),
            text_color: p.text_on_primary,
            ..base
        },
        button::Status::Disabled => button::Style {
            text_color: p.text_muted,
            border: Border {
                color: p.border_subtle,
                ..base.border
            },
            ..base
        },
    }
}

/// Sidebar navigation entry.
pub fn nav_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(Color::TRANSPARENT)),
        text_color: p.text_secondary,
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::none(),
        snap: false,
    };

    match status {
        button::Status::Active | button::Status::Disabled => base,
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(p.hover)),
            text_color: p.text_primary,
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(p.selected)),
            ..base
        },
    }
}

/// The active sidebar navigation entry.
pub fn nav_button_selected_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(p.selected)),
        text_color: p.primary,
        border: Border {
            color: p.selected_border,
            width: 1.0,
            radius: radius::MEDIUM.into(),
        },
        shadow: shadows::none(),
        snap: false,
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(p.hover)),
            ..base
        },
        _ => base,
    }
}

/// List row (email, prompt, draft).
pub fn row_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(Color::TRANSPARENT)),
        text_color: p.text_primary,
        border: Border::default(),
        shadow: shadows::none(),
        snap: false,
    };

    match status {
        button::Status::Active | button::Status::Disabled => base,
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(p.hover)),
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(p.selected)),
            ..base
        },
    }
}

/// The selected list row.
pub fn row_button_selected_style(_theme: &iced::Theme, _status: button::Status) -> button::Style {
    let p = palette::current();

    button::Style {
        background: Some(Background::Color(p.selected)),
        text_color: p.text_primary,
        border: Border {
            color: p.selected_border,
            width: 1.0,
            radius: radius::SMALL.into(),
        },
        shadow: shadows::none(),
        snap: false,
    }
}

/// Category filter chip.
pub fn chip_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let p = palette::current();

    let base = button::Style {
        background: Some(Background::Color(p.surface_sunken)),
        text_color: p.text_secondary,
        border: Border {
            color: p.border_subtle,
            width: 1.0,
            radius: radius::LARGE.into(),
        },
        shadow: shadows::none(),
        snap: false,
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(p.hover)),
            text_color: p.text_primary,
            ..base
        },
        _ => base,
    }
}

/// The active category filter chip.
pub fn chip_button_selected_style(_theme: &iced::Theme, _status: button::Status) -> button::Style {
    let p = palette::current();

    button::Style {
        background: Some(Background::Color(p.primary)),
        text_color: p.text_on_primary,
        border: Border {
            color: p.primary,
            width: 1.0,
            radius: radius::LARGE.into(),
        },
        shadow: shadows::none(),
        snap: false,
    }
}

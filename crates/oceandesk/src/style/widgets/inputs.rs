//! Styles for form fields and scroll areas.
//!
//! Single-line inputs and the multi-line template/body editors share one
//! look, so a field reads the same on the Prompts and Drafts screens.

use iced::widget::{container, scrollable, text_editor, text_input};
use iced::{Background, Border, Color};

use super::palette::{self, Palette};
use super::shadows;
use super::shadows::radius;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Idle,
    Hovered,
    Focused,
    Disabled,
}

impl Field {
    fn background(self, p: &Palette) -> Background {
        Background::Color(match self {
            Self::Focused => p.surface,
            _ => p.surface_sunken,
        })
    }

    fn border(self, p: &Palette) -> Border {
        let color = match self {
            Self::Idle | Self::Disabled => p.border_subtle,
            Self::Hovered => p.border_medium,
            Self::Focused => p.primary,
        };
        Border {
            color,
            width: if self == Self::Focused { 1.5 } else { 1.0 },
            radius: radius::MEDIUM.into(),
        }
    }

    fn value(self, p: &Palette) -> Color {
        if self == Self::Disabled {
            p.text_muted
        } else {
            p.text_primary
        }
    }
}

/// Single-line field: subjects, chat composer.
pub fn input_style(_theme: &iced::Theme, status: text_input::Status) -> text_input::Style {
    let p = palette::current();
    let field = match status {
        text_input::Status::Active => Field::Idle,
        text_input::Status::Hovered => Field::Hovered,
        text_input::Status::Focused { .. } => Field::Focused,
        text_input::Status::Disabled => Field::Disabled,
    };

    text_input::Style {
        background: field.background(&p),
        border: field.border(&p),
        icon: p.text_muted,
        placeholder: p.text_muted,
        value: field.value(&p),
        selection: p.selected,
    }
}

/// Multi-line editor for prompt templates and draft bodies.
pub fn editor_style(theme: &iced::Theme, status: text_editor::Status) -> text_editor::Style {
    let p = palette::current();
    let field = match status {
        text_editor::Status::Active => Field::Idle,
        text_editor::Status::Hovered => Field::Hovered,
        text_editor::Status::Focused { .. } => Field::Focused,
        text_editor::Status::Disabled => Field::Disabled,
    };

    let mut style = text_editor::default(theme, status);
    style.background = field.background(&p);
    style.border = field.border(&p);
    style.placeholder = p.text_muted;
    style.value = field.value(&p);
    style.selection = p.selected;
    style
}

fn rail(scroller: Color) -> scrollable::Rail {
    scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: Background::Color(scroller),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: radius::SMALL.into(),
            },
        },
    }
}

/// List and transcript scroll areas with a thin scroller that lights up
/// while hovered or dragged.
pub fn scrollable_style(_theme: &iced::Theme, status: scrollable::Status) -> scrollable::Style {
    let p = palette::current();

    let (vertical, horizontal) = match status {
        scrollable::Status::Active { .. } => (p.border_medium, p.border_medium),
        scrollable::Status::Hovered {
            is_vertical_scrollbar_hovered,
            is_horizontal_scrollbar_hovered,
            ..
        } => (
            if is_vertical_scrollbar_hovered { p.primary_light } else { p.border_medium },
            if is_horizontal_scrollbar_hovered { p.primary_light } else { p.border_medium },
        ),
        scrollable::Status::Dragged {
            is_vertical_scrollbar_dragged,
            is_horizontal_scrollbar_dragged,
            ..
        } => (
            if is_vertical_scrollbar_dragged { p.primary } else { p.border_medium },
            if is_horizontal_scrollbar_dragged { p.primary } else { p.border_medium },
        ),
    };

    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: rail(vertical),
        horizontal_rail: rail(horizontal),
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: Background::Color(p.surface_elevated),
            border: Border {
                color: p.border_subtle,
                width: 1.0,
                radius: radius::LARGE.into(),
            },
            shadow: shadows::subtle(),
            icon: p.text_secondary,
        },
    }
}

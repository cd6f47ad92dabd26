//! Color palette with light and dark theme support.
//!
//! Deep-sea blues for the dark theme, a bright coastal palette for light.

use iced::Color;
use oceandesk_api::Category;

/// Application theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Light theme.
    Light,
    /// Dark theme (default).
    #[default]
    Dark,
}

impl ThemeMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Complete color palette for the application.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    // Brand
    pub primary: Color,
    pub primary_light: Color,
    pub primary_dark: Color,

    // Surfaces
    pub surface: Color,
    pub surface_elevated: Color,
    pub surface_sunken: Color,
    pub background: Color,

    // Text
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub text_on_primary: Color,

    // Accents
    pub accent_blue: Color,
    pub accent_green: Color,
    pub accent_yellow: Color,
    pub accent_red: Color,
    pub accent_purple: Color,

    // States
    pub selected: Color,
    pub selected_border: Color,
    pub hover: Color,
    pub user_bubble: Color,
    pub agent_bubble: Color,

    // Borders
    pub border_subtle: Color,
    pub border_medium: Color,

    // Shadows
    pub shadow: Color,
    pub shadow_medium: Color,
}

impl Palette {
    /// Creates the light theme palette.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::from_rgb(0.0, 0.45, 0.75), // Harbor blue
            primary_light: Color::from_rgb(0.25, 0.62, 0.88),
            primary_dark: Color::from_rgb(0.0, 0.34, 0.60),

            surface: Color::WHITE,
            surface_elevated: Color::WHITE,
            surface_sunken: Color::from_rgb(0.96, 0.98, 0.99),
            background: Color::from_rgb(0.95, 0.97, 0.985),

            text_primary: Color::from_rgb(0.07, 0.12, 0.18),
            text_secondary: Color::from_rgb(0.38, 0.45, 0.53),
            text_muted: Color::from_rgb(0.58, 0.64, 0.70),
            text_on_primary: Color::WHITE,

            accent_blue: Color::from_rgb(0.10, 0.50, 0.90),
            accent_green: Color::from_rgb(0.10, 0.66, 0.50),
            accent_yellow: Color::from_rgb(0.93, 0.66, 0.05),
            accent_red: Color::from_rgb(0.90, 0.26, 0.30),
            accent_purple: Color::from_rgb(0.52, 0.36, 0.90),

            selected: Color::from_rgb(0.90, 0.95, 0.99),
            selected_border: Color::from_rgb(0.0, 0.45, 0.75),
            hover: Color::from_rgb(0.95, 0.97, 0.99),
            user_bubble: Color::from_rgb(0.0, 0.45, 0.75),
            agent_bubble: Color::from_rgb(0.93, 0.95, 0.97),

            border_subtle: Color::from_rgb(0.89, 0.92, 0.95),
            border_medium: Color::from_rgb(0.82, 0.86, 0.90),

            shadow: Color::from_rgba(0.0, 0.05, 0.1, 0.05),
            shadow_medium: Color::from_rgba(0.0, 0.05, 0.1, 0.10),
        }
    }

    /// Creates the dark theme palette.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::from_rgb(0.20, 0.78, 0.92), // Bioluminescent cyan
            primary_light: Color::from_rgb(0.42, 0.86, 0.96),
            primary_dark: Color::from_rgb(0.10, 0.60, 0.75),

            surface: Color::from_rgb(0.07, 0.11, 0.16),
            surface_elevated: Color::from_rgb(0.09, 0.14, 0.20),
            surface_sunken: Color::from_rgb(0.05, 0.08, 0.12),
            background: Color::from_rgb(0.04, 0.07, 0.10),

            text_primary: Color::from_rgb(0.90, 0.94, 0.97),
            text_secondary: Color::from_rgb(0.62, 0.70, 0.78),
            text_muted: Color::from_rgb(0.44, 0.52, 0.60),
            text_on_primary: Color::from_rgb(0.03, 0.08, 0.12),

            accent_blue: Color::from_rgb(0.36, 0.66, 1.0),
            accent_green: Color::from_rgb(0.30, 0.85, 0.62),
            accent_yellow: Color::from_rgb(1.0, 0.80, 0.30),
            accent_red: Color::from_rgb(1.0, 0.42, 0.45),
            accent_purple: Color::from_rgb(0.70, 0.52, 1.0),

            selected: Color::from_rgb(0.08, 0.20, 0.26),
            selected_border: Color::from_rgb(0.20, 0.78, 0.92),
            hover: Color::from_rgb(0.10, 0.16, 0.22),
            user_bubble: Color::from_rgb(0.10, 0.45, 0.58),
            agent_bubble: Color::from_rgb(0.11, 0.17, 0.24),

            border_subtle: Color::from_rgb(0.13, 0.19, 0.25),
            border_medium: Color::from_rgb(0.20, 0.27, 0.34),

            shadow: Color::from_rgba(0.0, 0.0, 0.0, 0.25),
            shadow_medium: Color::from_rgba(0.0, 0.0, 0.0, 0.35),
        }
    }

    /// Gets the palette for a given theme mode.
    #[must_use]
    pub const fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Badge color of an email category.
    #[must_use]
    pub fn category(&self, category: &Category) -> Color {
        match category {
            Category::Important => self.accent_red,
            Category::ToDo => self.accent_yellow,
            Category::Newsletter => self.accent_blue,
            Category::Spam | Category::Uncategorized => self.text_muted,
            Category::Other(_) => self.accent_purple,
        }
    }
}

/// Current active palette.
pub static CURRENT: std::sync::LazyLock<std::sync::RwLock<Palette>> =
    std::sync::LazyLock::new(|| std::sync::RwLock::new(Palette::dark()));

/// Sets the current global palette.
pub fn set_theme(mode: ThemeMode) {
    if let Ok(mut palette) = CURRENT.write() {
        *palette = Palette::for_mode(mode);
    }
}

/// Gets a copy of the current palette.
#[must_use]
pub fn current() -> Palette {
    CURRENT.read().map_or_else(|_| Palette::dark(), |p| *p)
}

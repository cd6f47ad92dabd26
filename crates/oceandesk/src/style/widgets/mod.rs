//! Widget styles with rounded corners, glows and theme-aware colors.

mod buttons;
mod containers;
mod inputs;
pub mod palette;
mod shadows;

pub use buttons::{
    chip_button_selected_style, chip_button_style, danger_button_style, nav_button_selected_style,
    nav_button_style, primary_button_style, row_button_selected_style, row_button_style,
    secondary_button_style,
};
pub use containers::{
    agent_bubble_style, app_style, badge_style, card_style, dirty_card_style, error_banner_style,
    header_style, panel_style, sidebar_style, user_bubble_style,
};
pub use inputs::{editor_style, input_style, scrollable_style};

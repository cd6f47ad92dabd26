//! Email Agent screen: the chat transcript and composer.

use iced::widget::{Column, Space, button, column, container, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};

use oceandesk_api::Email;
use oceandesk_core::{ChatMessage, Role};

use crate::message::{AgentMessage, Message};
use crate::style::widgets::{
    agent_bubble_style, input_style, primary_button_style, scrollable_style,
    secondary_button_style, user_bubble_style,
};
use crate::view::common::muted;

/// Everything the chat screen shows.
#[derive(Debug, Clone)]
pub struct ChatView<'a> {
    /// Transcript, oldest first.
    pub messages: &'a [ChatMessage],
    /// Composing text.
    pub input: &'a str,
    /// A turn is in flight.
    pub awaiting: bool,
    /// Email the agent is asked about.
    pub context: Option<&'a Email>,
}

/// Renders the transcript with the composer underneath.
pub fn view_chat(chat: &ChatView<'_>) -> Element<'static, Message> {
    let bubbles: Vec<Element<'static, Message>> = chat.messages.iter().map(view_bubble).collect();

    let mut transcript = Column::with_children(bubbles).spacing(10).padding(16);
    if chat.awaiting {
        transcript = transcript.push(muted("The agent is thinking…"));
    }

    let mut page = column![
        scrollable(transcript)
            .height(Length::Fill)
            .anchor_bottom()
            .style(scrollable_style),
    ]
    .spacing(8)
    .padding(16);

    if let Some(email) = chat.context {
        page = page.push(
            row![
                muted(format!("Asking about: {} ({})", email.subject, email.sender)),
                Space::new().width(Length::Fill),
                button(text("Clear").size(12))
                    .padding([4, 10])
                    .style(secondary_button_style)
                    .on_press(Message::Agent(AgentMessage::ClearContext)),
            ]
            .align_y(Alignment::Center),
        );
    }

    let can_send = !chat.awaiting && !chat.input.trim().is_empty();
    let mut input = text_input("Ask about your inbox…", chat.input)
        .padding(12)
        .size(14)
        .style(input_style);
    if !chat.awaiting {
        input = input
            .on_input(|value| Message::Agent(AgentMessage::InputChanged(value)))
            .on_submit(Message::Agent(AgentMessage::Submit));
    }

    let send = button(text("Send").size(14))
        .padding([12, 20])
        .style(primary_button_style)
        .on_press_maybe(can_send.then_some(Message::Agent(AgentMessage::Submit)));

    page.push(row![input, send].spacing(8).align_y(Alignment::Center))
        .into()
}

fn view_bubble(message: &ChatMessage) -> Element<'static, Message> {
    let (style, push_right): (fn(&iced::Theme) -> container::Style, bool) = match message.role {
        Role::User => (user_bubble_style, true),
        Role::Agent => (agent_bubble_style, false),
    };

    let bubble = container(text(message.content.clone()).size(14))
        .padding([10, 14])
        .max_width(560.0)
        .style(style);

    let line = if push_right {
        row![Space::new().width(Length::Fill), bubble]
    } else {
        row![bubble, Space::new().width(Length::Fill)]
    };

    line.width(Length::Fill).into()
}

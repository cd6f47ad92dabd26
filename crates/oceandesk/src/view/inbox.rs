//! Inbox screen: workflow toolbar, category filter, email list and detail.

use chrono::Utc;
use iced::widget::{Column, Row, Space, button, column, container, row, scrollable, text};
use iced::{Alignment, Element, Length};

use oceandesk_api::{Category, Email, EmailId};
use oceandesk_core::{Flow, Status};

use crate::message::Message;
use crate::model::inbox::{filter_emails, snippet, timestamp_label};
use crate::style::widgets::{
    badge_style, card_style, chip_button_selected_style, chip_button_style, palette, panel_style,
    primary_button_style, row_button_selected_style, row_button_style, scrollable_style,
    secondary_button_style,
};
use crate::view::common::{BOLD, SEMIBOLD, caption, error_banner, heading, muted, placeholder};

/// One workflow button.
#[derive(Debug, Clone)]
pub struct FlowButton {
    /// Which workflow.
    pub flow: Flow,
    /// Whether it may start now.
    pub enabled: bool,
    /// Failure of its previous run.
    pub last_error: Option<String>,
}

/// Snapshot the inbox screen renders.
#[derive(Debug, Clone)]
pub struct InboxView<'a> {
    /// Full collection in server order.
    pub emails: &'a [Email],
    /// Email in the detail pane.
    pub selected: Option<EmailId>,
    /// Category restriction.
    pub filter: Option<&'a Category>,
    /// Emails per category.
    pub counts: &'a [(Category, usize)],
    /// Emails that carry action items.
    pub action_items: usize,
    /// Fetch lifecycle.
    pub status: Status,
    /// Latest fetch error.
    pub error: Option<String>,
    /// Workflow buttons.
    pub flows: Vec<FlowButton>,
}

/// Renders the inbox screen.
pub fn view_inbox(inbox: &InboxView<'_>) -> Element<'static, Message> {
    let mut page = column![view_toolbar(inbox)].spacing(12).padding(16);

    if let Some(error) = &inbox.error {
        page = page.push(error_banner(error));
    }
    for flow in &inbox.flows {
        if let Some(error) = &flow.last_error {
            page = page.push(error_banner(&format!("{} failed: {error}", flow.flow.label())));
        }
    }

    page = page.push(view_filters(inbox));

    let visible = filter_emails(inbox.emails, inbox.filter);
    let selected = inbox
        .selected
        .and_then(|id| inbox.emails.iter().find(|e| e.id == id));

    let list: Element<'static, Message> = if visible.is_empty() {
        let empty = if inbox.filter.is_some() {
            "No emails in this category."
        } else {
            "Inbox is empty. Load the mock inbox to get started."
        };
        placeholder(inbox.status, empty)
    } else {
        let rows: Vec<Element<'static, Message>> = visible
            .iter()
            .map(|email| view_email_row(email, inbox.selected == Some(email.id)))
            .collect();
        scrollable(Column::with_children(rows).spacing(2).padding(4))
            .height(Length::Fill)
            .style(scrollable_style)
            .into()
    };

    let panes = row![
        container(list)
            .width(Length::FillPortion(2))
            .height(Length::Fill)
            .style(panel_style),
        container(view_detail(selected))
            .width(Length::FillPortion(3))
            .height(Length::Fill),
    ]
    .spacing(12);

    page.push(panes).into()
}

fn view_toolbar(inbox: &InboxView<'_>) -> Element<'static, Message> {
    let mut bar = Row::new().spacing(8).align_y(Alignment::Center);

    for (index, flow) in inbox.flows.iter().enumerate() {
        let style = if index == 0 {
            secondary_button_style
        } else {
            primary_button_style
        };
        bar = bar.push(
            button(text(flow.flow.label()).size(13))
                .padding([8, 14])
                .style(style)
                .on_press_maybe(flow.enabled.then_some(Message::RunFlow(flow.flow))),
        );
    }

    bar = bar.push(Space::new().width(Length::Fill));
    bar = bar.push(muted(format!(
        "{} emails \u{00B7} {} with action items",
        inbox.emails.len(),
        inbox.action_items
    )));

    bar.into()
}

fn view_filters(inbox: &InboxView<'_>) -> Element<'static, Message> {
    let mut chips = Row::new().spacing(6).align_y(Alignment::Center);

    chips = chips.push(chip(
        format!("All {}", inbox.emails.len()),
        inbox.filter.is_none(),
        Message::FilterCategory(None),
    ));

    for (category, count) in inbox.counts {
        chips = chips.push(chip(
            format!("{category} {count}"),
            inbox.filter == Some(category),
            Message::FilterCategory(Some(category.clone())),
        ));
    }

    chips.into()
}

fn chip(label: String, active: bool, on_press: Message) -> Element<'static, Message> {
    button(text(label).size(12))
        .padding([4, 12])
        .style(if active {
            chip_button_selected_style
        } else {
            chip_button_style
        })
        .on_press(on_press)
        .into()
}

fn category_badge(category: &Category) -> Element<'static, Message> {
    let color = palette::current().category(category);
    container(text(category.to_string()).size(11).font(SEMIBOLD))
        .padding([2, 8])
        .style(badge_style(color))
        .into()
}

fn view_email_row(email: &Email, selected: bool) -> Element<'static, Message> {
    let weight = if email.is_read { SEMIBOLD } else { BOLD };
    let when = email
        .timestamp
        .map(|ts| timestamp_label(ts, Utc::now()))
        .unwrap_or_default();

    let mut top = row![
        text(email.sender.clone()).size(13).font(weight),
        Space::new().width(Length::Fill),
    ]
    .spacing(8)
    .align_y(Alignment::Center);
    if email.has_action_items() {
        top = top.push(text("\u{2691}").size(12).color(palette::current().accent_yellow));
    }
    top = top.push(muted(when));

    let content = column![
        top,
        row![
            text(email.subject.clone()).size(13),
            Space::new().width(Length::Fill),
            category_badge(&email.category),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
        muted(snippet(&email.body, 90)),
    ]
    .spacing(4);

    button(content)
        .width(Length::Fill)
        .padding([10, 12])
        .style(if selected {
            row_button_selected_style
        } else {
            row_button_style
        })
        .on_press(Message::SelectEmail(email.id))
        .into()
}

fn view_detail(email: Option<&Email>) -> Element<'static, Message> {
    let Some(email) = email else {
        return container(muted("Select an email to read it."))
            .center(Length::Fill)
            .into();
    };

    let when = email
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();

    let mut body = column![
        row![
            heading(email.subject.clone()),
            Space::new().width(Length::Fill),
            category_badge(&email.category),
        ]
        .align_y(Alignment::Center),
        muted(format!("From {}  {when}", email.sender)),
        text(email.body.clone()).size(14),
    ]
    .spacing(12);

    let items = email.action_items();
    if !items.is_empty() {
        let mut list = column![caption("Action items")].spacing(6);
        for item in items {
            let line = match item.deadline {
                Some(deadline) => format!("\u{2022} {} (due {deadline})", item.task),
                None => format!("\u{2022} {}", item.task),
            };
            list = list.push(text(line).size(13));
        }
        body = body.push(list);
    }

    body = body.push(
        button(text("\u{1F4AC} Ask the agent about this email").size(13))
            .padding([8, 14])
            .style(secondary_button_style)
            .on_press(Message::AskAbout(email.id)),
    );

    container(scrollable(body.padding(20)).style(scrollable_style))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(card_style)
        .into()
}

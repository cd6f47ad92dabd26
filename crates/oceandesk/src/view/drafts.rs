//! Drafts screen: replies the agent prepared.

use iced::widget::{
    Column, Space, button, column, container, row, scrollable, text, text_editor, text_input,
};
use iced::{Alignment, Element, Length};

use oceandesk_api::{Draft, DraftId};
use oceandesk_core::{DraftField, EditableItem, Status};

use crate::message::{DraftMessage, Message};
use crate::style::widgets::{
    badge_style, card_style, danger_button_style, dirty_card_style, editor_style, input_style,
    palette, panel_style, primary_button_style, row_button_selected_style, row_button_style,
    scrollable_style, secondary_button_style,
};
use crate::view::common::{BOLD, caption, error_banner, muted, placeholder};

/// Renders the draft list and the editor for the selected draft.
pub fn view_drafts<'a>(
    items: &[EditableItem<Draft>],
    selected: Option<DraftId>,
    body: &'a text_editor::Content,
    confirm_delete: Option<DraftId>,
    status: Status,
    error: Option<&str>,
) -> Element<'a, Message> {
    let mut page = column![].spacing(12).padding(16);

    if let Some(error) = error {
        page = page.push(error_banner(error));
    }

    let list: Element<'a, Message> = if items.is_empty() {
        placeholder(status, "No drafts yet. Run agent processing to generate replies.")
    } else {
        let rows: Vec<Element<'a, Message>> = items
            .iter()
            .map(|item| view_draft_row(item, selected == Some(item.buffer.id)))
            .collect();
        scrollable(Column::with_children(rows).spacing(2).padding(4))
            .height(Length::Fill)
            .style(scrollable_style)
            .into()
    };

    let editor = match selected.and_then(|id| items.iter().find(|i| i.buffer.id == id)) {
        Some(item) => view_editor(item, body, confirm_delete == Some(item.buffer.id)),
        None => container(muted("Select a draft to review it."))
            .center(Length::Fill)
            .into(),
    };

    page.push(
        row![
            container(list)
                .width(Length::FillPortion(2))
                .height(Length::Fill)
                .style(panel_style),
            container(editor)
                .width(Length::FillPortion(3))
                .height(Length::Fill),
        ]
        .spacing(12),
    )
    .into()
}

fn status_badge(item: &EditableItem<Draft>) -> Element<'static, Message> {
    let color = palette::current().accent_green;
    container(text(item.buffer.status.as_str().to_owned()).size(11))
        .padding([2, 8])
        .style(badge_style(color))
        .into()
}

fn view_draft_row(item: &EditableItem<Draft>, selected: bool) -> Element<'static, Message> {
    let draft = &item.buffer;
    let subject = if draft.subject.trim().is_empty() {
        "(no subject)".to_owned()
    } else {
        draft.subject.clone()
    };

    let mut title = row![text(subject).size(14).font(BOLD)]
        .spacing(8)
        .align_y(Alignment::Center);
    if item.dirty {
        title = title.push(muted("\u{25CF} unsaved"));
    }
    title = title.push(Space::new().width(Length::Fill));
    title = title.push(status_badge(item));

    let reply_to = draft
        .email_id
        .map_or_else(|| "Standalone draft".to_owned(), |id| format!("Reply to email #{id}"));

    button(column![title, muted(reply_to)].spacing(4))
        .width(Length::Fill)
        .padding([10, 12])
        .style(if selected {
            row_button_selected_style
        } else {
            row_button_style
        })
        .on_press(Message::Draft(DraftMessage::Select(draft.id)))
        .into()
}

fn view_editor<'a>(
    item: &EditableItem<Draft>,
    body: &'a text_editor::Content,
    confirming: bool,
) -> Element<'a, Message> {
    let draft = &item.buffer;
    let id = draft.id;
    let busy = item.saving || item.deleting;

    let subject = text_input("Subject", &draft.subject)
        .on_input(move |value| Message::Draft(DraftMessage::Edit(id, DraftField::Subject, value)))
        .padding(10)
        .size(14)
        .style(input_style);

    let editor = text_editor(body)
        .on_action(|action| Message::Draft(DraftMessage::BodyAction(action)))
        .height(Length::Fill)
        .padding(10)
        .size(14)
        .style(editor_style);

    let save = button(text(if item.saving { "Saving…" } else { "Save" }).size(13))
        .padding([8, 16])
        .style(primary_button_style)
        .on_press_maybe((item.dirty && !busy).then_some(Message::Draft(DraftMessage::Save(id))));
    let discard = button(text("Discard").size(13))
        .padding([8, 16])
        .style(secondary_button_style)
        .on_press_maybe(item.dirty.then_some(Message::Draft(DraftMessage::Discard(id))));

    let mut actions = row![save, discard].spacing(8).align_y(Alignment::Center);
    actions = actions.push(Space::new().width(Length::Fill));

    if confirming {
        actions = actions.push(muted("Delete this draft permanently?"));
        actions = actions.push(
            button(text("Delete").size(13))
                .padding([8, 16])
                .style(danger_button_style)
                .on_press_maybe((!busy).then_some(Message::Draft(DraftMessage::ConfirmDelete(id)))),
        );
        actions = actions.push(
            button(text("Cancel").size(13))
                .padding([8, 16])
                .style(secondary_button_style)
                .on_press(Message::Draft(DraftMessage::CancelDelete)),
        );
    } else {
        let label = if item.deleting { "Deleting…" } else { "Delete" };
        actions = actions.push(
            button(text(label).size(13))
                .padding([8, 16])
                .style(danger_button_style)
                .on_press_maybe((!busy).then_some(Message::Draft(DraftMessage::RequestDelete(id)))),
        );
    }

    let mut content = column![caption("Subject"), subject, caption("Body"), editor, actions]
        .spacing(10)
        .padding(20);
    if let Some(error) = &item.error {
        content = content.push(muted(format!("Last request failed: {error}")));
    }

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(if item.dirty {
            dirty_card_style
        } else {
            card_style
        })
        .into()
}

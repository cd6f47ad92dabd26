//! Prompt Brain screen: the templates the agent runs with.

use iced::widget::{
    Column, Space, button, column, container, row, scrollable, text, text_editor, text_input,
};
use iced::{Alignment, Element, Length};

use oceandesk_api::{Prompt, PromptId};
use oceandesk_core::{EditableItem, PromptField, Status};

use crate::message::{Message, PromptMessage};
use crate::style::widgets::{
    card_style, dirty_card_style, editor_style, input_style, panel_style, primary_button_style,
    row_button_selected_style, row_button_style, scrollable_style, secondary_button_style,
};
use crate::view::common::{BOLD, caption, error_banner, heading, muted, placeholder};

/// Renders the prompt list and the editor for the selected prompt.
pub fn view_prompts<'a>(
    items: &[EditableItem<Prompt>],
    selected: Option<PromptId>,
    template: &'a text_editor::Content,
    status: Status,
    error: Option<&str>,
) -> Element<'a, Message> {
    let mut page = column![].spacing(12).padding(16);

    if let Some(error) = error {
        page = page.push(error_banner(error));
    }

    let list: Element<'a, Message> = if items.is_empty() {
        placeholder(status, "No prompts configured on the server.")
    } else {
        let rows: Vec<Element<'a, Message>> = items
            .iter()
            .map(|item| view_prompt_row(item, selected == Some(item.buffer.id)))
            .collect();
        scrollable(Column::with_children(rows).spacing(2).padding(4))
            .height(Length::Fill)
            .style(scrollable_style)
            .into()
    };

    let editor = match selected.and_then(|id| items.iter().find(|i| i.buffer.id == id)) {
        Some(item) => view_editor(item, template),
        None => container(muted("Select a prompt to edit its template."))
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

fn view_prompt_row(item: &EditableItem<Prompt>, selected: bool) -> Element<'static, Message> {
    let prompt = &item.buffer;
    let mut title = row![text(prompt.display_name()).size(14).font(BOLD)]
        .spacing(8)
        .align_y(Alignment::Center);
    if item.dirty {
        title = title.push(muted("\u{25CF} unsaved"));
    }

    let content = column![
        title,
        muted(prompt.description.clone().unwrap_or_default()),
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
        .on_press(Message::Prompt(PromptMessage::Select(prompt.id)))
        .into()
}

fn view_editor<'a>(
    item: &EditableItem<Prompt>,
    template: &'a text_editor::Content,
) -> Element<'a, Message> {
    let prompt = &item.buffer;
    let id = prompt.id;

    let description = text_input("Description", prompt.description.as_deref().unwrap_or(""))
        .on_input(move |value| {
            Message::Prompt(PromptMessage::Edit(id, PromptField::Description, value))
        })
        .padding(10)
        .size(14)
        .style(input_style);

    let editor = text_editor(template)
        .on_action(|action| Message::Prompt(PromptMessage::TemplateAction(action)))
        .height(Length::Fill)
        .padding(10)
        .size(14)
        .style(editor_style);

    let save_label = if item.saving { "Saving…" } else { "Save" };
    let save = button(text(save_label).size(13))
        .padding([8, 16])
        .style(primary_button_style)
        .on_press_maybe(
            (item.dirty && !item.saving).then_some(Message::Prompt(PromptMessage::Save(id))),
        );
    let discard = button(text("Discard").size(13))
        .padding([8, 16])
        .style(secondary_button_style)
        .on_press_maybe(item.dirty.then_some(Message::Prompt(PromptMessage::Discard(id))));

    let mut actions = row![save, discard].spacing(8).align_y(Alignment::Center);
    if let Some(error) = &item.error {
        actions = actions.push(Space::new().width(Length::Fill));
        actions = actions.push(muted(format!("Save failed: {error}")));
    }

    let body = column![
        heading(prompt.display_name()),
        muted(prompt.name.clone()),
        caption("Description"),
        description,
        caption("Template"),
        editor,
        actions,
    ]
    .spacing(10)
    .padding(20);

    container(body)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(if item.dirty {
            dirty_card_style
        } else {
            card_style
        })
        .into()
}

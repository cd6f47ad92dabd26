//! `OceanDesk` - desktop dashboard for the Ocean AI email agent.
//!
//! Built with Rust and the iced GUI framework on top of `oceandesk-core`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod message;
mod model;
mod style;
mod view;

use std::path::PathBuf;

use anyhow::Context;
use iced::keyboard::{self, Key, Modifiers};
use iced::widget::{Space, button, column, container, row, text, text_editor};
use iced::{Alignment, Element, Length, Subscription, Task};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oceandesk_api::{ApiConfig, Category, DraftId, EmailId, HttpTransport};
use oceandesk_core::{Dashboard, DraftField, Flow, PromptField, Status, TurnOutcome};

use message::{AgentMessage, DraftMessage, KeyboardAction, Message, PromptMessage, Screen};
use model::{LiveSettings, settings};
use style::widgets::palette::{self, ThemeMode};
use style::widgets::{app_style, error_banner_style, secondary_button_style};
use view::{ChatView, FlowButton, InboxView, SidebarBadges};

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "oceandesk=debug,oceandesk_core=debug,oceandesk_api=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OceanDesk");

    let dashboard = match connect() {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    };

    iced::application(
        move || OceanDesk::new(dashboard.clone()),
        OceanDesk::update,
        OceanDesk::view,
    )
    .title("OceanDesk")
    .theme(OceanDesk::theme)
    .subscription(OceanDesk::subscription)
    .run()
}

/// Reads the backend location from the environment and builds the dashboard.
fn connect() -> anyhow::Result<Dashboard<HttpTransport>> {
    let config = ApiConfig::from_env().context("invalid backend configuration")?;
    Dashboard::connect(&config).context("cannot create the HTTP client")
}

/// Main application state.
///
/// Server data lives in the dashboard's stores; this struct only holds what
/// is purely presentational.
struct OceanDesk {
    /// Shared stores, orchestrator and chat session.
    dashboard: Dashboard<HttpTransport>,
    /// Current screen.
    screen: Screen,
    /// Email in the inbox detail pane.
    selected_email: Option<EmailId>,
    /// Inbox category restriction.
    category_filter: Option<Category>,
    /// Draft awaiting delete confirmation.
    confirm_delete: Option<DraftId>,
    /// Template of the selected prompt.
    prompt_editor: text_editor::Content,
    /// Body of the selected draft.
    draft_editor: text_editor::Content,
    /// Persisted UI settings.
    settings: LiveSettings,
    /// Where settings are stored.
    settings_path: PathBuf,
    /// Local failure unrelated to backend data (settings I/O).
    notice: Option<String>,
}

impl OceanDesk {
    /// Create new application instance.
    fn new(dashboard: Dashboard<HttpTransport>) -> (Self, Task<Message>) {
        let app = Self {
            dashboard,
            screen: Screen::Inbox,
            selected_email: None,
            category_filter: None,
            confirm_delete: None,
            prompt_editor: text_editor::Content::new(),
            draft_editor: text_editor::Content::new(),
            settings: LiveSettings::default(),
            settings_path: settings::settings_path(),
            notice: None,
        };
        app.apply_theme();

        let load = Task::perform(settings::load(app.settings_path.clone()), |result| {
            Message::SettingsLoaded(result.map_err(|e| format!("{e:#}")))
        });
        let fetch = app.fetch(Screen::Inbox);
        (app, Task::batch([load, fetch]))
    }

    /// Applies the current theme mode to the global palette.
    fn apply_theme(&self) {
        palette::set_theme(self.settings.current().theme_mode);
    }

    fn theme(&self) -> iced::Theme {
        match self.settings.current().theme_mode {
            ThemeMode::Light => iced::Theme::Light,
            ThemeMode::Dark => iced::Theme::Dark,
        }
    }

    /// Starts a fetch of the collection a screen shows.
    ///
    /// Nothing happens if the same refresh is already running.
    fn fetch(&self, screen: Screen) -> Task<Message> {
        let task = match screen {
            Screen::Inbox => self
                .dashboard
                .refresh_inbox()
                .map(|fetch| Task::perform(fetch, fetched(screen))),
            Screen::Prompts => self
                .dashboard
                .refresh_prompts()
                .map(|fetch| Task::perform(fetch, fetched(screen))),
            Screen::Drafts => self
                .dashboard
                .refresh_drafts()
                .map(|fetch| Task::perform(fetch, fetched(screen))),
            Screen::Agent => None,
        };

        task.unwrap_or_else(|| {
            debug!(?screen, "refresh already running");
            Task::none()
        })
    }

    /// Resets the template editor to the selected prompt's buffer.
    fn sync_prompt_editor(&mut self) {
        let template = self
            .dashboard
            .prompts()
            .selected_item()
            .map(|item| item.buffer.template)
            .unwrap_or_default();
        if self.prompt_editor.text() != template {
            self.prompt_editor = text_editor::Content::with_text(&template);
        }
    }

    /// Resets the body editor to the selected draft's buffer.
    fn sync_draft_editor(&mut self) {
        let body = self
            .dashboard
            .drafts()
            .selected_item()
            .map(|item| item.buffer.body)
            .unwrap_or_default();
        if self.draft_editor.text() != body {
            self.draft_editor = text_editor::Content::with_text(&body);
        }
    }

    /// Update state based on message.
    #[allow(clippy::needless_pass_by_value)]
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::NavigateTo(screen) => {
                self.screen = screen;
                if matches!(screen, Screen::Prompts | Screen::Drafts) {
                    return self.fetch(screen);
                }
            }
            Message::Refresh => return self.fetch(self.screen),
            Message::Fetched(screen, result) => match result {
                Ok(count) => {
                    debug!(?screen, count, "fetch applied");
                    match screen {
                        Screen::Prompts => self.sync_prompt_editor(),
                        Screen::Drafts => self.sync_draft_editor(),
                        Screen::Inbox | Screen::Agent => {}
                    }
                }
                Err(e) => warn!(?screen, "fetch failed: {e}"),
            },

            Message::SelectEmail(id) => self.selected_email = Some(id),
            Message::FilterCategory(category) => self.category_filter = category,
            Message::AskAbout(id) => {
                self.dashboard.chat().set_context(Some(id));
                self.screen = Screen::Agent;
            }
            Message::RunFlow(flow) => {
                let Some(run) = self.dashboard.orchestrator().run(flow) else {
                    debug!(flow = flow.label(), "flow already running");
                    return Task::none();
                };
                return Task::perform(run, move |report| {
                    Message::FlowFinished(flow, report.into_result().map_err(|e| e.to_string()))
                });
            }
            Message::FlowFinished(flow, result) => {
                match result {
                    Ok(()) => info!(flow = flow.label(), "flow finished"),
                    Err(e) => warn!(flow = flow.label(), "flow failed: {e}"),
                }
                if let Some(id) = self.selected_email
                    && self.dashboard.inbox().get(id).is_none()
                {
                    self.selected_email = None;
                }
            }

            Message::Prompt(msg) => return self.handle_prompt(msg),
            Message::Draft(msg) => return self.handle_draft(msg),
            Message::Agent(msg) => return self.handle_agent(msg),

            Message::ToggleTheme => {
                let chosen = self.settings.toggle_theme();
                self.apply_theme();
                return Task::perform(
                    settings::save(self.settings_path.clone(), chosen),
                    |result| Message::SettingsSaved(result.map_err(|e| format!("{e:#}"))),
                );
            }
            Message::SettingsLoaded(result) => match result {
                Ok(loaded) => {
                    if self.settings.apply_loaded(loaded) {
                        self.apply_theme();
                    } else {
                        debug!("theme changed before settings loaded, keeping it");
                    }
                }
                Err(e) => {
                    warn!("cannot load settings: {e}");
                    self.notice = Some(format!("Settings could not be loaded: {e}"));
                }
            },
            Message::SettingsSaved(result) => {
                if let Err(e) = result {
                    warn!("cannot save settings: {e}");
                    self.notice = Some(format!("Settings could not be saved: {e}"));
                }
            }
            Message::DismissNotice => self.notice = None,

            Message::KeyPressed(action) => return self.handle_keyboard_action(action),
            Message::Ignored => {}
        }
        Task::none()
    }

    fn handle_prompt(&mut self, msg: PromptMessage) -> Task<Message> {
        let prompts = self.dashboard.prompts().clone();
        match msg {
            PromptMessage::Select(id) => {
                if let Err(e) = prompts.select(id) {
                    warn!("{e}");
                }
                self.sync_prompt_editor();
            }
            PromptMessage::TemplateAction(action) => {
                let is_edit = action.is_edit();
                self.prompt_editor.perform(action);
                if is_edit && let Some(id) = prompts.selected() {
                    let template = self.prompt_editor.text();
                    if let Err(e) = prompts.begin_edit(id, PromptField::Template, template) {
                        warn!("{e}");
                    }
                }
            }
            PromptMessage::Edit(id, field, value) => {
                if let Err(e) = prompts.begin_edit(id, field, value) {
                    warn!("{e}");
                }
            }
            PromptMessage::Save(id) => {
                return Task::perform(prompts.save(id), move |result| {
                    Message::Prompt(PromptMessage::Saved(
                        id,
                        result.map(|_| ()).map_err(|e| e.to_string()),
                    ))
                });
            }
            PromptMessage::Saved(id, result) => match result {
                Ok(()) => info!(%id, "prompt saved"),
                Err(e) => warn!(%id, "prompt save failed: {e}"),
            },
            PromptMessage::Discard(id) => {
                if let Err(e) = prompts.discard(id) {
                    warn!("{e}");
                }
                self.sync_prompt_editor();
            }
        }
        Task::none()
    }

    fn handle_draft(&mut self, msg: DraftMessage) -> Task<Message> {
        let drafts = self.dashboard.drafts().clone();
        match msg {
            DraftMessage::Select(id) => {
                self.confirm_delete = None;
                if let Err(e) = drafts.select(id) {
                    warn!("{e}");
                }
                self.sync_draft_editor();
            }
            DraftMessage::BodyAction(action) => {
                let is_edit = action.is_edit();
                self.draft_editor.perform(action);
                if is_edit && let Some(id) = drafts.selected() {
                    let body = self.draft_editor.text();
                    if let Err(e) = drafts.begin_edit(id, DraftField::Body, body) {
                        warn!("{e}");
                    }
                }
            }
            DraftMessage::Edit(id, field, value) => {
                if let Err(e) = drafts.begin_edit(id, field, value) {
                    warn!("{e}");
                }
            }
            DraftMessage::Save(id) => {
                return Task::perform(drafts.save(id), move |result| {
                    Message::Draft(DraftMessage::Saved(
                        id,
                        result.map(|_| ()).map_err(|e| e.to_string()),
                    ))
                });
            }
            DraftMessage::Saved(id, result) => match result {
                Ok(()) => info!(%id, "draft saved"),
                Err(e) => warn!(%id, "draft save failed: {e}"),
            },
            DraftMessage::Discard(id) => {
                if let Err(e) = drafts.discard(id) {
                    warn!("{e}");
                }
                self.sync_draft_editor();
            }
            DraftMessage::RequestDelete(id) => self.confirm_delete = Some(id),
            DraftMessage::CancelDelete => self.confirm_delete = None,
            DraftMessage::ConfirmDelete(id) => {
                self.confirm_delete = None;
                return Task::perform(drafts.delete(id), move |result| {
                    Message::Draft(DraftMessage::Deleted(id, result.map_err(|e| e.to_string())))
                });
            }
            DraftMessage::Deleted(id, result) => match result {
                Ok(()) => {
                    info!(%id, "draft deleted");
                    self.sync_draft_editor();
                }
                Err(e) => warn!(%id, "draft delete failed: {e}"),
            },
        }
        Task::none()
    }

    fn handle_agent(&self, msg: AgentMessage) -> Task<Message> {
        let chat = self.dashboard.chat();
        match msg {
            AgentMessage::InputChanged(input) => chat.set_input(input),
            AgentMessage::Submit => {
                if let Some(turn) = chat.submit_input() {
                    return Task::perform(turn, |outcome| {
                        Message::Agent(AgentMessage::TurnFinished(outcome))
                    });
                }
            }
            AgentMessage::ClearContext => chat.set_context(None),
            AgentMessage::TurnFinished(outcome) => match outcome {
                TurnOutcome::Resolved => debug!("agent replied"),
                TurnOutcome::Failed => debug!("agent turn fell back"),
            },
        }
        Task::none()
    }

    fn handle_keyboard_action(&mut self, action: KeyboardAction) -> Task<Message> {
        match action {
            KeyboardAction::Refresh => self.update(Message::Refresh),
            KeyboardAction::SwitchTo(screen) => self.update(Message::NavigateTo(screen)),
            KeyboardAction::Save => match self.screen {
                Screen::Drafts => match self.dashboard.drafts().selected() {
                    Some(id) if self.dashboard.drafts().is_dirty(id) => {
                        self.handle_draft(DraftMessage::Save(id))
                    }
                    _ => Task::none(),
                },
                Screen::Prompts => match self.dashboard.prompts().selected() {
                    Some(id) if self.dashboard.prompts().is_dirty(id) => {
                        self.handle_prompt(PromptMessage::Save(id))
                    }
                    _ => Task::none(),
                },
                Screen::Inbox | Screen::Agent => Task::none(),
            },
            KeyboardAction::Cancel => {
                match self.screen {
                    Screen::Inbox => self.selected_email = None,
                    Screen::Prompts => {
                        self.dashboard.prompts().clear_selection();
                        self.sync_prompt_editor();
                    }
                    Screen::Drafts => {
                        if self.confirm_delete.take().is_none() {
                            self.dashboard.drafts().clear_selection();
                            self.sync_draft_editor();
                        }
                    }
                    Screen::Agent => self.dashboard.chat().set_context(None),
                }
                Task::none()
            }
        }
    }

    /// Render current state as UI.
    fn view(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match self.screen {
            Screen::Inbox => self.view_inbox(),
            Screen::Prompts => {
                let prompts = self.dashboard.prompts();
                view::view_prompts(
                    &prompts.items(),
                    prompts.selected(),
                    &self.prompt_editor,
                    prompts.status(),
                    prompts.error().as_deref(),
                )
            }
            Screen::Agent => self.view_agent(),
            Screen::Drafts => {
                let drafts = self.dashboard.drafts();
                view::view_drafts(
                    &drafts.items(),
                    drafts.selected(),
                    &self.draft_editor,
                    self.confirm_delete,
                    drafts.status(),
                    drafts.error().as_deref(),
                )
            }
        };

        let mut main = column![view::view_header(self.screen, self.screen_status())];
        if let Some(notice) = &self.notice {
            main = main.push(container(self.view_notice(notice)).padding([8, 16]));
        }
        main = main.push(body);

        let layout = row![
            view::view_sidebar(self.screen, self.badges(), self.settings.current().theme_mode),
            main.width(Length::Fill).height(Length::Fill),
        ];

        container(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(app_style)
            .into()
    }

    fn view_inbox(&self) -> Element<'static, Message> {
        let inbox = self.dashboard.inbox();
        let orchestrator = self.dashboard.orchestrator();
        let emails = inbox.emails();
        let counts = inbox.count_by_category();
        let loading = inbox.is_loading();

        let flows = Flow::ALL
            .iter()
            .map(|&flow| FlowButton {
                flow,
                enabled: !loading && !orchestrator.is_busy(flow),
                last_error: orchestrator.last_error(flow),
            })
            .collect();

        view::view_inbox(&InboxView {
            emails: &emails,
            selected: self.selected_email,
            filter: self.category_filter.as_ref(),
            counts: &counts,
            action_items: inbox.action_item_count(),
            status: inbox.status(),
            error: inbox.error(),
            flows,
        })
    }

    fn view_agent(&self) -> Element<'static, Message> {
        let chat = self.dashboard.chat();
        let messages = chat.messages();
        let input = chat.input();
        let context = chat.context().and_then(|id| self.dashboard.inbox().get(id));

        view::view_chat(&ChatView {
            messages: &messages,
            input: &input,
            awaiting: chat.is_awaiting(),
            context: context.as_ref(),
        })
    }

    #[allow(clippy::unused_self)]
    fn view_notice(&self, notice: &str) -> Element<'static, Message> {
        container(
            row![
                text(notice.to_owned()).size(13),
                Space::new().width(Length::Fill),
                button(text("Dismiss").size(12))
                    .padding([4, 10])
                    .style(secondary_button_style)
                    .on_press(Message::DismissNotice),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
        .width(Length::Fill)
        .padding([8, 12])
        .style(error_banner_style)
        .into()
    }

    fn screen_status(&self) -> Status {
        match self.screen {
            Screen::Inbox => self.dashboard.inbox().status(),
            Screen::Prompts => self.dashboard.prompts().status(),
            Screen::Drafts => self.dashboard.drafts().status(),
            Screen::Agent if self.dashboard.chat().is_awaiting() => Status::Loading,
            Screen::Agent => Status::Ready,
        }
    }

    fn badges(&self) -> SidebarBadges {
        SidebarBadges {
            emails: self.dashboard.inbox().len(),
            dirty_prompts: self.dashboard.prompts().dirty_ids().len(),
            dirty_drafts: self.dashboard.drafts().dirty_ids().len(),
            agent_thinking: self.dashboard.chat().is_awaiting(),
        }
    }

    /// Subscribe to keyboard events for shortcuts.
    #[allow(clippy::unused_self)] // Required signature for iced subscription
    fn subscription(&self) -> Subscription<Message> {
        keyboard::listen().map(|event| {
            if let keyboard::Event::KeyPressed { key, modifiers, .. } = event {
                handle_key_press(key, modifiers).unwrap_or(Message::Ignored)
            } else {
                Message::Ignored
            }
        })
    }
}

/// Maps a settled fetch to its message.
fn fetched(
    screen: Screen,
) -> impl FnOnce(oceandesk_core::Result<usize>) -> Message + Send + 'static {
    move |result| Message::Fetched(screen, result.map_err(|e| e.to_string()))
}

/// Handle keyboard shortcuts and return appropriate message.
fn handle_key_press(key: Key, modifiers: Modifiers) -> Option<Message> {
    let ctrl = modifiers.command(); // Ctrl on Linux/Windows, Cmd on macOS

    let action = match key {
        Key::Named(keyboard::key::Named::F5) => KeyboardAction::Refresh,
        Key::Named(keyboard::key::Named::Escape) => KeyboardAction::Cancel,
        Key::Character(c) if ctrl && c.as_str() == "s" => KeyboardAction::Save,
        Key::Character(c) if ctrl => KeyboardAction::SwitchTo(Screen::from_digit(c.as_str())?),
        _ => return None,
    };
    Some(Message::KeyPressed(action))
}

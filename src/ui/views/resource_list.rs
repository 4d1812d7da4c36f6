use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    entity::{Resource, record_id},
    event::events::Event,
    list::{self, DeleteFlow, DeleteState, FetchRequest, ListController},
    query::{FilterChange, FilterSchema, FilterValue},
    ui::{
        components::{
            confirm::ConfirmDialog,
            prompt::{Prompt, PromptOutcome},
            spinner::{self, Spinner},
        },
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::truncate,
    },
    util::{colors, task::TaskManager},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Search,
    Filter,
}

/// Paginated table of one resource, driven entirely by its location.
pub struct ResourceList {
    controller: ListController,
    table_state: TableState,
    deletion: DeleteFlow,
    prompt: Option<(PromptKind, Prompt)>,
    tasks: TaskManager,
}

impl ResourceList {
    pub fn new(resource: Resource) -> Self {
        Self {
            controller: ListController::new(resource),
            table_state: TableState::default(),
            deletion: DeleteFlow::new(resource),
            prompt: None,
            tasks: TaskManager::new(),
        }
    }

    fn resource(&self) -> Resource {
        self.controller.resource()
    }

    fn fetch(&mut self, request: Option<FetchRequest>, ctx: &AppContext) {
        let Some(request) = request else {
            return;
        };

        let api = ctx.api.clone();
        let tx = ctx.event_tx.clone();
        self.tasks.spawn(
            "list_fetch",
            tokio::spawn(async move {
                let result = list::fetch_page(api.as_ref(), &request).await;
                let _ = tx.send(Event::ListFetched {
                    ticket: request.ticket,
                    result,
                });
            }),
        );
    }

    fn apply(&mut self, change: FilterChange, ctx: &AppContext) {
        let request = self.controller.apply_filter(&change, &ctx.cache);
        self.table_state.select(None);
        self.fetch(request, ctx);
    }

    fn selected_id(&self) -> Option<String> {
        let index = self.table_state.selected()?;
        let row = self.controller.row(index)?;
        record_id(row).map(str::to_string)
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: String, ctx: &AppContext) {
        let change = match kind {
            PromptKind::Search if input.trim().is_empty() => FilterChange::new().clear("q"),
            PromptKind::Search => FilterChange::new().set("q", FilterValue::Text(input.trim().to_string())),
            PromptKind::Filter => {
                match parse_filter_input(self.resource().filter_schema(), &input) {
                    Some(change) => change,
                    None => {
                        ctx.notifier.error(format!("Invalid filter: {input}"));
                        return;
                    }
                }
            }
        };
        self.apply(change, ctx);
    }

    fn confirm_delete(&mut self, ctx: &AppContext) {
        let Some(id) = self.deletion.confirm() else {
            return;
        };

        let resource = self.resource();
        let api = ctx.api.clone();
        let cache = ctx.cache.clone();
        let notifier = ctx.notifier.clone();
        let tx = ctx.event_tx.clone();
        self.tasks.spawn(
            "delete",
            tokio::spawn(async move {
                let event = match list::delete_record(api.as_ref(), &cache, &notifier, resource, &id).await {
                    Ok(()) => Event::RecordDeleted { resource, id },
                    Err(_) => Event::DeleteFailed { resource, id },
                };
                let _ = tx.send(event);
            }),
        );
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.controller.rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table_state.select(Some(next as usize));
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let location = self.controller.location();
        let filters: Vec<Span> = if self.controller.query().filter.is_empty() {
            vec![Span::styled("no filters", Style::default().fg(colors::MUTED))]
        } else {
            self.controller
                .query()
                .filter
                .iter()
                .flat_map(|(key, value)| {
                    [
                        Span::styled(format!("{key}="), Style::default().fg(colors::MUTED)),
                        Span::styled(format!("{}  ", value.encode()), Style::default().fg(colors::ACCENT)),
                    ]
                })
                .collect()
        };

        let lines = vec![
            Line::from(filters),
            Line::from(Span::styled(
                format!("?{location}"),
                Style::default().fg(colors::NEUTRAL),
            )),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let columns = self.resource().columns();

        if self.controller.rows().is_empty() {
            let message = if self.controller.is_loading() {
                None
            } else if let Some(error) = self.controller.error() {
                Some(Span::styled(error.to_string(), Style::default().fg(colors::DANGER)))
            } else {
                Some(Span::styled("No records", Style::default().fg(colors::MUTED)))
            };

            match message {
                Some(message) => f.render_widget(Paragraph::new(Line::from(message)).centered(), area),
                None => f.render_widget(
                    Spinner::default()
                        .with_style(Style::default().fg(colors::PRIMARY))
                        .with_label(format!("Loading {}...", self.resource().path())),
                    area,
                ),
            }
            return;
        }

        let header = Row::new(
            columns
                .iter()
                .map(|c| Cell::from(c.title).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().fg(colors::PRIMARY));

        let rows: Vec<Row> = self
            .controller
            .rows()
            .iter()
            .map(|record| {
                Row::new(columns.iter().map(|column| {
                    let text = column.cell(record);
                    Cell::from(truncate(&text, usize::from(column.width)))
                }))
            })
            .collect();

        let widths: Vec<Constraint> = columns.iter().map(|c| Constraint::Length(c.width)).collect();
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .row_highlight_style(
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        if self.table_state.selected().is_none() {
            self.table_state.select(Some(0));
        }
        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        if let Some((_, prompt)) = &self.prompt {
            prompt.render(f, area);
            return;
        }

        let pagination = self.controller.pagination();
        let total = pagination
            .total
            .map(|t| format!("{t} total"))
            .unwrap_or_else(|| "-".to_string());
        let mut spans = vec![Span::raw(format!(
            "Page {} of {}  ·  {} per page  ·  {}",
            pagination.page,
            pagination.page_count(),
            pagination.limit,
            total
        ))];
        if self.controller.is_loading() && !self.controller.rows().is_empty() {
            spans.push(Span::styled(
                format!("  {} refreshing", spinner::frame()),
                Style::default().fg(colors::MUTED),
            ));
        }
        if let Some(error) = self.controller.error() {
            spans.push(Span::styled(format!("  {error}"), Style::default().fg(colors::DANGER)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Reads `key=value` into a filter change. An empty value clears the key;
/// `None` when the value does not fit the key's type.
pub fn parse_filter_input(schema: &FilterSchema, input: &str) -> Option<FilterChange> {
    let (key, raw) = input.trim().split_once('=')?;
    let key = key.trim();
    let raw = raw.trim();
    if key.is_empty() {
        return None;
    }
    if raw.is_empty() {
        return Some(FilterChange::new().clear(key));
    }

    let value = FilterValue::decode(schema.coercion_for(key), raw)?;
    Some(FilterChange::new().set(key, value))
}

#[async_trait]
impl View for ResourceList {
    async fn on_mount(&mut self, ctx: &AppContext) {
        let location = self.controller.location().to_string();
        let request = self.controller.navigate(&location, &ctx.cache);
        self.fetch(request, ctx);
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(f, header);
        self.render_table(f, body);
        self.render_footer(f, footer);

        match self.deletion.state() {
            DeleteState::Idle => {}
            DeleteState::Confirming(id) | DeleteState::InFlight(id) => {
                let message = format!("Delete {} {id}? This cannot be undone.", self.resource().singular());
                let dialog = ConfirmDialog::new(" Delete ", &message).busy(self.deletion.is_in_flight());
                f.render_widget(dialog, area);
            }
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if let Some((kind, prompt)) = &mut self.prompt {
            let kind = *kind;
            match prompt.handle_key(key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancel => self.prompt = None,
                PromptOutcome::Submit(input) => {
                    self.prompt = None;
                    self.submit_prompt(kind, input, ctx);
                }
            }
            return Some(Action::None);
        }

        if self.deletion.is_confirming() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(ctx),
                KeyCode::Char('n') | KeyCode::Esc => self.deletion.cancel(),
                _ => {}
            }
            return Some(Action::None);
        }
        if self.deletion.is_in_flight() {
            return Some(Action::None);
        }

        let pagination = self.controller.pagination();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => {
                let len = self.controller.rows().len();
                self.table_state.select(len.checked_sub(1));
            }
            KeyCode::Enter => {
                return self.selected_id().map(|id| Action::OpenRecord {
                    resource: self.resource(),
                    id,
                });
            }
            KeyCode::Char('a') => return Some(Action::CreateRecord(self.resource())),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.deletion.request(id);
                }
            }
            KeyCode::Char('n') | KeyCode::Right if pagination.has_next() => {
                let request = self.controller.change_page(pagination.page + 1, &ctx.cache);
                self.table_state.select(None);
                self.fetch(request, ctx);
            }
            KeyCode::Char('p') | KeyCode::Left if pagination.has_previous() => {
                let request = self.controller.change_page(pagination.page - 1, &ctx.cache);
                self.table_state.select(None);
                self.fetch(request, ctx);
            }
            KeyCode::Char('/') => {
                let current = match self.controller.query().filter.get("q") {
                    Some(FilterValue::Text(q)) => q.clone(),
                    _ => String::new(),
                };
                self.prompt = Some((PromptKind::Search, Prompt::new("Search", current)));
            }
            KeyCode::Char(':') | KeyCode::Char('f') => {
                self.prompt = Some((PromptKind::Filter, Prompt::new("Filter (key=value)", "")));
            }
            KeyCode::Char('r') => {
                let request = self.controller.reset_filter(&ctx.cache);
                self.table_state.select(None);
                self.fetch(request, ctx);
            }
            KeyCode::Char('R') => {
                ctx.cache.invalidate(self.resource());
                let request = self.controller.refresh(&ctx.cache);
                self.fetch(request, ctx);
            }
            _ => return None,
        }
        Some(Action::None)
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        match event {
            Event::ListFetched { ticket, result } if ticket.resource == self.resource() => {
                if self.controller.on_fetched(ticket, result.clone(), &ctx.cache) {
                    let len = self.controller.rows().len();
                    if self.table_state.selected().is_some_and(|i| i >= len) {
                        self.table_state.select(len.checked_sub(1));
                    }
                }
            }
            Event::RecordDeleted { resource, .. } if *resource == self.resource() => {
                self.deletion.finish();
                let request = self.controller.refresh(&ctx.cache);
                self.fetch(request, ctx);
            }
            Event::DeleteFailed { resource, .. } if *resource == self.resource() => {
                self.deletion.finish();
            }
            Event::RecordSaved { resource, .. } if *resource == self.resource() => {
                let request = self.controller.refresh(&ctx.cache);
                self.fetch(request, ctx);
            }
            _ => {}
        }
    }

    fn hints(&self) -> &'static str {
        "j/k move · enter open · a add · d delete · n/p page · / search · f filter · r reset"
    }
}

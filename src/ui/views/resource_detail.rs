use std::path::PathBuf;

use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};
use tracing::debug;

use crate::{
    entity::Resource,
    event::events::Event,
    form::{
        self, ChangeTracker, FieldKind, FieldSpec, FieldValue, LocalFile, UploadDescriptor,
    },
    list::{self, RefOption, label_for, search_options},
    ui::{
        components::{
            prompt::{Prompt, PromptOutcome},
            spinner::Spinner,
        },
        context::AppContext,
        state::AppState,
        traits::{Action, View},
    },
    util::{colors, date, task::TaskManager},
};

const MATCHES_SHOWN: usize = 5;

struct FieldEditor {
    field: &'static FieldSpec,
    prompt: Prompt,
}

/// Edit or create form for one record.
pub struct ResourceDetail {
    resource: Resource,
    id: Option<String>,
    tracker: ChangeTracker,
    is_loading: bool,
    load_error: Option<String>,
    list_state: ListState,
    editor: Option<FieldEditor>,
    tasks: TaskManager,
}

impl ResourceDetail {
    pub fn edit(resource: Resource, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            is_loading: true,
            ..Self::create(resource)
        }
    }

    pub fn create(resource: Resource) -> Self {
        Self {
            resource,
            id: None,
            tracker: ChangeTracker::new(resource.form_schema()),
            is_loading: false,
            load_error: None,
            list_state: ListState::default().with_selected(Some(0)),
            editor: None,
            tasks: TaskManager::new(),
        }
    }

    fn fields(&self) -> &'static [FieldSpec] {
        self.tracker.schema().fields
    }

    fn selected_field(&self) -> Option<&'static FieldSpec> {
        self.fields().get(self.list_state.selected()?)
    }

    fn options(ctx: &AppContext, kind: FieldKind) -> Vec<RefOption> {
        match kind {
            FieldKind::Choice(key) | FieldKind::MultiChoice(key) => {
                ctx.cache.reference(key).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    fn begin_edit(&mut self, ctx: &AppContext) {
        let Some(field) = self.selected_field() else {
            return;
        };
        if self.tracker.is_locked(field.name) {
            ctx.notifier.info(format!("{} cannot be changed on this record", field.label));
            return;
        }

        let initial = match (field.kind, self.tracker.value(field.name)) {
            (FieldKind::Bool, current) => {
                let next = !matches!(current, FieldValue::Bool(true));
                self.set_field(field.name, FieldValue::Bool(next), ctx);
                return;
            }
            (FieldKind::Date, FieldValue::Date(d)) => date::format_day(d),
            (FieldKind::Choice(_) | FieldKind::MultiChoice(_) | FieldKind::Upload(_), _) => String::new(),
            (_, current) => current.display(),
        };

        let label = match field.kind {
            FieldKind::Date => format!("{} (YYYY-MM-DD)", field.label),
            FieldKind::MultiChoice(_) => format!("{} (toggle)", field.label),
            FieldKind::Upload(kind) => format!("{} ({kind} path)", field.label),
            _ => field.label.to_string(),
        };
        self.editor = Some(FieldEditor {
            field,
            prompt: Prompt::new(label, initial),
        });
    }

    fn finish_edit(&mut self, field: &'static FieldSpec, input: String, ctx: &AppContext) {
        if let FieldKind::Upload(kind) = field.kind {
            self.start_upload(field, kind, input, ctx);
            return;
        }

        let options = Self::options(ctx, field.kind);
        match parse_field_input(field.kind, &input, &options, self.tracker.value(field.name)) {
            Ok(value) => self.set_field(field.name, value, ctx),
            Err(message) => ctx.notifier.error(message),
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue, ctx: &AppContext) {
        if let Err(err) = self.tracker.set_field(name, value) {
            ctx.notifier.error(err.to_string());
        }
    }

    fn start_upload(&mut self, field: &'static FieldSpec, kind: form::UploadKind, input: String, ctx: &AppContext) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let path = PathBuf::from(input);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string());

        let mut descriptor = match self.tracker.value(field.name) {
            FieldValue::Upload(existing) => existing.clone(),
            _ => UploadDescriptor::default(),
        };
        let uid = descriptor.begin(name);
        self.set_field(field.name, FieldValue::Upload(descriptor), ctx);

        let api = ctx.api.clone();
        let tx = ctx.event_tx.clone();
        let field_name = field.name.to_string();
        self.tasks.spawn(
            format!("upload:{}", field.name),
            tokio::spawn(async move {
                let result = match LocalFile::read(&path).await {
                    Ok(file) => form::upload_file(api.as_ref(), kind, &file).await,
                    Err(err) => Err(format!("Cannot read {}: {err}", path.display())),
                };
                let _ = tx.send(Event::UploadFinished {
                    field: field_name,
                    uid,
                    result,
                });
            }),
        );
    }

    fn save(&mut self, ctx: &AppContext) {
        let submission = match self.tracker.submit() {
            Ok(Some(submission)) => submission,
            Ok(None) => return,
            Err(err) => {
                ctx.notifier.error(err.to_string());
                return;
            }
        };

        let resource = self.resource;
        let api = ctx.api.clone();
        let cache = ctx.cache.clone();
        let notifier = ctx.notifier.clone();
        let tx = ctx.event_tx.clone();
        self.tasks.spawn(
            "save",
            tokio::spawn(async move {
                let event = match form::send_submission(api.as_ref(), resource, &submission).await {
                    Ok(saved) => {
                        cache.invalidate(resource);
                        notifier.success("Saved");
                        Event::RecordSaved { resource, saved }
                    }
                    Err(error) => {
                        notifier.error(error.to_string());
                        Event::SaveFailed { resource, error }
                    }
                };
                let _ = tx.send(event);
            }),
        );
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.fields().len() as isize;
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        self.list_state.select(Some((current + delta).clamp(0, len - 1) as usize));
    }

    fn value_text(&self, field: &FieldSpec, ctx: &AppContext) -> String {
        let value = self.tracker.value(field.name);
        match (field.kind, value) {
            (FieldKind::Choice(_), FieldValue::Text(id)) => {
                let options = Self::options(ctx, field.kind);
                label_for(&options, id).to_string()
            }
            (FieldKind::MultiChoice(_), FieldValue::List(ids)) => {
                let options = Self::options(ctx, field.kind);
                ids.iter()
                    .map(|id| label_for(&options, id))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
            (FieldKind::Upload(_), FieldValue::Upload(_)) => value.display(),
            (FieldKind::Upload(_), _) => self.tracker.preview(field.name).unwrap_or_default().to_string(),
            _ => value.display(),
        }
    }

    fn render_heading(&self, f: &mut Frame, area: Rect) {
        let title = match &self.id {
            Some(id) => format!("Edit {} {id}", self.resource.singular()),
            None => format!("New {}", self.resource.singular()),
        };
        let snapshot = self.tracker.snapshot();
        let stamps = [("created", snapshot.created_at), ("updated", snapshot.updated_at)]
            .into_iter()
            .filter_map(|(label, at)| at.map(|at| format!("{label} {}", date::display_date(&at))))
            .collect::<Vec<_>>()
            .join("  ·  ");

        let lines = vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(stamps, Style::default().fg(colors::MUTED))),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_fields(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let label_width = self.fields().iter().map(|s| s.label.len()).max().unwrap_or(0) + 2;
        let items: Vec<ListItem> = self
            .fields()
            .iter()
            .map(|field| {
                let changed = self.tracker.changes().contains_key(field.name);
                let marker = if field.required { "*" } else { " " };
                let locked = self.tracker.is_locked(field.name);
                let value_style = if changed {
                    Style::default().fg(colors::ACCENT)
                } else if locked {
                    Style::default().fg(colors::MUTED)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<label_width$}", format!("{}{marker}", field.label)),
                        Style::default().fg(colors::MUTED),
                    ),
                    Span::styled(self.value_text(field, ctx), value_style),
                    Span::styled(if changed { "  ●" } else { "" }, Style::default().fg(colors::ACCENT)),
                    Span::styled(if locked { "  (locked)" } else { "" }, Style::default().fg(colors::MUTED)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        if let Some(editor) = &self.editor {
            let [prompt_area, matches_area] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
            editor.prompt.render(f, prompt_area);

            if let FieldKind::Choice(_) | FieldKind::MultiChoice(_) = editor.field.kind {
                let options = Self::options(ctx, editor.field.kind);
                let lines: Vec<Line> = search_options(&options, editor.prompt.input())
                    .into_iter()
                    .take(MATCHES_SHOWN)
                    .enumerate()
                    .map(|(i, option)| {
                        let style = if i == 0 {
                            Style::default().fg(colors::PRIMARY)
                        } else {
                            Style::default().fg(colors::MUTED)
                        };
                        Line::from(Span::styled(format!("  {}", option.label), style))
                    })
                    .collect();
                f.render_widget(Paragraph::new(lines), matches_area);
            }
            return;
        }

        let line = if self.tracker.is_submitting() {
            Line::from(Span::styled("Saving...", Style::default().fg(colors::MUTED)))
        } else if self.tracker.controls_visible() {
            Line::from(vec![
                Span::styled("s", Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" save   "),
                Span::styled("x", Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" reset   "),
                Span::styled(
                    format!("{} unsaved", self.tracker.changes().len()),
                    Style::default().fg(colors::ACCENT),
                ),
            ])
        } else {
            Line::default()
        };
        f.render_widget(Paragraph::new(line), area);
    }
}

/// Turns prompt input into a field value. Selection fields take the best
/// fuzzy match among `options`; a multi-choice toggles it in `current`.
pub fn parse_field_input(
    kind: FieldKind,
    input: &str,
    options: &[RefOption],
    current: &FieldValue,
) -> Result<FieldValue, String> {
    let input = input.trim();
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(input.to_string())),
        FieldKind::Number if input.is_empty() => Ok(FieldValue::Empty),
        FieldKind::Number => input
            .parse::<f64>()
            .map(FieldValue::Number)
            .map_err(|_| format!("{input} is not a number")),
        FieldKind::Bool => Ok(FieldValue::Bool(input != "false")),
        FieldKind::Date if input.is_empty() => Ok(FieldValue::Empty),
        FieldKind::Date => date::parse_day(input)
            .map(FieldValue::Date)
            .ok_or_else(|| format!("{input} is not a YYYY-MM-DD date")),
        FieldKind::Choice(_) if input.is_empty() => Ok(FieldValue::Empty),
        FieldKind::Choice(_) => pick(options, input).map(FieldValue::Text),
        FieldKind::MultiChoice(_) => {
            let mut ids = match current {
                FieldValue::List(ids) => ids.clone(),
                _ => Vec::new(),
            };
            if input.is_empty() {
                return Ok(FieldValue::List(ids));
            }
            let id = pick(options, input)?;
            match ids.iter().position(|existing| *existing == id) {
                Some(index) => {
                    ids.remove(index);
                }
                None => ids.push(id),
            }
            Ok(FieldValue::List(ids))
        }
        FieldKind::Upload(_) => Err("uploads take a file path".to_string()),
    }
}

fn pick(options: &[RefOption], input: &str) -> Result<String, String> {
    if options.is_empty() {
        return Ok(input.to_string());
    }
    search_options(options, input)
        .first()
        .map(|option| option.value.clone())
        .ok_or_else(|| format!("Nothing matches {input}"))
}

#[async_trait]
impl View for ResourceDetail {
    async fn on_mount(&mut self, ctx: &AppContext) {
        let references = self.tracker.schema().references();
        if !references.is_empty() {
            let api = ctx.api.clone();
            let cache = ctx.cache.clone();
            let notifier = ctx.notifier.clone();
            let tx = ctx.event_tx.clone();
            let resource = self.resource;
            self.tasks.spawn(
                "references",
                tokio::spawn(async move {
                    for (key, err) in list::load_references(api.as_ref(), &cache, &references).await {
                        notifier.error(format!("Could not load {}: {err}", key.cache_key()));
                    }
                    let _ = tx.send(Event::ReferencesLoaded(resource));
                }),
            );
        }

        let Some(id) = self.id.clone() else {
            return;
        };
        self.is_loading = true;
        let api = ctx.api.clone();
        let tx = ctx.event_tx.clone();
        let resource = self.resource;
        self.tasks.spawn(
            "record",
            tokio::spawn(async move {
                let result = api.get(resource, &id).await;
                let _ = tx.send(Event::RecordFetched { resource, id, result });
            }),
        );
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        if self.is_loading {
            f.render_widget(
                Spinner::default()
                    .with_style(Style::default().fg(colors::PRIMARY))
                    .with_label(format!("Loading {}...", self.resource.singular())),
                area,
            );
            return;
        }
        if let Some(error) = &self.load_error {
            f.render_widget(
                Paragraph::new(Span::styled(error.clone(), Style::default().fg(colors::DANGER))).centered(),
                area,
            );
            return;
        }

        let footer_height = if self.editor.is_some() { 1 + MATCHES_SHOWN as u16 } else { 1 };
        let [heading, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(footer_height),
        ])
        .areas(area);

        self.render_heading(f, heading);
        self.render_fields(f, body, ctx);
        self.render_footer(f, footer, ctx);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if let Some(editor) = &mut self.editor {
            match editor.prompt.handle_key(key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancel => self.editor = None,
                PromptOutcome::Submit(input) => {
                    let field = editor.field;
                    self.editor = None;
                    self.finish_edit(field, input, ctx);
                }
            }
            return Some(Action::None);
        }

        if self.is_loading || self.load_error.is_some() {
            return None;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter | KeyCode::Char('e') => self.begin_edit(ctx),
            KeyCode::Left | KeyCode::Char('h') if !self.tracker.controls_visible() => {
                return Some(Action::Back);
            }
            KeyCode::Char('s') if self.tracker.controls_visible() => self.save(ctx),
            KeyCode::Char('x') if self.tracker.controls_visible() && !self.tracker.is_submitting() => {
                self.tracker.reset()
            }
            _ => return None,
        }
        Some(Action::None)
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        match event {
            Event::RecordFetched { resource, id, result }
                if *resource == self.resource && self.id.as_deref() == Some(id.as_str()) =>
            {
                self.is_loading = false;
                match result {
                    Ok(record) => {
                        self.tracker.load_record(record);
                        self.load_error = None;
                    }
                    Err(err) => self.load_error = Some(err.to_string()),
                }
            }
            Event::RecordSaved { resource, saved } if *resource == self.resource && self.tracker.is_submitting() => {
                self.tracker.submit_succeeded(saved.as_ref());
                self.id = self.tracker.snapshot().id.clone();
                debug!(resource = %self.resource, id = ?self.id, "form saved");
                if self.tracker.created_without_id() {
                    ctx.notifier.info(format!("{} created; open it from the list to edit", self.resource.singular()));
                    let _ = ctx.event_tx.send(Event::Back);
                }
            }
            Event::SaveFailed { resource, .. } if *resource == self.resource && self.tracker.is_submitting() => {
                self.tracker.submit_failed();
            }
            Event::UploadFinished { field, uid, result } => {
                let FieldValue::Upload(mut descriptor) = self.tracker.value(field).clone() else {
                    return;
                };
                if !descriptor.file_list.iter().any(|f| f.uid == *uid) {
                    return;
                }
                match result {
                    Ok(response) => descriptor.complete(*uid, response.clone()),
                    Err(message) => {
                        descriptor.fail(*uid);
                        ctx.notifier.error(message.clone());
                    }
                }
                self.set_field(field, FieldValue::Upload(descriptor), ctx);
            }
            _ => {}
        }
    }

    fn hints(&self) -> &'static str {
        "j/k move · enter edit · s save · x reset · h/esc back"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ReferenceKey;

    fn artists() -> Vec<RefOption> {
        vec![
            RefOption { value: "a1".into(), label: "Nina Simone".into() },
            RefOption { value: "a2".into(), label: "Miles Davis".into() },
        ]
    }

    #[test]
    fn multi_choice_toggles_best_match() {
        let kind = FieldKind::MultiChoice(ReferenceKey::Artists);
        let options = artists();

        let added = parse_field_input(kind, "miles", &options, &FieldValue::Empty).unwrap();
        assert_eq!(added, FieldValue::List(vec!["a2".into()]));

        let removed = parse_field_input(kind, "miles", &options, &added).unwrap();
        assert_eq!(removed, FieldValue::List(vec![]));
    }

    #[test]
    fn choice_without_loaded_options_takes_raw_id() {
        let kind = FieldKind::Choice(ReferenceKey::Categories);
        assert_eq!(
            parse_field_input(kind, "c9", &[], &FieldValue::Empty).unwrap(),
            FieldValue::Text("c9".into())
        );
        assert_eq!(
            parse_field_input(kind, " ", &[], &FieldValue::Text("c9".into())).unwrap(),
            FieldValue::Empty
        );
    }

    #[test]
    fn typed_fields_are_parsed() {
        assert_eq!(
            parse_field_input(FieldKind::Number, "3", &[], &FieldValue::Empty).unwrap(),
            FieldValue::Number(3.0)
        );
        assert!(parse_field_input(FieldKind::Number, "three", &[], &FieldValue::Empty).is_err());
        assert_eq!(
            parse_field_input(FieldKind::Date, "2024-05-06", &[], &FieldValue::Empty).unwrap(),
            FieldValue::Date(date::parse_day("2024-05-06").unwrap())
        );
        assert!(parse_field_input(FieldKind::Date, "06/05/2024", &[], &FieldValue::Empty).is_err());
    }
}

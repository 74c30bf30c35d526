//! ratatui-based UI.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context as _;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use ratatui_image::picker::{Picker, cap_parser::QueryStdioOptions};
use readtrack_application::{
    AppContext, LibraryError, LookupCoordinator, LookupPhase, LookupStatus, SharedCatalogApi,
    StatusLevel, StatusMessage,
};
use readtrack_core::{Book, BookDraft, Theme, progress_string};
use unicode_width::UnicodeWidthStr;

mod cover;

use cover::CoverCache;

#[derive(Debug)]
pub struct UiOutcome {
    pub ctx: AppContext,
}

pub struct Ui {
    ctx: AppContext,
    api: SharedCatalogApi,
    form: Option<BookForm>,
    confirm_delete: Option<usize>,
    image_picker: Picker,
    cover: CoverCache,
}

impl Ui {
    pub fn new(mut ctx: AppContext, api: SharedCatalogApi) -> Self {
        ctx.clamp_selection();
        Self {
            ctx,
            api,
            form: None,
            confirm_delete: None,
            image_picker: Picker::halfblocks(),
            cover: CoverCache::default(),
        }
    }

    pub fn run(mut self) -> anyhow::Result<UiOutcome> {
        let mut terminal = setup_terminal()?;
        let options = QueryStdioOptions {
            timeout: Duration::from_millis(250),
            text_sizing_protocol: false,
        };
        self.image_picker =
            Picker::from_query_stdio_with_options(options).unwrap_or_else(|_| Picker::halfblocks());
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(())), Ok(())) => Ok(UiOutcome { ctx: self.ctx }),
            (Ok(Ok(())), Err(err)) => Err(err),
            (Ok(Err(err)), _) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn accent_color(&self) -> Color {
        match self.ctx.library.theme() {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::Yellow,
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let tick_rate = Duration::from_millis(100);
        let mut needs_redraw = true;

        loop {
            if self.poll_lookup() {
                needs_redraw = true;
            }
            if self.ctx.library.take_refresh() {
                self.ctx.clamp_selection();
                needs_redraw = true;
            }

            if needs_redraw {
                terminal.draw(|frame| self.draw(frame.area(), frame))?;
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }

                    needs_redraw = true;

                    let quit = if self.form.is_some() {
                        self.handle_form_key(key);
                        false
                    } else if self.confirm_delete.is_some() {
                        self.handle_confirm_delete_key(key);
                        false
                    } else {
                        self.handle_main_key(key)
                    };
                    if quit {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Applies a finished lookup to the open dialog, on this thread.
    fn poll_lookup(&mut self) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        match form.lookup.poll() {
            Some(status) => {
                form.apply_lookup(status);
                true
            }
            None => false,
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.ctx.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.ctx.select_prev(),
            KeyCode::Home => self.ctx.selected = 0,
            KeyCode::End => self.ctx.selected = self.ctx.library.len().saturating_sub(1),
            KeyCode::Char('a') => {
                self.form = Some(BookForm::new(
                    FormMode::Add,
                    BookDraft::default(),
                    self.api.clone(),
                ));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(book) = self.ctx.selected_book() {
                    let draft = BookDraft::from_book(book);
                    self.form = Some(BookForm::new(
                        FormMode::Edit(self.ctx.selected),
                        draft,
                        self.api.clone(),
                    ));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if self.ctx.selected_book().is_some() {
                    self.confirm_delete = Some(self.ctx.selected);
                }
            }
            KeyCode::Char('t') => {
                let theme = self.ctx.library.toggle_theme();
                self.ctx.status = Some(StatusMessage::info(format!("Theme: {theme}")));
            }
            _ => {}
        }
        false
    }

    fn handle_confirm_delete_key(&mut self, key: KeyEvent) {
        let Some(index) = self.confirm_delete else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.confirm_delete = None;
                let result = self.ctx.library.remove_at(index);
                let done = match &result {
                    Ok(book) => format!("Deleted \"{}\"", book.title),
                    Err(_) => String::new(),
                };
                self.ctx.report(result.map(|_| ()), done);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => {
                    if let Some(field) = form.text_field_mut() {
                        field.clear();
                    }
                }
                KeyCode::Char('l') => form.start_lookup(),
                KeyCode::Char('s') => self.submit_form(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                // Dropping the form drops its coordinator; a running lookup's
                // result is discarded.
                self.form = None;
            }
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Enter => {
                if form.focus == FormField::Isbn {
                    form.start_lookup();
                } else {
                    self.submit_form();
                }
            }
            KeyCode::Left | KeyCode::Right if form.focus == FormField::Mode => {
                form.draft.track_chapters = !form.draft.track_chapters;
            }
            KeyCode::Char(' ') if form.focus == FormField::Mode => {
                form.draft.track_chapters = !form.draft.track_chapters;
            }
            KeyCode::Backspace => {
                if let Some(field) = form.text_field_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                if let Some(field) = form.text_field_mut() {
                    field.push(ch);
                }
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let book = match form.draft.to_book() {
            Ok(book) => book,
            Err(err) => {
                form.error = Some(err.to_string());
                return;
            }
        };

        let title = book.title.clone();
        let (result, done) = match form.mode {
            FormMode::Add => {
                let result = self.ctx.library.append(book);
                if !matches!(result, Err(LibraryError::Invalid(_))) {
                    self.ctx.selected = self.ctx.library.len().saturating_sub(1);
                }
                (result, format!("Added \"{title}\""))
            }
            FormMode::Edit(index) => (
                self.ctx.library.replace(index, book).map(|_| ()),
                format!("Updated \"{title}\""),
            ),
        };

        if let Err(LibraryError::Invalid(err)) = &result {
            form.error = Some(err.to_string());
            return;
        }
        self.form = None;
        self.ctx.report(result, done);
    }

    fn draw(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        frame.render_widget(Clear, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new(Text::from(self.header_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, layout[0]);

        let body_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        self.draw_library(frame, body_layout[0]);
        self.draw_details(frame, body_layout[1]);

        let footer = Paragraph::new(Text::from(self.footer_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[2]);

        if self.form.is_some() {
            self.draw_form(area, frame);
        }

        if self.confirm_delete.is_some() {
            self.draw_confirm_delete(area, frame);
        }
    }

    fn header_lines(&self) -> Vec<Line<'static>> {
        let count = self.ctx.library.len();
        vec![Line::from(vec![
            Span::styled(
                "Reading Tracker",
                Style::default()
                    .fg(self.accent_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  {count} book{}  ·  {} theme",
                if count == 1 { "" } else { "s" },
                self.ctx.library.theme()
            )),
        ])]
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(vec![
            Span::styled("a", bold),
            Span::raw(" add  "),
            Span::styled("e/Enter", bold),
            Span::raw(" edit  "),
            Span::styled("d", bold),
            Span::raw(" delete  "),
            Span::styled("t", bold),
            Span::raw(" theme  "),
            Span::styled("q", bold),
            Span::raw(" quit"),
        ])];
        if let Some(status) = &self.ctx.status {
            lines.push(status_line(status));
        }
        lines
    }

    fn draw_library(&self, frame: &mut ratatui::Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Library");

        if self.ctx.library.is_empty() {
            let lines = vec![
                Line::raw("No books yet."),
                Line::raw(""),
                Line::raw("Press a to add one, optionally looking it up by ISBN."),
            ];
            let paragraph = Paragraph::new(Text::from(lines))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let max_width = area.width.saturating_sub(6) as usize;
        let items: Vec<ListItem> = self
            .ctx
            .library
            .books()
            .iter()
            .map(|book| {
                let heading =
                    truncate_to_width(&format!("{} — {}", book.title, book.author), max_width.max(8));
                ListItem::new(Text::from(vec![
                    Line::from(Span::styled(
                        heading,
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        progress_string(book),
                        Style::default().fg(Color::Gray),
                    )),
                ]))
            })
            .collect();

        let highlight_style = Style::default()
            .fg(Color::Black)
            .bg(self.accent_color())
            .add_modifier(Modifier::BOLD);

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.ctx.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_details(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let Some(book) = self.ctx.selected_book().cloned() else {
            let paragraph = Paragraph::new("Nothing selected.")
                .block(Block::default().borders(Borders::ALL).title("Details"));
            frame.render_widget(paragraph, area);
            return;
        };

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(area);

        let paragraph = Paragraph::new(Text::from(details_lines(&book)))
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, sections[0]);

        self.cover.draw(
            &self.image_picker,
            book.image_path.as_deref(),
            sections[1],
            frame,
        );
    }

    fn draw_form(&self, area: Rect, frame: &mut ratatui::Frame) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let popup_area = centered_rect(64, 70, area);
        frame.render_widget(Clear, popup_area);

        let title = match form.mode {
            FormMode::Add => "Add book".to_string(),
            FormMode::Edit(index) => format!("Edit book #{}", index + 1),
        };
        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(inner);

        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let focus_style = Style::default()
            .fg(Color::Black)
            .bg(self.accent_color())
            .add_modifier(Modifier::BOLD);

        let mut lines = Vec::new();
        for field in FormField::ALL {
            let selected = form.focus == field;
            let value = match field {
                FormField::Mode => {
                    let row = Line::from(vec![
                        Span::styled(format!("{:<14}", field.label(form)), label_style),
                        option_chip("pages", !form.draft.track_chapters, selected),
                        Span::raw(" "),
                        option_chip("chapters", form.draft.track_chapters, selected),
                    ]);
                    lines.push(row);
                    continue;
                }
                _ => form.text_field(field).unwrap_or_default().to_string(),
            };
            let cursor = if selected { "_" } else { "" };
            let value_style = if selected {
                focus_style
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<14}", field.label(form)), label_style),
                Span::styled(format!("{value}{cursor}"), value_style),
            ]));
        }

        lines.push(Line::raw(""));
        if form.lookup.phase() == LookupPhase::Running {
            let isbn = form
                .lookup
                .pending_isbn()
                .map(|i| i.to_string())
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!("Looking up {isbn}…"),
                Style::default().fg(Color::Cyan),
            )));
        } else if let Some(note) = &form.lookup_note {
            lines.push(status_line(note));
        }
        if let Some(err) = &form.error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }

        let paragraph = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Left);
        frame.render_widget(paragraph, sections[0]);

        let help_lines = vec![
            Line::from(vec![
                Span::styled("Tab/↑/↓", label_style),
                Span::raw(" field  "),
                Span::styled("Enter", label_style),
                Span::raw(" save (on ISBN: look up)  "),
                Span::styled("Ctrl+l", label_style),
                Span::raw(" look up"),
            ]),
            Line::from(vec![
                Span::styled("Space/←/→", label_style),
                Span::raw(" mode  "),
                Span::styled("Ctrl+u", label_style),
                Span::raw(" clear  "),
                Span::styled("Esc", label_style),
                Span::raw(" cancel"),
            ]),
        ];
        let help = Paragraph::new(Text::from(help_lines))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(help, sections[1]);
    }

    fn draw_confirm_delete(&self, area: Rect, frame: &mut ratatui::Frame) {
        let Some(book) = self.confirm_delete.and_then(|i| self.ctx.library.get(i)) else {
            return;
        };
        let popup_area = centered_rect(48, 24, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            "Delete book",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        let lines = vec![
            Line::raw(format!("Delete \"{}\" by {}?", book.title, book.author)),
            Line::raw(""),
            Line::raw("y deletes, n or Esc keeps it."),
        ];
        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormMode {
    Add,
    Edit(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Isbn,
    Title,
    Author,
    ImagePath,
    Mode,
    Total,
    Current,
}

impl FormField {
    const ALL: [FormField; 7] = [
        FormField::Isbn,
        FormField::Title,
        FormField::Author,
        FormField::ImagePath,
        FormField::Mode,
        FormField::Total,
        FormField::Current,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn label(self, form: &BookForm) -> &'static str {
        let chapters = form.draft.track_chapters;
        match self {
            FormField::Isbn => "ISBN",
            FormField::Title => "Title",
            FormField::Author => "Author",
            FormField::ImagePath => "Image path",
            FormField::Mode => "Track by",
            FormField::Total if chapters => "Chapters",
            FormField::Total => "Pages",
            FormField::Current if chapters => "Current ch.",
            FormField::Current => "Current page",
        }
    }
}

/// The add/edit dialog. Each dialog owns its own lookup coordinator.
struct BookForm {
    mode: FormMode,
    isbn: String,
    draft: BookDraft,
    focus: FormField,
    lookup: LookupCoordinator,
    lookup_note: Option<StatusMessage>,
    error: Option<String>,
}

impl BookForm {
    fn new(mode: FormMode, draft: BookDraft, api: SharedCatalogApi) -> Self {
        let focus = match mode {
            FormMode::Add => FormField::Isbn,
            FormMode::Edit(_) => FormField::Title,
        };
        Self {
            mode,
            isbn: String::new(),
            draft,
            focus,
            lookup: LookupCoordinator::new(api),
            lookup_note: None,
            error: None,
        }
    }

    fn text_field(&self, field: FormField) -> Option<&str> {
        let chapters = self.draft.track_chapters;
        let value = match field {
            FormField::Isbn => &self.isbn,
            FormField::Title => &self.draft.title,
            FormField::Author => &self.draft.author,
            FormField::ImagePath => &self.draft.image_path,
            FormField::Mode => return None,
            FormField::Total if chapters => &self.draft.total_chapters,
            FormField::Total => &self.draft.total_pages,
            FormField::Current if chapters => &self.draft.current_chapter,
            FormField::Current => &self.draft.current_progress,
        };
        Some(value.as_str())
    }

    fn text_field_mut(&mut self) -> Option<&mut String> {
        let chapters = self.draft.track_chapters;
        match self.focus {
            FormField::Isbn => Some(&mut self.isbn),
            FormField::Title => Some(&mut self.draft.title),
            FormField::Author => Some(&mut self.draft.author),
            FormField::ImagePath => Some(&mut self.draft.image_path),
            FormField::Mode => None,
            FormField::Total if chapters => Some(&mut self.draft.total_chapters),
            FormField::Total => Some(&mut self.draft.total_pages),
            FormField::Current if chapters => Some(&mut self.draft.current_chapter),
            FormField::Current => Some(&mut self.draft.current_progress),
        }
    }

    fn start_lookup(&mut self) {
        self.lookup_note = None;
        if let Some(status) = self.lookup.request(self.isbn.trim()) {
            self.apply_lookup(status);
        }
    }

    fn apply_lookup(&mut self, status: LookupStatus) {
        let message = status.message();
        self.lookup_note = Some(match status {
            LookupStatus::Found(found) => {
                self.draft.title = found.title;
                self.draft.author = found.author;
                self.error = None;
                StatusMessage::info(message)
            }
            _ => StatusMessage::error(message),
        });
    }
}

fn details_lines(book: &Book) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), bold),
            Span::raw(value),
        ])
    };
    let count = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());

    let (current, total) = book.active_counts();
    vec![
        field("Title", book.title.clone()),
        field("Author", book.author.clone()),
        field("Tracking", book.unit().to_string()),
        field("Current", count(current)),
        field("Total", count(total)),
        field("Progress", progress_string(book)),
        field(
            "Image",
            book.image_path.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ]
}

fn status_line(status: &StatusMessage) -> Line<'static> {
    let style = match status.level {
        StatusLevel::Info => Style::default().fg(Color::Green),
        StatusLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    Line::from(Span::styled(status.text.clone(), style))
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn option_chip(label: &str, selected: bool, row_selected: bool) -> Span<'static> {
    let base = if selected && row_selected {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Span::styled(label.to_string(), base)
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width + 1 > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out.push('…');
    out
}

mod categories;
mod chart;
mod form;

use crate::errors::{AppError, Result};
use crate::models::transaction::{Transaction, TransactionType};
use crate::operations;
use crate::operations::reports::Report;
use crate::ui::categories::{AddOutcome, CategoryManager};
use crate::ui::form::{EntryForm, FormOutcome};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
};
use rusqlite::Connection;
use std::cmp::max;
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Main,
    Entry,
    PickMonth,
    PickCategory,
    ConfirmDeleteTransaction,
    Manager,
    ManagerAdd,
    ManagerConfirmDelete,
}

enum NoticeKind {
    Info,
    Error,
}

/// Blocking message shown over everything else until dismissed.
struct Notice {
    kind: NoticeKind,
    text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

struct Shell {
    mode: Mode,
    report: Report,

    // Chart input: the full set, regardless of table filters.
    all_transactions: Vec<Transaction>,
    // Table input: respects the month/category filters.
    transactions: Vec<Transaction>,
    months: Vec<String>,
    category_names: Vec<String>,

    filter_month: Option<String>,
    filter_category: Option<String>,

    table_state: TableState,
    picker_state: ListState,
    form: EntryForm,
    manager: CategoryManager,
    notice: Option<Notice>,

    // Cached per-draw
    last_page_size: usize,
}

/// Runs the interactive shell until the user quits. Service failures are
/// surfaced as notices; only terminal I/O errors abort the loop.
pub fn run_shell(conn: &Connection) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)?;
        let mut shell = Shell::new(conn)?;

        loop {
            terminal.draw(|frame| render(frame, &mut shell))?;

            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) => {
                        if shell.handle_key(conn, key) {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

impl Shell {
    fn new(conn: &Connection) -> Result<Self> {
        let mut shell = Self {
            mode: Mode::Main,
            report: Report::ExpensesByCategory,
            all_transactions: Vec::new(),
            transactions: Vec::new(),
            months: Vec::new(),
            category_names: Vec::new(),
            filter_month: None,
            filter_category: None,
            table_state: TableState::default(),
            picker_state: ListState::default(),
            form: EntryForm::new(),
            manager: CategoryManager::new(),
            notice: None,
            last_page_size: 10,
        };
        shell.refresh(conn)?;
        Ok(shell)
    }

    /// Reloads everything the widgets render from: the transaction lists,
    /// the month dropdown values and the category names. Ran after every
    /// mutating action.
    fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.all_transactions = operations::transactions::list_all(conn)?;
        self.transactions = operations::transactions::list_filtered(
            conn,
            self.filter_month.as_deref(),
            self.filter_category.as_deref(),
        )?;
        self.months = operations::transactions::distinct_months(conn)?;
        self.category_names = operations::categories::list_all_names(conn)?;

        if self.transactions.is_empty() {
            self.table_state.select(None);
        } else {
            let selected = self
                .table_state
                .selected()
                .unwrap_or(0)
                .min(self.transactions.len() - 1);
            self.table_state.select(Some(selected));
        }
        Ok(())
    }

    fn try_refresh(&mut self, conn: &Connection) {
        if let Err(err) = self.refresh(conn) {
            self.report_error(err);
        }
    }

    /// A declined confirmation aborts silently; everything else becomes a
    /// blocking notice. The application keeps running either way.
    fn report_error(&mut self, err: AppError) {
        if !matches!(err, AppError::ConfirmationDeclined) {
            self.notice = Some(Notice::error(err.to_string()));
        }
    }

    fn selected_transaction(&self) -> Option<&Transaction> {
        self.transactions.get(self.table_state.selected()?)
    }

    fn move_selection(&mut self, delta: i32) {
        if self.transactions.is_empty() {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i32;
        let max_index = self.transactions.len().saturating_sub(1) as i32;
        let next = (current + delta).clamp(0, max_index) as usize;
        self.table_state.select(Some(next));
    }

    /// Returns true when the shell should exit.
    fn handle_key(&mut self, conn: &Connection, key: KeyEvent) -> bool {
        // Many terminals emit both a Press and a Release event. Only act
        // on Press/Repeat.
        if key.kind == KeyEventKind::Release {
            return false;
        }

        // A notice blocks all other input until dismissed.
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.notice = None;
            }
            return false;
        }

        match self.mode {
            Mode::Main => self.handle_main_key(conn, key),
            Mode::Entry => {
                self.handle_entry_key(conn, key);
                false
            }
            Mode::PickMonth | Mode::PickCategory => {
                self.handle_picker_key(conn, key);
                false
            }
            Mode::ConfirmDeleteTransaction => {
                self.handle_confirm_delete_transaction(conn, key);
                false
            }
            Mode::Manager => {
                self.handle_manager_key(conn, key);
                false
            }
            Mode::ManagerAdd => {
                self.handle_manager_add_key(conn, key);
                false
            }
            Mode::ManagerConfirmDelete => {
                self.handle_manager_confirm_key(conn, key);
                false
            }
        }
    }

    fn handle_main_key(&mut self, conn: &Connection, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-(max(1, self.last_page_size) as i32)),
            KeyCode::PageDown => self.move_selection(max(1, self.last_page_size) as i32),
            KeyCode::Home => {
                if !self.transactions.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.transactions.is_empty() {
                    self.table_state
                        .select(Some(self.transactions.len().saturating_sub(1)));
                }
            }
            KeyCode::Char('a') => self.open_entry_form(conn),
            KeyCode::Char('d') => {
                if self.selected_transaction().is_some() {
                    self.mode = Mode::ConfirmDeleteTransaction;
                }
            }
            KeyCode::Char('m') => {
                self.picker_state.select(Some(0));
                self.mode = Mode::PickMonth;
            }
            KeyCode::Char('c') => {
                self.picker_state.select(Some(0));
                self.mode = Mode::PickCategory;
            }
            KeyCode::Char('x') => {
                self.filter_month = None;
                self.filter_category = None;
                self.try_refresh(conn);
            }
            KeyCode::Char('g') => self.open_manager(conn),
            KeyCode::Char('r') => self.try_refresh(conn),
            KeyCode::Char(ch @ '1'..='5') => {
                self.report = Report::ALL[ch as usize - '1' as usize];
            }
            _ => {}
        }
        false
    }

    fn open_entry_form(&mut self, conn: &Connection) {
        match category_options(conn, self.form.transaction_type) {
            Ok(options) => {
                self.form.prepare(options);
                self.mode = Mode::Entry;
            }
            Err(err) => self.report_error(err),
        }
    }

    fn handle_entry_key(&mut self, conn: &Connection, key: KeyEvent) {
        match self.form.handle_key(key) {
            FormOutcome::Continue => {}
            FormOutcome::Cancelled => self.mode = Mode::Main,
            FormOutcome::TypeChanged => {
                // On type change, recompute the category options.
                match category_options(conn, self.form.transaction_type) {
                    Ok(options) => self.form.set_categories(options),
                    Err(err) => self.report_error(err),
                }
            }
            FormOutcome::Submitted => {
                let category = self.form.selected_category().unwrap_or("").to_string();
                let saved = operations::transactions::add_transaction(
                    conn,
                    &self.form.date,
                    &self.form.amount,
                    &category,
                    self.form.transaction_type,
                    self.form.description.trim(),
                );
                match saved {
                    Ok(_) => {
                        self.mode = Mode::Main;
                        self.form.clear();
                        self.notice = Some(Notice::info("Transaction saved"));
                        self.try_refresh(conn);
                    }
                    // Keep the form open with every field retained.
                    Err(AppError::Validation(message)) => self.form.error = Some(message),
                    Err(err) => self.report_error(err),
                }
            }
        }
    }

    fn handle_picker_key(&mut self, conn: &Connection, key: KeyEvent) {
        let count = 1 + match self.mode {
            Mode::PickMonth => self.months.len(),
            _ => self.category_names.len(),
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.mode = Mode::Main,
            KeyCode::Up => {
                let current = self.picker_state.selected().unwrap_or(0);
                self.picker_state.select(Some(current.saturating_sub(1)));
            }
            KeyCode::Down => {
                let current = self.picker_state.selected().unwrap_or(0);
                self.picker_state.select(Some((current + 1).min(count - 1)));
            }
            KeyCode::Enter => {
                let index = self.picker_state.selected().unwrap_or(0);
                let value = if index == 0 {
                    None
                } else {
                    match self.mode {
                        Mode::PickMonth => self.months.get(index - 1).cloned(),
                        _ => self.category_names.get(index - 1).cloned(),
                    }
                };
                match self.mode {
                    Mode::PickMonth => self.filter_month = value,
                    _ => self.filter_category = value,
                }
                self.mode = Mode::Main;
                self.try_refresh(conn);
            }
            _ => {}
        }
    }

    fn handle_confirm_delete_transaction(&mut self, conn: &Connection, key: KeyEvent) {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };

        self.mode = Mode::Main;
        let Some(id) = self.selected_transaction().map(|tx| tx.id) else {
            return;
        };
        match operations::transactions::delete_transaction(conn, id, confirmed) {
            Ok(()) => self.try_refresh(conn),
            Err(err) => self.report_error(err),
        }
    }

    fn open_manager(&mut self, conn: &Connection) {
        match operations::categories::list_all(conn) {
            Ok(list) => {
                self.manager.error = None;
                self.manager.set_categories(list);
                self.mode = Mode::Manager;
            }
            Err(err) => self.report_error(err),
        }
    }

    fn reload_manager(&mut self, conn: &Connection) {
        match operations::categories::list_all(conn) {
            Ok(list) => self.manager.set_categories(list),
            Err(err) => self.report_error(err),
        }
    }

    fn handle_manager_key(&mut self, conn: &Connection, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.manager.error = None;
                self.mode = Mode::Main;
                // Category names feed the filter controls and the form.
                self.try_refresh(conn);
            }
            KeyCode::Up => self.manager.move_selection(-1),
            KeyCode::Down => self.manager.move_selection(1),
            KeyCode::Char('a') => {
                self.manager.start_add();
                self.mode = Mode::ManagerAdd;
            }
            KeyCode::Char('d') => {
                let Some((id, name)) = self.manager.selected().map(|c| (c.id, c.name.clone()))
                else {
                    return;
                };
                // Probe with confirmed=false: the service checks the usage
                // guard first, so "declined" here means the delete is
                // allowed and only awaits the user's answer.
                match operations::categories::delete_category(conn, id, &name, false) {
                    Err(AppError::Conflict(count)) => {
                        self.manager.error = Some(AppError::Conflict(count).to_string());
                    }
                    Err(AppError::ConfirmationDeclined) => {
                        self.manager.error = None;
                        self.mode = Mode::ManagerConfirmDelete;
                    }
                    Err(err) => self.report_error(err),
                    Ok(()) => {}
                }
            }
            _ => {}
        }
    }

    fn handle_manager_add_key(&mut self, conn: &Connection, key: KeyEvent) {
        match self.manager.handle_add_key(key) {
            AddOutcome::Continue => {}
            AddOutcome::Cancelled => self.mode = Mode::Manager,
            AddOutcome::Submitted => {
                let added = operations::categories::add_category(
                    conn,
                    &self.manager.add_name,
                    self.manager.add_type,
                );
                match added {
                    Ok(_) => {
                        self.mode = Mode::Manager;
                        self.reload_manager(conn);
                    }
                    Err(AppError::Validation(message)) => self.manager.add_error = Some(message),
                    Err(err) => self.report_error(err),
                }
            }
        }
    }

    fn handle_manager_confirm_key(&mut self, conn: &Connection, key: KeyEvent) {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };

        self.mode = Mode::Manager;
        let Some((id, name)) = self.manager.selected().map(|c| (c.id, c.name.clone())) else {
            return;
        };
        match operations::categories::delete_category(conn, id, &name, confirmed) {
            Ok(()) => self.reload_manager(conn),
            Err(err) => self.report_error(err),
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let month = self.filter_month.as_deref().unwrap_or("(any)");
        let category = self.filter_category.as_deref().unwrap_or("(any)");

        let line = Line::from(vec![
            Span::styled(
                "Finance Tracker",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Report: {}", self.report.title()),
                Style::default().fg(Color::White),
            ),
            Span::raw("  |  "),
            Span::raw(format!("Month: {month}")),
            Span::raw("  |  "),
            Span::raw(format!("Category: {category}")),
            Span::raw("  |  "),
            Span::raw(format!("Rows: {}", self.transactions.len())),
        ]);

        let block = Block::default().borders(Borders::ALL);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Transactions").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Row::new([
            Cell::from("Date").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Type").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Amount").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Category").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Description").style(Style::default().add_modifier(Modifier::BOLD)),
        ])
        .style(Style::default().fg(Color::White));

        let rows = self.transactions.iter().map(|tx| {
            let amount_color = match tx.transaction_type {
                TransactionType::Income => Color::Green,
                TransactionType::Expense => Color::Red,
            };
            let mut description = tx.description.clone();
            if description.len() > 48 {
                description.truncate(45);
                description.push_str("...");
            }

            Row::new([
                Cell::from(tx.date.format("%Y-%m-%d").to_string()),
                Cell::from(tx.transaction_type.label()),
                Cell::from(tx.signed_amount()).style(Style::default().fg(amount_color)),
                Cell::from(tx.category.clone()),
                Cell::from(description),
            ])
        });

        // Leave room for the header row.
        self.last_page_size = max(1, inner.height.saturating_sub(2) as usize);

        let widths = [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Min(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("➤ ")
            .column_spacing(1);

        frame.render_stateful_widget(table, inner, &mut self.table_state);

        if self.transactions.is_empty() {
            let empty = Paragraph::new("No transactions match the current filters")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hint = match self.mode {
            Mode::Main => {
                "↑/↓ select  a add  d delete  m month  c category  x clear filters  g categories  1-5 report  r reload  q quit"
            }
            Mode::Entry => "Tab next field  Enter save  Ctrl+R clear  Esc cancel",
            Mode::PickMonth | Mode::PickCategory => "↑/↓ choose  Enter apply  Esc cancel",
            Mode::ConfirmDeleteTransaction | Mode::ManagerConfirmDelete => "y confirm  n cancel",
            Mode::Manager => "↑/↓ select  a add  d delete  Esc close",
            Mode::ManagerAdd => "type the name  ←/→ type  Enter save  Esc cancel",
        };

        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_picker(&mut self, frame: &mut Frame, area: Rect) {
        let (title, values) = match self.mode {
            Mode::PickMonth => ("Filter by month", &self.months),
            _ => ("Filter by category", &self.category_names),
        };

        let mut items: Vec<ListItem> = Vec::with_capacity(values.len() + 1);
        items.push(ListItem::new("(all)"));
        for value in values {
            items.push(ListItem::new(value.clone()));
        }

        let popup = centered_rect(36, 60, area);
        frame.render_widget(Clear, popup);

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("➤ ");

        frame.render_stateful_widget(list, popup, &mut self.picker_state);
    }
}

fn category_options(conn: &Connection, transaction_type: TransactionType) -> Result<Vec<String>> {
    let categories = operations::categories::list_by_type(conn, transaction_type)?;
    Ok(categories.into_iter().map(|c| c.name).collect())
}

fn render(frame: &mut Frame, shell: &mut Shell) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Min(7),
            Constraint::Length(2),
        ])
        .split(area);

    shell.render_header(frame, layout[0]);
    chart::render_report(frame, layout[1], shell.report, &shell.all_transactions);
    shell.render_table(frame, layout[2]);
    shell.render_footer(frame, layout[3]);

    match shell.mode {
        Mode::Main => {}
        Mode::Entry => shell.form.render(frame, centered_rect(64, 55, area)),
        Mode::PickMonth | Mode::PickCategory => shell.render_picker(frame, area),
        Mode::ConfirmDeleteTransaction => {
            render_confirm(frame, area, "Delete the selected transaction?");
        }
        Mode::Manager => shell.manager.render(frame, centered_rect(70, 70, area)),
        Mode::ManagerAdd => {
            shell.manager.render(frame, centered_rect(70, 70, area));
            shell.manager.render_add(frame, centered_rect(44, 35, area));
        }
        Mode::ManagerConfirmDelete => {
            shell.manager.render(frame, centered_rect(70, 70, area));
            render_confirm(frame, area, "Delete this category?");
        }
    }

    if let Some(ref notice) = shell.notice {
        render_notice(frame, area, notice);
    }
}

fn render_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "y yes   n no",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Confirm").borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let (title, color) = match notice.kind {
        NoticeKind::Info => ("Done", Color::Green),
        NoticeKind::Error => ("Error", Color::Red),
    };

    let popup = centered_rect(56, 24, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(notice.text.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
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

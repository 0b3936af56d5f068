use crate::models::category::Category;
use crate::models::transaction::TransactionType;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Continue,
    Cancelled,
    Submitted,
}

/// State of the category-management window: the list plus the small
/// add-category form that opens on top of it.
pub struct CategoryManager {
    pub categories: Vec<Category>,
    pub table_state: TableState,
    /// Usage-guard message shown under the list.
    pub error: Option<String>,
    pub add_name: String,
    pub add_type: TransactionType,
    pub add_error: Option<String>,
}

impl CategoryManager {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            table_state: TableState::default(),
            error: None,
            add_name: String::new(),
            add_type: TransactionType::Expense,
            add_error: None,
        }
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        if self.categories.is_empty() {
            self.table_state.select(None);
        } else {
            let selected = self
                .table_state
                .selected()
                .unwrap_or(0)
                .min(self.categories.len() - 1);
            self.table_state.select(Some(selected));
        }
    }

    pub fn selected(&self) -> Option<&Category> {
        self.categories.get(self.table_state.selected()?)
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.categories.is_empty() {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i32;
        let max_index = self.categories.len().saturating_sub(1) as i32;
        let next = (current + delta).clamp(0, max_index) as usize;
        self.table_state.select(Some(next));
    }

    pub fn start_add(&mut self) {
        self.add_name.clear();
        self.add_type = TransactionType::Expense;
        self.add_error = None;
    }

    pub fn handle_add_key(&mut self, key: KeyEvent) -> AddOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => AddOutcome::Cancelled,
                _ => AddOutcome::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => AddOutcome::Cancelled,
            KeyCode::Enter => AddOutcome::Submitted,
            KeyCode::Left | KeyCode::Right => {
                self.add_type = self.add_type.toggle();
                AddOutcome::Continue
            }
            KeyCode::Char(ch) => {
                self.add_name.push(ch);
                AddOutcome::Continue
            }
            KeyCode::Backspace => {
                self.add_name.pop();
                AddOutcome::Continue
            }
            _ => AddOutcome::Continue,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default().title("Categories").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(inner);

        let header = Row::new([
            Cell::from("Name").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Type").style(Style::default().add_modifier(Modifier::BOLD)),
        ]);

        let rows = self.categories.iter().map(|category| {
            Row::new([
                Cell::from(category.name.clone()),
                Cell::from(category.category_type.label()),
            ])
        });

        let widths = [Constraint::Percentage(70), Constraint::Percentage(30)];
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

        frame.render_stateful_widget(table, layout[0], &mut self.table_state);

        if self.categories.is_empty() {
            let empty = Paragraph::new("No categories yet — press a to add one")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, layout[0]);
        }

        let status = match self.error {
            Some(ref err) => Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))),
            None => Line::from(Span::styled(
                "↑/↓ select   a add   d delete   Esc close",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(status), layout[1]);
    }

    pub fn render_add(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default().title("Add category").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let type_value = match self.add_type {
            TransactionType::Expense => "[Expense]   Income ",
            TransactionType::Income => " Expense   [Income]",
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Name  ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}▏", self.add_name),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            Line::from(vec![
                Span::styled("Type  ", Style::default().fg(Color::DarkGray)),
                Span::raw(type_value),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter save   ←/→ type   Esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        if let Some(ref err) = self.add_error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

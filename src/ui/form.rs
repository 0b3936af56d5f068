use crate::models::transaction::TransactionType;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Type,
    Date,
    Amount,
    Category,
    Description,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Type => Field::Date,
            Field::Date => Field::Amount,
            Field::Amount => Field::Category,
            Field::Category => Field::Description,
            Field::Description => Field::Type,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Type => Field::Description,
            Field::Date => Field::Type,
            Field::Amount => Field::Date,
            Field::Category => Field::Amount,
            Field::Description => Field::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Cancelled,
    Submitted,
    /// The type radio flipped; the shell must recompute category options.
    TypeChanged,
}

/// State of the new-entry form. The raw date/amount strings are handed to
/// the transaction service untouched; validation happens there.
pub struct EntryForm {
    pub transaction_type: TransactionType,
    pub date: String,
    pub amount: String,
    pub description: String,
    pub error: Option<String>,
    categories: Vec<String>,
    category_index: usize,
    focus: Field,
}

impl EntryForm {
    pub fn new() -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            date: today(),
            amount: String::new(),
            description: String::new(),
            error: None,
            categories: Vec::new(),
            category_index: 0,
            focus: Field::Date,
        }
    }

    /// Resets the fields for a fresh entry and installs the category
    /// options for the current type. The type itself is kept.
    pub fn prepare(&mut self, categories: Vec<String>) {
        self.clear();
        self.set_categories(categories);
    }

    pub fn clear(&mut self) {
        self.date = today();
        self.amount.clear();
        self.description.clear();
        self.error = None;
        self.category_index = 0;
        self.focus = Field::Date;
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = categories;
        self.category_index = 0;
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.categories.get(self.category_index).map(String::as_str)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('r') => {
                    self.clear();
                    FormOutcome::Continue
                }
                KeyCode::Char('c') | KeyCode::Char('q') => FormOutcome::Cancelled,
                _ => FormOutcome::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => FormOutcome::Cancelled,
            KeyCode::Enter => FormOutcome::Submitted,
            KeyCode::Tab => {
                self.focus = self.focus.next();
                FormOutcome::Continue
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                FormOutcome::Continue
            }
            _ => self.handle_field_key(key),
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent) -> FormOutcome {
        match self.focus {
            Field::Type => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                    self.transaction_type = self.transaction_type.toggle();
                    self.category_index = 0;
                    FormOutcome::TypeChanged
                }
                _ => FormOutcome::Continue,
            },
            Field::Category => match key.code {
                KeyCode::Up => {
                    self.category_index = self.category_index.saturating_sub(1);
                    FormOutcome::Continue
                }
                KeyCode::Down => {
                    if self.category_index + 1 < self.categories.len() {
                        self.category_index += 1;
                    }
                    FormOutcome::Continue
                }
                _ => FormOutcome::Continue,
            },
            Field::Date => edit_text(&mut self.date, key),
            Field::Amount => edit_text(&mut self.amount, key),
            Field::Description => edit_text(&mut self.description, key),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = Block::default().title("New entry").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let type_value = match self.transaction_type {
            TransactionType::Expense => "[Expense]   Income ",
            TransactionType::Income => " Expense   [Income]",
        };
        let category_value = match self.selected_category() {
            Some(name) => format!("< {name} >"),
            None => "(no categories for this type)".to_string(),
        };

        let mut lines = vec![
            self.field_line(Field::Type, "Type", type_value.to_string()),
            self.field_line(Field::Date, "Date", self.editable(Field::Date, &self.date)),
            self.field_line(Field::Amount, "Amount", self.editable(Field::Amount, &self.amount)),
            self.field_line(Field::Category, "Category", category_value),
            self.field_line(
                Field::Description,
                "Description",
                self.editable(Field::Description, &self.description),
            ),
            Line::from(""),
            Line::from(Span::styled(
                "Enter save   Tab next field   Ctrl+R clear   Esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        if let Some(ref err) = self.error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }

    fn field_line(&self, field: Field, label: &str, value: String) -> Line<'_> {
        let focused = self.focus == field;
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let value_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        Line::from(vec![
            Span::styled(format!("{label:<13}"), label_style),
            Span::styled(value, value_style),
        ])
    }

    fn editable(&self, field: Field, value: &str) -> String {
        if self.focus == field {
            format!("{value}▏")
        } else {
            value.to_string()
        }
    }
}

fn edit_text(buffer: &mut String, key: KeyEvent) -> FormOutcome {
    match key.code {
        KeyCode::Char(ch) => buffer.push(ch),
        KeyCode::Backspace => {
            buffer.pop();
        }
        _ => {}
    }
    FormOutcome::Continue
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

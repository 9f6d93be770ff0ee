use console_interface::{
    Pagination, QueryResult, QueryState, SortDirection, TableRow, sort_rows,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::{View, ViewAction, ViewContext};

const EMPTY_HINT: &str = "No data available. Press F5 to execute the query.";

/// Query editor with a paged, sortable result table.
#[derive(Debug)]
pub struct DashboardView {
    editor: String,
    pagination: Pagination,
    sort: Option<(String, SortDirection)>,
}

impl DashboardView {
    pub fn new(initial_query: &str, page_size: usize) -> Self {
        Self {
            editor: initial_query.to_string(),
            pagination: Pagination::with_page_size(page_size).unwrap_or_default(),
            sort: None,
        }
    }

    pub fn editor_text(&self) -> &str {
        &self.editor
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    /// Back to the first page, unsorted. Called when a new result arrives.
    pub fn reset_table(&mut self) {
        self.pagination.reset();
        self.sort = None;
    }

    /// Rows of the current page after sorting.
    pub fn visible_rows<'a>(&self, result: &'a QueryResult) -> Vec<TableRow<'a>> {
        let mut rows = result.rows();
        if let Some((column, direction)) = &self.sort {
            sort_rows(&mut rows, column, *direction);
        }
        let range = self.pagination.range(rows.len());
        rows.drain(range).collect()
    }

    /// Unsorted, then each column in turn, then unsorted again.
    fn cycle_sort(&mut self, result: Option<&QueryResult>) {
        let Some(result) = result else {
            return;
        };
        let sortable: Vec<&str> = result
            .columns()
            .iter()
            .filter(|column| column.sortable)
            .map(|column| column.id.as_str())
            .collect();

        let next = match &self.sort {
            None => sortable.first().copied(),
            Some((current, _)) => sortable
                .iter()
                .position(|id| id == current)
                .and_then(|index| sortable.get(index + 1).copied()),
        };
        let direction = self.sort.as_ref().map(|(_, dir)| *dir).unwrap_or_default();
        self.sort = next.map(|id| (id.to_string(), direction));
        self.pagination.reset();
    }

    fn toggle_sort_direction(&mut self) {
        if let Some((_, direction)) = &mut self.sort {
            *direction = direction.toggled();
            self.pagination.reset();
        }
    }

    fn trigger_line(&self, ctx: &ViewContext<'_>) -> Line<'static> {
        let theme = ctx.theme;
        let state = &ctx.state.query_state;
        let label = if state.is_running() {
            Span::styled("[ Running... ]", theme.muted_style())
        } else {
            Span::styled("[ Run query (F5) ]", theme.title_style())
        };

        let mut spans = vec![label];
        if let Some(message) = state.error() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.to_string(), theme.error_style()));
        }
        Line::from(spans)
    }

    fn render_results(&self, frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>) {
        let theme = ctx.theme;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted))
            .title(Span::styled("Results", theme.title_style()));

        let result = match &ctx.state.query_state {
            QueryState::Ready(result) => result,
            QueryState::Running => {
                frame.render_widget(
                    Paragraph::new(Line::styled("Running query...", theme.muted_style()))
                        .block(block),
                    area,
                );
                return;
            }
            QueryState::Idle | QueryState::Failed(_) => {
                frame.render_widget(
                    Paragraph::new(Line::styled(EMPTY_HINT, theme.muted_style())).block(block),
                    area,
                );
                return;
            }
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("Displaying {} rows from the query", result.len()),
                theme.text_style(),
            )),
            chunks[0],
        );

        let sort = self.sort();
        let header = Row::new(result.columns().iter().map(|column| {
            let marker = match sort {
                Some((id, SortDirection::Ascending)) if id == column.id => " ▲",
                Some((id, SortDirection::Descending)) if id == column.id => " ▼",
                _ => "",
            };
            Cell::from(format!("{}{marker}", column.header))
        }))
        .style(theme.header_style());

        let rows = self.visible_rows(result).into_iter().map(|row| {
            Row::new(
                result
                    .columns()
                    .iter()
                    .map(|column| Cell::from(row.cell(&column.id))),
            )
            .style(theme.text_style())
        });
        let widths = vec![Constraint::Fill(1); result.columns().len()];
        frame.render_widget(Table::new(rows, widths).header(header), chunks[1]);

        let total = result.len();
        let footer = format!(
            "Page {}/{}  |  {} rows per page  |  PgUp/PgDn page, Ctrl+S sort, Ctrl+O order, Ctrl+P page size",
            self.pagination.range(total).start / self.pagination.page_size() + 1,
            self.pagination.page_count(total),
            self.pagination.page_size(),
        );
        frame.render_widget(
            Paragraph::new(Line::styled(footer, theme.muted_style())),
            chunks[2],
        );
    }
}

impl View for DashboardView {
    fn title(&self) -> &str {
        "Dashboard"
    }

    fn help_text(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("F5/Ctrl+R", "Run query"),
            ("PgUp/PgDn", "Previous/next page"),
            ("Ctrl+S", "Sort by next column"),
            ("Ctrl+O", "Toggle sort order"),
            ("Ctrl+P", "Cycle page size"),
            ("Tab", "Home"),
        ]
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &ViewContext<'_>) -> ViewAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let query_state = &ctx.state.query_state;

        if key.code == KeyCode::F(5) || (ctrl && key.code == KeyCode::Char('r')) {
            return if query_state.is_running() {
                ViewAction::ShowStatus("A query is already running".to_string())
            } else {
                ViewAction::RunQuery(self.editor.clone())
            };
        }

        match key.code {
            KeyCode::Char('s') if ctrl => {
                self.cycle_sort(query_state.result());
                ViewAction::None
            }
            KeyCode::Char('o') if ctrl => {
                self.toggle_sort_direction();
                ViewAction::None
            }
            KeyCode::Char('p') if ctrl => {
                self.pagination.cycle_page_size();
                ViewAction::None
            }
            KeyCode::PageDown => {
                let total = query_state.result().map_or(0, QueryResult::len);
                self.pagination.next_page(total);
                ViewAction::None
            }
            KeyCode::PageUp => {
                self.pagination.prev_page();
                ViewAction::None
            }
            KeyCode::Enter => {
                self.editor.push('\n');
                ViewAction::None
            }
            KeyCode::Backspace => {
                self.editor.pop();
                ViewAction::None
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.editor.push(c);
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>) {
        let editor_height = (self.editor.lines().count() as u16 + 2).clamp(3, 10);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(editor_height),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(area);

        let editor = Paragraph::new(format!("{}▏", self.editor))
            .style(ctx.theme.text_style())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ctx.theme.accent))
                    .title(Span::styled("Query", ctx.theme.title_style())),
            );
        frame.render_widget(editor, chunks[0]);
        frame.render_widget(Paragraph::new(self.trigger_line(ctx)), chunks[1]);
        self.render_results(frame, chunks[2], ctx);
    }
}

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::domain::{HELP_TEXT, InputMode};
use crate::model::{Model, Status};
use crate::users::{COLUMNS, ColumnId};

pub const FILTER_HEIGHT: u16 = 3;
pub const PAGER_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;

const FILTER_COLUMNS: [ColumnId; 2] = [ColumnId::Username, ColumnId::Email];

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        match model.status {
            Status::FAILED => self.draw_error(model, frame),
            Status::LOADING => self.draw_loading(model, frame),
            Status::READY | Status::QUITTING => self.draw_table(model, frame),
        }
        if model.show_help() {
            self.draw_popup(frame, " Help ", Text::from(HELP_TEXT));
        }
    }

    // Nothing but the message is shown once the load failed.
    fn draw_error(&self, model: &Model, frame: &mut Frame) {
        let message = model
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Failed to load users".to_string());
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, frame.area());
    }

    fn draw_loading(&self, model: &Model, frame: &mut Frame) {
        let [area] = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .areas(frame.area());
        frame.render_widget(Paragraph::new(model.status_message().to_string()).centered(), area);
    }

    fn draw_table(&self, model: &Model, frame: &mut Frame) {
        let [filter_area, table_area, pager_area, status_area] = Layout::vertical([
            Constraint::Length(FILTER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(PAGER_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.draw_filters(model, frame, filter_area);
        self.draw_rows(model, frame, table_area);
        self.draw_pager(model, frame, pager_area);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::from(model.status_message().to_string()),
                "  ? help  q quit".dark_gray(),
            ])),
            status_area,
        );

        if model.input_mode() == Some(InputMode::PageSelect) {
            self.draw_page_selector(model, frame);
        }
    }

    fn draw_filters(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let areas = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

        for (column, &area) in FILTER_COLUMNS.iter().zip(areas.iter()) {
            let editing = model.input_mode() == Some(InputMode::Filter(*column));
            let key = match column {
                ColumnId::Username => "u",
                _ => "e",
            };
            let title = Line::from(vec![
                format!(" {} filter ", column.label()).into(),
                format!("<{key}> ").blue().bold(),
            ]);
            let mut block = Block::bordered().title(title);
            if editing {
                block = block.border_set(border::THICK).border_style(Style::default().fg(Color::Yellow));
            }
            let text = if editing {
                model.last_input().input.clone()
            } else {
                model.filters().text(*column).to_string()
            };
            frame.render_widget(Paragraph::new(text).block(block), area);

            if editing {
                let x = area.x + 1 + model.last_input().curser_pos as u16;
                frame.set_cursor_position(Position::new(
                    std::cmp::min(x, area.right().saturating_sub(2)),
                    area.y + 1,
                ));
            }
        }
    }

    fn header_cell(&self, model: &Model, column: ColumnId, pos: usize) -> Cell<'static> {
        let sort = model.sort();
        let (icon, style) = if sort.column == column {
            let icon = if sort.descending { "▼" } else { "▲" };
            (icon, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            ("↕", Style::default().fg(Color::DarkGray))
        };
        Cell::from(Line::from(vec![
            Span::styled(format!("{icon} "), style),
            Span::styled(column.label(), style),
            Span::styled(format!(" {}", pos + 1), Style::default().fg(Color::DarkGray)),
        ]))
    }

    fn draw_rows(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            COLUMNS
                .iter()
                .enumerate()
                .map(|(pos, &column)| self.header_cell(model, column, pos)),
        )
        .style(Style::default().add_modifier(Modifier::UNDERLINED));

        let users = model.users();
        let view = model.view();
        let rows = view.rows.iter().map(|&idx| {
            Row::new(
                COLUMNS
                    .iter()
                    .map(|&column| Cell::from(users[idx].value(column).to_string())),
            )
        });

        let widths = [
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(Line::from(" Users ".bold()).centered()));
        frame.render_widget(table, area);
    }

    fn draw_pager(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let page = model.page();
        let view = model.view();

        let enabled = Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD);
        let disabled = Style::default().fg(Color::DarkGray);

        let prev_style = if page.can_previous() { enabled } else { disabled };
        let next_style = if page.can_next(view.filtered_count) { enabled } else { disabled };

        let position = if view.page_count == 0 {
            " No matching users ".to_string()
        } else {
            format!(" Page {} of {} <g> ", page.page_index + 1, view.page_count)
        };
        let position = if view.page_count > 0 && page.page_index >= view.page_count {
            position.replace(" <g> ", " (empty) <g> ")
        } else {
            position
        };

        let line = Line::from(vec![
            Span::styled("‹ Prev", prev_style),
            Span::from(position),
            Span::styled("Next ›", next_style),
            self.count_label(model, view.filtered_count).dark_gray(),
        ]);
        frame.render_widget(Paragraph::new(line).centered(), area);
    }

    fn count_label(&self, model: &Model, filtered_count: usize) -> String {
        if model.filters().is_empty() {
            format!("  {filtered_count} users")
        } else {
            format!("  {filtered_count} of {} users", model.users().len())
        }
    }

    fn draw_page_selector(&self, model: &Model, frame: &mut Frame) {
        let page_count = model.view().page_count;
        let lines: Vec<Line> = model
            .page()
            .page_options(model.view().filtered_count)
            .map(|idx| {
                let label = format!(" Page {} ", idx + 1);
                if idx == model.page_cursor() {
                    Line::from(label.black().on_yellow())
                } else {
                    Line::from(label)
                }
            })
            .collect();
        self.draw_popup(frame, &format!(" Go to page (1-{page_count}) "), Text::from(lines));
    }

    fn draw_popup(&self, frame: &mut Frame, title: &str, text: Text) {
        let height = text.lines.len() as u16 + 2;
        let width = text.width() as u16 + 4;
        let [area] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [area] = Layout::horizontal([Constraint::Length(std::cmp::max(width, title.len() as u16 + 4))])
            .flex(Flex::Center)
            .areas(area);

        let block = Block::bordered()
            .title(Line::from(title.to_string().bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoadError, Message, UDConfig};
    use crate::users::UserRecord;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn loaded() -> Model {
        let mut model = Model::init(&UDConfig::default());
        model
            .update(Message::DataLoaded(Ok(vec![
                UserRecord::new("alice", "a@x.com", "1"),
                UserRecord::new("bob", "b@x.com", "2"),
            ])))
            .unwrap();
        model
    }

    #[test]
    fn renders_loading_notice() {
        let model = Model::init(&UDConfig::default());
        let screen = render(&model);
        assert!(screen.contains("Loading users"));
        assert!(!screen.contains("Username"));
    }

    #[test]
    fn renders_table_with_rows() {
        let model = loaded();
        let screen = render(&model);
        assert!(screen.contains("Username"));
        assert!(screen.contains("Email"));
        assert!(screen.contains("Phone"));
        assert!(screen.contains("alice"));
        assert!(screen.contains("b@x.com"));
        assert!(screen.contains("Page 1 of 1"));
        // active sort column is marked ascending
        assert!(screen.contains("▲ Username"));
    }

    #[test]
    fn filtered_rows_disappear() {
        let mut model = loaded();
        model.update(Message::EditFilter(ColumnId::Username)).unwrap();
        for c in "ali".chars() {
            model
                .update(Message::RawKey(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
                .unwrap();
        }
        let screen = render(&model);
        assert!(screen.contains("alice"));
        assert!(!screen.contains("bob"));
        assert!(screen.contains("1 of 2 users"));
    }

    #[test]
    fn sort_icon_follows_direction() {
        let mut model = loaded();
        model.update(Message::SortBy(ColumnId::Email)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("▼ Email"));
        assert!(screen.contains("↕ Username"));
    }

    #[test]
    fn failure_shows_only_the_message() {
        let mut model = Model::init(&UDConfig::default());
        model
            .update(Message::DataLoaded(Err(LoadError::Network("connection refused".into()))))
            .unwrap();
        let screen = render(&model);
        assert!(screen.contains("Failed to load users"));
        assert!(!screen.contains("Username"));
        assert!(!screen.contains("Prev"));
        assert!(!screen.contains("filter"));
    }

    #[test]
    fn page_selector_lists_pages() {
        let mut model = Model::init(&UDConfig::default());
        let users = (1..=12)
            .map(|i| UserRecord::new(&format!("user{i:02}"), "u@x.com", "1"))
            .collect();
        model.update(Message::DataLoaded(Ok(users))).unwrap();
        model.update(Message::PageSelector).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Page 3"));
        assert!(screen.contains("Go to page (1-3)"));
    }

    #[test]
    fn out_of_range_page_is_marked_empty() {
        let mut model = Model::init(&UDConfig::default());
        let users = (1..=12)
            .map(|i| UserRecord::new(&format!("user{i:02}"), "u@x.com", "1"))
            .collect();
        model.update(Message::DataLoaded(Ok(users))).unwrap();
        model.set_page_index(2);
        model.set_filter(ColumnId::Username, Some(crate::filter::FilterValue::Text("user0".into())));
        let screen = render(&model);
        assert!(screen.contains("Page 3 of 2 (empty)"));

        model.set_filter(ColumnId::Username, None);
        let screen = render(&model);
        assert!(screen.contains("Page 3 of 3 <g>"));
        assert!(!screen.contains("(empty)"));
    }

    #[test]
    fn help_popup() {
        let mut model = loaded();
        model.update(Message::Help).unwrap();
        let screen = render(&model);
        assert!(screen.contains("select page"));
    }
}

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info, trace};

use crate::domain::{InputMode, LoadError, Message, UDConfig, UDError};
use crate::filter::{FilterSet, FilterValue};
use crate::inputter::{InputResult, Inputter};
use crate::pagination::PageSetting;
use crate::sort::SortDirective;
use crate::users::{ColumnId, UserRecord};
use crate::view::{DerivedView, derive};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    FAILED,
    QUITTING,
}

/// Holds the loaded users and the three independent pieces of view state.
/// Filters, sort and page are replaced as whole values on every change and the
/// visible rows are derived from them on demand.
pub struct Model {
    config: UDConfig,
    pub status: Status,
    users: Vec<UserRecord>,
    error: Option<LoadError>,
    filters: FilterSet,
    sort: SortDirective,
    page: PageSetting,
    input: Inputter,
    input_mode: Option<InputMode>,
    last_input: InputResult,
    page_cursor: usize,
    show_help: bool,
    status_message: String,
}

impl Model {
    pub fn init(config: &UDConfig) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::LOADING,
            users: Vec::new(),
            error: None,
            filters: config.initial_filters.clone(),
            sort: SortDirective::default(),
            page: PageSetting::new(config.page_size),
            input: Inputter::default(),
            input_mode: None,
            last_input: InputResult::default(),
            page_cursor: 0,
            show_help: false,
            status_message: String::new(),
        };
        model.set_status_message(format!("Loading users from {} ...", config.url));
        model
    }

    pub fn update(&mut self, message: Message) -> Result<(), UDError> {
        trace!("Update: status {:?}, message {:?}", self.status, message);
        match self.status {
            Status::QUITTING => {}
            // Only leaving is possible once the load failed
            Status::FAILED => {
                if message == Message::Quit {
                    self.quit();
                }
            }
            Status::LOADING => match message {
                Message::Quit => self.quit(),
                Message::DataLoaded(result) => self.data_loaded(result),
                Message::Help => self.show_help = true,
                Message::Exit => self.show_help = false,
                _ => (),
            },
            Status::READY => {
                if let Some(mode) = self.input_mode {
                    if let Message::RawKey(key) = message {
                        self.raw_input(mode, key);
                    }
                    return Ok(());
                }
                match message {
                    Message::Quit => self.quit(),
                    Message::EditFilter(column) => self.enter_filter_mode(column),
                    Message::SortBy(column) => self.sort_by(column),
                    Message::PreviousPage => self.previous_page(),
                    Message::NextPage => self.next_page(),
                    Message::PageSelector => self.enter_page_select(),
                    Message::Help => self.show_help = true,
                    Message::Exit => self.show_help = false,
                    Message::DataLoaded(_) => debug!("Users already loaded, ignoring second result"),
                    Message::RawKey(_) => (),
                }
            }
        }
        Ok(())
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// True while a line editor owns the keyboard.
    pub fn raw_keyevents(&self) -> bool {
        self.input_mode.is_some()
    }

    /// Rows to render for the current filters, sort and page.
    pub fn view(&self) -> DerivedView {
        derive(
            &self.users,
            &self.filters,
            &self.sort,
            &self.page,
            self.config.parse_policy,
        )
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &SortDirective {
        &self.sort
    }

    pub fn page(&self) -> &PageSetting {
        &self.page
    }

    pub fn input_mode(&self) -> Option<InputMode> {
        self.input_mode
    }

    pub fn last_input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn page_cursor(&self) -> usize {
        self.page_cursor
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Upserts a filter condition.
    pub fn set_filter(&mut self, column: ColumnId, value: Option<FilterValue>) {
        self.filters = self.filters.with(column, value);
    }

    /// Sets the page index as given, without clamping it to the page count.
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page = self.page.with_page_index(page_index);
    }

    // -------------------- Control handling functions ---------------------- //

    fn data_loaded(&mut self, result: Result<Vec<UserRecord>, LoadError>) {
        match result {
            Ok(users) => {
                info!("Received {} users", users.len());
                self.users = users;
                self.status = Status::READY;
                self.set_status_message(format!("Loaded {} users", self.users.len()));
            }
            Err(e) => {
                info!("Switching to error view: {e}");
                self.error = Some(e);
                self.show_help = false;
                self.status = Status::FAILED;
            }
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn filtered_count(&self) -> usize {
        self.view().filtered_count
    }

    fn sort_by(&mut self, column: ColumnId) {
        self.sort = self.sort.toggle(column, self.config.first_sort_direction);
        let direction = if self.sort.descending { "descending" } else { "ascending" };
        self.set_status_message(format!("Sorted by {} {}", column.label(), direction));
    }

    fn previous_page(&mut self) {
        self.page = self.page.previous();
    }

    fn next_page(&mut self) {
        let nrows = self.filtered_count();
        self.page = self.page.next(nrows);
    }

    fn enter_filter_mode(&mut self, column: ColumnId) {
        trace!("Editing filter of {}", column.as_str());
        self.show_help = false;
        self.input_mode = Some(InputMode::Filter(column));
        let current = self.filters.text(column).to_string();
        self.input.set(&current);
        self.last_input = self.input.get();
    }

    fn enter_page_select(&mut self) {
        let page_count = self.page.page_count(self.filtered_count());
        if page_count == 0 {
            self.set_status_message("No pages to select");
            return;
        }
        self.show_help = false;
        self.page_cursor = std::cmp::min(self.page.page_index, page_count - 1);
        self.input_mode = Some(InputMode::PageSelect);
    }

    fn raw_input(&mut self, mode: InputMode, key: KeyEvent) {
        match mode {
            InputMode::Filter(column) => self.filter_input(column, key),
            InputMode::PageSelect => self.page_select_input(key),
        }
    }

    // Filters follow every keystroke. Escape drops the condition.
    fn filter_input(&mut self, column: ColumnId, key: KeyEvent) {
        self.last_input = self.input.read(key);
        let value = Some(FilterValue::Text(self.last_input.input.clone()));
        self.set_filter(column, value);

        if self.last_input.finished {
            self.input_mode = None;
            if self.last_input.canceled {
                self.set_status_message(format!("Cleared {} filter", column.label()));
            } else {
                self.set_status_message(format!("{} matching users", self.filtered_count()));
            }
        }
    }

    fn page_select_input(&mut self, key: KeyEvent) {
        let page_count = self.page.page_count(self.filtered_count());
        let last = page_count.saturating_sub(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.page_cursor = self.page_cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.page_cursor = std::cmp::min(self.page_cursor + 1, last)
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let target = c.to_digit(10).unwrap_or(0) as usize;
                if (1..=page_count).contains(&target) {
                    self.page_cursor = target - 1;
                }
            }
            KeyCode::Enter => {
                self.set_page_index(self.page_cursor);
                self.input_mode = None;
                self.set_status_message(format!("Page {} of {}", self.page_cursor + 1, page_count));
            }
            KeyCode::Esc => self.input_mode = None,
            _ => (),
        }
    }
}

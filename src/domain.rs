use std::fmt;
use std::io::Error;

use clap::Parser;
use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::filter::{FilterSet, FilterValue, ParsePolicy};
use crate::pagination::PAGE_SIZE;
use crate::sort::SortDirection;
use crate::users::{ColumnId, UserRecord};

pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

#[derive(Parser, Debug)]
#[command(version, about = "A tui based user directory viewer.")]
pub struct Args {
    /// Endpoint returning a JSON array of users
    #[arg(long, default_value = DEFAULT_USERS_URL)]
    pub url: String,

    /// Log file, `~` and environment variables are expanded
    #[arg(long, default_value = "~/.userdir.log")]
    pub log_file: String,

    /// Event poll time in ms
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Direction a column gets when it becomes the sort column
    #[arg(long, value_enum, default_value_t = SortDirection::Descending)]
    pub sort_first: SortDirection,

    /// Reject rows instead of keeping them when a date filter cannot be parsed
    #[arg(long)]
    pub strict_filters: bool,

    /// Start with a username substring filter
    #[arg(long)]
    pub username: Option<String>,

    /// Start with an email substring filter
    #[arg(long)]
    pub email: Option<String>,

    /// Start with a phone filter, matched as exact number or date
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct UDConfig {
    pub url: String,
    pub event_poll_time: u64,
    pub page_size: usize,
    pub first_sort_direction: SortDirection,
    pub parse_policy: ParsePolicy,
    pub initial_filters: FilterSet,
}

impl Default for UDConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_USERS_URL.to_string(),
            event_poll_time: 100,
            page_size: PAGE_SIZE,
            first_sort_direction: SortDirection::Descending,
            parse_policy: ParsePolicy::Permissive,
            initial_filters: FilterSet::default(),
        }
    }
}

impl From<&Args> for UDConfig {
    fn from(args: &Args) -> Self {
        let policy = if args.strict_filters {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Permissive
        };
        let initial_filters = FilterSet::default()
            .with(ColumnId::Username, args.username.clone().map(FilterValue::Text))
            .with(ColumnId::Email, args.email.clone().map(FilterValue::Text))
            .with(ColumnId::Phone, args.phone.as_deref().map(FilterValue::parse));
        UDConfig::default()
            .with_url(args.url.clone())
            .with_initial_filters(initial_filters)
            .with_event_poll_time(args.poll_ms)
            .with_first_sort_direction(args.sort_first)
            .with_parse_policy(policy)
    }
}

/// Which line editor currently receives raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Filter(ColumnId),
    PageSelect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    EditFilter(ColumnId),
    RawKey(KeyEvent),
    SortBy(ColumnId),
    PreviousPage,
    NextPage,
    PageSelector,
    Help,
    Exit,
    DataLoaded(Result<Vec<UserRecord>, LoadError>),
}

/// The one failure class of the application: the user list could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Network(String),
    Status { status: u16, message: String },
    Body(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(e) => write!(f, "Failed to load users: {e}"),
            LoadError::Status { status, message } => {
                write!(f, "Failed to load users: server answered {status} {message}")
            }
            LoadError::Body(e) => write!(f, "Failed to load users: invalid response ({e})"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LoadError::Body(err.to_string())
        } else {
            LoadError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Body(err.to_string())
    }
}

#[derive(Debug)]
pub enum UDError {
    IoError(Error),
    LoadFailed(LoadError),
    LoggingFailed(String),
}

impl From<Error> for UDError {
    fn from(err: Error) -> Self {
        UDError::IoError(err)
    }
}

impl From<LoadError> for UDError {
    fn from(err: LoadError) -> Self {
        UDError::LoadFailed(err)
    }
}

impl fmt::Display for UDError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UDError::IoError(e) => write!(f, "IO error: {e}"),
            UDError::LoadFailed(e) => write!(f, "{e}"),
            UDError::LoggingFailed(e) => write!(f, "Could not set up logging: {e}"),
        }
    }
}

impl std::error::Error for UDError {}

pub const HELP_TEXT: &str = "\
Keys
  u        edit username filter
  e        edit email filter
  Enter    finish editing
  Esc      clear filter / close popup
  1 2 3    sort by username, email, phone (again to flip)
  h ←      previous page
  l →      next page
  g        select page
  ?        this help
  q        quit";

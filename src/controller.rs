use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, UDConfig, UDError};
use crate::model::Model;
use crate::users::ColumnId;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &UDConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, UDError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, model.raw_keyevents()));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('u'), _) => Some(Message::EditFilter(ColumnId::Username)),
            (KeyCode::Char('e'), _) => Some(Message::EditFilter(ColumnId::Email)),
            (KeyCode::Char(c @ '1'..='9'), _) => c
                .to_digit(10)
                .and_then(|d| ColumnId::from_position(d as usize - 1))
                .map(Message::SortBy),
            (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(Message::PreviousPage),
            (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(Message::NextPage),
            (KeyCode::Char('g'), _) => Some(Message::PageSelector),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

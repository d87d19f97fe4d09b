use lp_core::EventId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("event {0} is not on this timeline")]
    UnknownEvent(EventId),

    #[error("cursor from generation {cursor} used on timeline at generation {current}")]
    StaleCursor { cursor: u64, current: u64 },

    #[error("timeline corrupt: {0}")]
    Corrupt(String),
}

pub type TimelineResult<T> = Result<T, TimelineError>;

pub mod config;
pub mod error;
pub mod logging;
pub mod memo;
pub mod patterns;

pub use config::{Config, ConfigError, DEFAULT_MEMO_LIMIT, FeedConfig, LoggingConfig, RenderConfig, TodoIdMode};
pub use error::{Error, Result};
pub use memo::{Memo, MemoId, RowStatus, Shortcut, UserId, Visibility};

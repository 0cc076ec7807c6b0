#![forbid(unsafe_code)]

pub mod browser;
pub mod convert;
pub mod error;
pub mod input;
pub mod options;
pub mod page;
pub mod player;
pub mod player_assets;
pub mod record;
pub mod signal;

pub use convert::convert_cast_to_video;
pub use error::{CastError, CastResult};
pub use options::{ParsedOptions, RawOptions, Theme};

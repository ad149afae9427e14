//! Prelude for common imports used throughout all taskdeck crates

pub use crate::error::{ApiError, ApiResult, Error, Result, ResultExt};
pub use tracing::{debug, error, info, instrument, trace, warn};

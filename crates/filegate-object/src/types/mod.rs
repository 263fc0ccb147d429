mod error;
mod key_prefix;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use key_prefix::KeyPrefix;

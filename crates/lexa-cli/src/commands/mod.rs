//! CLI command implementations.

mod check;
mod keys;
mod resolve;

pub use check::{run_check, CheckArgs};
pub use keys::{run_keys, KeysArgs};
pub use resolve::{run_resolve, ResolveArgs};

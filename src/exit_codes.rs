//! Process exit codes of the `lbuild` binary.

use crate::error::Error;

pub const SUCCESS: i32 = 0;
/// Any resolution or build failure.
pub const FAILURE: i32 = 1;
/// Malformed command line or argument.
pub const USAGE: i32 = 2;
/// Failure while rendering templates.
pub const TEMPLATE: i32 = 3;

/// Exit code for an error returned by a command.
pub fn for_error(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        match cause.downcast_ref::<Error>() {
            Some(Error::Argument { .. }) => return USAGE,
            Some(Error::Template { .. }) => return TEMPLATE,
            _ => {}
        }
    }
    FAILURE
}

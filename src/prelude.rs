/*!
Common imports shared by every module.
*/

pub use snafu::{ensure, OptionExt, ResultExt, Snafu};

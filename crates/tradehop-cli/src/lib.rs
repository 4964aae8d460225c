//! Tradehop CLI library.
//!
//! Terminal styling and text/JSON rendering shared by the `tradehop`
//! subcommands.

pub mod output;
pub mod terminal;

//! librecur - Recurring transactions for plain text ledgers
//! ---
//!
//! A small config file lists transaction templates, each opened by a header line
//! such as `2011-07-01 (1m) * Rent`. Posting generates one ledger entry per period
//! that fell due up to a target date, appends them to the ledger file and moves
//! every template's date past the target, so running it again is a no-op.
//!

extern crate pest;
#[macro_use]
extern crate pest_derive;

/// Calendar parsing and period arithmetic on local epoch seconds.
///
/// Month steps clamp days past the 28th before adding, so `2011-01-31 + 1m` is
/// `2011-02-28`; year steps turn Feb 29 into Feb 28.
pub mod date;

mod error;
pub mod log;

/// Config grammar and loader entrypoints.
pub mod parser;

/// The recurring-transaction engine.
pub mod schedule;

pub mod store;
mod template;

pub use date::{add_period, format_date, parse_date, today, EpochSeconds, Period, PeriodUnit};
pub use error::{RecurError, Result};
pub use log::{Logger, TracingLogger};
pub use parser::{parse, parse_file};
pub use schedule::Schedule;
pub use store::{FileStore, Store};
pub use template::Template;

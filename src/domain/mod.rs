//! Transaction records and calendar windows shared by the engine.

pub mod transaction;
pub mod window;

pub use transaction::{parse_date, Period, Transaction, TransactionKind, TransactionType};
pub use window::DateWindow;

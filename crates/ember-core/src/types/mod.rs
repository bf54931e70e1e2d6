pub mod account;
pub mod address;
pub mod balance;
pub mod transaction;

pub use account::Account;
pub use address::Address;
pub use balance::{parse_balance, Balance};
pub use transaction::{Message, Transaction};

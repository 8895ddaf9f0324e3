pub mod accounts;
pub mod options;

pub use accounts::InMemoryAccounts;
pub use options::InMemoryOptionStore;

//! Command implementations for overrides-cli

pub mod add;
pub mod diff;
pub mod init;
pub mod list;
pub mod remove;
pub mod upgrade;
pub mod validate;

pub use add::run_add;
pub use diff::run_diff;
pub use init::run_init;
pub use list::run_list;
pub use remove::run_remove;
pub use upgrade::run_upgrade;
pub use validate::run_validate;

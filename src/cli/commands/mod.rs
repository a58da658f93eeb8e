//! One module per CLI subcommand.

pub mod change_password;
pub mod check_password;
pub mod init;
pub mod lock;
pub mod persistence;
pub mod reset;
pub mod set;
pub mod show;
pub mod status;
pub mod unlock;

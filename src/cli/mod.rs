//! 命令列介面：參數定義與指令分派

pub mod args;
pub mod commands;
pub mod context;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts};
pub use context::AppContext;

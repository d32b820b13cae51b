//! 子指令實作

pub mod backup;
pub mod bom;
pub mod import;
pub mod init;
pub mod part;

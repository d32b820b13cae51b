//! # bomkit
//!
//! 部品目錄與 BOM 計價工具：目錄儲存、主檔匯入、計價與匯出。

pub mod cli;
pub mod logging;
pub mod service;

pub use service::price_bom;

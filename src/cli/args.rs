//! 命令列參數（clap derive）

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{bom::BomCommands, import::ImportArgs, init::InitArgs, part::PartCommands};

/// 預設設定檔
pub const DEFAULT_CONFIG_FILE: &str = "bomkit.toml";

#[derive(Parser, Debug)]
#[command(name = "bomkit")]
#[command(author, version, about = "部品目錄與 BOM 計價工具")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// 設定檔（不存在時使用預設值）
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE, env = "BOMKIT_CONFIG")]
    pub config: PathBuf,

    /// 資料庫路徑（覆寫設定檔）
    #[arg(long, global = true, env = "BOMKIT_DB")]
    pub db: Option<PathBuf>,

    /// 允許寫入資料庫
    #[arg(long, global = true)]
    pub allow_write: bool,

    /// 輸出除錯日誌
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 初始化資料庫，目錄為空時載入主檔
    Init(InitArgs),

    /// 部品目錄
    #[command(subcommand)]
    Part(PartCommands),

    /// 從 CSV/Excel 匯入部品（預設僅預覽）
    Import(ImportArgs),

    /// BOM 管理、計價與匯出
    #[command(subcommand)]
    Bom(BomCommands),

    /// 備份資料庫檔案
    Backup,
}

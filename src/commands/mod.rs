//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `geometry/`, `utils/`
//! - 子模块: convert, info, rotate, show

pub mod convert;
pub mod info;
pub mod rotate;
pub mod show;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Info(args) => info::execute(args),
        Commands::Rotate(args) => rotate::execute(args),
        Commands::Show(args) => show::execute(args),
    }
}

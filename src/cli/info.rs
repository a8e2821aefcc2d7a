//! # info 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/info.rs`

use clap::Args;
use std::path::PathBuf;

/// info 子命令参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Structure file (POSCAR/CONTCAR/*.vasp or *.xyz)
    pub input: PathBuf,

    /// Also print every atom position
    #[arg(short, long, default_value_t = false)]
    pub atoms: bool,
}

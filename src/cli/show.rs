//! # show 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/show.rs`

use clap::Args;
use std::path::PathBuf;

/// show 子命令参数
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Structure file to display
    pub input: PathBuf,

    /// Viewer executable, called as '<viewer> -nt -POSCAR <file>'
    #[arg(long, env = "VASPUTIL_VIEWER", default_value = "vmd")]
    pub viewer: String,
}

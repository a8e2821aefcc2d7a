//! # show 命令实现
//!
//! 在外部查看器中显示晶胞，用户按回车后删除临时文件。
//!
//! ## 依赖关系
//! - 使用 `cli/show.rs` 定义的参数
//! - 使用 `parsers/`, `utils/viewer.rs`, `utils/output.rs`

use crate::cli::show::ShowArgs;
use crate::error::{Result, VasputilError};
use crate::parsers;
use crate::utils::output;
use crate::utils::viewer::{show_cell, ProcessRunner};

use std::io::{self, BufRead};

/// 执行 show 命令
pub fn execute(args: ShowArgs) -> Result<()> {
    let cell = parsers::parse_structure_file(&args.input)?;

    output::print_info(&format!(
        "Opening {} in {}",
        args.input.display(),
        args.viewer
    ));

    show_cell(&cell, &args.viewer, &ProcessRunner, wait_for_enter)
}

fn wait_for_enter() -> Result<()> {
    output::print_info("Press Enter when done to delete the temp file.");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| VasputilError::FileReadError {
            path: "<stdin>".to_string(),
            source: e,
        })?;
    Ok(())
}

//! # vasputil - VASP 超胞工具
//!
//! 读写 POSCAR / XYZ 结构文件，在分数坐标与笛卡尔坐标之间转换，
//! 并提供 Euler 角刚体旋转。
//!
//! ## 子命令
//! - `convert` - 结构格式与坐标类型转换 (POSCAR, XYZ)
//! - `info`    - 打印晶胞信息
//! - `rotate`  - Euler 角旋转原子
//! - `show`    - 在外部查看器中显示晶胞
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (POSCAR / XYZ 读写)
//!   │     ├── models/    (Cell 数据模型)
//!   │     └── geometry/  (Euler 角旋转)
//!   ├── utils/      (输出、进度条、查看器)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod geometry;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

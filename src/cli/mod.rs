//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: POSCAR / XYZ 格式转换与坐标类型切换
//! - `info`: 打印晶胞信息
//! - `rotate`: Euler 角旋转原子
//! - `show`: 在外部查看器中显示晶胞
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, info, rotate, show

pub mod convert;
pub mod info;
pub mod rotate;
pub mod show;

use clap::{Parser, Subcommand};

/// vasputil - VASP 超胞工具
#[derive(Parser)]
#[command(name = "vasputil")]
#[command(version)]
#[command(about = "Supercell utilities for VASP workflows", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert structure files between POSCAR and XYZ, optionally switching coordinates
    Convert(convert::ConvertArgs),

    /// Print lattice, species and coordinate information of a structure
    Info(info::InfoArgs),

    /// Rotate atoms by Euler angles (z-x-z convention)
    Rotate(rotate::RotateArgs),

    /// Show a structure in an external viewer (VMD)
    Show(show::ShowArgs),
}

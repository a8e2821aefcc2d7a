//! # convert 子命令 CLI 定义
//!
//! 批量转换结构文件格式 (POSCAR <-> XYZ) 以及坐标类型。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 支持的输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// VASP POSCAR format
    Poscar,
    /// XYZ format (always cartesian)
    Xyz,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Poscar => write!(f, "poscar"),
            OutputFormat::Xyz => write!(f, "xyz"),
        }
    }
}

/// 输出坐标类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CoordinateMode {
    /// Keep the coordinate type of the input
    Keep,
    /// Direct (fractional) coordinates
    Direct,
    /// Cartesian coordinates
    Cartesian,
}

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input structure files (POSCAR/CONTCAR/*.vasp or *.xyz)
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for converted files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target output format
    #[arg(short, long, value_enum)]
    pub target: OutputFormat,

    /// Coordinate type of the written structure
    #[arg(short, long, value_enum, default_value_t = CoordinateMode::Keep)]
    pub coords: CoordinateMode,

    /// Replace atom positions with those read from this XYZ file
    /// (lattice, species and flags come from each input)
    #[arg(long)]
    pub positions: Option<PathBuf>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

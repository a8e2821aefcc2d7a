//! # rotate 子命令 CLI 定义
//!
//! 以 z-x-z Euler 角绕指定点旋转原子。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/rotate.rs`

use clap::Args;
use std::path::PathBuf;

/// rotate 子命令参数
#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Input structure file
    pub input: PathBuf,

    /// Output file (format inferred from name: *.xyz or POSCAR-like)
    #[arg(short, long)]
    pub output: PathBuf,

    /// First rotation angle about z
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub phi: f64,

    /// Rotation angle about x
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub theta: f64,

    /// Second rotation angle about z
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub psi: f64,

    /// Angles are given in degrees instead of radians
    #[arg(long, default_value_t = false)]
    pub degrees: bool,

    /// Cartesian rotation point 'x,y,z' (default: origin)
    #[arg(long, allow_hyphen_values = true)]
    pub point: Option<String>,

    /// 1-based inclusive atom range to rotate, e.g. '3-8' (default: all atoms)
    #[arg(long)]
    pub atoms: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

//! # convert 命令实现
//!
//! 批量转换结构文件格式。
//!
//! ## 功能
//! - 读取 POSCAR 或 XYZ 文件
//! - 按需切换分数/笛卡尔坐标
//! - 写出 POSCAR 或 XYZ 格式
//! - 支持并行处理
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `parsers/`, `models/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::convert::{ConvertArgs, CoordinateMode, OutputFormat};
use crate::error::{Result, VasputilError};
use crate::models::Cell;
use crate::parsers::{self, poscar, xyz};
use crate::utils::{output, progress};

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header(&format!("Converting to {} format", args.target));

    // 创建输出目录
    fs::create_dir_all(&args.output).map_err(|e| VasputilError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    if args.target == OutputFormat::Xyz && args.coords == CoordinateMode::Direct {
        output::print_warning("XYZ output is always cartesian. Ignoring --coords direct.");
    }

    output::print_info(&format!("Found {} files to convert", args.inputs.len()));

    // 设置并行度
    let num_threads = if args.jobs == 0 {
        num_cpus::get()
    } else {
        args.jobs
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();

    let pb = progress::create_progress_bar(args.inputs.len() as u64, "Converting");
    let success_count = AtomicUsize::new(0);
    let skip_count = AtomicUsize::new(0);
    let fail_count = AtomicUsize::new(0);

    let options = ConvertOptions {
        target: args.target,
        coords: args.coords,
        positions: args.positions.as_deref(),
        overwrite: args.overwrite,
    };

    // 并行处理
    args.inputs.par_iter().for_each(|input_path| {
        match convert_file(input_path, &args.output, &options) {
            Ok(ConvertStatus::Success) => {
                success_count.fetch_add(1, Ordering::SeqCst);
            }
            Ok(ConvertStatus::Skipped) => {
                skip_count.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                fail_count.fetch_add(1, Ordering::SeqCst);
                pb.suspend(|| {
                    output::print_error(&format!("{}: {}", input_path.display(), e));
                });
            }
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");

    output::print_done(&format!(
        "Converted {} file(s) to '{}' in '{}' ({} skipped, {} failed)",
        success_count.load(Ordering::SeqCst),
        args.target,
        args.output.display(),
        skip_count.load(Ordering::SeqCst),
        fail_count.load(Ordering::SeqCst)
    ));

    Ok(())
}

/// 单个文件的转换选项
struct ConvertOptions<'a> {
    target: OutputFormat,
    coords: CoordinateMode,
    positions: Option<&'a Path>,
    overwrite: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum ConvertStatus {
    Success,
    Skipped,
}

/// 目标文件路径
fn output_path_for(input_path: &Path, output_dir: &Path, target: OutputFormat) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure");

    match target {
        OutputFormat::Poscar => output_dir.join(format!("POSCAR_{}", stem)),
        OutputFormat::Xyz => output_dir.join(format!("{}.xyz", stem)),
    }
}

/// 按坐标模式切换晶胞坐标
fn apply_coordinate_mode(cell: &mut Cell, mode: CoordinateMode) -> Result<()> {
    match mode {
        CoordinateMode::Keep => Ok(()),
        CoordinateMode::Direct => cell.cartesian_to_direct(),
        CoordinateMode::Cartesian => {
            cell.direct_to_cartesian();
            Ok(())
        }
    }
}

/// 转换单个文件
fn convert_file(
    input_path: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<ConvertStatus> {
    let output_path = output_path_for(input_path, output_dir, options.target);

    // 检查是否需要跳过
    if output_path.exists() && !options.overwrite {
        return Ok(ConvertStatus::Skipped);
    }

    let mut cell = parsers::parse_structure_file(input_path)?;

    if let Some(positions) = options.positions {
        xyz::read_xyz_into(&mut cell, positions)?;
    }

    match options.target {
        OutputFormat::Poscar => {
            apply_coordinate_mode(&mut cell, options.coords)?;
            poscar::write_poscar_file(&cell, &output_path)?;
        }
        OutputFormat::Xyz => {
            xyz::write_xyz_file(&mut cell, &output_path)?;
        }
    }

    Ok(ConvertStatus::Success)
}

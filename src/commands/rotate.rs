//! # rotate 命令实现
//!
//! 以 Euler 角绕给定点旋转晶胞中的原子并写出结果。
//! 分数坐标输入会先转为笛卡尔坐标旋转，写出前再转回分数坐标。
//!
//! ## 依赖关系
//! - 使用 `cli/rotate.rs` 定义的参数
//! - 使用 `parsers/`, `models/`, `geometry/`
//! - 使用 `utils/output.rs`

use crate::cli::rotate::RotateArgs;
use crate::error::{Result, VasputilError};
use crate::geometry::EulerAngles;
use crate::parsers::{self, poscar, xyz, StructureFormat};
use crate::utils::output;

use nalgebra::Vector3;
use std::ops::Range;

/// 执行 rotate 命令
pub fn execute(args: RotateArgs) -> Result<()> {
    output::print_header("Rotating atoms");

    if args.output.exists() && !args.overwrite {
        return Err(VasputilError::InvalidArgument(format!(
            "Output file '{}' exists (use --overwrite)",
            args.output.display()
        )));
    }

    let mut cell = parsers::parse_structure_file(&args.input)?;
    let was_direct = !cell.is_cartesian();

    let rotp = match &args.point {
        Some(p) => parse_point(p)?,
        None => Vector3::zeros(),
    };
    let range = match &args.atoms {
        Some(r) => parse_atom_range(r, cell.n_atoms())?,
        None => 0..cell.n_atoms(),
    };
    let angles = if args.degrees {
        EulerAngles::from_degrees(args.phi, args.theta, args.psi)
    } else {
        EulerAngles::new(args.phi, args.theta, args.psi)
    };

    output::print_info(&format!(
        "Rotating atoms {}-{} about ({}, {}, {})",
        range.start + 1,
        range.end,
        rotp.x,
        rotp.y,
        rotp.z
    ));

    cell.direct_to_cartesian();
    let mut rotated = cell.rotated(range, &rotp, angles)?;
    if was_direct {
        rotated.cartesian_to_direct()?;
    }

    match StructureFormat::detect(&args.output) {
        Some(StructureFormat::Xyz) => xyz::write_xyz_file(&mut rotated, &args.output)?,
        _ => poscar::write_poscar_file(&rotated, &args.output)?,
    }

    output::print_conversion(
        &args.input.display().to_string(),
        &args.output.display().to_string(),
    );
    Ok(())
}

/// 解析 "x,y,z" 形式的点
fn parse_point(point: &str) -> Result<Vector3<f64>> {
    let values = point
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| VasputilError::InvalidArgument(format!("Invalid point '{}'", point)))?;

    if values.len() != 3 {
        return Err(VasputilError::InvalidArgument(format!(
            "Point '{}' must have 3 components",
            point
        )));
    }

    Ok(Vector3::new(values[0], values[1], values[2]))
}

/// 解析 1 起始的闭区间 "a-b"，转换为 0 起始的半开区间
fn parse_atom_range(range: &str, n_atoms: usize) -> Result<Range<usize>> {
    let parts: Vec<&str> = range.split('-').collect();
    if parts.len() != 2 {
        return Err(VasputilError::InvalidRange(range.to_string()));
    }

    let start: usize = parts[0]
        .trim()
        .parse()
        .map_err(|_| VasputilError::InvalidRange(range.to_string()))?;
    let end: usize = parts[1]
        .trim()
        .parse()
        .map_err(|_| VasputilError::InvalidRange(range.to_string()))?;

    if start < 1 || end < start || end > n_atoms {
        return Err(VasputilError::InvalidRange(format!(
            "{} (must be 1 <= start <= end <= {})",
            range, n_atoms
        )));
    }

    Ok(start - 1..end)
}

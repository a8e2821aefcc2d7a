//! # XYZ 格式解析器
//!
//! ## XYZ 格式说明
//! ```text
//! 3                      # number of atoms
//! Generated by vasputil  # comment, ignored on read
//! Ag  0.0 0.0 0.0        # label x y z
//! ...
//! ```
//!
//! 读取时原子行先按标签 (第一个字段) 稳定排序，再依次填入坐标，
//! 因此同种元素的原子会排在一起，原文件顺序不保留。
//! XYZ 不携带晶格和元素计数信息，只更新 `atoms` 和坐标类型。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `models/cell.rs`, `commands/` 使用
//! - 使用 `models/cell.rs`

use crate::error::{Result, VasputilError};
use crate::models::Cell;
use nalgebra::Vector3;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const FORMAT: &str = "xyz";
const COMMENT: &str = "Generated by vasputil";

/// 没有元素信息时使用的标签
const UNKNOWN_LABEL: &str = "X";

/// 解析 XYZ 文件为新的晶胞
pub fn parse_xyz_file(path: &Path) -> Result<Cell> {
    let content = read_file(path)?;
    parse_xyz_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 XYZ 格式
pub fn parse_xyz_content(content: &str, name: &str) -> Result<Cell> {
    let mut cell = Cell::default();
    cell.replace_positions(parse_positions(content, name)?, true)?;
    Ok(cell)
}

/// 把 XYZ 文件中的坐标读入已有晶胞
///
/// 只替换 `atoms` 并置为笛卡尔坐标，其余字段保持不变。解析失败时晶胞不变。
pub fn read_xyz_into(cell: &mut Cell, path: &Path) -> Result<()> {
    let content = read_file(path)?;
    let atoms = parse_positions(&content, &path.display().to_string())?;
    cell.replace_positions(atoms, true)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 解析原子数和按标签排序后的坐标
fn parse_positions(content: &str, name: &str) -> Result<Vec<Vector3<f64>>> {
    let lines: Vec<&str> = content.lines().collect();

    // Line 0: 原子数
    let count: usize = lines
        .first()
        .ok_or_else(|| VasputilError::parse(FORMAT, name, 0, "Missing atom count"))?
        .trim()
        .parse()
        .map_err(|_| VasputilError::parse(FORMAT, name, 0, "Invalid atom count"))?;

    // Line 1 为注释，原子行从 line 2 开始
    let available = lines.len().saturating_sub(2);
    if available < count {
        return Err(VasputilError::parse(
            FORMAT,
            name,
            lines.len(),
            format!("Expected {} atom lines, found {}", count, available),
        ));
    }

    let mut records: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .skip(2)
        .take(count)
        .map(|(idx, line)| (idx, *line))
        .collect();
    records.sort_by(|a, b| label_of(a.1).cmp(label_of(b.1)));

    records
        .into_iter()
        .map(|(idx, line)| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 4 {
                return Err(VasputilError::parse(
                    FORMAT,
                    name,
                    idx,
                    "Expected '<label> x y z'",
                ));
            }
            let mut xyz = [0.0; 3];
            for (value, token) in xyz.iter_mut().zip(&tokens[1..4]) {
                *value = token.parse().map_err(|_| {
                    let reason = format!("Invalid coordinate '{}'", token);
                    VasputilError::parse(FORMAT, name, idx, reason)
                })?;
            }
            Ok(Vector3::from(xyz))
        })
        .collect()
}

fn label_of(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

/// 将 Cell 转换为 XYZ 格式字符串
///
/// 晶胞处于分数坐标时会先原地转换为笛卡尔坐标。
pub fn to_xyz_string(cell: &mut Cell) -> Result<String> {
    cell.direct_to_cartesian();

    let labels = cell
        .atom_labels()
        .unwrap_or_else(|| vec![UNKNOWN_LABEL; cell.n_atoms()]);

    let mut result = String::new();
    result.push_str(&format!("{}\n{}\n", cell.n_atoms(), COMMENT));

    for (label, pos) in labels.iter().zip(cell.atoms()) {
        result.push_str(&format!("{}\t{}\t{}\t{}\n", label, pos[0], pos[1], pos[2]));
    }

    Ok(result)
}

/// 写入 XYZ 文件 (创建或覆盖)
pub fn write_xyz_file(cell: &mut Cell, path: &Path) -> Result<()> {
    let content = to_xyz_string(cell)?;
    let map_err = |e| VasputilError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(map_err)?);
    writer.write_all(content.as_bytes()).map_err(map_err)?;
    writer.flush().map_err(map_err)
}

//! # 解析器模块
//!
//! 提供 POSCAR 与 XYZ 两种结构文件的读写。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `models/cell.rs` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, xyz

pub mod poscar;
pub mod xyz;

use crate::error::{Result, VasputilError};
use crate::models::{Cell, CellSource};
use std::path::Path;

/// 支持的结构文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Poscar,
    Xyz,
}

impl StructureFormat {
    /// 从文件名推断格式
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xyz" => Some(StructureFormat::Xyz),
            "vasp" | "poscar" => Some(StructureFormat::Poscar),
            _ => {
                // POSCAR/CONTCAR 通常没有扩展名
                let name = path.file_name().and_then(|n| n.to_str())?;
                if name.starts_with("POSCAR") || name.starts_with("CONTCAR") {
                    Some(StructureFormat::Poscar)
                } else {
                    None
                }
            }
        }
    }
}

/// 从文件路径推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<Cell> {
    let source = match StructureFormat::detect(path) {
        Some(StructureFormat::Poscar) => CellSource::Poscar(path.to_path_buf()),
        Some(StructureFormat::Xyz) => CellSource::Xyz(path.to_path_buf()),
        None => {
            return Err(VasputilError::UnsupportedFormat(format!(
                "Cannot determine format for: {}",
                path.display()
            )))
        }
    };
    Cell::load(&source)
}

//! # 超胞数据模型
//!
//! 定义 `Cell`：一个超胞快照，包含晶格常数、基矢、按元素分组的原子坐标，
//! 以及可选的 selective dynamics 标记。
//!
//! 坐标可以处于笛卡尔或分数 (direct) 表示，两者之间通过
//! `cartesian_to_direct` / `direct_to_cartesian` 原地切换。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `commands/`, `utils/viewer.rs` 使用
//! - 使用 `error.rs`, `geometry/rotation.rs`
//! - 使用 `nalgebra` 进行矩阵运算

use crate::error::{Result, VasputilError};
use crate::geometry::{rotate_molecule, EulerAngles};
use nalgebra::{Matrix3, Matrix3xX, Vector3};
use std::ops::Range;
use std::path::PathBuf;

/// 每个原子在 x/y/z 三个方向上的可移动标记 (如 "T"/"F")
pub type SelectiveFlags = [String; 3];

/// 构造 `Cell` 的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellSource {
    /// 默认空晶胞
    Empty,
    /// 从 POSCAR 文件读取
    Poscar(PathBuf),
    /// 从 XYZ 文件读取
    Xyz(PathBuf),
}

/// 构造 `Cell` 所需的全部字段
#[derive(Debug, Clone)]
pub struct CellParts {
    pub atom_names: Vec<String>,
    pub lattice_constant: f64,
    /// 基矢按列存储
    pub basis_vectors: Matrix3<f64>,
    pub n_atoms_type: Vec<usize>,
    pub atoms: Vec<Vector3<f64>>,
    pub selective_dynamics: bool,
    pub selective_flags: Vec<SelectiveFlags>,
    pub cartesian: bool,
}

/// 超胞
///
/// 原子总数 `n_atoms()` 由 `atoms` 的行数导出，没有任何修改它的途径。
/// 构造完成后只有 `atoms` 和 `cartesian` 会被坐标转换原地修改。
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    atom_names: Vec<String>,
    lattice_constant: f64,
    basis_vectors: Matrix3<f64>,
    n_atoms_type: Vec<usize>,
    atoms: Vec<Vector3<f64>>,
    selective_dynamics: bool,
    selective_flags: Vec<SelectiveFlags>,
    cartesian: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            atom_names: Vec::new(),
            lattice_constant: 1.0,
            basis_vectors: Matrix3::identity(),
            n_atoms_type: Vec::new(),
            atoms: Vec::new(),
            selective_dynamics: true,
            selective_flags: Vec::new(),
            cartesian: true,
        }
    }
}

impl Cell {
    /// 按来源构造晶胞
    pub fn load(source: &CellSource) -> Result<Self> {
        match source {
            CellSource::Empty => Ok(Cell::default()),
            CellSource::Poscar(path) => crate::parsers::poscar::parse_poscar_file(path),
            CellSource::Xyz(path) => crate::parsers::xyz::parse_xyz_file(path),
        }
    }

    /// 从各字段构造晶胞，并检查字段之间的一致性
    ///
    /// 元素计数为空时 (如 XYZ 来源) 不要求其总和等于原子数。
    pub fn from_parts(parts: CellParts) -> Result<Self> {
        if parts.atom_names.len() != parts.n_atoms_type.len() {
            return Err(VasputilError::InconsistentCell(format!(
                "{} species names but {} species counts",
                parts.atom_names.len(),
                parts.n_atoms_type.len()
            )));
        }

        let declared = total_count(&parts.n_atoms_type);
        if !parts.n_atoms_type.is_empty() && declared != Some(parts.atoms.len()) {
            return Err(VasputilError::InconsistentCell(format!(
                "species counts {:?} do not add up to {} atoms",
                parts.n_atoms_type,
                parts.atoms.len()
            )));
        }

        if parts.selective_dynamics && parts.selective_flags.len() != parts.atoms.len() {
            return Err(VasputilError::InconsistentCell(format!(
                "selective dynamics needs {} flag rows, got {}",
                parts.atoms.len(),
                parts.selective_flags.len()
            )));
        }

        if !parts.selective_dynamics && !parts.selective_flags.is_empty() {
            return Err(VasputilError::InconsistentCell(
                "selective flags given without selective dynamics".to_string(),
            ));
        }

        Ok(Cell {
            atom_names: parts.atom_names,
            lattice_constant: parts.lattice_constant,
            basis_vectors: parts.basis_vectors,
            n_atoms_type: parts.n_atoms_type,
            atoms: parts.atoms,
            selective_dynamics: parts.selective_dynamics,
            selective_flags: parts.selective_flags,
            cartesian: parts.cartesian,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // 访问器
    // ─────────────────────────────────────────────────────────────

    pub fn atom_names(&self) -> &[String] {
        &self.atom_names
    }

    pub fn lattice_constant(&self) -> f64 {
        self.lattice_constant
    }

    /// 基矢矩阵，每一列是一个基矢
    pub fn basis_vectors(&self) -> &Matrix3<f64> {
        &self.basis_vectors
    }

    pub fn n_atoms_type(&self) -> &[usize] {
        &self.n_atoms_type
    }

    pub fn atoms(&self) -> &[Vector3<f64>] {
        &self.atoms
    }

    pub fn selective_dynamics(&self) -> bool {
        self.selective_dynamics
    }

    pub fn selective_flags(&self) -> &[SelectiveFlags] {
        &self.selective_flags
    }

    pub fn is_cartesian(&self) -> bool {
        self.cartesian
    }

    /// 原子总数
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// 晶格常数乘以基矢
    pub fn scaled_basis(&self) -> Matrix3<f64> {
        self.basis_vectors * self.lattice_constant
    }

    /// 晶胞体积 (含晶格常数缩放)
    pub fn volume(&self) -> f64 {
        self.scaled_basis().determinant().abs()
    }

    /// 按元素顺序给出每个原子的元素符号
    ///
    /// 没有元素信息时 (XYZ 来源) 返回 `None`。
    pub fn atom_labels(&self) -> Option<Vec<&str>> {
        if self.n_atoms_type.is_empty() {
            return None;
        }
        Some(
            self.atom_names
                .iter()
                .zip(self.n_atoms_type.iter())
                .flat_map(|(name, &count)| std::iter::repeat(name.as_str()).take(count))
                .collect(),
        )
    }

    // ─────────────────────────────────────────────────────────────
    // 坐标转换
    // ─────────────────────────────────────────────────────────────

    /// 笛卡尔坐标转分数坐标
    ///
    /// 求解线性方程组 `a * B * X = atoms^T`，而不是对 `B` 求逆。
    /// 基矢奇异时返回错误，晶胞保持不变。
    pub fn cartesian_to_direct(&mut self) -> Result<()> {
        if !self.cartesian {
            return Ok(());
        }

        let lu = self.scaled_basis().lu();
        if !lu.is_invertible() {
            return Err(VasputilError::SingularLattice);
        }

        if !self.atoms.is_empty() {
            let rhs = Matrix3xX::from_columns(&self.atoms);
            let solved = lu.solve(&rhs).ok_or(VasputilError::SingularLattice)?;
            self.atoms = solved.column_iter().map(|c| c.into_owned()).collect();
        }

        self.cartesian = false;
        Ok(())
    }

    /// 分数坐标转笛卡尔坐标
    pub fn direct_to_cartesian(&mut self) {
        if self.cartesian {
            return;
        }

        let m = self.scaled_basis();
        for atom in self.atoms.iter_mut() {
            *atom = m * *atom;
        }

        self.cartesian = true;
    }

    // ─────────────────────────────────────────────────────────────
    // 派生晶胞
    // ─────────────────────────────────────────────────────────────

    /// 以新的坐标替换 `atoms`，其余字段沿用当前晶胞
    pub fn with_positions(&self, atoms: Vec<Vector3<f64>>) -> Result<Self> {
        if atoms.len() != self.atoms.len() {
            return Err(VasputilError::InconsistentCell(format!(
                "expected {} positions, got {}",
                self.atoms.len(),
                atoms.len()
            )));
        }
        Ok(Cell {
            atoms,
            ..self.clone()
        })
    }

    /// 绕 `rotp` 以 Euler 角旋转 `range` 范围内的原子，返回新的晶胞
    ///
    /// 晶胞必须处于笛卡尔表示。
    pub fn rotated(
        &self,
        range: Range<usize>,
        rotp: &Vector3<f64>,
        angles: EulerAngles,
    ) -> Result<Self> {
        if !self.cartesian {
            return Err(VasputilError::InconsistentCell(
                "rotation requires cartesian coordinates".to_string(),
            ));
        }
        if range.start > range.end || range.end > self.atoms.len() {
            return Err(VasputilError::InvalidArgument(format!(
                "atom range {}..{} out of bounds for {} atoms",
                range.start,
                range.end,
                self.atoms.len()
            )));
        }

        let rotated = rotate_molecule(&self.atoms[range.clone()], rotp, angles);
        let mut atoms = self.atoms.clone();
        atoms[range].copy_from_slice(&rotated);
        self.with_positions(atoms)
    }

    /// 仅替换坐标与坐标类型，用于把 XYZ 坐标读入已有晶胞
    ///
    /// 已有元素计数或 selective 标记与新的原子数不符时拒绝替换。
    pub(crate) fn replace_positions(
        &mut self,
        atoms: Vec<Vector3<f64>>,
        cartesian: bool,
    ) -> Result<()> {
        let declared = total_count(&self.n_atoms_type);
        if !self.n_atoms_type.is_empty() && declared != Some(atoms.len()) {
            return Err(VasputilError::InconsistentCell(format!(
                "cell declares {:?} atoms per species, new coordinates have {}",
                self.n_atoms_type,
                atoms.len()
            )));
        }
        if !self.selective_flags.is_empty() && self.selective_flags.len() != atoms.len() {
            return Err(VasputilError::InconsistentCell(format!(
                "cell carries {} selective flag rows, new coordinates have {}",
                self.selective_flags.len(),
                atoms.len()
            )));
        }

        self.atoms = atoms;
        self.cartesian = cartesian;
        Ok(())
    }
}

/// 元素计数之和，溢出时返回 `None`
pub(crate) fn total_count(counts: &[usize]) -> Option<usize> {
    counts.iter().try_fold(0usize, |acc, &n| acc.checked_add(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ag_ge_cell() -> Cell {
        Cell::from_parts(CellParts {
            atom_names: vec!["Ag".to_string(), "Ge".to_string()],
            lattice_constant: 2.0,
            basis_vectors: Matrix3::identity(),
            n_atoms_type: vec![1, 2],
            atoms: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.5, 1.5, 1.0),
            ],
            selective_dynamics: false,
            selective_flags: Vec::new(),
            cartesian: true,
        })
        .unwrap()
    }

    fn assert_atoms_close(a: &[Vector3<f64>], b: &[Vector3<f64>], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < tol, "{:?} != {:?}", x, y);
        }
    }

    #[test]
    fn test_default_cell() {
        let cell = Cell::default();
        assert_eq!(cell.n_atoms(), 0);
        assert_eq!(cell.lattice_constant(), 1.0);
        assert_eq!(*cell.basis_vectors(), Matrix3::identity());
        assert!(cell.is_cartesian());
        assert!(cell.selective_dynamics());
        assert!(cell.atom_names().is_empty());
    }

    #[test]
    fn test_load_empty_source() {
        let cell = Cell::load(&CellSource::Empty).unwrap();
        assert_eq!(cell, Cell::default());
    }

    #[test]
    fn test_n_atoms_tracks_rows() {
        let cell = ag_ge_cell();
        assert_eq!(cell.n_atoms(), cell.atoms().len());
        assert_eq!(cell.n_atoms(), 3);
    }

    #[test]
    fn test_cartesian_direct_round_trip() {
        let mut cell = ag_ge_cell();
        let original = cell.atoms().to_vec();

        cell.cartesian_to_direct().unwrap();
        assert!(!cell.is_cartesian());
        assert!((cell.atoms()[1] - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-12);

        cell.direct_to_cartesian();
        assert!(cell.is_cartesian());
        assert_atoms_close(cell.atoms(), &original, 1e-9);
    }

    #[test]
    fn test_round_trip_non_orthogonal() {
        let basis = Matrix3::from_columns(&[
            Vector3::new(4.0, 0.0, 0.0),
            Vector3::new(2.0, 3.46, 0.0),
            Vector3::new(0.3, 0.7, 5.0),
        ]);
        let mut cell = Cell::from_parts(CellParts {
            atom_names: vec!["Si".to_string()],
            lattice_constant: 1.3,
            basis_vectors: basis,
            n_atoms_type: vec![2],
            atoms: vec![Vector3::new(0.333, 0.667, 0.25), Vector3::new(0.9, 0.1, 0.5)],
            selective_dynamics: false,
            selective_flags: Vec::new(),
            cartesian: false,
        })
        .unwrap();
        let original = cell.atoms().to_vec();

        cell.direct_to_cartesian();
        cell.cartesian_to_direct().unwrap();
        assert_atoms_close(cell.atoms(), &original, 1e-9);
    }

    #[test]
    fn test_conversion_is_noop_in_same_state() {
        let mut cell = ag_ge_cell();
        let original = cell.atoms().to_vec();
        cell.direct_to_cartesian();
        assert_eq!(cell.atoms(), &original[..]);

        cell.cartesian_to_direct().unwrap();
        let direct = cell.atoms().to_vec();
        cell.cartesian_to_direct().unwrap();
        assert_eq!(cell.atoms(), &direct[..]);
    }

    #[test]
    fn test_toggle_pair_idempotent() {
        let mut cell = ag_ge_cell();
        cell.cartesian_to_direct().unwrap();
        let direct = cell.atoms().to_vec();
        cell.direct_to_cartesian();
        cell.cartesian_to_direct().unwrap();
        assert_atoms_close(cell.atoms(), &direct, 1e-9);
    }

    #[test]
    fn test_singular_lattice_rejected() {
        let mut parts = CellParts {
            atom_names: vec!["H".to_string()],
            lattice_constant: 1.0,
            basis_vectors: Matrix3::zeros(),
            n_atoms_type: vec![1],
            atoms: vec![Vector3::new(1.0, 0.0, 0.0)],
            selective_dynamics: false,
            selective_flags: Vec::new(),
            cartesian: true,
        };
        parts.basis_vectors[(0, 0)] = 1.0;
        let mut cell = Cell::from_parts(parts).unwrap();
        let before = cell.clone();

        let err = cell.cartesian_to_direct().unwrap_err();
        assert!(matches!(err, VasputilError::SingularLattice));
        assert_eq!(cell, before);
    }

    #[test]
    fn test_from_parts_count_mismatch() {
        let err = Cell::from_parts(CellParts {
            atom_names: vec!["Ag".to_string()],
            lattice_constant: 1.0,
            basis_vectors: Matrix3::identity(),
            n_atoms_type: vec![2],
            atoms: vec![Vector3::zeros()],
            selective_dynamics: false,
            selective_flags: Vec::new(),
            cartesian: true,
        })
        .unwrap_err();
        assert!(matches!(err, VasputilError::InconsistentCell(_)));
    }

    #[test]
    fn test_from_parts_missing_flags() {
        let err = Cell::from_parts(CellParts {
            atom_names: vec!["Ag".to_string()],
            lattice_constant: 1.0,
            basis_vectors: Matrix3::identity(),
            n_atoms_type: vec![1],
            atoms: vec![Vector3::zeros()],
            selective_dynamics: true,
            selective_flags: Vec::new(),
            cartesian: true,
        })
        .unwrap_err();
        assert!(matches!(err, VasputilError::InconsistentCell(_)));
    }

    #[test]
    fn test_atom_labels() {
        let cell = ag_ge_cell();
        assert_eq!(cell.atom_labels().unwrap(), vec!["Ag", "Ge", "Ge"]);
        assert!(Cell::default().atom_labels().is_none());
    }

    #[test]
    fn test_volume_scaled() {
        let cell = ag_ge_cell();
        // (2.0)^3
        assert!((cell.volume() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotated_subset() {
        let cell = ag_ge_cell();
        let angles = EulerAngles {
            phi: std::f64::consts::FRAC_PI_2,
            theta: 0.0,
            psi: 0.0,
        };
        let rotated = cell.rotated(1..2, &Vector3::zeros(), angles).unwrap();

        assert_eq!(rotated.atoms()[0], cell.atoms()[0]);
        assert_eq!(rotated.atoms()[2], cell.atoms()[2]);
        assert!((rotated.atoms()[1].norm() - cell.atoms()[1].norm()).abs() < 1e-12);
        assert_eq!(rotated.atom_names(), cell.atom_names());
    }

    #[test]
    fn test_rotated_requires_cartesian() {
        let mut cell = ag_ge_cell();
        cell.cartesian_to_direct().unwrap();
        assert!(cell
            .rotated(0..1, &Vector3::zeros(), EulerAngles::default())
            .is_err());
    }

    #[test]
    fn test_rotated_range_out_of_bounds() {
        let cell = ag_ge_cell();
        let err = cell
            .rotated(0..4, &Vector3::zeros(), EulerAngles::default())
            .unwrap_err();
        assert!(matches!(err, VasputilError::InvalidArgument(_)));
    }

    #[test]
    fn test_replace_positions_checks_counts() {
        let mut cell = ag_ge_cell();
        let err = cell
            .replace_positions(vec![Vector3::zeros()], true)
            .unwrap_err();
        assert!(matches!(err, VasputilError::InconsistentCell(_)));
        assert_eq!(cell.n_atoms(), 3);
    }

    #[test]
    fn test_overflowing_counts_rejected() {
        let err = Cell::from_parts(CellParts {
            atom_names: vec!["Ag".to_string(), "Ge".to_string()],
            lattice_constant: 1.0,
            basis_vectors: Matrix3::identity(),
            n_atoms_type: vec![usize::MAX, 1],
            atoms: Vec::new(),
            selective_dynamics: false,
            selective_flags: Vec::new(),
            cartesian: true,
        })
        .unwrap_err();
        assert!(matches!(err, VasputilError::InconsistentCell(_)));
        assert_eq!(total_count(&[usize::MAX, 1]), None);
        assert_eq!(total_count(&[1, 2]), Some(3));
    }
}

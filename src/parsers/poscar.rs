//! # VASP POSCAR 格式解析器
//!
//! 读写 vasputil 使用的 POSCAR 布局。
//!
//! ## POSCAR 格式说明
//! ```text
//! Ag Ge                  # element symbols, in species order
//! 2.0                    # lattice constant
//! a1 a2 a3               # lattice vector a (stored as column 0)
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! 1 2                    # number of atoms per element
//! Selective dynamics     # optional, first char 'S'/'s'
//! Cartesian              # 'C'/'c'/'K'/'k' => cartesian, otherwise direct
//! x1 y1 z1 [T T T]       # one line per atom, flags iff selective dynamics
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `models/cell.rs`, `commands/` 使用
//! - 使用 `models/cell.rs`

use crate::error::{Result, VasputilError};
use crate::models::cell::total_count;
use crate::models::{Cell, CellParts, SelectiveFlags};
use nalgebra::{Matrix3, Vector3};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const FORMAT: &str = "poscar";

/// 解析 POSCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Cell> {
    let content = fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POSCAR 格式
///
/// `name` 只用于错误信息。
pub fn parse_poscar_content(content: &str, name: &str) -> Result<Cell> {
    let lines: Vec<&str> = content.lines().collect();
    let err = |idx: usize, reason: String| VasputilError::parse(FORMAT, name, idx, reason);
    let line = |idx: usize, what: &'static str| required_line(&lines, idx, what, name);

    // Line 0: 元素符号
    let atom_names: Vec<String> = line(0, "element symbols")?
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();

    // Line 1: 晶格常数
    let lattice_constant: f64 = line(1, "lattice constant")?
        .trim()
        .parse()
        .map_err(|_| err(1, "Invalid lattice constant".to_string()))?;

    // Lines 2-4: 基矢，文件中按行给出，内部按列存储
    let mut columns = [Vector3::zeros(); 3];
    for (i, column) in columns.iter_mut().enumerate() {
        let idx = 2 + i;
        *column = parse_vector(line(idx, "lattice vector")?)
            .ok_or_else(|| err(idx, "Invalid lattice vector".to_string()))?;
    }
    let basis_vectors = Matrix3::from_columns(&columns);

    // Line 5: 每种元素的原子数
    let n_atoms_type = line(5, "atom counts")?
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| err(5, "Invalid atom count".to_string()))?;

    if n_atoms_type.len() != atom_names.len() {
        return Err(err(
            5,
            format!(
                "{} atom counts given for {} element symbols",
                n_atoms_type.len(),
                atom_names.len()
            ),
        ));
    }

    // Line 6: 可选的 Selective dynamics
    let mut coord_line = 6;
    let selective_dynamics = first_char_in(line(coord_line, "coordinate type")?, &['s']);
    if selective_dynamics {
        coord_line += 1;
    }

    // 坐标类型
    let coord_type = line(coord_line, "coordinate type")?;
    if coord_type.trim().is_empty() {
        return Err(err(coord_line, "Empty coordinate type line".to_string()));
    }
    let cartesian = first_char_in(coord_type, &['c', 'k']);

    // 原子坐标
    let total = total_count(&n_atoms_type)
        .ok_or_else(|| err(5, "Atom counts overflow".to_string()))?;
    let first_atom_line = coord_line + 1;
    let available = lines.len().saturating_sub(first_atom_line);
    if available < total {
        return Err(err(
            first_atom_line + available,
            format!("Expected {} atom lines, found {}", total, available),
        ));
    }

    let mut atoms = Vec::with_capacity(total);
    let mut selective_flags: Vec<SelectiveFlags> = Vec::new();

    for (k, text) in lines[first_atom_line..first_atom_line + total].iter().enumerate() {
        let idx = first_atom_line + k;

        atoms.push(
            parse_vector(text).ok_or_else(|| err(idx, "Invalid atom coordinates".to_string()))?,
        );

        if selective_dynamics {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.len() < 6 {
                return Err(err(idx, "Missing selective dynamics flags".to_string()));
            }
            selective_flags.push([
                tokens[3].to_string(),
                tokens[4].to_string(),
                tokens[5].to_string(),
            ]);
        }
    }

    Cell::from_parts(CellParts {
        atom_names,
        lattice_constant,
        basis_vectors,
        n_atoms_type,
        atoms,
        selective_dynamics,
        selective_flags,
        cartesian,
    })
}

fn required_line<'a>(lines: &[&'a str], idx: usize, what: &str, name: &str) -> Result<&'a str> {
    lines
        .get(idx)
        .copied()
        .ok_or_else(|| VasputilError::parse(FORMAT, name, idx, format!("Missing {}", what)))
}

/// 取一行中前三个数值
fn parse_vector(line: &str) -> Option<Vector3<f64>> {
    let mut it = line.split_whitespace().map(|s| s.parse::<f64>());
    let x = it.next()?.ok()?;
    let y = it.next()?.ok()?;
    let z = it.next()?.ok()?;
    Some(Vector3::new(x, y, z))
}

/// 行首 (忽略前导空白) 字符是否为给定字符之一，大小写不敏感
fn first_char_in(line: &str, chars: &[char]) -> bool {
    line.trim_start()
        .chars()
        .next()
        .map(|c| chars.contains(&c.to_ascii_lowercase()))
        .unwrap_or(false)
}

/// 将 Cell 转换为 POSCAR 格式字符串
///
/// 没有元素计数的晶胞 (XYZ 来源) 无法写成 POSCAR。
pub fn to_poscar_string(cell: &Cell) -> Result<String> {
    if cell.atom_labels().is_none() && cell.n_atoms() > 0 {
        return Err(VasputilError::InvalidArgument(
            "cell has no species counts (XYZ input), cannot write POSCAR".to_string(),
        ));
    }
    if cell.selective_dynamics() && cell.selective_flags().len() != cell.n_atoms() {
        return Err(VasputilError::InconsistentCell(format!(
            "selective dynamics is on but {} flag rows exist for {} atoms",
            cell.selective_flags().len(),
            cell.n_atoms()
        )));
    }

    let mut result = String::new();

    // Line 0: Elements
    result.push_str(&format!("{}\n", cell.atom_names().join(" ")));

    // Line 1: Lattice constant
    result.push_str(&format!("{}\n", cell.lattice_constant()));

    // Lines 2-4: Lattice, 每列写成一行
    for v in cell.basis_vectors().column_iter() {
        result.push_str(&format!("{} {} {}\n", v[0], v[1], v[2]));
    }

    // Line 5: Counts
    let counts: Vec<String> = cell.n_atoms_type().iter().map(|n| n.to_string()).collect();
    result.push_str(&format!("{}\n", counts.join(" ")));

    if cell.selective_dynamics() {
        result.push_str("Selective dynamics\n");
    }

    if cell.is_cartesian() {
        result.push_str("Cartesian\n");
    } else {
        result.push_str("Direct\n");
    }

    for (i, pos) in cell.atoms().iter().enumerate() {
        result.push_str(&format!("{} {} {}", pos[0], pos[1], pos[2]));
        if cell.selective_dynamics() {
            let flags = &cell.selective_flags()[i];
            result.push_str(&format!(" {} {} {}", flags[0], flags[1], flags[2]));
        }
        result.push('\n');
    }

    Ok(result)
}

/// 写入调用者持有的输出流
///
/// 写完后刷新，但不关闭 `sink`。
pub fn write_poscar<W: Write>(cell: &Cell, sink: &mut W) -> Result<()> {
    let content = to_poscar_string(cell)?;
    sink.write_all(content.as_bytes())
        .and_then(|_| sink.flush())
        .map_err(|e| VasputilError::FileWriteError {
            path: "<stream>".to_string(),
            source: e,
        })
}

/// 写入 POSCAR 文件 (创建或覆盖)
pub fn write_poscar_file(cell: &Cell, path: &Path) -> Result<()> {
    let content = to_poscar_string(cell)?;
    let map_err = |e| VasputilError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(map_err)?);
    writer.write_all(content.as_bytes()).map_err(map_err)?;
    writer.flush().map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AG_GE: &str = r#"Ag Ge
2.0
1.0 0.0 0.0
0.0 1.0 0.0
0.0 0.0 1.0
1 2
Cartesian
0.0 0.0 0.0
1.0 1.0 0.0
0.5 1.5 1.0
"#;

    const SELECTIVE: &str = r#"Fe
2.87
1.0 0.0 0.0
0.0 1.0 0.0
0.0 0.0 1.0
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F T
"#;

    #[test]
    fn test_parse_ag_ge() {
        let cell = parse_poscar_content(AG_GE, "AgGe").unwrap();
        assert_eq!(cell.n_atoms(), 3);
        assert_eq!(cell.atom_names(), &["Ag".to_string(), "Ge".to_string()]);
        assert_eq!(cell.n_atoms_type(), &[1, 2]);
        assert!((cell.lattice_constant() - 2.0).abs() < 1e-12);
        assert_eq!(*cell.basis_vectors(), Matrix3::identity());
        assert!(cell.is_cartesian());
        assert_eq!(cell.atoms()[1], Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(cell.atoms()[2], Vector3::new(0.5, 1.5, 1.0));
    }

    #[test]
    fn test_no_selective_dynamics() {
        let cell = parse_poscar_content(AG_GE, "AgGe").unwrap();
        assert!(!cell.selective_dynamics());
        assert!(cell.selective_flags().is_empty());
    }

    #[test]
    fn test_parse_selective_dynamics() {
        let cell = parse_poscar_content(SELECTIVE, "Fe").unwrap();
        assert!(cell.selective_dynamics());
        assert!(!cell.is_cartesian());
        assert_eq!(cell.selective_flags().len(), 2);
        assert_eq!(cell.selective_flags()[1], ["F", "F", "T"].map(String::from));
    }

    #[test]
    fn test_basis_rows_stored_as_columns() {
        let content = "Si\n1.0\n1.0 2.0 3.0\n4.0 5.0 6.0\n7.0 8.0 10.0\n1\nDirect\n0 0 0\n";
        let cell = parse_poscar_content(content, "Si").unwrap();
        let b = cell.basis_vectors();
        assert_eq!(b.column(0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b[(0, 1)], 4.0);
        assert_eq!(b[(2, 2)], 10.0);
    }

    #[test]
    fn test_write_basis_as_rows() {
        let content = "Si\n1.0\n1.0 2.0 3.0\n4.0 5.0 6.0\n7.0 8.0 10.0\n1\nDirect\n0 0 0\n";
        let cell = parse_poscar_content(content, "Si").unwrap();

        let text = to_poscar_string(&cell).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "1 2 3");
        assert_eq!(lines[3], "4 5 6");
        assert_eq!(lines[4], "7 8 10");

        let parsed = parse_poscar_content(&text, "Si").unwrap();
        assert_eq!(parsed, cell);
    }

    #[test]
    fn test_overflowing_atom_counts() {
        let content = AG_GE.replace("1 2\n", "18446744073709551615 1\n");
        let err = parse_poscar_content(&content, "bad").unwrap_err();
        assert!(matches!(err, VasputilError::ParseError { line: 6, .. }));
    }

    #[test]
    fn test_huge_atom_count_without_lines() {
        let content = "H\n1.0\n1 0 0\n0 1 0\n0 0 1\n1000000000000000000\nDirect\n0 0 0\n";
        let err = parse_poscar_content(content, "bad").unwrap_err();
        match err {
            VasputilError::ParseError { line, reason, .. } => {
                assert_eq!(line, 9);
                assert!(reason.contains("found 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_coordinate_type_markers() {
        let markers = [
            ("K", true),
            ("kartesian", true),
            ("c", true),
            ("Direct", false),
            ("reduced", false),
        ];
        for (marker, cartesian) in markers {
            let content = format!("H\n1.0\n1 0 0\n0 1 0\n0 0 1\n1\n{}\n0 0 0\n", marker);
            let cell = parse_poscar_content(&content, "H").unwrap();
            assert_eq!(cell.is_cartesian(), cartesian, "marker {}", marker);
        }
    }

    #[test]
    fn test_missing_atom_lines() {
        let truncated: String = AG_GE.lines().take(9).map(|l| format!("{}\n", l)).collect();
        let err = parse_poscar_content(&truncated, "short").unwrap_err();
        match err {
            VasputilError::ParseError { line, reason, .. } => {
                assert_eq!(line, 10);
                assert!(reason.contains("Expected 3 atom lines"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_header() {
        let err = parse_poscar_content("Ag\n1.0\n1 0 0\n", "short").unwrap_err();
        assert!(matches!(err, VasputilError::ParseError { line: 4, .. }));
    }

    #[test]
    fn test_non_numeric_lattice_constant() {
        let content = AG_GE.replacen("2.0", "two", 1);
        let err = parse_poscar_content(&content, "bad").unwrap_err();
        assert!(matches!(err, VasputilError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let content = AG_GE.replace("0.5 1.5 1.0", "0.5 x 1.0");
        let err = parse_poscar_content(&content, "bad").unwrap_err();
        assert!(matches!(err, VasputilError::ParseError { line: 10, .. }));
    }

    #[test]
    fn test_species_count_mismatch() {
        let content = AG_GE.replace("1 2\n", "1 2 3\n");
        let err = parse_poscar_content(&content, "bad").unwrap_err();
        assert!(matches!(err, VasputilError::ParseError { line: 6, .. }));
    }

    #[test]
    fn test_missing_flags() {
        let content = SELECTIVE.replace("0.5 0.5 0.5 F F T", "0.5 0.5 0.5");
        let err = parse_poscar_content(&content, "bad").unwrap_err();
        assert!(matches!(err, VasputilError::ParseError { line: 10, .. }));
    }

    #[test]
    fn test_string_round_trip() {
        for source in [AG_GE, SELECTIVE] {
            let cell = parse_poscar_content(source, "orig").unwrap();
            let text = to_poscar_string(&cell).unwrap();
            let parsed = parse_poscar_content(&text, "round_trip").unwrap();
            assert_eq!(parsed, cell);
        }
    }

    #[test]
    fn test_round_trip_after_conversion() {
        let mut cell = parse_poscar_content(AG_GE, "AgGe").unwrap();
        cell.cartesian_to_direct().unwrap();
        let parsed = parse_poscar_content(&to_poscar_string(&cell).unwrap(), "rt").unwrap();
        assert!(!parsed.is_cartesian());
        for (a, b) in parsed.atoms().iter().zip(cell.atoms()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_write_line_layout() {
        let cell = parse_poscar_content(SELECTIVE, "Fe").unwrap();
        let text = to_poscar_string(&cell).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Fe");
        assert_eq!(lines[1], "2.87");
        assert_eq!(lines[5], "2");
        assert_eq!(lines[6], "Selective dynamics");
        assert_eq!(lines[7], "Direct");
        assert_eq!(lines[9], "0.5 0.5 0.5 F F T");
    }

    #[test]
    fn test_write_to_sink_keeps_sink_open() {
        let cell = parse_poscar_content(AG_GE, "AgGe").unwrap();
        let mut sink: Vec<u8> = Vec::new();
        write_poscar(&cell, &mut sink).unwrap();
        sink.extend_from_slice(b"trailer\n");

        let text = String::from_utf8(sink).unwrap();
        assert!(text.ends_with("0.5 1.5 1\ntrailer\n"));
    }

    #[test]
    fn test_file_round_trip() {
        let cell = parse_poscar_content(SELECTIVE, "Fe").unwrap();
        let path = std::env::temp_dir().join(format!("vasputil_poscar_{}", std::process::id()));

        write_poscar_file(&cell, &path).unwrap();
        let parsed = parse_poscar_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(parsed, cell);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("vasputil_does_not_exist_POSCAR");
        let err = parse_poscar_file(&path).unwrap_err();
        assert!(matches!(err, VasputilError::FileReadError { .. }));
    }

    #[test]
    fn test_refuse_cell_without_species() {
        let mut cell = Cell::default();
        cell.replace_positions(vec![Vector3::zeros()], true).unwrap();
        let err = to_poscar_string(&cell).unwrap_err();
        match err {
            VasputilError::InvalidArgument(msg) => assert!(msg.contains("no species counts")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_default_cell_writes() {
        let text = to_poscar_string(&Cell::default()).unwrap();
        assert!(text.contains("Selective dynamics\nCartesian\n"));
    }
}

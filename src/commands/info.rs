//! # info 命令实现
//!
//! 打印晶胞的晶格、元素和坐标信息。
//!
//! ## 依赖关系
//! - 使用 `cli/info.rs` 定义的参数
//! - 使用 `parsers/`, `models/`
//! - 使用 `utils/output.rs`

use crate::cli::info::InfoArgs;
use crate::error::Result;
use crate::models::Cell;
use crate::parsers;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 元素统计行
#[derive(Debug, Clone, Tabled)]
struct SpeciesRow {
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// 原子坐标行
#[derive(Debug, Clone, Tabled)]
struct AtomRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "x")]
    x: String,
    #[tabled(rename = "y")]
    y: String,
    #[tabled(rename = "z")]
    z: String,
}

/// 执行 info 命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let cell = parsers::parse_structure_file(&args.input)?;

    output::print_header(&format!("Cell: {}", args.input.display()));

    output::print_info(&format!("Atoms: {}", cell.n_atoms()));
    output::print_info(&format!("Lattice constant: {}", cell.lattice_constant()));
    for (i, v) in cell.basis_vectors().column_iter().enumerate() {
        output::print_info(&format!(
            "Basis vector {}: {:12.6} {:12.6} {:12.6}",
            i + 1,
            v[0],
            v[1],
            v[2]
        ));
    }
    output::print_info(&format!("Volume: {:.6}", cell.volume()));
    output::print_info(&format!(
        "Coordinates: {}",
        if cell.is_cartesian() { "Cartesian" } else { "Direct" }
    ));
    output::print_info(&format!(
        "Selective dynamics: {}",
        if cell.selective_dynamics() { "on" } else { "off" }
    ));

    let rows = species_rows(&cell);
    if rows.is_empty() {
        output::print_warning("No species information (XYZ input)");
    } else {
        println!("{}", Table::new(&rows));
    }

    if args.atoms {
        print_atom_table(&cell);
    }

    Ok(())
}

fn species_rows(cell: &Cell) -> Vec<SpeciesRow> {
    cell.atom_names()
        .iter()
        .zip(cell.n_atoms_type())
        .map(|(name, &count)| SpeciesRow {
            species: name.clone(),
            count,
        })
        .collect()
}

/// 打印原子坐标表格
fn print_atom_table(cell: &Cell) {
    let labels = cell
        .atom_labels()
        .unwrap_or_else(|| vec!["X"; cell.n_atoms()]);

    let rows: Vec<AtomRow> = labels
        .iter()
        .zip(cell.atoms())
        .enumerate()
        .map(|(i, (label, pos))| AtomRow {
            index: i + 1,
            species: label.to_string(),
            x: format!("{:.6}", pos[0]),
            y: format!("{:.6}", pos[1]),
            z: format!("{:.6}", pos[2]),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header("Atom Positions");
        println!("{}", Table::new(&rows));
    }
}

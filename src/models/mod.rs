//! # 数据模型模块
//!
//! 定义超胞数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `commands/` 使用
//! - 子模块: cell

pub mod cell;

pub use cell::{Cell, CellParts, CellSource, SelectiveFlags};

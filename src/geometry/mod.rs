//! # 几何工具模块
//!
//! 与晶胞无关的坐标变换。
//!
//! ## 依赖关系
//! - 被 `models/` 和 `commands/` 使用
//! - 子模块: rotation

pub mod rotation;

pub use rotation::{rotate_molecule, EulerAngles};

//! # Euler 角刚体旋转
//!
//! 采用 z-x-z 本征 Euler 角约定：先绕 z 轴转 phi，再绕 x 轴转 theta，
//! 最后再绕 z 轴转 psi，总旋转矩阵 `R = Rz(psi) · Rx(theta) · Rz(phi)`。
//! 定义见 <http://mathworld.wolfram.com/EulerAngles.html>。
//!
//! ## 依赖关系
//! - 被 `models/cell.rs` 和 `commands/rotate.rs` 使用
//! - 使用 `nalgebra`

use nalgebra::{Matrix3, Vector3};

/// Euler 角 (弧度)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    /// 第一次绕 z 轴的转角
    pub phi: f64,
    /// 绕 x 轴的转角
    pub theta: f64,
    /// 第二次绕 z 轴的转角
    pub psi: f64,
}

impl EulerAngles {
    pub fn new(phi: f64, theta: f64, psi: f64) -> Self {
        EulerAngles { phi, theta, psi }
    }

    /// 从角度 (度) 构造
    pub fn from_degrees(phi: f64, theta: f64, psi: f64) -> Self {
        EulerAngles {
            phi: phi.to_radians(),
            theta: theta.to_radians(),
            psi: psi.to_radians(),
        }
    }

    /// 组合后的旋转矩阵
    pub fn matrix(&self) -> Matrix3<f64> {
        rot_z(self.psi) * rot_x(self.theta) * rot_z(self.phi)
    }
}

fn rot_z(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(
        c, s, 0.0, //
        -s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

fn rot_x(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, s, //
        0.0, -s, c,
    )
}

/// 绕 `rotp` 旋转一组坐标，返回新坐标，不修改输入
///
/// 先平移 `-rotp`，施加旋转，再平移回去。
pub fn rotate_molecule(
    coords: &[Vector3<f64>],
    rotp: &Vector3<f64>,
    angles: EulerAngles,
) -> Vec<Vector3<f64>> {
    let r = angles.matrix();
    coords.iter().map(|c| r * (c - rotp) + rotp).collect()
}

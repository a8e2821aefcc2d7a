//! # 外部可视化工具
//!
//! 把晶胞写入临时 POSCAR 文件并交给外部查看器 (默认 VMD) 打开。
//! 进程调用通过 `CommandRunner` 注入，核心逻辑不直接依赖进程管理。
//!
//! ## 依赖关系
//! - 被 `commands/show.rs` 使用
//! - 使用 `parsers/poscar.rs`

use crate::error::{Result, VasputilError};
use crate::models::Cell;
use crate::parsers::poscar::write_poscar;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 运行外部命令的能力
pub trait CommandRunner {
    /// 运行 `program args...` 并等待其结束
    fn run(&self, program: &str, args: &[&str]) -> Result<()>;
}

/// 基于 `std::process::Command` 的实现
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|_| VasputilError::CommandNotFound {
                command: program.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(VasputilError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                stderr: format!("exited with {}", status),
            })
        }
    }
}

/// 临时文件，离开作用域时删除
struct TempFile(PathBuf);

impl TempFile {
    fn new(stem: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        TempFile(std::env::temp_dir().join(format!("{}_{}_{}", stem, std::process::id(), n)))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

/// 在外部查看器中显示晶胞
///
/// 写入临时 POSCAR，执行 `<viewer> -nt -POSCAR <file>`，
/// 然后调用 `wait` 阻塞直到用户确认，最后删除临时文件 (出错时同样删除)。
pub fn show_cell<R, F>(cell: &Cell, viewer: &str, runner: &R, wait: F) -> Result<()>
where
    R: CommandRunner + ?Sized,
    F: FnOnce() -> Result<()>,
{
    let tmp = TempFile::new("POSCAR_vasputil");
    let mut file = File::create(tmp.path()).map_err(|e| VasputilError::FileWriteError {
        path: tmp.path().display().to_string(),
        source: e,
    })?;
    write_poscar(cell, &mut file)?;

    let arg = tmp.path().display().to_string();
    runner.run(viewer, &["-nt", "-POSCAR", &arg])?;
    wait()
}

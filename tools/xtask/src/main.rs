//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 photo-transition 覆盖率
//! - `replay-check`: 回放手势脚本，检查结果是否符合 `expected`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use photo_transition::replay::{GestureScript, replay};
use photo_transition::{TransitionConfig, TransitionOutcome};
use tracing::{Level, debug};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

/// 默认手势脚本目录（相对于 workspace root）
const GESTURES_DIR: &str = "fixtures/gestures";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "photo-transition 开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,

    /// 运行 photo-transition 覆盖率报告
    CovCore,

    /// 回放手势脚本
    ///
    /// 不带参数：回放 fixtures/gestures/ 下所有 .json 文件
    /// 带路径参数：回放指定文件或目录
    ReplayCheck {
        /// 脚本文件或目录
        path: Option<PathBuf>,

        /// 转场配置文件（默认使用内置默认值）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    if let Err(e) = real_main(cli.command) {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::CheckAll => check_all(),
        Commands::CovCore => cov_core(),
        Commands::ReplayCheck { path, config } => replay_check(path.as_deref(), config.as_deref()),
    }
}

fn check_all() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    eprintln!("\n==> cargo fmt --all -- --check");
    cmd!(sh, "cargo fmt --all -- --check").run()?;

    eprintln!("\n==> cargo clippy --workspace --all-targets");
    cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

    eprintln!("\n==> cargo test --workspace");
    cmd!(sh, "cargo test --workspace").run()?;

    Ok(())
}

fn cov_core() -> anyhow::Result<()> {
    let sh = Shell::new()?;

    if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
        anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        );
    }

    eprintln!("\n==> cargo llvm-cov -p photo-transition --html");
    cmd!(sh, "cargo llvm-cov -p photo-transition --html").run()?;

    eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
    Ok(())
}

//=============================================================================
// replay-check 命令实现
//=============================================================================

/// 单个脚本的回放结论
enum Verdict {
    Pass,
    Mismatch {
        expected: TransitionOutcome,
        actual: Option<TransitionOutcome>,
    },
    Error(String),
}

fn replay_check(path: Option<&Path>, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(p) => TransitionConfig::try_load(p)
            .map_err(|e| anyhow::anyhow!("配置文件 {} 无效: {e}", p.display()))?,
        None => TransitionConfig::default(),
    };

    let root = match path {
        Some(p) if p.exists() => p.to_path_buf(),
        Some(p) => anyhow::bail!("路径不存在: {}", p.display()),
        None => {
            let default = PathBuf::from(GESTURES_DIR);
            if !default.exists() {
                anyhow::bail!(
                    "默认手势目录不存在: {}\n请在 workspace 根目录运行，或指定脚本路径",
                    default.display()
                );
            }
            default
        }
    };

    let files = collect_scripts(&root);
    if files.is_empty() {
        eprintln!("未找到手势脚本（.json）");
        return Ok(());
    }

    eprintln!("==> 回放 {} 个手势脚本...\n", files.len());

    let mut failures = 0;
    for file in &files {
        let verdict = check_script(file, &config);
        match &verdict {
            Verdict::Pass => eprintln!("[PASS] {}", file.display()),
            Verdict::Mismatch { expected, actual } => {
                let actual = actual.map_or_else(|| "none".to_string(), |o| o.to_string());
                eprintln!("[FAIL] {}: 期望 {expected}，实际 {actual}", file.display());
            }
            Verdict::Error(e) => eprintln!("[ERROR] {}: {e}", file.display()),
        }
        if !matches!(verdict, Verdict::Pass) {
            failures += 1;
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    if failures > 0 {
        eprintln!("❌ {failures} / {} 个脚本未通过", files.len());
        anyhow::bail!("手势回放检查失败");
    }
    eprintln!("✅ {} 个脚本全部通过", files.len());
    Ok(())
}

/// 收集脚本文件（单个文件直接返回）
fn collect_scripts(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn check_script(file: &Path, config: &TransitionConfig) -> Verdict {
    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => return Verdict::Error(format!("无法读取文件 - {e}")),
    };
    let script = match GestureScript::from_json(&content) {
        Ok(s) => s,
        Err(e) => return Verdict::Error(e.to_string()),
    };
    let report = match replay(&script, config) {
        Ok(r) => r,
        Err(e) => return Verdict::Error(e.to_string()),
    };

    debug!(
        script = script.display_name(),
        frames = report.frames,
        summary = %report.summary(),
        "回放完成"
    );

    match script.expected {
        Some(expected) if report.outcome != Some(expected) => Verdict::Mismatch {
            expected,
            actual: report.outcome,
        },
        _ => Verdict::Pass,
    }
}

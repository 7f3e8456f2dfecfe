//! # Tween Demo
//!
//! 无界面宿主：用固定步长驱动补间引擎。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p tween-demo -- showcase
//! cargo run -p tween-demo -- showcase --fps 30 -v
//! cargo run -p tween-demo -- bench --objects 5000 --frames 600
//! cargo run -p tween-demo -- --config tween.json bench
//! ```

mod bench;
mod clock;
mod showcase;

use std::path::PathBuf;

use anima_tween::{Tweener, TweenerConfig};
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tween-demo")]
#[command(about = "补间引擎演示 - 固定步长驱动的无界面宿主")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 引擎配置文件（JSON）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 日志详细程度（-v: debug，-vv: trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放演示场景：打字机文本、颜色链、路径移动与重复定时器
    Showcase {
        /// 每秒帧数
        #[arg(long, default_value = "60")]
        fps: u32,
    },

    /// 压力测试：大量对象同时补间
    Bench {
        /// 对象数量
        #[arg(long, default_value = "1000")]
        objects: usize,

        /// 每个补间的时长（秒）
        #[arg(long, default_value = "2.0")]
        duration: f32,

        /// 测量的帧数
        #[arg(long, default_value = "600")]
        frames: u32,

        /// 每秒帧数（决定每帧的时间增量）
        #[arg(long, default_value = "60")]
        fps: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => TweenerConfig::load(path),
        None => TweenerConfig::default(),
    };
    let mut tweener = Tweener::with_config(config);

    match cli.command {
        Commands::Showcase { fps } => showcase::run(&mut tweener, fps),
        Commands::Bench {
            objects,
            duration,
            frames,
            fps,
        } => {
            let options = bench::BenchOptions {
                objects,
                duration,
                frames,
                fps,
            };
            let report = bench::run(&mut tweener, &options)?;
            report.print();
            Ok(())
        }
    }
}

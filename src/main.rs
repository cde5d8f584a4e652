use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assigner::{app::Application, shutdown::ShutdownManager};
use assigner_core::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("assigner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("就近分配服务提供者")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（默认查找 config/assigner.toml 和 assigner.toml）"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("监听端口，覆盖配置文件和PORT环境变量")
                .value_parser(clap::value_parser!(u16)),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");

    // 加载配置
    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<默认路径>")
        )
    })?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.api.set_port(*port);
    }

    // 初始化日志系统
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    )?;

    info!("启动就近分配服务");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    let app = Application::new(config)?;
    let shutdown_manager = ShutdownManager::new();

    let app_handle = {
        let signal = shutdown_manager.subscribe();
        let shutdown_manager = shutdown_manager.clone();
        tokio::spawn(async move {
            let result = app.run(signal).await;
            if let Err(e) = &result {
                error!("应用运行失败: {e:#}");
            }
            // 应用自行退出时同样结束主任务的等待
            shutdown_manager.shutdown();
            result
        })
    };

    let mut stopped = shutdown_manager.subscribe();
    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
            shutdown_manager.shutdown();
        }
        _ = stopped.recv() => {
            warn!("应用提前退出");
        }
    }

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(Ok(()))) => info!("应用已优雅关闭"),
        Ok(Ok(Err(e))) => return Err(e),
        Ok(Err(e)) => error!("应用任务异常结束: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("就近分配服务已退出");
    Ok(())
}

/// 初始化日志系统，`RUST_LOG` 优先于配置
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}

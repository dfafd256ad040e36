use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use dtest::shutdown::ShutdownManager;
use dtest::DistributedTestSystem;
use dtest_core::{AppConfig, ObservabilityConfig};
use dtest_worker::{CoordinatorClient, HeartbeatManager};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<String>("config");
    let mode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("coordinator");

    // 加载配置
    let mut config = AppConfig::load(config_path.map(String::as_str))
        .with_context(|| format!("加载配置失败: {}", config_path.map_or("<默认路径>", |p| p)))?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }

    // 初始化日志系统
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    )?;
    init_metrics(&config.observability)?;

    info!("启动分布式测试协调系统");
    info!("运行模式: {mode}");

    match mode {
        "worker" => {
            let worker_id = matches
                .get_one::<String>("worker-id")
                .context("worker模式需要 --worker-id")?;
            let coordinator_url = matches
                .get_one::<String>("coordinator-url")
                .cloned()
                .unwrap_or_else(|| {
                    format!(
                        "http://{}:{}",
                        config.coordinator.bind_address, config.coordinator.coordinator_port
                    )
                });
            run_worker(&config, worker_id, &coordinator_url).await?;
        }
        _ => run_coordinator(&config).await?,
    }

    info!("分布式测试协调系统已退出");
    Ok(())
}

async fn run_coordinator(config: &AppConfig) -> Result<()> {
    let system = DistributedTestSystem::new(config.coordinator.clone())
        .await
        .context("启动协调器失败")?;

    info!(
        "协调器已启动: http://{}, 负载均衡策略: {}",
        system.local_addr(),
        system.coordinator().strategy_name()
    );

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");

    if tokio::time::timeout(Duration::from_secs(30), system.close())
        .await
        .is_err()
    {
        warn!("协调器关闭超时，强制退出");
    } else {
        info!("协调器已优雅关闭");
    }
    Ok(())
}

async fn run_worker(config: &AppConfig, worker_id: &str, coordinator_url: &str) -> Result<()> {
    let host = hostname::get()
        .context("获取主机名失败")?
        .to_string_lossy()
        .into_owned();
    let address = format!("{}:{}", host, config.coordinator.worker_port);
    info!("Worker ID: {}, 对外地址: {}", worker_id, address);

    let client = Arc::new(CoordinatorClient::new(coordinator_url, worker_id, address));
    client
        .register()
        .await
        .with_context(|| format!("向协调器注册失败: {coordinator_url}"))?;

    let shutdown_manager = ShutdownManager::new();
    let heartbeat_interval = config.coordinator.heartbeat_interval();

    // 负载等于协调器分配给本Worker的运行中任务数
    let load = Arc::new(AtomicU32::new(0));
    let heartbeat_manager = HeartbeatManager::new(Arc::clone(&client), heartbeat_interval);
    let heartbeat_load = Arc::clone(&load);
    let heartbeat_handle = heartbeat_manager.start_heartbeat_task(
        shutdown_manager.subscribe().await,
        Arc::new(move || heartbeat_load.load(Ordering::Relaxed)),
    );

    let poll_handle = {
        let client = Arc::clone(&client);
        let load = Arc::clone(&load);
        let mut shutdown_rx = shutdown_manager.subscribe().await;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(heartbeat_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match client.fetch_assigned_tasks().await {
                            Ok(tasks) => {
                                for task in &tasks {
                                    info!("已分配任务: {} ({})", task.id, task.test_name);
                                }
                                load.store(tasks.len() as u32, Ordering::Relaxed);
                            }
                            Err(e) => error!("拉取任务失败: {}", e),
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        })
    };

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown().await;

    let joined = tokio::time::timeout(Duration::from_secs(30), async {
        let _ = heartbeat_handle.await;
        let _ = poll_handle.await;
    })
    .await;
    if joined.is_err() {
        warn!("Worker后台任务关闭超时");
    }

    if let Err(e) = client.go_offline().await {
        warn!("通知协调器下线失败: {}", e);
    }
    Ok(())
}

/// 构建命令行参数定义
fn cli() -> Command {
    Command::new("dtest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("分布式测试协调与负载均衡系统")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，不指定时按默认路径查找"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("运行模式")
                .value_parser(["coordinator", "worker"])
                .default_value("coordinator"),
        )
        .arg(
            Arg::new("worker-id")
                .long("worker-id")
                .value_name("ID")
                .help("Worker ID (仅在worker模式下使用)")
                .required_if_eq("mode", "worker"),
        )
        .arg(
            Arg::new("coordinator-url")
                .long("coordinator-url")
                .value_name("URL")
                .help("协调器地址 (仅在worker模式下使用)，默认由配置推导"),
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
}

/// 初始化日志系统
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

/// 启用时安装Prometheus指标导出
fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.metrics_enabled {
        return Ok(());
    }

    let address: SocketAddr = config
        .metrics_bind_address
        .parse()
        .with_context(|| format!("无效的指标监听地址: {}", config.metrics_bind_address))?;

    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()
        .context("安装Prometheus指标导出失败")?;

    info!("Prometheus指标导出已启动: http://{}/metrics", address);
    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {}", e);
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
                error!("安装SIGTERM信号处理器失败: {}", e);
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

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use junqi_server::ServerConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 配置路径：第一个命令行参数，其次 JUNQI_CONFIG
    let config_path = env::args_os()
        .nth(1)
        .or_else(|| env::var_os("JUNQI_CONFIG"))
        .map(PathBuf::from);
    let config = ServerConfig::load(config_path.as_deref())?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(config.log_filter.parse().context("日志过滤指令无效")?))
        .init();

    info!(
        room_queue_capacity = config.room_queue_capacity,
        outbound_queue_capacity = config.outbound_queue_capacity,
        notify_decode_errors = config.notify_decode_errors,
        "军棋翻棋服务端启动"
    );

    // 房间由接入层通过 ServerConfig::spawn_room 创建，这里只等待退出信号
    tokio::signal::ctrl_c().await.context("监听退出信号失败")?;
    info!("服务端退出");

    Ok(())
}

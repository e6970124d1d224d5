use anyhow::{Context, Result};
use std::io::Read;

use review_sentiment::utils::logging;
use review_sentiment::{build_scorer, BatchOrchestrator, Config, RawInput};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    // 评分器只初始化一次
    let scorer = build_scorer(&config)?;
    let orchestrator = BatchOrchestrator::new(scorer, &config)?;

    let raw = RawInput::Text(read_payload()?);
    let payload = orchestrator
        .run(&raw, config.decode_format, config.encode_format)
        .await?;

    // 结果写到标准输出，供调用进程读取
    println!("{}", payload.to_wire_string()?);

    Ok(())
}

/// 读取批次：优先取第一个命令行参数，否则读标准输入
fn read_payload() -> Result<String> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(arg);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("无法从标准输入读取批次")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

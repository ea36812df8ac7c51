use anyhow::Result;
use assignment_annotator::utils::logging;
use assignment_annotator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行一次巡检
    App::initialize(config).await?.run().await?;

    Ok(())
}

use anyhow::Result;
use exam_paper_gen::app::App;
use exam_paper_gen::config::Config;
use exam_paper_gen::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod config;
pub mod crawler;
pub mod declare;
pub mod event;
pub mod logging;
pub mod store;
pub mod util;

#[derive(Parser)]
#[command(name = "gold_crawler", about = "台銀黃金存摺牌價擷取與金品溢價計算")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 抓取台銀黃金存摺 1 公克賣出價，寫入快照檔並追加歷史紀錄
    Quote,
    /// 比對金品零售價並計算相對黃金存摺的溢價
    Premiums,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Quote => event::gold_quote::execute().await,
        Commands::Premiums => event::premium::execute().await,
    }
}

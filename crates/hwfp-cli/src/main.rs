//! hwfp CLI
//!
//! 命令行客户端，把本地文件上传到收集服务

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hwfp", version, about = "硬件指纹文件收集 - 上传客户端")]
struct Cli {
    /// 服务地址
    #[arg(short, long, global = true, default_value = client::DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 上传文件 (同一次上传的文件落在同一个批次目录)
    Push {
        /// 要上传的文件路径
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// 检查服务是否在线
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = client::UploadClient::new(&cli.server)?;

    match cli.command {
        Commands::Push { files } => {
            println!("📤 上传 {} 个文件到 {}", files.len(), cli.server);
            for file in &files {
                println!("   {}", file.display());
            }
            client.push(&files).await?;
            println!("✅ 上传完成");
        }
        Commands::Ping => {
            client.ping().await?;
            println!("✅ 服务在线: {}", cli.server);
        }
    }

    Ok(())
}

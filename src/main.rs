// ==========================================
// 运费账单对账系统 - 命令行入口
// ==========================================
// 子命令:
//   reconcile  运单 + 主数据 → 合并对账表 + JSON 汇总
//   invoice    运单 + 发票抬头 → 发票工作簿
//   recap      已开具发票 → Rekap Invoice
// 结果 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use freight_recon::api::{
    InvoiceApi, InvoiceRequest, RecapApi, ReconApi, ReconRequest,
};
use freight_recon::config::{ConfigManager, ReconConfig, ReconConfigReader};
use freight_recon::domain::{InvoiceHeader, TaxMode};
use freight_recon::importer::SourceFile;
use freight_recon::logging;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "freight-recon")]
#[command(about = "运费账单对账系统 - 运单对账、开票与发票汇总")]
#[command(version)]
struct Cli {
    /// 配置文件（JSON），缺省时读取系统配置目录下的 freight-recon/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 合并运单并与主数据对账
    Reconcile {
        /// 运单文件（.xlsx/.xlsm/.xls/.ods/.csv）
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        master: MasterArgs,

        /// 输出文件名后缀（缺省为当天日期）
        #[arg(long)]
        suffix: Option<String>,

        /// 输出目录
        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,
    },

    /// 生成发票工作簿
    Invoice {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        master: MasterArgs,

        /// 发票抬头（JSON 文件，字段见 InvoiceHeader）
        #[arg(long)]
        header: Option<PathBuf>,

        /// with_tax 或 no_tax
        #[arg(long, default_value = "with_tax")]
        tax_mode: TaxMode,

        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,
    },

    /// 汇总已开具的发票
    Recap {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct MasterArgs {
    /// 主数据文件，可重复
    #[arg(long = "master", value_name = "FILE")]
    master_files: Vec<PathBuf>,

    /// 粘贴的主数据（JSON 数组或带表头的分隔文本）所在文件
    #[arg(long, value_name = "FILE")]
    paste: Option<PathBuf>,
}

impl MasterArgs {
    fn load(&self) -> Result<(Vec<SourceFile>, Option<String>)> {
        let files = read_sources(&self.master_files)?;
        let pasted = match &self.paste {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("无法读取粘贴数据: {}", path.display()))?,
            ),
            None => None,
        };
        Ok((files, pasted))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    info!("{} v{}", freight_recon::APP_NAME, freight_recon::VERSION);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Reconcile {
            files,
            master,
            suffix,
            out_dir,
        } => {
            let (master_files, pasted_master) = master.load()?;
            let request = ReconRequest {
                manifests: read_sources(&files)?,
                master_files,
                pasted_master,
                filename_suffix: suffix,
            };
            let response = ReconApi::new(config).reconcile(request).await?;
            write_output(&out_dir, &response.summary.output_filename, &response.generated_file)?;
            print_json(&response)?;
        }
        Commands::Invoice {
            files,
            master,
            header,
            tax_mode,
            out_dir,
        } => {
            let (master_files, pasted_master) = master.load()?;
            let header = match header {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("无法读取发票抬头: {}", path.display()))?;
                    serde_json::from_str::<InvoiceHeader>(&raw)
                        .with_context(|| format!("发票抬头格式错误: {}", path.display()))?
                }
                None => InvoiceHeader::default(),
            };
            let request = InvoiceRequest {
                manifests: read_sources(&files)?,
                master_files,
                pasted_master,
                header,
                tax_mode,
            };
            let response = InvoiceApi::new(config).create_invoice(request).await?;
            write_output(&out_dir, &response.filename, &response.generated_file)?;
            print_json(&response)?;
        }
        Commands::Recap { files, out_dir } => {
            let api = RecapApi::new();
            let response = api.read_invoices(read_sources(&files)?).await?;
            let recaps = response.recaps();
            if !recaps.is_empty() {
                let export = api.export(&recaps)?;
                write_output(&out_dir, &export.filename, &export.generated_file)?;
            }
            print_json(&response)?;
        }
    }

    Ok(())
}

/// 配置来源: 指定文件 > 默认路径（存在时）> 内置默认值，最后应用环境变量覆写
fn load_config(path: Option<&Path>) -> Result<ReconConfig> {
    let manager = match path {
        Some(p) => ConfigManager::from_json_file(p)
            .with_context(|| format!("无法加载配置文件: {}", p.display()))?,
        None => match ConfigManager::default_config_path().filter(|p| p.exists()) {
            Some(p) => ConfigManager::from_json_file(&p)
                .with_context(|| format!("无法加载配置文件: {}", p.display()))?,
            None => ConfigManager::new(),
        },
    };
    Ok(manager.with_env_overrides().snapshot()?)
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("无法读取文件: {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(SourceFile::new(filename, bytes))
        })
        .collect()
}

fn write_output(dir: &Path, filename: &str, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("无法创建输出目录: {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).with_context(|| format!("无法写入: {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "输出文件已写入");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

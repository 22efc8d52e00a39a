//! 시장 데이터 조회 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 시가총액 상위 20개 자산
//! market all --limit 20
//!
//! # 이더리움 현재 시세 (JSON)
//! market --format json asset eip155:1/slip44:60
//!
//! # 비트코인 1년 가격 이력
//! market history bip122:000000000019d6689c085ae165831e93/slip44:0 -t YEAR
//!
//! # 유로 환율과 한 달 이력
//! market fiat EUR
//! market fiat-history EUR -t MONTH
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use market_core::{init_logging, AppConfig, LogConfig};

mod commands;

use commands::output::OutputFormat;
use commands::query;

#[derive(Parser)]
#[command(name = "market")]
#[command(about = "Market data CLI - 암호화폐/법정화폐 시세 조회", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: String,

    /// 출력 형식 (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시가총액 상위 자산 시세
    All {
        /// 출력할 최대 자산 수
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// 자산 하나의 현재 시세
    Asset {
        /// 자산 식별자 (예: eip155:1/slip44:60)
        asset_id: String,
    },

    /// 자산 하나의 가격 이력
    History {
        /// 자산 식별자
        asset_id: String,

        /// 타임프레임 (HOUR, DAY, WEEK, MONTH, YEAR, ALL)
        #[arg(short, long, default_value = "DAY")]
        timeframe: String,
    },

    /// 법정화폐 하나의 현재 환율 (USD 기준)
    Fiat {
        /// 통화 코드 (예: EUR, KRW)
        symbol: String,
    },

    /// 법정화폐 하나의 환율 이력
    FiatHistory {
        /// 통화 코드
        symbol: String,

        /// 타임프레임 (HOUR, DAY, WEEK, MONTH, YEAR, ALL)
        #[arg(short, long, default_value = "DAY")]
        timeframe: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;
    debug!(config = %cli.config, "configuration loaded");

    let format = OutputFormat::parse(&cli.format)?;
    let api = query::build_api(&config)?;

    let result = match cli.command {
        Commands::All { limit } => query::all(&api, limit, format).await,
        Commands::Asset { asset_id } => query::asset(&api, &asset_id, format).await,
        Commands::History {
            asset_id,
            timeframe,
        } => query::history(&api, &asset_id, &timeframe, format).await,
        Commands::Fiat { symbol } => query::fiat(&api, &symbol, format).await,
        Commands::FiatHistory { symbol, timeframe } => {
            query::fiat_history(&api, &symbol, &timeframe, format).await
        }
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("Query failed: {:#}", e);
            Err(e)
        }
    }
}

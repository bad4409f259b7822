//! Crypto Direction Predictor
//!
//! Predicts whether the next candle of a trading pair closes higher, scores
//! free-text sentiment, and keeps a CSV log of both.

use chrono::Utc;
use clap::{Parser, Subcommand};
use crypto_predictor::{
    app::AppContext,
    config::AppConfig,
    types::{symbol_display_name, LogRecord, SUPPORTED_SYMBOLS},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "crypto-predictor")]
#[command(about = "Next-candle direction prediction with sentiment logging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest close and last-candle change
    Snapshot {
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
        /// 1m, 5m, 15m or 1h
        #[arg(short, long)]
        interval: Option<String>,
    },
    /// Print recent candles
    Candles {
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
        #[arg(short, long)]
        interval: Option<String>,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Latest spot price
    Price {
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
    },
    /// Retrain and store the model for a symbol and interval
    Train {
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
        #[arg(short, long)]
        interval: Option<String>,
    },
    /// Predict the direction of the next candle
    Predict {
        #[arg(short, long, default_value = "BTCUSDT")]
        symbol: String,
        #[arg(short, long)]
        interval: Option<String>,
        /// Retrain before predicting
        #[arg(long)]
        retrain: bool,
        /// Score this text and log it with the prediction
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Score the sentiment of a text
    Sentiment {
        text: String,
    },
    /// Show logged predictions
    History {
        #[arg(short, long, default_value = "20")]
        tail: usize,
    },
    /// List supported trading pairs
    Symbols,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Snapshot { symbol, interval } => show_snapshot(&ctx, &symbol, interval).await,
        Commands::Candles {
            symbol,
            interval,
            limit,
        } => show_candles(&ctx, &symbol, interval, limit).await,
        Commands::Price { symbol } => show_price(&ctx, &symbol).await,
        Commands::Train { symbol, interval } => train(&ctx, &symbol, interval).await,
        Commands::Predict {
            symbol,
            interval,
            retrain,
            text,
        } => predict(&ctx, &symbol, interval, retrain, text).await,
        Commands::Sentiment { text } => show_sentiment(&ctx, &text),
        Commands::History { tail } => show_history(&ctx, tail),
        Commands::Symbols => show_symbols(&ctx),
    }
}

async fn show_snapshot(ctx: &AppContext, symbol: &str, interval: Option<String>) -> anyhow::Result<()> {
    let symbol = ctx.symbol(symbol)?;
    let interval = ctx.interval(interval.as_deref())?;
    let snapshot = ctx.service.snapshot(&symbol, interval).await?;

    println!("\n📊 {} ({})\n", symbol, interval);
    println!("Latest close:  {:.4}", snapshot.latest_close);
    println!("Change:        {:+.3}%", snapshot.pct_change);
    println!("Last candle:   {}", snapshot.last_open_time.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

async fn show_candles(
    ctx: &AppContext,
    symbol: &str,
    interval: Option<String>,
    limit: usize,
) -> anyhow::Result<()> {
    let symbol = ctx.symbol(symbol)?;
    let interval = ctx.interval(interval.as_deref())?;
    let candles = ctx.service.candles(&symbol, interval, limit).await?;

    println!("\n🕯️ Last {} {} candles ({}):\n", candles.len(), symbol, interval);
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Open time", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(86));
    for c in &candles {
        println!(
            "{:<20} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>14.3}",
            c.open_time.format("%Y-%m-%d %H:%M"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        );
    }
    Ok(())
}

async fn show_price(ctx: &AppContext, symbol: &str) -> anyhow::Result<()> {
    let symbol = ctx.symbol(symbol)?;
    let price = ctx.service.latest_price(&symbol).await?;
    println!("{}: {}", symbol, price);
    Ok(())
}

async fn train(ctx: &AppContext, symbol: &str, interval: Option<String>) -> anyhow::Result<()> {
    let symbol = ctx.symbol(symbol)?;
    let interval = ctx.interval(interval.as_deref())?;
    let artifact = ctx.service.train(&symbol, interval).await?;

    println!("\n🧠 Trained {} model\n", artifact.key());
    println!("Train rows:       {}", artifact.train_rows);
    println!("Validation rows:  {}", artifact.validation_rows);
    match artifact.validation_accuracy {
        Some(acc) => println!("Validation acc:   {:.1}%", acc * 100.0),
        None => println!("Validation acc:   n/a"),
    }
    println!("Features:         {}", artifact.feature_names.join(", "));
    Ok(())
}

async fn predict(
    ctx: &AppContext,
    symbol: &str,
    interval: Option<String>,
    retrain: bool,
    text: Option<String>,
) -> anyhow::Result<()> {
    let symbol = ctx.symbol(symbol)?;
    let interval = ctx.interval(interval.as_deref())?;
    let outcome = ctx.service.predict(&symbol, interval, retrain).await?;
    let p = &outcome.prediction;

    println!("\n🤖 Next {} candle for {}\n", interval, symbol);
    println!("Price:       {:.4}", outcome.price);
    println!("Prob UP:     {:.2}%", p.prob_up * 100.0);
    println!("Prob DOWN:   {:.2}%", p.prob_down * 100.0);
    println!("Prediction:  {}", p.label);
    if outcome.trained {
        println!("(model trained on {} candles)", outcome.candles_used);
    }

    if let Some(text) = text {
        let sentiment = ctx.scorer.score(&text);
        println!("\nSentiment:   {} ({:.3})", sentiment.label, sentiment.polarity);

        let record = LogRecord::join(Utc::now(), outcome.price, p, &sentiment, text);
        ctx.logger.append(&record)?;
        println!("✅ Logged to {}", ctx.logger.path().display());
    }
    Ok(())
}

fn show_sentiment(ctx: &AppContext, text: &str) -> anyhow::Result<()> {
    let result = ctx.scorer.score(text);
    println!("Sentiment label: {}", result.label);
    println!("Polarity score:  {:.3}", result.polarity);
    Ok(())
}

fn show_history(ctx: &AppContext, tail: usize) -> anyhow::Result<()> {
    let records = ctx.logger.tail(tail)?;
    if records.is_empty() {
        println!("No logs yet. Run `predict --text ...` to start logging.");
        return Ok(());
    }

    println!(
        "\n📜 Last {} logged predictions ({})\n",
        records.len(),
        ctx.logger.path().display()
    );
    println!(
        "{:<20} {:<8} {:>12} {:>7} {:<5} {:>7} {:<8} {}",
        "Time", "Symbol", "Price", "Up", "Pred", "Sent", "Label", "Text"
    );
    println!("{}", "-".repeat(100));
    for r in &records {
        let text: String = if r.text.chars().count() > 30 {
            format!("{}...", r.text.chars().take(27).collect::<String>())
        } else {
            r.text.clone()
        };
        println!(
            "{:<20} {:<8} {:>12.4} {:>6.1}% {:<5} {:>7.3} {:<8} {}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.symbol,
            r.price,
            r.prob_up * 100.0,
            r.pred_label,
            r.sentiment_score,
            r.sentiment_label,
            text.replace('\n', " ")
        );
    }
    Ok(())
}

fn show_symbols(ctx: &AppContext) -> anyhow::Result<()> {
    println!("\nSupported pairs:\n");
    for symbol in &ctx.config.symbols {
        let name = symbol_display_name(symbol).unwrap_or("-");
        println!("  {:<10} {}", symbol, name);
    }
    if ctx.config.symbols.len() < SUPPORTED_SYMBOLS.len() {
        println!("\n({} of {} built-in pairs enabled)", ctx.config.symbols.len(), SUPPORTED_SYMBOLS.len());
    }
    Ok(())
}

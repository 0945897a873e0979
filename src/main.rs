use std::io::Write;
use std::time::Duration;

use agecalc::{AcquiredInstant, Config, TimeSource, Widget, age};
use anyhow::Result;
use chrono::SecondsFormat;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Age calculator against the current UTC time.
///
/// Without `--birth`, each line read from stdin is a new birth date
/// (YYYY-MM-DD); an empty line clears it.
#[derive(Parser, Debug)]
#[command(name = "agecalc", version)]
struct Cli {
    /// Birth date (YYYY-MM-DD); print a single result and exit
    #[arg(long)]
    birth: Option<String>,

    /// Print the single result as JSON
    #[arg(long, requires = "birth")]
    json: bool,

    /// UTC time service endpoint (overrides AGECALC_TIME_URL)
    #[arg(long, conflicts_with = "offline")]
    time_url: Option<String>,

    /// Skip the time service and use the local clock
    #[arg(long)]
    offline: bool,

    /// Time service timeout in seconds (overrides AGECALC_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.time_url {
        config.time_url = Some(url);
    }
    if cli.offline {
        config.time_url = None;
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }

    let source = TimeSource::new(&config)?;

    match cli.birth {
        Some(birth) => one_shot(&source, &birth, cli.json).await,
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            run_events(stdin, &mut std::io::stdout(), source.acquire()).await
        }
    }
}

async fn one_shot(source: &TimeSource, birth: &str, as_json: bool) -> Result<()> {
    let now = source.acquire().await;

    if as_json {
        let age = age::compute(age::parse_birth_date(birth), now.instant);
        let out = serde_json::json!({
            "age": age,
            "now": now.instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            "source": now.source,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut widget = Widget::new();
    widget.set_instant(now);
    widget.on_birth_date_change(birth);
    let mut out = std::io::stdout();
    write_clock(&mut out, &widget)?;
    writeln!(out, "{}", widget.result_text())?;
    Ok(())
}

/// Event loop: the time query and input change events race on one task.
///
/// Each input line is a change event. Bytes that are not UTF-8 are decoded
/// lossily, so they land in the "no date" state like any other bad input.
/// Once the instant is known it is handled before pending input.
async fn run_events<R, W, F>(mut input: R, out: &mut W, acquire: F) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future<Output = AcquiredInstant>,
{
    let mut widget = Widget::new();
    let mut buf = Vec::new();
    let mut input_open = true;

    writeln!(out, "{}", widget.result_text())?;

    tokio::pin!(acquire);

    loop {
        tokio::select! {
            biased;

            acquired = &mut acquire, if widget.is_loading() => {
                widget.set_instant(acquired);
                write_clock(out, &widget)?;
                writeln!(out, "{}", widget.result_text())?;
                if !input_open {
                    break;
                }
            }
            // read_until keeps partial reads in `buf` if the other branch wins.
            read = input.read_until(b'\n', &mut buf), if input_open => {
                if read? == 0 {
                    input_open = false;
                    if !widget.is_loading() {
                        break;
                    }
                    continue;
                }

                let line = String::from_utf8_lossy(&buf).into_owned();
                buf.clear();
                widget.on_birth_date_change(&line);
                if !widget.is_loading() {
                    writeln!(out, "{}", widget.result_text())?;
                }
            }
            else => break,
        }
    }

    out.flush()?;
    Ok(())
}

fn write_clock(out: &mut impl Write, widget: &Widget) -> std::io::Result<()> {
    if let (Some(text), Some(stamp)) = (widget.utc_text(), widget.utc_timestamp()) {
        writeln!(out, "{text} ({stamp})")?;
    }
    Ok(())
}

//! kv-port-info: report the capability matrix of this build
//!
//! Prints which `HAVE_*` capabilities the build resolved, where each value
//! came from, and which strategies the platform layer selected as a result.
//! The matrix is fixed at build time; this tool only reads it.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use kv_port::checksum;
use kv_port::compression::{self, available_codecs};
use kv_port::config::{self, CapabilityReport};
use kv_port::durability::{self, WritableFile};
use kv_port::{BlockOptions, CloexecStrategy, CompressionType, FlushKind};

/// kv-port-info: capability matrix report
#[derive(Parser, Debug)]
#[command(name = "kv-port-info")]
#[command(about = "Report the capability matrix this kv-port build was resolved with")]
struct Args {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Run checksum, codec and flush self-tests
    #[arg(long)]
    check: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log: String,
}

#[derive(Debug, Serialize)]
struct Report {
    #[serde(flatten)]
    matrix: CapabilityReport,
    flush: FlushKind,
    cloexec: CloexecStrategy,
    checksum: &'static str,
    codecs: Vec<CompressionType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checks: Vec<Check>,
}

#[derive(Debug, Serialize)]
struct Check {
    name: String,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl Check {
    fn from_result(name: impl Into<String>, result: anyhow::Result<()>) -> Self {
        let detail = result.as_ref().err().map(|e| format!("{e:#}"));
        Self {
            name: name.into(),
            passed: result.is_ok(),
            detail,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    config::log_capabilities();

    let checks = if args.check { run_checks() } else { Vec::new() };

    let report = Report {
        matrix: CapabilityReport::current(),
        flush: FlushKind::PREFERRED,
        cloexec: CloexecStrategy::CURRENT,
        checksum: checksum::active().name(),
        codecs: available_codecs(),
        checks,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }

    let failed = report.checks.iter().filter(|check| !check.passed).count();
    if failed > 0 {
        bail!("{failed} self-test(s) failed");
    }
    Ok(())
}

fn print_text(report: &Report) {
    println!("Capabilities");
    for entry in &report.matrix.capabilities {
        let state = if entry.enabled { "enabled" } else { "disabled" };
        println!(
            "  {:<16} {:<9} value={:<3} origin={:<8} {}",
            entry.define, state, entry.value, entry.origin, entry.summary
        );
    }

    println!();
    println!("Selected strategies");
    println!("  flush     {}", report.flush);
    println!("  cloexec   {:?}", report.cloexec);
    println!("  checksum  {}", report.checksum);
    let codecs: Vec<_> = report.codecs.iter().map(|c| c.name()).collect();
    println!("  codecs    {}", codecs.join(", "));

    if !report.checks.is_empty() {
        println!();
        println!("Self-tests");
        for check in &report.checks {
            let status = if check.passed { "ok" } else { "FAILED" };
            match &check.detail {
                Some(detail) => println!("  {:<24} {status}: {detail}", check.name),
                None => println!("  {:<24} {status}", check.name),
            }
        }
    }
}

fn run_checks() -> Vec<Check> {
    let mut checks = vec![Check::from_result("checksum", check_checksum())];

    for kind in available_codecs() {
        checks.push(Check::from_result(
            format!("codec {kind}"),
            check_codec(kind),
        ));
    }

    checks.push(Check::from_result("flush", check_flush()));
    checks
}

fn check_checksum() -> anyhow::Result<()> {
    const EXPECTED: u32 = 0xe306_9283;

    let actual = checksum::value(b"123456789");
    if actual != EXPECTED {
        bail!(
            "{} CRC32C of \"123456789\" is {actual:#010x}, expected {EXPECTED:#010x}",
            checksum::active().name()
        );
    }
    Ok(())
}

fn check_codec(kind: CompressionType) -> anyhow::Result<()> {
    let options = BlockOptions::new().with_compression(kind);
    let raw: Vec<u8> = (0..256u32)
        .flat_map(|i| format!("key-{i:08}:value-{:04}|", i % 7).into_bytes())
        .collect();

    let block = compression::encode_block(&options, &raw);
    let decoded = compression::decode_block(&block, &options, true)
        .with_context(|| format!("decoding a {kind} block"))?;
    if decoded != raw {
        bail!("{kind} block did not decode to its input");
    }
    Ok(())
}

fn check_flush() -> anyhow::Result<()> {
    let path: PathBuf =
        std::env::temp_dir().join(format!("kv-port-info-{}.log", std::process::id()));

    let result = (|| -> anyhow::Result<()> {
        let mut file = WritableFile::create(&path)?;
        file.append(b"kv-port flush self-test")?;
        file.sync()?;
        file.close()?;
        durability::sync_dir(&std::env::temp_dir())?;
        Ok(())
    })();

    let _ = std::fs::remove_file(&path);
    result
}

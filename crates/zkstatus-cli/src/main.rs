// crates/zkstatus-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zkstatus_aggregate::{parse_source_response, Aggregator, SourceResponseEntry};
use zkstatus_core::{
    io::{
        read_auto, read_proof_artifact_auto, read_status_chain_auto, write_auto,
        write_proof_artifact_auto, write_status_chain_auto,
    },
    CircuitKind, Config, Status,
};
use zkstatus_prover::{
    prove_artifact, CallOptions, MockProver, ProverGateway, ProverInput, SubprocessProver,
};
use zkstatus_report::{
    write_prover_input, AggregateReport, CircuitInput, CompactAggregateInputs, TransitionInputs,
};

#[derive(Parser, Debug)]
#[command(
    name = "zkstatus",
    about = "Credential status chains, oracle aggregation, and Groth16 prover inputs",
    long_about = "zkstatus CLI.\n\nSimulate status chains, aggregate oracle responses, export prover inputs, and drive the external Groth16 prover.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Advance the genesis status of the configured mechanism N times
    Simulate {
        /// Number of advances (>0)
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
        steps: u32,

        /// Output path for the status chain (CBOR/JSON)
        #[arg(long, default_value = "chain.json")]
        out: PathBuf,
    },

    /// Validate oracle responses and select the canonical status
    Aggregate {
        /// One oracle response file (JSON array of entries) per source
        #[arg(long, required = true)]
        responses: Vec<PathBuf>,

        /// Last status accepted on-chain (CBOR/JSON); genesis when omitted
        #[arg(long)]
        last_known: Option<PathBuf>,

        /// Optional output path for the canonical status (CBOR/JSON)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Optional output path for aggregate prover inputs built from the
        /// validated per-source chains
        #[arg(long)]
        inputs_out: Option<PathBuf>,
    },

    /// Publish a status chain as oracle response entries (JSON)
    Respond {
        /// Input status chain (CBOR/JSON)
        #[arg(long)]
        chain: PathBuf,

        /// Output path for the response entries
        #[arg(long, default_value = "response.json")]
        out: PathBuf,
    },

    /// Build transition or aggregate prover inputs from a status chain
    ExportInputs {
        /// Input status chain (CBOR/JSON), at least two statuses
        #[arg(long)]
        chain: PathBuf,

        /// Replicate the chain as this many identical oracle reports
        /// (0 = single transition); use `aggregate --inputs-out` for real
        /// per-source reports
        #[arg(long, default_value_t = 0)]
        oracles: usize,

        /// Emit compact delta inputs (wide bitmask chains, needs --oracles)
        #[arg(long, default_value_t = false)]
        compact: bool,

        /// Output path for the prover input JSON
        #[arg(long, default_value = "input.json")]
        out: PathBuf,
    },

    /// Generate proving and verifying keys for a circuit
    Setup {
        #[command(flatten)]
        gateway: GatewayArgs,
    },

    /// Prove an exported input and write a proof artifact
    Prove {
        #[command(flatten)]
        gateway: GatewayArgs,

        /// Prover input JSON
        #[arg(long)]
        input: PathBuf,

        /// Output path for the proof artifact (CBOR/JSON)
        #[arg(long, default_value = "proof.json")]
        out: PathBuf,
    },

    /// Verify a proof artifact against its input
    Verify {
        #[command(flatten)]
        gateway: GatewayArgs,

        /// Prover input JSON
        #[arg(long)]
        input: PathBuf,

        /// Proof artifact (CBOR/JSON)
        #[arg(long)]
        proof: PathBuf,
    },

    /// Emit the Solidity verifier for a circuit
    ExportVerifier {
        #[command(flatten)]
        gateway: GatewayArgs,

        /// Output file, or a directory to hold `<Circuit>Verifier.sol`
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug)]
struct GatewayArgs {
    /// Circuit name, e.g. StateTransition or AggBSLStateReport
    #[arg(long, value_parser = parse_circuit)]
    circuit: CircuitKind,

    /// Use the deterministic in-process prover
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Per-call timeout in seconds (overrides `[prover].timeout_secs`)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn parse_circuit(s: &str) -> Result<CircuitKind, String> {
    s.parse()
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Cmd::Simulate { steps, out } => simulate(&cfg, steps, &out),
        Cmd::Aggregate {
            responses,
            last_known,
            out,
            inputs_out,
        } => aggregate(
            &cfg,
            &responses,
            last_known.as_deref(),
            out.as_deref(),
            inputs_out.as_deref(),
        ),
        Cmd::Respond { chain, out } => respond(&cfg, &chain, &out),
        Cmd::ExportInputs {
            chain,
            oracles,
            compact,
            out,
        } => export_inputs(&cfg, &chain, oracles, compact, &out),
        Cmd::Setup { gateway } => block_on(setup(&cfg, &gateway)),
        Cmd::Prove {
            gateway,
            input,
            out,
        } => block_on(prove(&cfg, &gateway, &input, &out)),
        Cmd::Verify {
            gateway,
            input,
            proof,
        } => block_on(verify(&cfg, &gateway, &input, &proof)),
        Cmd::ExportVerifier { gateway, out } => block_on(export_verifier(&cfg, &gateway, &out)),
        Cmd::Config => {
            print!("{}", cfg.to_toml_string()?);
            Ok(())
        }
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = match path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Run a prover future on a single-threaded runtime.
fn block_on<F: Future<Output = Result<()>>>(fut: F) -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?
        .block_on(fut)
}

/* ---------- status chains ---------- */

fn simulate(cfg: &Config, steps: u32, out: &Path) -> Result<()> {
    let params = cfg.status_params()?;
    info!(mechanism = %params.mechanism(), steps, "simulating status chain");

    let mut current = Status::genesis(&params);
    let mut chain = vec![current.clone()];
    for _ in 0..steps {
        current = current.advance()?;
        chain.push(current.clone());
    }

    write_status_chain_auto(out, &chain)
        .with_context(|| format!("writing status chain to {}", out.display()))?;
    println!(
        "Simulated {} chain: {} statuses → {}",
        params.mechanism(),
        chain.len(),
        out.display()
    );
    Ok(())
}

fn respond(cfg: &Config, chain: &Path, out: &Path) -> Result<()> {
    let statuses = read_status_chain_auto(chain)
        .with_context(|| format!("reading status chain from {}", chain.display()))?;
    let entries: Vec<SourceResponseEntry> = statuses
        .iter()
        .skip(1)
        .map(|s| SourceResponseEntry::from_status(s, cfg.status.status_type))
        .collect();
    write_auto(out, &entries).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {} response entries → {}", entries.len(), out.display());
    Ok(())
}

fn aggregate(
    cfg: &Config,
    responses: &[PathBuf],
    last_known: Option<&Path>,
    out: Option<&Path>,
    inputs_out: Option<&Path>,
) -> Result<()> {
    let aggregator = Aggregator::from_config(cfg)?;
    let last = match last_known {
        Some(p) => read_auto::<Status, _>(p)
            .with_context(|| format!("reading last known status from {}", p.display()))?,
        None => Status::genesis(aggregator.params()),
    };
    ensure!(
        last.mechanism() == aggregator.params().mechanism(),
        "last known status is {}, config expects {}",
        last.mechanism(),
        aggregator.params().mechanism()
    );

    let mut per_source = Vec::with_capacity(responses.len());
    for p in responses {
        let text = std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        let entries =
            parse_source_response(&text).with_context(|| format!("parse {}", p.display()))?;
        info!(path = %p.display(), entries = entries.len(), "loaded oracle response");
        per_source.push(entries);
    }

    let outcome = aggregator.aggregate(&per_source, &last);
    for (i, chain) in outcome.chains.iter().enumerate() {
        match &chain.rejection {
            Some(r) => println!("source {i}: kept {} ({r})", chain.len()),
            None => println!("source {i}: kept {}", chain.len()),
        }
    }
    let canonical = &outcome.canonical;
    match canonical.source {
        Some(s) => println!(
            "canonical: source {s}, time {}",
            canonical.status.time()
        ),
        None => println!("canonical: genesis (no source advanced)"),
    }
    println!("{}", serde_json::to_string_pretty(&canonical.status)?);

    if let Some(p) = out {
        write_auto(p, &canonical.status)
            .with_context(|| format!("writing canonical status to {}", p.display()))?;
    }

    if let Some(p) = inputs_out {
        let Some(source) = canonical.source else {
            bail!("no source advanced past the last known status; nothing to aggregate");
        };
        let report = AggregateReport::from_chains(
            cfg.aggregation.fault_tolerance,
            &last,
            &outcome.chains,
            source,
        )?;
        write_prover_input(&report, p)?;
        println!(
            "Exported {} input ({} of {} sources present) → {}",
            report.circuit(),
            report.indicator().count_ones(),
            outcome.chains.len(),
            p.display()
        );
    }
    Ok(())
}

/* ---------- prover inputs ---------- */

fn export_inputs(
    cfg: &Config,
    chain: &Path,
    oracles: usize,
    compact: bool,
    out: &Path,
) -> Result<()> {
    let statuses = read_status_chain_auto(chain)
        .with_context(|| format!("reading status chain from {}", chain.display()))?;
    let f = cfg.aggregation.fault_tolerance;
    info!(chain = %chain.display(), len = statuses.len(), oracles, compact, "building prover inputs");

    let circuit = if compact {
        ensure!(oracles > 0, "--compact needs --oracles > 0");
        let Some(previous) = statuses.first() else {
            bail!("{} holds no statuses", chain.display());
        };
        let inputs = CompactAggregateInputs::build(f, previous, statuses.len() - 1, oracles)?;
        write_prover_input(&inputs, out)?;
        inputs.circuit()
    } else {
        let transition = TransitionInputs::build(&statuses)?;
        if oracles == 0 {
            write_prover_input(&transition, out)?;
            transition.circuit()
        } else {
            let report =
                AggregateReport::build(f, transition.clone(), vec![transition; oracles])?;
            write_prover_input(&report, out)?;
            report.circuit()
        }
    };

    println!("Exported {circuit} input → {}", out.display());
    Ok(())
}

/* ---------- prover gateway ---------- */

fn gateway(cfg: &Config, args: &GatewayArgs) -> (Box<dyn ProverGateway>, CallOptions) {
    let opts = args.timeout_secs.map_or_else(
        || CallOptions::from_config(&cfg.prover),
        |s| CallOptions::with_timeout(Duration::from_secs(s)),
    );
    let gw: Box<dyn ProverGateway> = if args.mock {
        Box::new(MockProver::new())
    } else {
        Box::new(SubprocessProver::from_config(&cfg.prover))
    };
    (gw, opts)
}

fn read_input(path: &Path) -> Result<ProverInput> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(ProverInput::new(bytes))
}

async fn setup(cfg: &Config, args: &GatewayArgs) -> Result<()> {
    let (gw, opts) = gateway(cfg, args);
    gw.setup(args.circuit, opts)
        .await
        .with_context(|| format!("setup {}", args.circuit))?;
    println!("Setup complete for {}", args.circuit);
    Ok(())
}

async fn prove(cfg: &Config, args: &GatewayArgs, input: &Path, out: &Path) -> Result<()> {
    let (gw, opts) = gateway(cfg, args);
    let prover_input = read_input(input)?;
    info!(circuit = %args.circuit, input = %input.display(), mock = args.mock, "proving");

    let artifact = prove_artifact(gw.as_ref(), args.circuit, &prover_input, opts)
        .await
        .with_context(|| format!("prove {}", args.circuit))?;
    write_proof_artifact_auto(out, &artifact)
        .with_context(|| format!("writing proof to {}", out.display()))?;

    println!(
        "Proved {} (input {}), wrote {}",
        artifact.circuit,
        artifact.input_digest_hex(),
        out.display()
    );
    Ok(())
}

async fn verify(cfg: &Config, args: &GatewayArgs, input: &Path, proof: &Path) -> Result<()> {
    let (gw, opts) = gateway(cfg, args);
    let prover_input = read_input(input)?;
    let artifact = read_proof_artifact_auto(proof)
        .with_context(|| format!("reading proof artifact from {}", proof.display()))?;

    ensure!(
        artifact.circuit == args.circuit,
        "proof is for {}, not {}",
        artifact.circuit,
        args.circuit
    );
    ensure!(
        artifact.input_digest == prover_input.digest(),
        "proof was generated for a different input than {}",
        input.display()
    );

    let ok = gw
        .verify(args.circuit, &artifact.proof, &prover_input, opts)
        .await
        .with_context(|| format!("verify {}", args.circuit))?;
    if !ok {
        bail!("proof rejected by {}", args.circuit);
    }
    println!("OK: proof verified");
    Ok(())
}

async fn export_verifier(cfg: &Config, args: &GatewayArgs, out: &Path) -> Result<()> {
    let (gw, opts) = gateway(cfg, args);
    let path = gw
        .export_verifier(args.circuit, out, opts)
        .await
        .with_context(|| format!("export verifier for {}", args.circuit))?;
    println!("Exported {} verifier → {}", args.circuit, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_gateway_flags() {
        let cli = Cli::try_parse_from([
            "zkstatus",
            "prove",
            "--circuit",
            "aggbslstatereport",
            "--mock",
            "--input",
            "in.json",
        ])
        .unwrap();
        let Cmd::Prove { gateway, out, .. } = cli.cmd else {
            unreachable!("parsed as prove");
        };
        assert_eq!(gateway.circuit, CircuitKind::AggBslStateReport);
        assert!(gateway.mock);
        assert_eq!(out, PathBuf::from("proof.json"));
    }

    #[test]
    fn aggregate_exports_per_source_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.status.mechanism = zkstatus_core::StatusMechanism::Bitmask64;
        let last = Status::Bitmask64 { time: 1, bits: 0b1 };
        let last_path = dir.path().join("last.json");
        write_auto(&last_path, &last).unwrap();

        let mut cur = last.clone();
        let honest: Vec<SourceResponseEntry> = (0..5)
            .map(|_| {
                cur = cur.advance().unwrap();
                SourceResponseEntry::from_status(&cur, cfg.status.status_type)
            })
            .collect();
        let mut broken = honest[..3].to_vec();
        broken[1] = SourceResponseEntry::from_status(
            &Status::Bitmask64 { time: 3, bits: 0b101 },
            cfg.status.status_type,
        );
        let responses: Vec<PathBuf> = [&honest[..3], &honest[..], &broken[..]]
            .iter()
            .enumerate()
            .map(|(i, entries)| {
                let p = dir.path().join(format!("source-{i}.json"));
                write_auto(&p, &entries.to_vec()).unwrap();
                p
            })
            .collect();

        let inputs = dir.path().join("agg.json");
        aggregate(&cfg, &responses, Some(&last_path), None, Some(&inputs)).unwrap();

        let v: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&inputs).unwrap()).unwrap();
        assert_eq!(v["finalTransitionTime"], serde_json::json!(["1", "6"]));
        assert_eq!(v["reportTimes"][0], serde_json::json!(["2", "3", "4", "4", "4"]));
        assert_eq!(v["reportTimes"][1], serde_json::json!(["2", "3", "4", "5", "6"]));
        assert_eq!(v["reportTimes"][2], serde_json::json!(["2", "2", "2", "2", "2"]));
        assert_eq!(v["indicator"], "2");
    }

    #[test]
    fn rejects_unknown_circuit() {
        assert!(Cli::try_parse_from(["zkstatus", "setup", "--circuit", "Nope"]).is_err());
    }
}

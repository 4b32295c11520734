//! Subprocess gateway against a scripted stand-in for the prover binary.
#![cfg(unix)]

use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};
use zkstatus_core::{CircuitKind, Groth16Proof, PROOF_BYTES};
use zkstatus_prover::{
    prove_artifact, CallOptions, MockProver, ProverError, ProverGateway, ProverInput,
    SubprocessProver,
};

const FAKE_PROVER: &str = r#"
case "$1" in
  setup) echo "setup $2" ;;
  prove) head -c 256 /dev/zero > "$4" ;;
  verify)
    if grep -q bad "$3"; then echo "Failed to verify"; else echo "Verified"; fi ;;
  generate-verifier) echo "contract $2Verifier {}" > "$3" ;;
  *) echo "unknown command $1" >&2; exit 2 ;;
esac
"#;

const ECHO_PROVER: &str = r#"
case "$1" in
  prove) sleep 0.3; head -c 256 "$3" > "$4" ;;
esac
"#;

const SHORT_PROOF: &str = r#"
case "$1" in
  prove) head -c 10 /dev/zero > "$4" ;;
esac
"#;

#[track_caller]
fn scripted(dir: &Path, script: &str) -> SubprocessProver {
    let path = dir.join("prover.sh");
    std::fs::write(&path, script).unwrap();
    SubprocessProver::with_program(
        "sh",
        vec![path.into_os_string()],
        dir,
        &dir.join("output"),
    )
}

fn inline(dir: &Path, body: &str) -> SubprocessProver {
    SubprocessProver::with_program(
        "sh",
        vec![OsString::from("-c"), OsString::from(body), OsString::from("sh")],
        dir,
        &dir.join("output"),
    )
}

fn opts() -> CallOptions {
    CallOptions::with_timeout(Duration::from_secs(10))
}

#[track_caller]
fn leftovers(prover: &SubprocessProver, circuit: CircuitKind) -> Vec<OsString> {
    std::fs::read_dir(prover.circuit_dir(circuit))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect()
}

#[tokio::test]
async fn prove_reads_proof_and_places_it() {
    let dir = tempfile::tempdir().unwrap();
    let prover = scripted(dir.path(), FAKE_PROVER);
    let input = ProverInput::new(br#"{"f":"1"}"#.to_vec());

    let proof = prover
        .prove(CircuitKind::StateTransition, &input, opts())
        .await
        .unwrap();
    assert_eq!(proof, Groth16Proof::default());
    assert!(leftovers(&prover, CircuitKind::StateTransition).is_empty());
}

#[tokio::test]
async fn overlapping_proves_keep_their_own_files() {
    let dir = tempfile::tempdir().unwrap();
    let prover = scripted(dir.path(), ECHO_PROVER);
    let c = CircuitKind::StateTransition;
    let a = ProverInput::new(vec![0x01; PROOF_BYTES]);
    let b = ProverInput::new(vec![0x02; PROOF_BYTES]);

    let (pa, pb) = tokio::join!(prover.prove(c, &a, opts()), prover.prove(c, &b, opts()));
    assert_eq!(pa.unwrap(), Groth16Proof::from_bytes(a.bytes()).unwrap());
    assert_eq!(pb.unwrap(), Groth16Proof::from_bytes(b.bytes()).unwrap());
    assert!(leftovers(&prover, c).is_empty());
}

#[tokio::test]
async fn verify_maps_failure_marker_to_false() {
    let dir = tempfile::tempdir().unwrap();
    let prover = scripted(dir.path(), FAKE_PROVER);
    let c = CircuitKind::AggBslStateReport;
    let proof = Groth16Proof::default();

    let good = ProverInput::new(b"{}".to_vec());
    assert!(prover.verify(c, &proof, &good, opts()).await.unwrap());
    let bad = ProverInput::new(br#"{"bad":true}"#.to_vec());
    assert!(!prover.verify(c, &proof, &bad, opts()).await.unwrap());
    assert!(leftovers(&prover, c).is_empty());
}

#[tokio::test]
async fn setup_and_export_verifier() {
    let dir = tempfile::tempdir().unwrap();
    let prover = scripted(dir.path(), FAKE_PROVER);
    let c = CircuitKind::AggCbslStateReport;
    prover.setup(c, opts()).await.unwrap();

    let contracts = dir.path().join("contracts");
    std::fs::create_dir_all(&contracts).unwrap();
    let out = prover.export_verifier(c, &contracts, opts()).await.unwrap();
    assert_eq!(out, contracts.join("AggCBSLStateReportVerifier.sol"));
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("contract AggCBSLStateReportVerifier"));
    assert_eq!(std::fs::read_dir(&contracts).unwrap().count(), 1);
}

#[tokio::test]
async fn malformed_proof_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let prover = scripted(dir.path(), SHORT_PROOF);
    let err = prover
        .prove(CircuitKind::StateTransition, &ProverInput::new(vec![]), opts())
        .await
        .unwrap_err();
    assert!(matches!(err, ProverError::MalformedProof(e) if e.actual == 10));

    assert!(leftovers(&prover, CircuitKind::StateTransition).is_empty());
}

#[tokio::test]
async fn non_zero_exit_carries_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let prover = inline(dir.path(), "echo boom >&2; exit 3");
    let err = prover
        .setup(CircuitKind::BigStateTransition, opts())
        .await
        .unwrap_err();
    match err {
        ProverError::NonZeroExit { code, stderr, .. } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn timeout_kills_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let prover = inline(dir.path(), "sleep 5");
    let started = Instant::now();
    let err = prover
        .setup(
            CircuitKind::StateTransition,
            CallOptions::with_timeout(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProverError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let prover = SubprocessProver::with_program(
        dir.path().join("no-such-prover"),
        Vec::new(),
        dir.path(),
        &dir.path().join("output"),
    );
    let err = prover
        .setup(CircuitKind::StateTransition, opts())
        .await
        .unwrap_err();
    assert!(matches!(err, ProverError::Spawn { .. }));
}

#[tokio::test]
async fn unknown_circuit_never_spawns() {
    let dir = tempfile::tempdir().unwrap();
    let prover = inline(dir.path(), "exit 9");
    let err = prover
        .setup(CircuitKind::Unknown, opts())
        .await
        .unwrap_err();
    assert!(matches!(err, ProverError::UnknownCircuit(_)));
}

#[tokio::test]
async fn artifact_binds_input_digest() {
    let mock = MockProver::new();
    let input = ProverInput::new(b"{}".to_vec());
    let art = prove_artifact(&mock, CircuitKind::MtStateTransition, &input, opts())
        .await
        .unwrap();
    assert_eq!(art.circuit, CircuitKind::MtStateTransition);
    assert_eq!(art.input_digest, input.digest());
    assert!(mock
        .verify(art.circuit, &art.proof, &input, opts())
        .await
        .unwrap());
}

use num_complex::Complex64;
use twonucleon_checkpoint::{
    staging_path, CheckpointError, CheckpointSink, JsonCheckpoint, STAGING_SUFFIX,
};

fn values(n: usize) -> Vec<Complex64> {
    (0..n).map(|t| Complex64::new(t as f64, -(t as f64))).collect()
}

#[test]
fn test_staging_path_suffix() {
    let p = staging_path(std::path::Path::new("/tmp/out.json"));
    assert_eq!(p.to_string_lossy(), format!("/tmp/out.json{STAGING_SUFFIX}"));
}

#[test]
fn test_finalize_renames_staging_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nn.json");

    let mut chk = JsonCheckpoint::create(&output).unwrap();
    assert!(chk.staging_path().exists());
    chk.create_directory("boost_px0py0pz0").unwrap();
    chk.close().unwrap();

    chk.open().unwrap();
    chk.set_consistency(false).unwrap();
    chk.set("boost_px0py0pz0/ppcorr_SING_0_0_px0py0pz0", &values(4))
        .unwrap();
    chk.set("proton_POS_PAR", &values(4)).unwrap();
    chk.set_counter("mucurrent", 1).unwrap();
    chk.set_consistency(true).unwrap();
    chk.close().unwrap();
    chk.finalize().unwrap();

    assert!(output.exists());
    assert!(!staging_path(&output).exists());

    let store = JsonCheckpoint::load(&output).unwrap();
    assert!(store.consistent);
    assert_eq!(store.counters["mucurrent"], 1);
    assert_eq!(
        store.entries["boost_px0py0pz0/ppcorr_SING_0_0_px0py0pz0"],
        values(4)
    );
}

#[test]
fn test_inconsistent_checkpoint_is_not_published() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nn.json");

    let mut chk = JsonCheckpoint::create(&output).unwrap();
    chk.set("proton_NEG_PAR", &values(2)).unwrap();
    chk.close().unwrap();
    assert!(matches!(chk.finalize(), Err(CheckpointError::Inconsistent)));

    assert!(!output.exists());
    assert!(staging_path(&output).exists());
}

#[test]
fn test_resume_keeps_entries_but_clears_consistency() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nn.json");

    {
        let mut chk = JsonCheckpoint::create(&output).unwrap();
        chk.set("proton_POS_PAR", &values(3)).unwrap();
        chk.set_consistency(true).unwrap();
        chk.close().unwrap();
    }

    let chk = JsonCheckpoint::create(&output).unwrap();
    assert!(!chk.is_consistent());
    assert_eq!(chk.get("proton_POS_PAR").unwrap(), Some(values(3)));
}

#[test]
fn test_closed_checkpoint_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let mut chk = JsonCheckpoint::create(dir.path().join("nn.json")).unwrap();
    chk.close().unwrap();
    assert!(matches!(
        chk.set("proton_POS_PAR", &values(1)),
        Err(CheckpointError::Closed)
    ));
}

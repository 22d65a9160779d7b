use zkcdn_adapters::{Ledger, LocalLedger};
use zkcdn_core::Fingerprint;

const OWNER: &str = "0xA11CE";

#[tokio::test]
async fn registry_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");

    let ledger = LocalLedger::open(&path, Some(OWNER.into())).unwrap();
    ledger.mint(OWNER, "QmA", Fingerprint::of("QmA")).await.unwrap();
    ledger.mint(OWNER, "QmB", Fingerprint::of("QmB")).await.unwrap();
    drop(ledger);

    let reopened = LocalLedger::open(&path, None).unwrap();
    assert_eq!(reopened.resolve(Fingerprint::of("QmB")).await.unwrap(), "QmB");
    assert_eq!(reopened.fingerprints_of(OWNER).await.unwrap(),
               vec![Fingerprint::of("QmA"), Fingerprint::of("QmB")]);
}

#[tokio::test]
async fn corrupt_registry_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(LocalLedger::open(&path, None).is_err());
}

use zkcdn_core::{fingerprint, Fingerprint};

#[test]
fn empty_string_yields_seed() {
    assert_eq!(fingerprint(""), 5381);
}

#[test]
fn known_values() {
    assert_eq!(fingerprint("a"), 177670);
    assert_eq!(fingerprint("ab"), 5863208);
    assert_eq!(fingerprint("QmTzQ1JRkWErjk39mryYw2WVaphAZNAREyMchXzYQ7c15n"), 1963768101);
    assert_eq!(fingerprint("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"), 1724732998);
}

#[test]
fn non_ascii_is_hashed_per_code_point() {
    assert_eq!(fingerprint("ñ"), 177814);
}

#[test]
fn same_input_same_fingerprint() {
    let cid = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    assert_eq!(fingerprint(cid), fingerprint(cid));
    assert_eq!(Fingerprint::of(cid).value(), fingerprint(cid));
}

#[test]
fn fingerprint_parses_from_decimal_text() {
    let fp: Fingerprint = " 1963768101 ".parse().expect("decimal");
    assert_eq!(fp, Fingerprint(1963768101));
    assert_eq!(fp.to_string(), "1963768101");
    assert!("-1".parse::<Fingerprint>().is_err());
}

//! End-to-end behaviour of records: construction paths, equality table,
//! annotation identity and wire round trips.

use std::error::Error;
use std::io;

use errtrail::{
    annotate, equals, normalize, parse, reason, trail, ErrorRecord, ResultExt, TrailResult,
    ERR_NO_DATA,
};
use serde_json::{json, Value};

fn foreign(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, msg.to_string())
}

fn norm(err: &(dyn Error + 'static)) -> ErrorRecord {
    normalize(Some(err)).unwrap()
}

fn wire(rec: &ErrorRecord) -> Value {
    serde_json::from_str(&rec.to_string()).expect("record text is JSON")
}

#[test]
fn construction_paths_agree() {
    let code = "new test";

    let e = ErrorRecord::new(code);
    assert_eq!(e.code(), code);
    assert!(!e.to_string().is_empty());

    let e_as = annotate(Some(&e), reason!["annotated in place"]).unwrap();
    assert_eq!(e_as.code(), code);
    assert!(ErrorRecord::ptr_eq(&e, &e_as));

    let e_norm = normalize(Some(&e)).unwrap();
    assert_eq!(e_norm.code(), code);
    assert!(ErrorRecord::ptr_eq(&e, &e_norm));

    let e_parsed = parse(&e.to_string()).unwrap();
    assert_eq!(e_parsed.code(), code);
    assert!(!ErrorRecord::ptr_eq(&e, &e_parsed));
    assert_eq!(e_parsed.reasons(), e.reasons());
    assert_eq!(e_parsed.locations(), e.locations());
}

#[test]
fn equality_table() {
    let rec = |c: &str| ErrorRecord::new(c);
    let as_rec = |c: &str| annotate(Some(&ErrorRecord::new(c)), reason![]).unwrap();
    let as_foreign = |c: &str| annotate(Some(&foreign(c)), reason![]).unwrap();
    let as_rec_r = |c: &str| annotate(Some(&ErrorRecord::new(c)), reason!["reason"]).unwrap();
    let as_foreign_r = |c: &str| annotate(Some(&foreign(c)), reason!["reason"]).unwrap();

    let cases: Vec<(ErrorRecord, ErrorRecord)> = vec![
        (rec("New"), rec("New")),
        (rec("New"), norm(&ErrorRecord::new("New"))),
        (rec("New"), norm(&foreign("New"))),
        (rec("New"), as_rec("New")),
        (rec("New"), as_foreign("New")),
        (rec("New"), as_rec_r("New")),
        (rec("New"), as_foreign_r("New")),
        (norm(&ErrorRecord::new("P")), norm(&ErrorRecord::new("P"))),
        (norm(&ErrorRecord::new("P")), norm(&foreign("P"))),
        (norm(&ErrorRecord::new("P")), as_rec("P")),
        (norm(&ErrorRecord::new("P")), as_foreign("P")),
        (norm(&ErrorRecord::new("P")), as_rec_r("P")),
        (norm(&ErrorRecord::new("P")), as_foreign_r("P")),
    ];

    for (i, (a, b)) in cases.iter().enumerate() {
        assert!(a.equal(Some(b)), "case {i}: method form");
        assert!(equals(Some(a), Some(b)), "case {i}: free form");
        assert!(equals(Some(b), Some(a)), "case {i}: symmetric");
    }
}

#[test]
fn equality_against_foreign_values() {
    let rec = ErrorRecord::new("New");
    assert!(equals(Some(&rec), Some(&foreign("New"))));
    assert!(!equals(Some(&rec), Some(&foreign("Old"))));
    assert!(equals(Some(&rec), Some(&foreign(&rec.to_string()))));
    assert!(!equals(Some(&rec), None));
    assert!(!equals(None, Some(&foreign("New"))));
    assert!(equals(None, None));
}

#[test]
fn equality_across_construction_routes() {
    let c = "X";
    let direct = ErrorRecord::new(c);
    let normalized = normalize(Some(&ErrorRecord::new(c))).unwrap();
    let reparsed = parse(&ErrorRecord::new(c).to_string()).unwrap();
    let all = [&direct, &normalized, &reparsed];
    for a in all {
        for b in all {
            assert!(equals(Some(a), Some(b)));
        }
    }
}

#[test]
fn annotate_grows_by_one() {
    let r = ErrorRecord::new("X");
    for expected in 2..=3 {
        let out = r.annotate(reason!["x"]);
        assert!(ErrorRecord::ptr_eq(&r, &out));
        assert_eq!(r.reasons().len(), expected);
        assert_eq!(r.locations().len(), expected);
    }
}

#[test]
fn mixed_annotation_forms() {
    let err1 = ErrorRecord::new("test");
    let err2 = ErrorRecord::new("test");

    let out1 = annotate(Some(&err1), reason!["test", "test"]).unwrap();
    let out2 = err2.annotate(reason!["test", "test"]);
    let out3 = annotate(Some(&err1), reason![123, 456]).unwrap();
    let out4 = err2.annotate(reason![123, 456]);

    for out in [&out1, &out2, &out3, &out4] {
        assert!(!out.to_string().is_empty());
        assert_eq!(out.depth(), 3);
    }
    assert_eq!(err1.reasons()[2], vec![json!(123), json!(456)]);

    // a record is itself a valid reason value
    let nested = err1.annotate(reason![err2.clone()]);
    let last = nested.reasons().pop().unwrap();
    assert_eq!(last[0]["code"], json!("test"));
}

#[test]
fn concrete_wire_scenario() {
    let r = ErrorRecord::new("X");
    let v = wire(&r);
    assert_eq!(v["code"], json!("X"));
    assert_eq!(v["reason"], json!([["new"]]));
    assert_eq!(v["where"].as_array().unwrap().len(), 1);

    r.annotate(reason![42, "ctx"]);
    let v = wire(&r);
    let reasons = v["reason"].as_array().unwrap();
    assert_eq!(reasons.len(), 2);
    assert_eq!(reasons[1], json!([42, "ctx"]));
    assert_eq!(v["where"].as_array().unwrap().len(), 2);
}

#[test]
fn parse_edge_cases() {
    assert!(parse("").is_none());
    assert!(normalize(None).is_none());
    assert_eq!(parse("not-json-and-no-brace").unwrap().code(), "not-json-and-no-brace");

    let mismatched = r#"{"code":"X","reason":[["new"]],"where":[]}"#;
    let rec = parse(mismatched).unwrap();
    assert_eq!(rec.code(), mismatched);
    assert_eq!(rec.depth(), 1);

    let future = r#"{"code":"X","reason":[["new"]],"where":["a(a.rs:1)"],"trace_id":"abc"}"#;
    let rec = parse(future).unwrap();
    assert_eq!(rec.code(), "X");
    assert_eq!(rec.locations(), vec!["a(a.rs:1)".to_string()]);
}

#[test]
fn foreign_values_are_never_mutated() {
    let src = foreign("disk full");
    let a = annotate(Some(&src), reason![1]).unwrap();
    let b = annotate(Some(&src), reason![2]).unwrap();
    assert!(!ErrorRecord::ptr_eq(&a, &b));
    assert_eq!(a.depth(), 2);
    assert_eq!(b.depth(), 2);
    assert_eq!(src.to_string(), "disk full");
}

#[test]
fn sentinel_shared_across_callers() {
    fn lookup(key: &str) -> TrailResult<u32> {
        Err(errtrail::annotate!(ERR_NO_DATA, key))
    }
    let a = lookup("a").unwrap_err();
    let b = lookup("b").unwrap_err();
    assert!(ERR_NO_DATA.equal(Some(&a)));
    assert!(equals(Some(&a), Some(&b)));
    assert_eq!(ERR_NO_DATA.depth(), 1);
    assert_eq!(a.reasons()[1], vec![json!("a")]);
    assert_eq!(b.reasons()[1], vec![json!("b")]);
}

#[test]
fn propagation_through_layers() {
    fn storage() -> Result<(), io::Error> {
        Err(io::Error::new(io::ErrorKind::NotFound, "row missing"))
    }
    fn repo(id: u32) -> TrailResult<()> {
        storage().annotate_err(reason!["repo", id])
    }
    fn handler() -> TrailResult<()> {
        repo(5).map_err(|e| errtrail::annotate!(e, "handler"))
    }

    let err = handler().unwrap_err();
    assert_eq!(err.code(), "row missing");
    assert_eq!(err.depth(), 3);
    assert!(err.locations()[1].starts_with("repo(record_properties.rs:"), "{}", err.locations()[1]);
    assert!(err.locations()[2].starts_with("handler("), "{}", err.locations()[2]);

    let back = parse(&err.to_string()).unwrap();
    assert_eq!(back.reasons(), err.reasons());
}

#[test]
fn trail_macro_records_function() {
    fn make() -> ErrorRecord {
        trail!("T", "first")
    }
    let e = make();
    assert!(e.locations().iter().all(|l| l.starts_with("make(record_properties.rs:")));
}

#[test]
fn plain_calls_record_function() {
    #[inline(never)]
    fn load() -> ErrorRecord {
        ErrorRecord::new("X")
    }
    #[inline(never)]
    fn fetch(rec: &ErrorRecord) -> ErrorRecord {
        rec.annotate(reason!["fetch"])
    }
    #[inline(never)]
    fn decode(text: &str) -> Option<ErrorRecord> {
        parse(text)
    }

    let rec = load();
    assert!(rec.locations()[0].starts_with("load(record_properties.rs:"), "{:?}", rec.locations());
    fetch(&rec);
    assert!(rec.locations()[1].starts_with("fetch(record_properties.rs:"), "{:?}", rec.locations());
    let opaque = decode("plain text").unwrap();
    assert!(opaque.locations()[0].starts_with("decode(record_properties.rs:"));
}

#[test]
fn shared_across_threads() {
    let rec = ErrorRecord::new("X");
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let r = rec.clone();
            std::thread::spawn(move || {
                r.annotate(reason![i]);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(rec.depth(), 5);
    assert_eq!(rec.locations().len(), 5);
}

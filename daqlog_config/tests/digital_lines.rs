use daqlog_config::expand_digital_spec;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("port0/line0:3", &["port0/line0", "port0/line1", "port0/line2", "port0/line3"])]
#[case("port0/line3:0", &["port0/line0", "port0/line1", "port0/line2", "port0/line3"])]
#[case("port0/line0,port0/line3", &["port0/line0", "port0/line3"])]
#[case("port0/line2, port0/line0:2", &["port0/line2", "port0/line0", "port0/line1"])]
#[case(" port1/line0 ", &["port1/line0"])]
fn expands_spec(#[case] spec: &str, #[case] expected: &[&str]) {
    let lines = expand_digital_spec(spec).expect("valid spec");
    assert_eq!(lines, expected);
}

#[rstest]
#[case("port0/line0:x")]
#[case("0:3")]
#[case("port0/line:3")]
fn rejects_malformed_range_tokens(#[case] spec: &str) {
    assert!(expand_digital_spec(spec).is_err(), "should reject {spec:?}");
}

#[test]
fn duplicates_keep_first_occurrence_order() {
    let lines = expand_digital_spec("port0/line1,port0/line0:2,port0/line1").unwrap();
    assert_eq!(lines, ["port0/line1", "port0/line0", "port0/line2"]);
}

proptest! {
    // Ranges written a:b and b:a expand to the same ascending list, with no
    // duplicates, regardless of bounds.
    #[test]
    fn range_expansion_is_order_insensitive(a in 0u32..16, b in 0u32..16) {
        let fwd = expand_digital_spec(&format!("port0/line{a}:{b}")).unwrap();
        let rev = expand_digital_spec(&format!("port0/line{b}:{a}")).unwrap();
        prop_assert_eq!(&fwd, &rev);
        let lo = a.min(b);
        let hi = a.max(b);
        let expected: Vec<String> =
            (lo..=hi).map(|i| format!("port0/line{i}")).collect();
        prop_assert_eq!(fwd, expected);
    }
}

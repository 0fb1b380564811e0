use cartbasic::lang::LineNumber;
use cartbasic::mach::Listing;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use std::collections::BTreeMap;

fn content(x: u8) -> String {
    if x % 4 == 0 {
        String::new()
    } else {
        format!("A={}", x)
    }
}

fn apply(edits: &[(u16, u8)]) -> Listing {
    let mut listing = Listing::default();
    for &(n, x) in edits {
        listing.set_line(LineNumber::from(n) % 1000, &content(x));
    }
    listing
}

#[quickcheck]
fn ascending_unique_last_write_wins(edits: Vec<(u16, u8)>) -> bool {
    let listing = apply(&edits);
    let mut model: BTreeMap<LineNumber, String> = BTreeMap::new();
    for &(n, x) in &edits {
        let n = LineNumber::from(n) % 1000;
        let text = content(x);
        if text.is_empty() {
            model.remove(&n);
        } else {
            model.insert(n, text);
        }
    }
    let numbers: Vec<LineNumber> = listing.lines().map(|l| l.number()).collect();
    numbers.windows(2).all(|w| w[0] < w[1])
        && listing
            .lines()
            .map(|l| (l.number(), l.content().to_string()))
            .eq(model.into_iter())
}

#[quickcheck]
fn empty_content_deletes(edits: Vec<(u16, u8)>, n: u16) -> bool {
    let mut listing = apply(&edits);
    let n = LineNumber::from(n) % 1000;
    listing.set_line(n, "X");
    listing.set_line(n, "");
    listing.get(n).is_none() && listing.lines().all(|l| l.number() != n)
}

#[quickcheck]
fn saved_text_loads_back(edits: Vec<(u16, u8)>) -> bool {
    let listing = apply(&edits);
    let mut loaded = Listing::default();
    for line in listing.to_string().lines() {
        if loaded.load_str(line).is_err() {
            return false;
        }
    }
    loaded == listing
}

#[quickcheck]
fn renum_keeps_order(edits: Vec<(u16, u8)>) -> TestResult {
    let mut listing = apply(&edits);
    if listing.len() > 100 {
        return TestResult::discard();
    }
    let before: Vec<String> = listing.lines().map(|l| l.content().to_string()).collect();
    if listing.renum(100, 10, 0).is_err() {
        return TestResult::failed();
    }
    let numbers: Vec<LineNumber> = listing.lines().map(|l| l.number()).collect();
    let expected: Vec<LineNumber> = (0..before.len() as LineNumber).map(|i| 100 + i * 10).collect();
    let after: Vec<String> = listing.lines().map(|l| l.content().to_string()).collect();
    TestResult::from_bool(numbers == expected && after == before)
}

#[test]
fn test_list_is_restartable() {
    let listing = apply(&[(10, 1), (20, 2), (30, 3)]);
    let lines = listing.list(0..=25);
    let first: Vec<LineNumber> = lines.clone().map(|l| l.number()).collect();
    let second: Vec<LineNumber> = lines.map(|l| l.number()).collect();
    assert_eq!(first, vec![10, 20]);
    assert_eq!(first, second);
}

#[test]
fn test_renum_three_lines() {
    let mut listing = apply(&[(3, 1), (1, 2), (2, 3)]);
    listing.renum(100, 10, 0).unwrap();
    assert_eq!(listing.to_string(), "100 A=2\n110 A=3\n120 A=1\n");
}

#[test]
fn test_clear_is_idempotent() {
    let mut listing = apply(&[(10, 1)]);
    listing.clear();
    listing.clear();
    assert!(listing.is_empty());
    assert_eq!(listing.source(), "");
}

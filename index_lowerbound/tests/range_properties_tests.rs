//! Algebraic properties of ranges and range arithmetic over sample ranges.

use index_lowerbound::range::{IntWidth, OverflowPolicy, Range, RangeDomain};
use pretty_assertions::assert_eq;

fn samples() -> Vec<Range> {
    vec![
        Range::NOTHING,
        Range::constant(0),
        Range::constant(-1),
        Range::create(-5, 5),
        Range::create(3, 10),
        Range::create(-100, -20),
        Range::create(i64::MIN, 0),
        Range::create(0, i64::MAX),
        Range::EVERYTHING,
    ]
}

#[test]
fn test_create_accessors() {
    let r = Range::create(-3, 8);
    assert_eq!((r.from(), r.to()), (-3, 8));
    assert!(!r.is_nothing());
    assert!(Range::NOTHING.is_nothing());
    assert_eq!(Range::try_create(2, 1), None);
}

#[test]
#[should_panic(expected = "malformed range")]
fn test_create_rejects_inverted_bounds() {
    Range::create(5, 4);
}

#[test]
fn test_union_and_intersect_laws() {
    let samples = samples();
    for a in &samples {
        assert_eq!(a.union(&Range::NOTHING), *a);
        assert_eq!(a.intersect(&Range::NOTHING), Range::NOTHING);
        assert_eq!(a.union(a), *a);
        for b in &samples {
            assert_eq!(a.union(b), b.union(a));
            assert_eq!(a.intersect(b), b.intersect(a));
            assert!(a.union(b).contains_range(a));
            for c in &samples {
                assert_eq!(a.union(b).union(c), a.union(&b.union(c)));
                assert_eq!(a.intersect(b).intersect(c), a.intersect(&b.intersect(c)));
            }
        }
    }
}

#[test]
fn test_nothing_absorbs_arithmetic() {
    let domain = RangeDomain::default();
    for a in samples() {
        assert!(domain.plus(&a, &Range::NOTHING).is_nothing());
        assert!(domain.times(&Range::NOTHING, &a).is_nothing());
        assert!(domain.divide(&a, &Range::NOTHING).is_nothing());
    }
}

#[test]
fn test_divide_by_point_zero_is_nothing() {
    for overflow in [OverflowPolicy::Wrap, OverflowPolicy::Saturate] {
        let domain = RangeDomain::new(overflow);
        for a in samples() {
            assert!(domain.divide(&a, &Range::constant(0)).is_nothing());
        }
    }
}

#[test]
fn test_arithmetic_contains_concrete_results() {
    let domain = RangeDomain::default();
    let points = [-7i64, -1, 0, 2, 9];
    let left = Range::create(-7, 9);
    let right = Range::create(2, 9);
    let sum = domain.plus(&left, &right);
    let product = domain.times(&left, &right);
    let quotient = domain.divide(&left, &right);
    let rem = domain.remainder(&left, &right);
    for a in points {
        for b in [2i64, 9] {
            assert!(sum.contains(a + b));
            assert!(product.contains(a * b));
            assert!(quotient.contains(a / b));
            assert!(rem.contains(a % b));
        }
    }
}

#[test]
fn test_narrowing_inside_width_is_identity() {
    let widths = [
        IntWidth::Byte,
        IntWidth::Short,
        IntWidth::Char,
        IntWidth::Int,
        IntWidth::Long,
    ];
    for overflow in [OverflowPolicy::Wrap, OverflowPolicy::Saturate] {
        let domain = RangeDomain::new(overflow);
        for width in widths {
            let everything = width.everything();
            let inside = Range::create(everything.from().max(0), everything.from().max(0) + 10);
            assert_eq!(domain.narrow(&inside, width), inside);
            assert_eq!(domain.narrow(&everything, width), everything);
        }
    }
}

#[test]
fn test_unknown_bitwise_gives_up() {
    let domain = RangeDomain::default();
    let a = Range::create(0, 3);
    assert_eq!(domain.bitwise_or(&a, &a), Range::EVERYTHING);
    assert_eq!(domain.bitwise_xor(&a, &a), Range::EVERYTHING);
    assert_eq!(domain.bitwise_and(&a, &Range::constant(1)), Range::create(0, 1));
}

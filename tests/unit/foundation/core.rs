use super::*;

#[test]
fn round_out_floors_min_and_ceils_max() {
    let r = PixelRect::round_out(Rect::new(-2.3, 1.0, 7.7, 10.5));
    assert_eq!(r, PixelRect::new(-3, 1, 11, 10));
}

#[test]
fn round_out_of_non_finite_is_empty() {
    let r = PixelRect::round_out(Rect::new(f64::NAN, 0.0, 1.0, 1.0));
    assert!(r.is_empty());
}

#[test]
fn intersect_disjoint_is_empty() {
    let a = PixelRect::new(0, 0, 4, 4);
    let b = PixelRect::new(4, 0, 4, 4);
    assert_eq!(a.intersect(b), PixelRect::EMPTY);
    assert_eq!(
        a.intersect(PixelRect::new(2, 2, 10, 10)),
        PixelRect::new(2, 2, 2, 2)
    );
}

#[test]
fn union_ignores_empty_operands() {
    let a = PixelRect::new(5, 5, 2, 2);
    assert_eq!(a.union(PixelRect::EMPTY), a);
    assert_eq!(PixelRect::EMPTY.union(a), a);
    assert_eq!(
        a.union(PixelRect::new(0, 0, 1, 1)),
        PixelRect::new(0, 0, 7, 7)
    );
}

#[test]
fn grow_and_translate_preserve_size_semantics() {
    let r = PixelRect::new(1, 2, 3, 4).grow(1, 2).translate(-1, 0);
    assert_eq!(r, PixelRect::new(-1, 0, 5, 8));
    assert!(PixelRect::new(0, 0, 2, 2).grow(-1, -1).is_empty());
}

#[test]
fn premul_from_straight_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
}

use super::*;
use crate::foundation::core::{Affine, PixelRect, Rect};
use crate::image::context::FilterContext;

fn white_square() -> EffectRef {
    EffectRef::flood(
        Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
        PixelRect::new(10, 10, 10, 10),
    )
}

fn offset_node(ds: &DropShadow) -> EffectRef {
    let EffectKind::Delegate { head } = ds.node().kind() else {
        panic!("expected a delegate");
    };
    head.input(0).unwrap()
}

#[test]
fn defaults() {
    let ds = DropShadow::new(None, None);
    assert_eq!(ds.shadow_mode(), ShadowMode::Gaussian);
    assert_eq!(ds.radius(), DEFAULT_RADIUS);
    assert_eq!(ds.color(), Rgba8Premul::BLACK);
    assert_eq!(ds.spread(), 0.0);
    assert_eq!(ds.offset(), (0.0, 0.0));
    assert!(matches!(
        ds.shadow_node().kind(),
        EffectKind::GaussianShadow { radius, .. } if radius == DEFAULT_RADIUS
    ));
}

#[test]
fn mode_change_swaps_the_shadow_node() {
    let source = white_square();
    let mut ds = DropShadow::new(Some(source.clone()), None);
    ds.set_radius(4.0);
    let before = ds.shadow_node().clone();

    ds.set_shadow_mode(ShadowMode::TwoPassBox).unwrap();
    let after = ds.shadow_node().clone();
    assert!(!after.ptr_eq(&before));
    assert!(offset_node(&ds).input(0).unwrap().ptr_eq(&after));
    assert!(after.input(0).unwrap().ptr_eq(&source));
    assert!(matches!(
        after.kind(),
        EffectKind::BoxShadow { passes: 2, radius, .. } if radius == 4.0
    ));

    ds.set_shadow_mode(ShadowMode::TwoPassBox).unwrap();
    assert!(ds.shadow_node().ptr_eq(&after));
}

#[test]
fn setters_clamp_and_update_the_node() {
    let mut ds = DropShadow::new(None, None);
    ds.set_radius(500.0);
    assert_eq!(ds.radius(), crate::effects::blur::MAX_RADIUS);
    ds.set_spread(2.0);
    assert_eq!(ds.spread(), 1.0);
    let red = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    ds.set_color(red);
    assert!(matches!(
        ds.shadow_node().kind(),
        EffectKind::GaussianShadow { color, spread, .. } if color == red && spread == 1.0
    ));
    ds.set_offset(3.0, -2.0);
    assert_eq!(ds.offset(), (3.0, -2.0));
}

#[test]
fn shadow_is_offset_under_the_content() {
    let ctx = FilterContext::default();
    let square = white_square();
    let mut ds = DropShadow::new(Some(square.clone()), Some(square));
    ds.set_radius(2.0);
    ds.set_offset(5.0, 5.0);

    assert_eq!(
        ds.node().bounds(Affine::IDENTITY, None).unwrap(),
        Rect::new(10.0, 10.0, 27.0, 27.0)
    );
    let out = ds
        .node()
        .filter(&ctx, Affine::IDENTITY, None, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(out.bounds(), PixelRect::new(10, 10, 17, 17));
    let raster = out.raster().unwrap();
    assert_eq!(raster.pixel(2, 2), [255, 255, 255, 255]);
    let shadow = raster.pixel(15, 15);
    assert_eq!(&shadow[..3], &[0, 0, 0]);
    assert!(shadow[3] > 0);
}

#[test]
fn content_input_can_be_rewired() {
    let ds = DropShadow::new(None, None);
    let content = white_square();
    ds.set_content_input(Some(content.clone())).unwrap();
    let EffectKind::Delegate { head } = ds.node().kind() else {
        panic!("expected a delegate");
    };
    assert!(head.input(1).unwrap().ptr_eq(&content));
    ds.set_shadow_source_input(Some(content.clone())).unwrap();
    assert!(ds.shadow_node().input(0).unwrap().ptr_eq(&content));
}

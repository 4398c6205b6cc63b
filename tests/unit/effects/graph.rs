use super::*;

#[derive(Default)]
struct Recorder {
    calls: Vec<(PixelRect, Affine)>,
}

impl ImageDataRenderer for Recorder {
    fn render_image(
        &mut self,
        image: ImageData,
        transform: Affine,
        _ctx: &FilterContext,
    ) -> ShadefxResult<()> {
        self.calls.push((image.bounds(), transform));
        Ok(())
    }
}

fn square(x: i32, y: i32, size: i32) -> EffectRef {
    EffectRef::flood(Rgba8Premul::BLACK, PixelRect::new(x, y, size, size))
}

#[test]
fn invalid_input_releases_earlier_inputs_and_skips_combine() {
    let ctx = FilterContext::default();
    let r0 = Arc::new(Raster::filled(2, 2, Rgba8Premul::BLACK));
    let r1 = Arc::new(Raster::new(2, 2));
    let merge = EffectRef::merge([
        Some(EffectRef::identity(Some(Arc::clone(&r0)), 0, 0)),
        Some(EffectRef::identity(Some(Arc::clone(&r1)), 1, 1)),
        Some(EffectRef::identity(None, 0, 0)),
    ]);

    let out = merge
        .filter(&ctx, Affine::IDENTITY, None, None, None)
        .unwrap()
        .unwrap();
    assert!(!out.validate(&ctx));
    // Only the test and the source node still hold each raster.
    assert_eq!(Arc::strong_count(&r0), 2);
    assert_eq!(Arc::strong_count(&r1), 2);
    assert_eq!(ctx.pool_stats().alloc_surfaces, 0);
}

#[test]
fn invalid_input_propagates_through_parents() {
    let ctx = FilterContext::default();
    let blur = EffectRef::gaussian_blur(2.0, Some(EffectRef::identity(None, 0, 0)));
    let blend = EffectRef::blend(BlendMode::SrcOver, Some(square(0, 0, 4)), Some(blur));
    let out = blend
        .filter(&ctx, Affine::IDENTITY, None, None, None)
        .unwrap()
        .unwrap();
    assert!(!out.validate(&ctx));
}

#[test]
fn blur_bounds_pad_in_user_space_then_transform() {
    let blur = EffectRef::gaussian_blur(2.0, Some(square(0, 0, 10)));
    assert_eq!(
        blur.bounds(Affine::IDENTITY, None).unwrap(),
        Rect::new(-2.0, -2.0, 12.0, 12.0)
    );
    assert_eq!(
        blur.bounds(Affine::scale(2.0), None).unwrap(),
        Rect::new(-4.0, -4.0, 24.0, 24.0)
    );
}

#[test]
fn composite_bounds() {
    let offset = EffectRef::offset(3.0, -1.0, Some(square(0, 0, 4)));
    assert_eq!(
        offset.bounds(Affine::IDENTITY, None).unwrap(),
        Rect::new(3.0, -1.0, 7.0, 3.0)
    );
    let merge = EffectRef::merge([Some(square(0, 0, 2)), Some(square(5, 5, 2))]);
    assert_eq!(
        merge.bounds(Affine::IDENTITY, None).unwrap(),
        Rect::new(0.0, 0.0, 7.0, 7.0)
    );
    let crop = EffectRef::crop(Some(square(0, 0, 10)), Some(square(2, 2, 3)));
    assert_eq!(
        crop.bounds(Affine::IDENTITY, None).unwrap(),
        Rect::new(2.0, 2.0, 5.0, 5.0)
    );
    let empty = EffectRef::gaussian_blur(4.0, Some(EffectRef::identity(None, 0, 0)));
    assert_eq!(empty.bounds(Affine::IDENTITY, None).unwrap(), Rect::ZERO);
}

#[test]
fn input_clip_untransforms_and_pads_for_user_space_nodes() {
    let blur = EffectRef::gaussian_blur(2.0, None);
    let clip = Some(PixelRect::new(0, 0, 10, 10));
    let tx = Affine::translate((2.3, -1.0));
    assert_eq!(
        blur.input_clip(0, tx, clip),
        Some(PixelRect::new(-5, -1, 15, 14))
    );
    assert_eq!(blur.input_clip(0, tx, None), None);

    let offset = EffectRef::offset(4.0, 4.0, None);
    assert_eq!(offset.input_clip(0, tx, clip), clip);
    let singular = Affine::scale_non_uniform(0.0, 1.0);
    assert_eq!(blur.input_clip(0, singular, clip), Some(PixelRect::EMPTY));
}

#[test]
fn missing_input_needs_a_default() {
    let ctx = FilterContext::default();
    let bp = EffectRef::brightpass(0.3, None);
    let err = bp
        .filter(&ctx, Affine::IDENTITY, None, None, None)
        .unwrap_err();
    assert!(matches!(err, ShadefxError::Validation(_)));

    let fallback = square(1, 1, 2);
    let out = bp
        .filter(&ctx, Affine::IDENTITY, None, None, Some(&fallback))
        .unwrap()
        .unwrap();
    assert_eq!(out.bounds(), PixelRect::new(1, 1, 2, 2));
    assert_eq!(
        bp.bounds(Affine::IDENTITY, Some(&fallback)).unwrap(),
        Rect::new(1.0, 1.0, 3.0, 3.0)
    );
}

#[test]
fn set_input_checks_the_slot() {
    let bp = EffectRef::brightpass(0.3, None);
    assert!(bp.set_input(0, Some(square(0, 0, 1))).is_ok());
    assert!(bp.input(0).is_some());
    assert!(matches!(
        bp.set_input(1, None),
        Err(ShadefxError::Validation(_))
    ));
}

#[test]
fn user_space_result_is_transformed_or_handed_to_helper() {
    let ctx = FilterContext::default();
    let blur = EffectRef::gaussian_blur(1.0, Some(square(0, 0, 4)));
    let tx = Affine::scale(2.0);

    let lazy = blur.filter(&ctx, tx, None, None, None).unwrap().unwrap();
    assert_eq!(lazy.bounds(), PixelRect::new(-1, -1, 6, 6));
    assert_eq!(lazy.current_transform(), tx);

    let mut rec = Recorder::default();
    let helper: &mut dyn ImageDataRenderer = &mut rec;
    let out = blur.filter(&ctx, tx, None, Some(helper), None).unwrap();
    assert!(out.is_none());
    assert_eq!(rec.calls, vec![(PixelRect::new(-1, -1, 6, 6), tx)]);
}

#[test]
fn render_space_nodes_ignore_helper_when_spaces_match() {
    let ctx = FilterContext::default();
    let merge = EffectRef::merge([Some(square(0, 0, 2))]);
    let mut rec = Recorder::default();
    let helper: &mut dyn ImageDataRenderer = &mut rec;
    let out = merge
        .filter(&ctx, Affine::translate((1.0, 0.0)), None, Some(helper), None)
        .unwrap()
        .unwrap();
    assert!(rec.calls.is_empty());
    assert_eq!(out.bounds(), PixelRect::new(1, 0, 2, 2));
    assert_eq!(out.current_transform(), Affine::IDENTITY);
}

#[test]
fn offset_moves_pixels() {
    let ctx = FilterContext::default();
    let src = Arc::new(Raster::filled(1, 1, Rgba8Premul::BLACK));
    let offset = EffectRef::offset(2.0, 3.0, Some(EffectRef::identity(Some(src), 0, 0)));
    let out = offset
        .filter(&ctx, Affine::IDENTITY, None, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(out.bounds(), PixelRect::new(2, 3, 1, 1));
    assert_eq!(out.raster().unwrap().pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn output_clip_limits_sources_and_composites() {
    let ctx = FilterContext::default();
    let merge = EffectRef::merge([Some(square(0, 0, 10)), Some(square(20, 0, 10))]);
    let out = merge
        .filter(
            &ctx,
            Affine::IDENTITY,
            Some(PixelRect::new(5, 0, 20, 5)),
            None,
            None,
        )
        .unwrap()
        .unwrap();
    assert_eq!(out.bounds(), PixelRect::new(5, 0, 20, 5));
}

#[test]
fn shared_nodes_feed_several_parents() {
    let ctx = FilterContext::default();
    let shared = square(0, 0, 2);
    let blend = EffectRef::blend(BlendMode::Add, Some(shared.clone()), Some(shared.clone()));
    let out = blend
        .filter(&ctx, Affine::IDENTITY, None, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(out.raster().unwrap().pixel(1, 1), [0, 0, 0, 255]);
}

#[test]
fn delegate_forwards_everything() {
    let ctx = FilterContext::default();
    let head = EffectRef::offset(1.0, 1.0, None);
    let d = EffectRef::delegate(head);
    let input = square(0, 0, 2);
    assert_eq!(
        d.bounds(Affine::IDENTITY, Some(&input)).unwrap(),
        Rect::new(1.0, 1.0, 3.0, 3.0)
    );
    let out = d
        .filter(&ctx, Affine::IDENTITY, None, None, Some(&input))
        .unwrap()
        .unwrap();
    assert_eq!(out.bounds(), PixelRect::new(1, 1, 2, 2));
}

#[test]
fn nodes_missing_input_slots_fail_validation() {
    let ctx = FilterContext::default();
    let blur = EffectRef::new(EffectKind::GaussianBlur { radius: 2.0 }, []);
    let fallback = square(0, 0, 2);
    assert!(matches!(
        blur.filter(&ctx, Affine::IDENTITY, None, None, Some(&fallback)),
        Err(ShadefxError::Validation(_))
    ));
    assert!(matches!(
        blur.bounds(Affine::IDENTITY, Some(&fallback)),
        Err(ShadefxError::Validation(_))
    ));

    let blend = EffectRef::new(
        EffectKind::Blend {
            mode: BlendMode::SrcOver,
            opacity: 1.0,
        },
        [Some(square(0, 0, 2))],
    );
    assert!(matches!(
        blend.filter(&ctx, Affine::IDENTITY, None, None, None),
        Err(ShadefxError::Validation(_))
    ));
    assert!(matches!(
        blend.bounds(Affine::IDENTITY, None),
        Err(ShadefxError::Validation(_))
    ));

    let crop = EffectRef::new(EffectKind::Crop, [Some(square(0, 0, 2))]);
    assert!(matches!(
        crop.filter(&ctx, Affine::IDENTITY, None, None, None),
        Err(ShadefxError::Validation(_))
    ));
}

#[test]
fn required_inputs_per_kind() {
    assert_eq!(EffectKind::Crop.required_inputs(), Some(2));
    assert_eq!(
        EffectKind::Offset { dx: 1.0, dy: 0.0 }.required_inputs(),
        Some(1)
    );
    assert_eq!(EffectKind::Merge.required_inputs(), None);
    let merge = EffectRef::new(EffectKind::Merge, []);
    assert_eq!(merge.bounds(Affine::IDENTITY, None).unwrap(), Rect::ZERO);
}

use super::*;
use crate::image::raster::Raster;

fn dot(ctx: &FilterContext) -> ImageData {
    let r = Raster::filled(1, 1, Rgba8Premul::from_straight_rgba(255, 255, 255, 255));
    ImageData::from_raster(ctx, r, PixelRect::new(5, 5, 1, 1))
}

#[test]
fn kernels_sum_to_one_in_q16() {
    for radius in [1u32, 3, 10, 63] {
        let k = gaussian_kernel_q16(radius, radius as f32 / 3.0).unwrap();
        assert_eq!(k.len(), (2 * radius + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
        assert!(k[radius as usize] >= k[0]);
    }
    for half in [0u32, 1, 4] {
        let k = box_kernel_q16(half);
        assert_eq!(k.len(), (2 * half + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
    }
    assert!(gaussian_kernel_q16(2, 0.0).is_err());
}

#[test]
fn pads_follow_radius_and_passes() {
    assert_eq!(gaussian_pad(10.0), 10);
    assert_eq!(gaussian_pad(2.2), 3);
    assert_eq!(gaussian_pad(-4.0), 0);
    assert_eq!(gaussian_pad(1000.0), 127);
    assert_eq!(box_pad(1, 10.0), 10);
    assert_eq!(box_pad(2, 10.0), 10);
    assert_eq!(box_pad(3, 9.0), 9);
}

#[test]
fn blur_spreads_a_single_pixel_symmetrically() {
    let ctx = FilterContext::default();
    let out = gaussian_blur(&ctx, &dot(&ctx), 3.0, None).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(2, 2, 7, 7));
    let r = out.raster().unwrap();
    let center = r.pixel(3, 3)[3];
    assert!(center > 0 && center < 255);
    assert_eq!(r.pixel(2, 3), r.pixel(4, 3));
    assert_eq!(r.pixel(3, 2), r.pixel(3, 4));
    assert!(r.pixel(0, 0)[3] <= r.pixel(1, 1)[3]);
}

#[test]
fn blur_output_is_clipped() {
    let ctx = FilterContext::default();
    let out = gaussian_blur(&ctx, &dot(&ctx), 3.0, Some(PixelRect::new(5, 0, 100, 100))).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(5, 2, 4, 7));
}

#[test]
fn zero_radius_blur_copies() {
    let ctx = FilterContext::default();
    let out = gaussian_blur(&ctx, &dot(&ctx), 0.0, None).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(5, 5, 1, 1));
    assert_eq!(out.raster().unwrap().pixel(0, 0), [255, 255, 255, 255]);
}

#[test]
fn shadow_takes_color_from_parameter_and_shape_from_alpha() {
    let ctx = FilterContext::default();
    let red = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    let out = gaussian_shadow(&ctx, &dot(&ctx), 2.0, red, 0.0, None).unwrap();
    assert_eq!(out.bounds(), PixelRect::new(3, 3, 5, 5));
    let [r, g, b, a] = out.raster().unwrap().pixel(2, 2);
    assert!(a > 0);
    assert_eq!(r, a);
    assert_eq!((g, b), (0, 0));
}

#[test]
fn box_shadow_passes_widen_support() {
    let ctx = FilterContext::default();
    let one = box_shadow(&ctx, &dot(&ctx), 1, 2.0, Rgba8Premul::BLACK, 0.0, None).unwrap();
    let three = box_shadow(&ctx, &dot(&ctx), 3, 3.0, Rgba8Premul::BLACK, 0.0, None).unwrap();
    assert_eq!(one.bounds(), PixelRect::new(3, 3, 5, 5));
    assert_eq!(three.bounds(), PixelRect::new(2, 2, 7, 7));
    // One box pass is flat across its support.
    let r = one.raster().unwrap();
    assert_eq!(r.pixel(0, 2)[3], r.pixel(2, 2)[3]);
}

#[test]
fn spread_pushes_alpha_to_opaque() {
    assert_eq!(spread_alpha(100, 0.0), 100);
    assert_eq!(spread_alpha(100, 0.5), 200);
    assert_eq!(spread_alpha(200, 0.5), 255);
    assert_eq!(spread_alpha(1, 1.0), 255);
    assert_eq!(spread_alpha(0, 1.0), 0);
}

#[test]
fn missing_raster_stays_invalid() {
    let ctx = FilterContext::default();
    let bad = ImageData::invalid(&ctx, PixelRect::new(0, 0, 1, 1));
    assert!(!gaussian_blur(&ctx, &bad, 2.0, None).unwrap().validate(&ctx));
}

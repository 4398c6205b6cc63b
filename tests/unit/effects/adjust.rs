use super::*;
use crate::foundation::core::Rgba8Premul;
use crate::image::raster::Raster;

fn image(ctx: &FilterContext, bounds: PixelRect, color: Rgba8Premul) -> ImageData {
    let r = Raster::filled(bounds.width as u32, bounds.height as u32, color);
    ImageData::from_raster(ctx, r, bounds)
}

#[test]
fn crop_inside_shares_and_partial_copies() {
    let ctx = FilterContext::default();
    let img = image(&ctx, PixelRect::new(0, 0, 4, 4), Rgba8Premul::BLACK);
    let same = crop(&ctx, &img, PixelRect::new(-10, -10, 100, 100));
    assert_eq!(img.ref_count(), 2);
    same.unref();

    let part = crop(&ctx, &img, PixelRect::new(2, 1, 10, 2));
    assert_eq!(part.bounds(), PixelRect::new(2, 1, 2, 2));
    assert_eq!(part.raster().unwrap().pixel(1, 1), [0, 0, 0, 255]);

    let none = crop(&ctx, &img, PixelRect::new(10, 10, 1, 1));
    assert!(none.bounds().is_empty());
}

#[test]
fn brightpass_keeps_only_bright_pixels() {
    let ctx = FilterContext::default();
    let px = PixelRect::new(0, 0, 1, 1);
    let opaque = |r, g, b| Rgba8Premul::from_straight_rgba(r, g, b, 255);
    let white = image(&ctx, px, opaque(255, 255, 255));
    let dark = image(&ctx, px, opaque(40, 40, 40));
    let blue = image(&ctx, px, opaque(0, 0, 255));

    assert_eq!(brightpass(&ctx, &white, 0.3).raster().unwrap().pixel(0, 0), [255; 4]);
    assert_eq!(brightpass(&ctx, &dark, 0.3).raster().unwrap().pixel(0, 0), [0; 4]);
    // Pure blue carries little luminance.
    assert_eq!(brightpass(&ctx, &blue, 0.3).raster().unwrap().pixel(0, 0), [0; 4]);
    assert_eq!(brightpass(&ctx, &blue, 0.0).raster().unwrap().pixel(0, 0), [0, 0, 255, 255]);
}

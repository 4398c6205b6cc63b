use rayon::prelude::*;

use crate::foundation::core::{PixelRect, Rgba8Premul};
use crate::foundation::error::{ShadefxError, ShadefxResult};
use crate::foundation::math::mul_div255_u8;
use crate::image::context::FilterContext;
use crate::image::data::ImageData;

/// Largest kernel radius honoured; larger values are clamped.
pub const MAX_RADIUS: f64 = 127.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

fn clamp_radius(radius: f64) -> f64 {
    if radius.is_finite() {
        radius.clamp(0.0, MAX_RADIUS)
    } else {
        0.0
    }
}

pub(crate) fn gaussian_pad(radius: f64) -> i32 {
    clamp_radius(radius).ceil() as i32
}

fn box_half(passes: u32, radius: f64) -> u32 {
    let p = f64::from(passes.clamp(1, 3));
    (clamp_radius(radius) / p).round() as u32
}

pub(crate) fn box_pad(passes: u32, radius: f64) -> i32 {
    (passes.clamp(1, 3) * box_half(passes, radius)) as i32
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ShadefxResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ShadefxError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(ShadefxError::evaluation("gaussian kernel sum is zero"));
    }
    Ok(normalize_q16(&weights_f, sum))
}

pub(crate) fn box_kernel_q16(half: u32) -> Vec<u32> {
    let n = (2 * half + 1) as usize;
    normalize_q16(&vec![1.0; n], n as f64)
}

fn normalize_q16(weights_f: &[f64], sum: f64) -> Vec<u32> {
    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    weights
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

/// One separable pass. Taps outside the buffer read as transparent.
fn convolve_q16(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    k: &[u32],
    axis: Axis,
) {
    if width == 0 || height == 0 {
        return;
    }
    if k.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }
    let radius = (k.len() / 2) as isize;
    dst.par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, out)| {
            for x in 0..width {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let d = ki as isize - radius;
                    let (sx, sy) = match axis {
                        Axis::Horizontal => (x as isize + d, y as isize),
                        Axis::Vertical => (x as isize, y as isize + d),
                    };
                    if sx < 0 || sy < 0 || sx >= width as isize || sy >= height as isize {
                        continue;
                    }
                    let idx = (sy as usize * width + sx as usize) * channels;
                    for (c, a) in acc.iter_mut().enumerate().take(channels) {
                        *a += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for (c, a) in acc.iter().enumerate().take(channels) {
                    out[x * channels + c] = q16_to_u8(*a);
                }
            }
        });
}

fn separable(
    buf: &mut [u8],
    tmp: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    k: &[u32],
) {
    convolve_q16(buf, tmp, width, height, channels, k, Axis::Horizontal);
    convolve_q16(tmp, buf, width, height, channels, k, Axis::Vertical);
}

/// Gaussian blur (`sigma = radius / 3`) of every premultiplied channel.
pub(crate) fn gaussian_blur(
    ctx: &FilterContext,
    img: &ImageData,
    radius: f64,
    clip: Option<PixelRect>,
) -> ShadefxResult<ImageData> {
    let pad = gaussian_pad(radius);
    let Some(src) = img.raster() else {
        return Ok(ImageData::invalid(ctx, PixelRect::EMPTY));
    };
    let out = img.bounds().grow(pad, pad).clip_to(clip);
    if out.is_empty() || img.bounds().is_empty() {
        return Ok(ImageData::empty(ctx));
    }
    let kernel = gaussian_kernel_q16(pad as u32, (clamp_radius(radius) / 3.0) as f32)?;

    let work = out.grow(pad, pad);
    let (w, h) = (work.width as u32, work.height as u32);
    let mut a = ctx.borrow_raster(w, h);
    let mut b = ctx.borrow_raster(w, h);
    a.blit(work, src, img.bounds());
    separable(a.data_mut(), b.data_mut(), w as usize, h as usize, 4, &kernel);

    let mut dst = ctx.borrow_raster(out.width as u32, out.height as u32);
    dst.blit(out, &a, work);
    ctx.release_raster(a);
    ctx.release_raster(b);
    Ok(ImageData::from_raster(ctx, dst, out))
}

/// Gaussian-blurred alpha tinted with `color`.
pub(crate) fn gaussian_shadow(
    ctx: &FilterContext,
    img: &ImageData,
    radius: f64,
    color: Rgba8Premul,
    spread: f64,
    clip: Option<PixelRect>,
) -> ShadefxResult<ImageData> {
    let pad = gaussian_pad(radius);
    let kernel = gaussian_kernel_q16(pad as u32, (clamp_radius(radius) / 3.0) as f32)?;
    Ok(shadow(ctx, img, &[kernel], pad, color, spread, clip))
}

/// Box-blurred alpha (`passes` repetitions) tinted with `color`.
pub(crate) fn box_shadow(
    ctx: &FilterContext,
    img: &ImageData,
    passes: u32,
    radius: f64,
    color: Rgba8Premul,
    spread: f64,
    clip: Option<PixelRect>,
) -> ShadefxResult<ImageData> {
    let passes = passes.clamp(1, 3);
    let kernel = box_kernel_q16(box_half(passes, radius));
    let kernels = vec![kernel; passes as usize];
    Ok(shadow(
        ctx,
        img,
        &kernels,
        box_pad(passes, radius),
        color,
        spread,
        clip,
    ))
}

fn shadow(
    ctx: &FilterContext,
    img: &ImageData,
    kernels: &[Vec<u32>],
    pad: i32,
    color: Rgba8Premul,
    spread: f64,
    clip: Option<PixelRect>,
) -> ImageData {
    let Some(src) = img.raster() else {
        return ImageData::invalid(ctx, PixelRect::EMPTY);
    };
    let out = img.bounds().grow(pad, pad).clip_to(clip);
    if out.is_empty() || img.bounds().is_empty() {
        return ImageData::empty(ctx);
    }

    let work = out.grow(pad, pad);
    let (w, h) = (work.width as usize, work.height as usize);
    let mut plane = vec![0u8; w * h];
    let mut tmp = vec![0u8; w * h];
    let sb = img.bounds();
    let overlap = work.intersect(sb);
    for y in overlap.y..overlap.max_y() {
        for x in overlap.x..overlap.max_x() {
            let a = src.pixel((x - sb.x) as u32, (y - sb.y) as u32)[3];
            plane[(y - work.y) as usize * w + (x - work.x) as usize] = a;
        }
    }
    for k in kernels {
        separable(&mut plane, &mut tmp, w, h, 1, k);
    }

    let c = color.to_array();
    let mut dst = ctx.borrow_raster(out.width as u32, out.height as u32);
    let ow = out.width as usize;
    dst.data_mut()
        .par_chunks_mut(ow * 4)
        .enumerate()
        .for_each(|(row, line)| {
            let py = (out.y - work.y) as usize + row;
            for (col, px) in line.chunks_exact_mut(4).enumerate() {
                let px_x = (out.x - work.x) as usize + col;
                let a = u16::from(spread_alpha(plane[py * w + px_x], spread));
                for (p, &ch) in px.iter_mut().zip(c.iter()) {
                    *p = mul_div255_u8(u16::from(ch), a);
                }
            }
        });
    ImageData::from_raster(ctx, dst, out)
}

/// Push coverage toward opaque: `spread` of 0 keeps the blur, 1 makes any coverage solid.
pub(crate) fn spread_alpha(a: u8, spread: f64) -> u8 {
    if spread.is_nan() || spread <= 0.0 {
        return a;
    }
    if spread >= 1.0 {
        return if a > 0 { 255 } else { 0 };
    }
    (f64::from(a) / (1.0 - spread)).round().min(255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;

use super::*;

#[test]
fn pool_honors_bucket_cap() {
    let mut p = RasterPool::new(RasterPoolOpts::default().with_max_surfaces_per_bucket(1));
    let a = p.borrow(8, 8);
    let b = p.borrow(8, 8);
    p.release(a);
    p.release(b);

    let st = p.stats();
    assert_eq!(st.retained_surfaces, 1);
    assert_eq!(st.dropped_on_release, 1);
    assert_eq!(st.alloc_surfaces, 2);
}

#[test]
fn pool_honors_global_byte_cap() {
    let bytes_8x8 = 8 * 8 * 4;
    let mut p = RasterPool::new(RasterPoolOpts {
        max_pool_bytes: bytes_8x8,
        max_surfaces_per_bucket: 8,
    });
    let a = p.borrow(8, 8);
    let b = p.borrow(8, 8);
    p.release(a);
    p.release(b);

    let st = p.stats();
    assert_eq!(st.retained_bytes, bytes_8x8);
    assert_eq!(st.retained_surfaces, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn borrowed_rasters_are_cleared_and_reused() {
    let mut p = RasterPool::new(RasterPoolOpts::default());
    let mut a = p.borrow(2, 3);
    a.data_mut().fill(200);
    p.release(a);

    let b = p.borrow(2, 3);
    assert!(b.data().iter().all(|&v| v == 0));
    assert_eq!((b.width(), b.height()), (2, 3));
    let st = p.stats();
    assert_eq!(st.alloc_surfaces, 1);
    assert_eq!(st.reused_surfaces, 1);
    assert_eq!(st.retained_surfaces, 0);
}

#[test]
fn zero_caps_disable_retention() {
    let mut p = RasterPool::new(RasterPoolOpts::default().with_max_pool_bytes(0));
    let a = p.borrow(4, 4);
    p.release(a);
    assert_eq!(p.stats().retained_surfaces, 0);
    assert_eq!(p.stats().dropped_on_release, 1);
}

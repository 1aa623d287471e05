//! HEIF decoding for the AV1-coded variant.
//!
//! `avif-parse` walks the ISO-BMFF container and hands back the primary
//! item's AV1 bitstream; `rav1d` (pure Rust dav1d) decodes it to YUV planes,
//! which are converted to RGB here. HEVC-coded HEIC has no pure Rust decoder
//! and is rejected up front so the caller gets a clear transcode error.

use super::backend::ImageError;
use super::container::{HeifBrand, sniff_heif_brand};
use image::{DynamicImage, RgbImage};
use std::ptr::NonNull;

/// Decode a HEIF file into an RGB image.
pub fn decode_heif(data: &[u8]) -> Result<DynamicImage, ImageError> {
    if sniff_heif_brand(data) == Some(HeifBrand::Hevc) {
        return Err(ImageError::Transcode(
            "HEVC-coded HEIC is not supported; export the photo as JPEG".into(),
        ));
    }

    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(data))
        .map_err(|e| ImageError::Transcode(format!("unreadable HEIF container: {e:?}")))?;
    decode_av1_still(&avif.primary_item)
}

/// Run one AV1 still picture through rav1d.
///
/// The decoder context is opened once and closed on every path; picture and
/// data buffers are released as soon as they are no longer needed.
fn decode_av1_still(av1: &[u8]) -> Result<DynamicImage, ImageError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use rav1d::src::lib as dav1d;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe { dav1d::dav1d_default_settings(NonNull::from(&mut settings).cast()) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(ImageError::Transcode(format!("AV1 decoder init failed ({})", rc.0)));
    }

    let decode = || -> Result<DynamicImage, ImageError> {
        let mut data = Dav1dData::default();
        let buf = unsafe { dav1d::dav1d_data_create(NonNull::new(&mut data), av1.len()) };
        if buf.is_null() {
            return Err(ImageError::Transcode("AV1 buffer allocation failed".into()));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1.as_ptr(), buf, av1.len()) };

        let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { dav1d::dav1d_data_unref(NonNull::new(&mut data)) };
            return Err(ImageError::Transcode(format!("AV1 bitstream rejected ({})", rc.0)));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            return Err(ImageError::Transcode(format!("AV1 decode produced no picture ({})", rc.0)));
        }

        let converted = picture_to_rgb(&pic);
        unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut pic)) };
        converted
    };

    let result = decode();
    unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
    result
}

/// One decoded plane: base pointer plus row stride in bytes.
#[derive(Clone, Copy)]
struct Plane {
    ptr: *const u8,
    stride: isize,
}

impl Plane {
    /// Sample at `(x, y)`; samples above 8 bits are stored as `u16`.
    #[inline]
    fn sample(self, x: u32, y: u32, bpc: u32) -> f32 {
        let row = y as isize * self.stride;
        if bpc <= 8 {
            (unsafe { *self.ptr.offset(row + x as isize) }) as f32
        } else {
            (unsafe { *(self.ptr.offset(row + x as isize * 2) as *const u16) }) as f32
        }
    }
}

enum Chroma {
    Monochrome,
    /// Planes U and V with horizontal/vertical subsampling flags.
    Color { u: Plane, v: Plane, ss_x: bool, ss_y: bool },
}

fn picture_to_rgb(
    pic: &rav1d::include::dav1d::picture::Dav1dPicture,
) -> Result<DynamicImage, ImageError> {
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };

    let plane = |index: usize, stride: isize| -> Result<Plane, ImageError> {
        let ptr = pic.data[index]
            .ok_or_else(|| ImageError::Transcode(format!("decoded picture lacks plane {index}")))?
            .as_ptr() as *const u8;
        Ok(Plane { ptr, stride })
    };

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;
    let layout = pic.p.layout;
    let luma = plane(0, pic.stride[0])?;

    let chroma = if layout == DAV1D_PIXEL_LAYOUT_I400 {
        Chroma::Monochrome
    } else {
        let (ss_x, ss_y) = match layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            _ => {
                return Err(ImageError::Transcode(format!(
                    "unsupported HEIF pixel layout: {layout}"
                )));
            }
        };
        Chroma::Color {
            u: plane(1, pic.stride[1])?,
            v: plane(2, pic.stride[1])?,
            ss_x,
            ss_y,
        }
    };

    let rgb = yuv_to_rgb(luma, &chroma, width, height, bpc);
    RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| ImageError::Transcode("decoded plane size mismatch".into()))
}

/// BT.601 YCbCr to interleaved 8-bit RGB.
fn yuv_to_rgb(luma: Plane, chroma: &Chroma, width: u32, height: u32, bpc: u32) -> Vec<u8> {
    let scale = 255.0 / ((1u32 << bpc) - 1) as f32;
    let center = (1u32 << (bpc - 1)) as f32;
    let to_u8 = |v: f32| (v * scale).clamp(0.0, 255.0) as u8;

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let l = luma.sample(x, y, bpc);
            match chroma {
                Chroma::Monochrome => {
                    let g = to_u8(l);
                    rgb.extend_from_slice(&[g, g, g]);
                }
                Chroma::Color { u, v, ss_x, ss_y } => {
                    let cx = if *ss_x { x / 2 } else { x };
                    let cy = if *ss_y { y / 2 } else { y };
                    let cb = u.sample(cx, cy, bpc) - center;
                    let cr = v.sample(cx, cy, bpc) - center;
                    rgb.extend_from_slice(&[
                        to_u8(l + 1.402 * cr),
                        to_u8(l - 0.344136 * cb - 0.714136 * cr),
                        to_u8(l + 1.772 * cb),
                    ]);
                }
            }
        }
    }
    rgb
}

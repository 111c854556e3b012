//! Image and animation encoding on top of the `image` crate.
//!
//! Both encoders take *transposed* escape matrices: one row per imaginary-axis
//! sample, so the real axis runs along the image width.

use std::{
    cell::RefCell,
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use image::{
    codecs::gif::{self, Repeat},
    imageops::{self, FilterType},
    Delay, DynamicImage, Frame, ImageFormat, RgbImage,
};
use log::{debug, trace};

use crate::{
    canvas::Canvas,
    colour::{colourize, ColourMap, Normalisation},
    error::RenderError,
    grid::EscapeMatrix,
    pixel,
};

/// Receives animation frames in display order and serialises them.
pub trait AnimationEncoder {
    fn push_frame(&mut self, frame: &EscapeMatrix) -> Result<(), RenderError>;

    /// Flush and publish the animation. Dropping an encoder without calling
    /// this discards everything pushed so far.
    ///
    /// Errors raised while closing the container (for GIF, the trailer byte)
    /// are reported here even when the backend itself swallows them.
    fn finish(self) -> Result<(), RenderError>;
}

/// Raster format for a still image, from the extension of `path`.
pub fn still_format(path: &Path) -> Result<ImageFormat, RenderError> {
    match ImageFormat::from_path(path) {
        Ok(format) if format.can_write() => Ok(format),
        _ => Err(RenderError::invalid(
            "output_path",
            format!(
                "{} does not name a writable image format (try .png)",
                path.display()
            ),
        )),
    }
}

/// Animations are always GIF.
pub fn check_animation_path(path: &Path) -> Result<(), RenderError> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Gif) => Ok(()),
        _ => Err(RenderError::invalid(
            "output_path",
            format!("{} must have a .gif extension", path.display()),
        )),
    }
}

fn dimension(density: usize) -> Result<u32, RenderError> {
    u32::try_from(density)
        .map_err(|_| RenderError::invalid("density", format!("{density} is too large for an image")))
}

fn rgb_image(
    transposed: &EscapeMatrix,
    map: &ColourMap,
    normalisation: Normalisation,
) -> Result<RgbImage, RenderError> {
    let side = dimension(transposed.density())?;
    let pixels = colourize(transposed, map, normalisation);
    RgbImage::from_raw(side, side, pixel::as_bytes(&pixels).to_vec()).ok_or_else(|| {
        RenderError::invalid(
            "density",
            format!("{side}x{side} does not match the pixel buffer"),
        )
    })
}

/// Resample to `frame_size` with a bicubic (Catmull-Rom) filter. `None`, or a
/// size equal to the current one, leaves the image untouched.
fn display_frame(image: RgbImage, frame_size: Option<u32>) -> RgbImage {
    match frame_size {
        Some(size) if size != image.width() || size != image.height() => {
            imageops::resize(&image, size, size, FilterType::CatmullRom)
        }
        _ => image,
    }
}

/// A writer that remembers its first failure, for callers that drop write errors.
struct Latched<W> {
    inner: W,
    error: Rc<RefCell<Option<io::Error>>>,
}

impl<W: Write> Latched<W> {
    fn new(inner: W) -> (Self, Rc<RefCell<Option<io::Error>>>) {
        let error = Rc::new(RefCell::new(None));
        let latched = Self {
            inner,
            error: Rc::clone(&error),
        };
        (latched, error)
    }

    fn latch(&self, err: io::Error) -> io::Error {
        if err.kind() != io::ErrorKind::Interrupted {
            self.error
                .borrow_mut()
                .get_or_insert_with(|| io::Error::new(err.kind(), err.to_string()));
        }
        err
    }
}

impl<W: Write> Write for Latched<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(|err| self.latch(err))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(|err| self.latch(err))
    }
}

/// Write `transposed` as a colour-mapped still image at `path`.
pub fn write_still(
    transposed: &EscapeMatrix,
    map: &ColourMap,
    normalisation: Normalisation,
    path: &Path,
) -> Result<PathBuf, RenderError> {
    let format = still_format(path)?;
    let image = rgb_image(transposed, map, normalisation)?;

    let canvas = Canvas::create(path)?;
    let mut writer = canvas.writer()?;
    DynamicImage::ImageRgb8(image)
        .write_to(&mut writer, format)
        .map_err(|source| RenderError::encode(path, source))?;
    writer
        .flush()
        .map_err(|source| RenderError::io(path, source))?;
    drop(writer);

    canvas.persist()
}

/// Looping GIF backend.
///
/// Each frame is colour-mapped on its own range and, when `frame_size`
/// differs from the matrix density, resampled with a bicubic (Catmull-Rom)
/// filter. Without a `frame_size` frames are encoded pixel-for-pixel.
pub struct GifEncoder {
    canvas: Canvas,
    encoder: gif::GifEncoder<Latched<File>>,
    write_error: Rc<RefCell<Option<io::Error>>>,
    map: ColourMap,
    normalisation: Normalisation,
    delay: Delay,
    frame_size: Option<u32>,
    frames: u32,
}

impl GifEncoder {
    pub fn create(
        path: &Path,
        map: ColourMap,
        normalisation: Normalisation,
        interval_ms: u32,
        frame_size: Option<u32>,
    ) -> Result<Self, RenderError> {
        check_animation_path(path)?;

        let canvas = Canvas::create(path)?;
        let (file, write_error) = Latched::new(canvas.file()?);
        let mut encoder = gif::GifEncoder::new(file);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|source| RenderError::encode(path, source))?;

        Ok(Self {
            canvas,
            encoder,
            write_error,
            map,
            normalisation,
            delay: Delay::from_numer_denom_ms(interval_ms, 1),
            frame_size,
            frames: 0,
        })
    }
}

impl AnimationEncoder for GifEncoder {
    fn push_frame(&mut self, frame: &EscapeMatrix) -> Result<(), RenderError> {
        trace!("begin push_frame {}", self.frames);

        let image = display_frame(
            rgb_image(frame, &self.map, self.normalisation)?,
            self.frame_size,
        );

        let rgba = DynamicImage::ImageRgb8(image).into_rgba8();
        self.encoder
            .encode_frame(Frame::from_parts(rgba, 0, 0, self.delay))
            .map_err(|source| RenderError::encode(self.canvas.destination(), source))?;
        self.frames += 1;

        trace!("end push_frame");
        Ok(())
    }

    fn finish(self) -> Result<(), RenderError> {
        let Self {
            canvas,
            encoder,
            write_error,
            frames,
            ..
        } = self;

        // Dropping the encoder writes the GIF trailer and discards any error.
        drop(encoder);
        if let Some(err) = write_error.borrow_mut().take() {
            return Err(RenderError::io(canvas.destination(), err));
        }
        let path = canvas.persist()?;
        debug!("wrote {} frames to {}", frames, path.display());
        Ok(())
    }
}

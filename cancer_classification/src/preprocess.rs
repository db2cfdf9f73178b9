use crate::error::ImageDecodeError;
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, ImageReader};
use ndarray::{Array4, ArrayView4};
use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;
pub const TENSOR_LEN: usize = (INPUT_SIZE as usize) * (INPUT_SIZE as usize) * CHANNELS;

const PIXEL_MEAN: f32 = 127.5;
const PIXEL_SCALE: f32 = 127.5;

/// Where an image to classify comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn decode(&self) -> Result<DynamicImage, ImageDecodeError> {
        let image = match self {
            ImageSource::Path(path) => ImageReader::open(path)?.with_guessed_format()?.decode()?,
            ImageSource::Bytes(bytes) => ImageReader::new(Cursor::new(bytes.as_slice()))
                .with_guessed_format()?
                .decode()?,
        };
        Ok(image)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

/// Model input of shape `[1, 224, 224, 3]` (NHWC). Its standard-layout order
/// is row, column, then R, G, B.
#[derive(Debug, Clone)]
pub struct NormalizedTensor {
    data: Array4<f32>,
}

impl NormalizedTensor {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// Values in row-major pixel order, channels interleaved.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }
}

pub fn normalize(channel: u8) -> f32 {
    (channel as f32 - PIXEL_MEAN) / PIXEL_SCALE
}

pub fn preprocess(source: &ImageSource) -> Result<NormalizedTensor, ImageDecodeError> {
    let image = source.decode()?;
    preprocess_image(&image)
}

pub fn preprocess_image(image: &DynamicImage) -> Result<NormalizedTensor, ImageDecodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageDecodeError::Empty { width, height });
    }

    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let size = INPUT_SIZE as usize;
    let mut input = Array4::<f32>::zeros((1, size, size, CHANNELS));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let [r, g, b] = pixel.0;
        input[[0, y, x, 0]] = normalize(r);
        input[[0, y, x, 1]] = normalize(g);
        input[[0, y, x, 2]] = normalize(b);
    }

    tracing::trace!(width, height, "Preprocessed image into {:?}", input.shape());

    Ok(NormalizedTensor { data: input })
}

use std::{fmt, str::FromStr};

use image::imageops::FilterType;

use crate::DataError;

pub const DEFAULT_IMG_SIZE: u32 = 224;
pub const DEFAULT_CROP_PCT: f32 = 0.875;
pub const IMAGENET_DEFAULT_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_DEFAULT_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Overrides given on the command line. `None` (or an empty
/// interpolation name) keeps the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataArgs {
    pub img_size: Option<u32>,
    pub mean: Option<Vec<f32>>,
    pub std: Option<Vec<f32>>,
    pub crop_pct: Option<f32>,
    pub interpolation: String,
    pub tf_preprocessing: bool,
}

/// Fully resolved preprocessing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    /// `(channels, height, width)`
    pub input_size: (u32, u32, u32),
    pub interpolation: Interpolation,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub crop_pct: f32,
    pub tf_preprocessing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos,
}

impl Interpolation {
    pub fn filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
            Self::Bicubic => FilterType::CatmullRom,
            Self::Lanczos => FilterType::Lanczos3,
        }
    }
}

impl FromStr for Interpolation {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Ok(Self::default()),
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            "bicubic" => Ok(Self::Bicubic),
            "lanczos" => Ok(Self::Lanczos),
            _ => Err(DataError::UnknownInterpolation(s.to_string())),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Lanczos => "lanczos",
        };
        f.write_str(name)
    }
}

impl DataConfig {
    pub fn img_size(&self) -> u32 {
        self.input_size.2
    }
}

pub fn resolve_data_config(args: &DataArgs) -> Result<DataConfig, DataError> {
    let img_size = args.img_size.unwrap_or(DEFAULT_IMG_SIZE);
    if img_size == 0 {
        return Err(DataError::InvalidConfig("image size must be positive".into()));
    }

    let crop_pct = args.crop_pct.unwrap_or(DEFAULT_CROP_PCT);
    if !(crop_pct > 0.0 && crop_pct <= 1.0) {
        return Err(DataError::InvalidConfig(
            format!("crop pct must be in (0, 1], got {crop_pct}").into(),
        ));
    }

    let config = DataConfig {
        input_size: (3, img_size, img_size),
        interpolation: args.interpolation.parse()?,
        mean: per_channel("mean", args.mean.as_deref(), IMAGENET_DEFAULT_MEAN)?,
        std: per_channel("std", args.std.as_deref(), IMAGENET_DEFAULT_STD)?,
        crop_pct,
        tf_preprocessing: args.tf_preprocessing,
    };
    if config.std.iter().any(|&s| s == 0.0) {
        return Err(DataError::InvalidConfig("std must be non-zero".into()));
    }

    log::info!("Data processing configuration:");
    log::info!("\tinput_size: {:?}", config.input_size);
    log::info!("\tinterpolation: {}", config.interpolation);
    log::info!("\tmean: {:?}", config.mean);
    log::info!("\tstd: {:?}", config.std);
    log::info!("\tcrop_pct: {}", config.crop_pct);

    Ok(config)
}

fn per_channel(
    name: &'static str,
    values: Option<&[f32]>,
    default: [f32; 3],
) -> Result<[f32; 3], DataError> {
    match values {
        None => Ok(default),
        Some(&[v]) => Ok([v; 3]),
        Some(&[r, g, b]) => Ok([r, g, b]),
        Some(vs) => Err(DataError::InvalidConfig(
            format!("{name} needs 1 or 3 values, got {}", vs.len()).into(),
        )),
    }
}

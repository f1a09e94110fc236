pub const DEFAULT_MAX_DIMENSION: u32 =
  1_200;
pub const DEFAULT_JPEG_QUALITY: f64 = 0.7;
pub const JPEG_MIME: &str = "image/jpeg";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DropKind {
  Image,
  Pdf,
  Other
}

impl DropKind {
  #[must_use]
  pub fn classify(mime: &str) -> Self {
    let mime = mime.trim();
    if mime.starts_with("image/") {
      Self::Image
    } else if mime == "application/pdf" {
      Self::Pdf
    } else {
      Self::Other
    }
  }
}

/// Size an image is redrawn at before embedding.
///
/// The longer side is capped at `max`; a square counts as portrait.
/// Images already within bounds keep their size.
#[must_use]
pub fn fit_within(
  width: u32,
  height: u32,
  max: u32
) -> (u32, u32) {
  if width == 0 || height == 0 || max == 0
  {
    return (width, height);
  }

  let scale = |side: u32, long: u32| {
    let scaled = (f64::from(side)
      * f64::from(max)
      / f64::from(long))
    .round();
    (scaled as u32).max(1)
  };

  if width > height {
    if width > max {
      return (max, scale(height, width));
    }
  } else if height > max {
    return (scale(width, height), max);
  }
  (width, height)
}

/// Rough decoded size of a base64 data URL, for logging.
#[must_use]
pub fn data_url_bytes(
  data_url: &str
) -> usize {
  data_url.len() * 3 / 4
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface dimensions {width} x {height} contain no pixels")]
    ZeroSizedSurface { width: u32, height: u32 },

    #[error("surface dimensions {width} x {height} exceed the block-aligned maximum of 65532")]
    SurfaceTooLarge { width: u32, height: u32 },

    #[error("expected surface to have at least {expected} elements but found {actual}")]
    NotEnoughData { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("error writing encoded blocks")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ReadPkmError {
    #[error("the data does not contain a valid PKM file")]
    NotAPkmFile,

    #[error("error decoding PKM surface")]
    Surface(#[from] SurfaceError),

    #[error("error reading PKM data")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum WritePkmError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("error writing PKM data")]
    Io(#[from] std::io::Error),
}

impl From<EncodeError> for WritePkmError {
    fn from(value: EncodeError) -> Self {
        match value {
            EncodeError::Surface(e) => WritePkmError::Surface(e),
            EncodeError::Io(e) => WritePkmError::Io(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateImageError {
    #[error("data length {data_length} is not valid for a {width}x{height} image")]
    InvalidSurfaceDimensions {
        width: u32,
        height: u32,
        data_length: usize,
    },

    #[error("error decoding surface")]
    Surface(#[from] SurfaceError),

    #[error("error reading PKM file")]
    ReadPkm(#[from] ReadPkmError),
}

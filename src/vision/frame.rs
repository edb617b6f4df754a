//! Camera frames and frame sources
//!
//! The camera is consumed as a stream of raw RGB24 frames of a fixed size,
//! e.g. `ffmpeg -f v4l2 -i /dev/video0 -vf scale=224:224 -pix_fmt rgb24 -f rawvideo -`.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Frame acquisition failures
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to open frame source {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("failed to read frame: {0}")]
    Io(#[from] io::Error),
    #[error("frame stream ended")]
    EndOfStream,
    #[error("frame stream ended mid-frame ({got} of {expected} bytes)")]
    Truncated { got: usize, expected: usize },
}

impl FrameError {
    /// Whether the source can never produce another frame
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FrameError::EndOfStream | FrameError::Truncated { .. } | FrameError::Open { .. }
        )
    }
}

/// Interleaved RGB24 image
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Single-color frame
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let pixels = rgb.iter().copied().cycle().take(width * height * 3).collect();
        Frame {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// RGB triple at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

/// Continuous source of camera frames, pulled once per tick
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, FrameError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        (**self).next_frame()
    }
}

/// Reads fixed-size raw RGB24 frames back to back from any reader
pub struct RawVideoSource<R: Read> {
    reader: R,
    width: usize,
    height: usize,
}

impl<R: Read> RawVideoSource<R> {
    pub fn new(reader: R, width: usize, height: usize) -> Self {
        RawVideoSource {
            reader,
            width,
            height,
        }
    }

    fn frame_len(&self) -> usize {
        self.width * self.height * 3
    }
}

impl RawVideoSource<BufReader<File>> {
    /// Open a raw video file or named pipe
    pub fn open(path: &Path, width: usize, height: usize) -> Result<Self, FrameError> {
        let file = File::open(path).map_err(|source| FrameError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), width, height))
    }
}

impl<R: Read> FrameSource for RawVideoSource<R> {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        let expected = self.frame_len();
        let mut pixels = vec![0u8; expected];
        let mut got = 0;

        while got < expected {
            match self.reader.read(&mut pixels[got..]) {
                Ok(0) if got == 0 => return Err(FrameError::EndOfStream),
                Ok(0) => return Err(FrameError::Truncated { got, expected }),
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Frame {
            width: self.width,
            height: self.height,
            pixels,
        })
    }
}

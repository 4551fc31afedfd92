use ndarray::{Array3, ArrayView3};

/// A single decoded video frame: contiguous samples in row-major
/// `height x width x channels` order, tagged with its position in the stream.
///
/// Readers produce 3-channel RGB frames. Transforms may return a single
/// channel, which [`Frame::to_rgb`] widens before encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Builds a frame from an `(height, width, channels)` array in any memory
    /// layout.
    pub fn from_array(array: ArrayView3<'_, u8>, index: usize) -> Self {
        let (height, width, channels) = array.dim();
        let data: Vec<u8> = array.iter().copied().collect();
        Self::new(data, width as u32, height as u32, channels as u8, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Returns a 3-channel copy, replicating the only channel of a grayscale
    /// frame. Frames that already have 3 channels are cloned unchanged.
    pub fn to_rgb(&self) -> Option<Frame> {
        match self.channels {
            3 => Some(self.clone()),
            1 => {
                let gray = self.as_ndarray();
                let rgb: Array3<u8> = gray
                    .broadcast((self.height as usize, self.width as usize, 3))?
                    .to_owned();
                Some(Frame::from_array(rgb.view(), self.index))
            }
            _ => None,
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// Owned interleaved 8-bit RGB frame, row-major, `data.len() == w * h * 3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbFrame {
    /// All-black frame of the given size.
    pub fn black(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 3],
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Convert to single-channel intensity with BT.601 luma weights.
    pub fn to_gray(&self) -> GrayImage {
        let mut out = Vec::with_capacity(self.width * self.height);
        for px in self.data.chunks_exact(3) {
            let y = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
            out.push(y.round().clamp(0.0, 255.0) as u8);
        }
        GrayImage {
            width: self.width,
            height: self.height,
            data: out,
        }
    }
}

/// Single-channel 8-bit image, row-major, `data.len() == w * h`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_of_white_is_white() {
        let mut f = RgbFrame::black(2, 1);
        f.set_pixel(1, 0, [255, 255, 255]);
        let g = f.to_gray();
        assert_eq!(g.get(0, 0), 0);
        assert_eq!(g.get(1, 0), 255);
    }

    #[test]
    fn luma_weights_channels() {
        let mut f = RgbFrame::black(1, 1);
        f.set_pixel(0, 0, [255, 0, 0]);
        let r = f.to_gray().get(0, 0);
        f.set_pixel(0, 0, [0, 255, 0]);
        let g = f.to_gray().get(0, 0);
        assert!(g > r, "green should dominate luma ({g} vs {r})");
    }
}

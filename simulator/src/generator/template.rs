use ndarray::Array2;

/// Draws a filled bright disc into a frame, clipped to the frame bounds.
pub fn draw_disc(pixels: &mut Array2<u8>, cy: i32, cx: i32, radius: i32, value: u8) {
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            if dr * dr + dc * dc <= radius * radius {
                let row = cy + dr;
                let col = cx + dc;
                if row >= 0
                    && col >= 0
                    && (row as usize) < pixels.nrows()
                    && (col as usize) < pixels.ncols()
                {
                    pixels[[row as usize, col as usize]] = value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_is_clipped_to_bounds() {
        let mut pixels: Array2<u8> = Array2::zeros((10, 10));
        draw_disc(&mut pixels, 0, 0, 3, 255);
        assert_eq!(pixels[[0, 0]], 255);
        assert_eq!(pixels[[3, 0]], 255);
        assert_eq!(pixels[[9, 9]], 0);
    }
}

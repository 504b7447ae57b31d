use crate::math::geometry::{min_enclosing_circle, polygon_area, polygon_perimeter};
use crate::prelude::{
    ContourCandidate, DetectStage, DetectorConfig, StageError, StageInput, StageMetadata,
    StageOutput, StageResult,
};
use crate::telemetry::log::LogManager;
use ndarray::Array2;
use std::f32::consts::PI;

// Moore neighborhood in clockwise order starting west of the pixel.
const NEIGHBORS: [(i32, i32); 8] = [
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
];

fn is_foreground(mask: &Array2<u8>, row: i32, col: i32) -> bool {
    row >= 0
        && col >= 0
        && (row as usize) < mask.nrows()
        && (col as usize) < mask.ncols()
        && mask[[row as usize, col as usize]] != 0
}

/// Moore-neighbor boundary trace from a component's topmost-leftmost pixel.
/// Terminates on Jacob's criterion, with a revisit cap for one-pixel-wide
/// appendages that never re-enter the start from the original direction.
fn trace_boundary(mask: &Array2<u8>, start: (usize, usize)) -> Vec<(usize, usize)> {
    let start_i = (start.0 as i32, start.1 as i32);
    // the scan reached the start pixel from its (background) west neighbor
    let initial_backtrack = (start_i.0, start_i.1 - 1);

    let mut contour = vec![start];
    let mut current = start_i;
    let mut backtrack = initial_backtrack;
    let mut start_visits = 0usize;
    let limit = 4 * mask.len() + 8;

    for _ in 0..limit {
        let anchor = NEIGHBORS
            .iter()
            .position(|&(dr, dc)| (current.0 + dr, current.1 + dc) == backtrack)
            .unwrap_or(0);

        let mut advanced = false;
        let mut last_background = backtrack;
        for step in 1..=NEIGHBORS.len() {
            let idx = (anchor + step) % NEIGHBORS.len();
            let next = (current.0 + NEIGHBORS[idx].0, current.1 + NEIGHBORS[idx].1);
            if is_foreground(mask, next.0, next.1) {
                if next == start_i {
                    start_visits += 1;
                    if last_background == initial_backtrack || start_visits >= 3 {
                        return contour;
                    }
                }
                contour.push((next.0 as usize, next.1 as usize));
                backtrack = last_background;
                current = next;
                advanced = true;
                break;
            }
            last_background = next;
        }

        if !advanced {
            // isolated pixel
            break;
        }
    }
    contour
}

/// Contour-extraction stage that measures every external connected region
/// of the cleaned mask and emits it as a ball candidate.
pub struct ContourStage {
    logger: LogManager,
}

impl ContourStage {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("contour"),
        }
    }
}

impl Default for ContourStage {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectStage for ContourStage {
    fn initialize(&mut self, _config: &DetectorConfig) -> StageResult<()> {
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        if input.pixels.is_empty() {
            return Err(StageError::InvalidInput("no mask to scan".into()));
        }

        let mask = &input.pixels;
        let (height, width) = mask.dim();
        let mut visited = vec![false; width * height];
        let mut candidates = Vec::new();

        for row in 0..height {
            for col in 0..width {
                let index = row * width + col;
                if visited[index] || mask[[row, col]] == 0 {
                    continue;
                }

                // flood the 8-connected component so it is measured once
                let mut stack = vec![(row, col)];
                visited[index] = true;
                while let Some((r, c)) = stack.pop() {
                    for &(dr, dc) in &NEIGHBORS {
                        let rr = r as i32 + dr;
                        let cc = c as i32 + dc;
                        if is_foreground(mask, rr, cc) {
                            let neighbor = rr as usize * width + cc as usize;
                            if !visited[neighbor] {
                                visited[neighbor] = true;
                                stack.push((rr as usize, cc as usize));
                            }
                        }
                    }
                }

                // the row-major scan guarantees (row, col) is the
                // component's topmost-leftmost pixel
                let boundary = trace_boundary(mask, (row, col));
                let points: Vec<(f32, f32)> = boundary
                    .iter()
                    .map(|&(r, c)| (c as f32, r as f32))
                    .collect();

                let area = polygon_area(&points);
                let perimeter = polygon_perimeter(&points);
                let circularity = if perimeter > 0.0 {
                    4.0 * PI * area / (perimeter * perimeter)
                } else {
                    0.0
                };
                let circle = min_enclosing_circle(&points);

                candidates.push(ContourCandidate {
                    area,
                    perimeter,
                    circularity,
                    center_x: circle.cx,
                    center_y: circle.cy,
                    radius: circle.radius,
                });
            }
        }

        self.logger.record(&format!("contours {}", candidates.len()));

        let metadata = StageMetadata {
            notes: vec![format!("contours {}", candidates.len())],
            candidates,
            ..Default::default()
        };

        Ok(StageOutput {
            pixels: input.pixels,
            metadata,
        })
    }

    fn cleanup(&mut self) {}
}

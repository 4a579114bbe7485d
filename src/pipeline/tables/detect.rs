//! Morphological table-region detection.
//!
//! The page is binarized with dark pixels as foreground, then long
//! horizontal and vertical runs are isolated (a run-length equivalent of
//! directional morphological opening with a 40x1 / 1x40 kernel). The two
//! masks are ORed into a table skeleton and connected components above a
//! minimum bounding-box area become candidate regions. A page with no
//! candidates falls back to one whole-page region.

use image::RgbImage;

use super::types::TableRegion;

/// Gray levels below this count as foreground (ink).
pub const BINARIZE_THRESHOLD: u8 = 150;
/// Minimum run of foreground pixels that counts as a ruled line.
pub const LINE_RUN_LENGTH: usize = 40;
/// Minimum bounding-box area for a candidate region.
pub const MIN_REGION_AREA: u64 = 1000;

pub fn detect_regions(image: &RgbImage) -> Vec<TableRegion> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let ink: Vec<bool> = image
        .pixels()
        .map(|p| {
            let luma =
                (0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32) as u8;
            luma < BINARIZE_THRESHOLD
        })
        .collect();

    let mut skeleton = vec![false; w * h];
    keep_horizontal_runs(&ink, w, h, &mut skeleton);
    keep_vertical_runs(&ink, w, h, &mut skeleton);

    let mut regions = connected_regions(&skeleton, w, h);
    regions.retain(|r| r.area() > MIN_REGION_AREA);
    regions.sort_by_key(|r| (r.y, r.x));

    if regions.is_empty() {
        tracing::debug!("No grid regions found, falling back to whole page");
        regions.push(TableRegion {
            x: 0,
            y: 0,
            width: w as u32,
            height: h as u32,
        });
    }
    regions
}

fn keep_horizontal_runs(ink: &[bool], w: usize, h: usize, out: &mut [bool]) {
    for y in 0..h {
        let row = y * w;
        let mut x = 0;
        while x < w {
            if !ink[row + x] {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && ink[row + x] {
                x += 1;
            }
            if x - start >= LINE_RUN_LENGTH {
                for i in start..x {
                    out[row + i] = true;
                }
            }
        }
    }
}

fn keep_vertical_runs(ink: &[bool], w: usize, h: usize, out: &mut [bool]) {
    for x in 0..w {
        let mut y = 0;
        while y < h {
            if !ink[y * w + x] {
                y += 1;
                continue;
            }
            let start = y;
            while y < h && ink[y * w + x] {
                y += 1;
            }
            if y - start >= LINE_RUN_LENGTH {
                for i in start..y {
                    out[i * w + x] = true;
                }
            }
        }
    }
}

/// 4-connected component bounding boxes over the skeleton mask.
fn connected_regions(mask: &[bool], w: usize, h: usize) -> Vec<TableRegion> {
    let mut visited = vec![false; w * h];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if !mask[start] || visited[start] {
            continue;
        }
        let (mut min_x, mut min_y) = (w, h);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        visited[start] = true;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            let mut push = |nx: usize, ny: usize, stack: &mut Vec<usize>| {
                let n = ny * w + nx;
                if mask[n] && !visited[n] {
                    visited[n] = true;
                    stack.push(n);
                }
            };
            if x > 0 {
                push(x - 1, y, &mut stack);
            }
            if x + 1 < w {
                push(x + 1, y, &mut stack);
            }
            if y > 0 {
                push(x, y - 1, &mut stack);
            }
            if y + 1 < h {
                push(x, y + 1, &mut stack);
            }
        }

        regions.push(TableRegion {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        });
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    /// Draw a rectangular grid outline on a white page.
    fn page_with_grid(x0: u32, y0: u32, gw: u32, gh: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(300, 300, WHITE);
        for x in x0..x0 + gw {
            img.put_pixel(x, y0, BLACK);
            img.put_pixel(x, y0 + gh - 1, BLACK);
        }
        for y in y0..y0 + gh {
            img.put_pixel(x0, y, BLACK);
            img.put_pixel(x0 + gw - 1, y, BLACK);
        }
        img
    }

    #[test]
    fn grid_outline_becomes_one_region() {
        let img = page_with_grid(50, 40, 120, 80);
        let regions = detect_regions(&img);

        assert_eq!(regions.len(), 1);
        let r = regions[0];
        assert_eq!((r.x, r.y), (50, 40));
        assert_eq!((r.width, r.height), (120, 80));
    }

    #[test]
    fn blank_page_falls_back_to_whole_page() {
        let img = RgbImage::from_pixel(200, 150, WHITE);
        let regions = detect_regions(&img);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].width, 200);
        assert_eq!(regions[0].height, 150);
    }

    #[test]
    fn short_strokes_do_not_form_regions() {
        // Strokes shorter than the run threshold are opened away.
        let mut img = RgbImage::from_pixel(200, 200, WHITE);
        for x in 20..50 {
            img.put_pixel(x, 100, BLACK);
        }
        for y in 20..50 {
            img.put_pixel(100, y, BLACK);
        }
        let regions = detect_regions(&img);

        // Whole-page fallback, not two tiny line regions.
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].x, 0);
        assert_eq!(regions[0].width, 200);
    }

    #[test]
    fn two_separate_grids_yield_two_regions() {
        let mut img = page_with_grid(10, 10, 100, 60);
        let second = page_with_grid(150, 180, 100, 60);
        for (x, y, p) in second.enumerate_pixels() {
            if p[0] == 0 {
                img.put_pixel(x, y, BLACK);
            }
        }
        let regions = detect_regions(&img);

        assert_eq!(regions.len(), 2);
        assert!(regions[0].y < regions[1].y);
    }
}

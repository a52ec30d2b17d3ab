use crate::types::{LayoutRect, Rect};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// ASCII preview of one sheet, scaled to fit an 80x40 character box.
pub fn render_sheet(stock: Rect, rects: &[LayoutRect]) -> String {
    let scale = f64::min(MAX_WIDTH / stock.w, MAX_HEIGHT / stock.h);
    let grid_w = (stock.w * scale).round() as usize;
    let grid_h = (stock.h * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    for r in rects {
        let sx = (r.x * scale).round() as usize;
        let sy = (r.y * scale).round() as usize;
        let sw = (r.width * scale).round() as usize;
        let sh = (r.height * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sy, sw, sh);

        let label_chars: Vec<char> = r.label.chars().collect();
        if sw > 2 && sh > 0 {
            let cx = sx + sw / 2;
            let cy = sy + sh / 2;
            let half = label_chars.len() / 2;
            let start_x = cx.saturating_sub(half);

            for (i, &ch) in label_chars.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw && cy > sy && cy < sy + sh {
                    grid[cy][x] = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            if y < rows {
                grid[y][i] = if grid[y][i] == '|' || grid[y][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
            if y + h < rows {
                grid[y + h][i] = if grid[y + h][i] == '|' || grid[y + h][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
        }
    }

    // Vertical edges
    for j in y..=y + h {
        if j < rows {
            if x < cols {
                grid[j][x] = if grid[j][x] == '-' || grid[j][x] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
            if x + w < cols {
                grid[j][x + w] = if grid[j][x + w] == '-' || grid[j][x + w] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
        }
    }

    // Corners
    for &cx in &[x, x + w] {
        for &cy in &[y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(x: f64, y: f64, width: f64, height: f64, label: &str) -> LayoutRect {
        LayoutRect {
            x,
            y,
            width,
            height,
            rotated: false,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_render_single_piece() {
        let stock = Rect::new(96.0, 48.0);
        let output = render_sheet(stock, &[layout(0.0, 0.0, 96.0, 48.0, "96 x 48")]);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        assert!(output.contains("96 x 48"));
    }

    #[test]
    fn test_render_two_pieces() {
        let stock = Rect::new(48.0, 96.0);
        let rects = vec![
            layout(0.0, 0.0, 24.0, 96.0, "24 x 96"),
            layout(24.0, 0.0, 24.0, 96.0, "24 x 96"),
        ];
        let output = render_sheet(stock, &rects);
        assert_eq!(output.lines().count(), 41);
        assert!(output.contains("24 x 96"));
    }

    #[test]
    fn test_render_empty() {
        let output = render_sheet(Rect::new(48.0, 96.0), &[]);
        // Still draws the stock border
        assert!(output.contains('+'));
    }
}

use crate::types::{EPSILON, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeRect {
    pub x: f64,
    pub y: f64,
    pub rect: Rect,
}

impl FreeRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            rect: Rect::new(w, h),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.rect.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.rect.h
    }

    /// Overlap deeper than `EPSILON` on both axes. Shared edges and contact
    /// within rounding error do not count, matching the split guards.
    pub fn intersects(&self, other: &FreeRect) -> bool {
        self.x < other.right() - EPSILON
            && other.x < self.right() - EPSILON
            && self.y < other.bottom() - EPSILON
            && other.y < self.bottom() - EPSILON
    }

    pub fn contained_in(&self, other: &FreeRect) -> bool {
        self.x >= other.x - EPSILON
            && self.y >= other.y - EPSILON
            && self.right() <= other.right() + EPSILON
            && self.bottom() <= other.bottom() + EPSILON
    }
}

/// Empty regions of one sheet, kept in insertion order.
#[derive(Debug, Clone)]
pub struct FreeRectangleSet {
    rects: Vec<FreeRect>,
}

impl FreeRectangleSet {
    /// A fresh sheet: one free rectangle covering everything.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            rects: vec![FreeRect::new(0.0, 0.0, width, height)],
        }
    }

    pub fn from_rects(rects: Vec<FreeRect>) -> Self {
        Self { rects }
    }

    pub fn rects(&self) -> &[FreeRect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Indices of every free rectangle that can hold a `w` x `h` footprint.
    pub fn query(&self, w: f64, h: f64) -> Vec<usize> {
        let footprint = Rect::new(w, h);
        self.rects
            .iter()
            .enumerate()
            .filter(|(_, free)| footprint.fits_in(&free.rect))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Removes `region` from every free rectangle it overlaps, then prunes.
    pub fn consume(&mut self, region: &FreeRect) {
        let mut next = Vec::with_capacity(self.rects.len() + 4);
        for free in &self.rects {
            if free.intersects(region) {
                Self::split(free, region, &mut next);
            } else {
                next.push(*free);
            }
        }
        self.rects = next;
        self.prune();
    }

    fn split(free: &FreeRect, region: &FreeRect, out: &mut Vec<FreeRect>) {
        // Above
        if region.y > free.y + EPSILON && region.y < free.bottom() - EPSILON {
            out.push(FreeRect::new(free.x, free.y, free.rect.w, region.y - free.y));
        }
        // Below
        if region.bottom() > free.y + EPSILON && region.bottom() < free.bottom() - EPSILON {
            out.push(FreeRect::new(
                free.x,
                region.bottom(),
                free.rect.w,
                free.bottom() - region.bottom(),
            ));
        }

        let top = free.y.max(region.y);
        let bottom = free.bottom().min(region.bottom());
        if bottom - top <= EPSILON {
            return;
        }
        // Left
        if region.x > free.x + EPSILON && region.x < free.right() - EPSILON {
            out.push(FreeRect::new(free.x, top, region.x - free.x, bottom - top));
        }
        // Right
        if region.right() > free.x + EPSILON && region.right() < free.right() - EPSILON {
            out.push(FreeRect::new(
                region.right(),
                top,
                free.right() - region.right(),
                bottom - top,
            ));
        }
    }

    /// Drops every rectangle contained in another; the earlier of two
    /// identical rectangles survives.
    pub fn prune(&mut self) {
        let mut i = 0;
        while i < self.rects.len() {
            let mut removed = false;
            let mut j = i + 1;
            while j < self.rects.len() {
                if self.rects[j].contained_in(&self.rects[i]) {
                    self.rects.remove(j);
                } else if self.rects[i].contained_in(&self.rects[j]) {
                    self.rects.remove(i);
                    removed = true;
                    break;
                } else {
                    j += 1;
                }
            }
            if !removed {
                i += 1;
            }
        }
    }
}

//! Row-major 2D grid shared by noise samples, height maps, and biome maps.

use std::ops::{Index, IndexMut};

/// A dense 2D grid indexed by `(x, y)`, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns `true` if `(x, y)` lies inside the grid.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if self.contains(x, y) {
            Some(&self.cells[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    /// Returns the cell at `(x, y)` mutably, or `None` outside the grid.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if self.contains(x, y) {
            Some(&mut self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// All cells in row-major order, mutably.
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Map every cell into a new grid of the same dimensions.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }

    /// Iterate `(x, y, &cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i % width, i / width, cell))
    }

    /// Iterate the square window of `radius` cells around `(cx, cy)`, clipped
    /// to the grid. Yields `(x, y, dx, dy)` where `(dx, dy)` is the offset
    /// from the center.
    pub fn window(
        &self,
        cx: usize,
        cy: usize,
        radius: u32,
    ) -> impl Iterator<Item = (usize, usize, i64, i64)> + use<T> {
        let r = i64::from(radius);
        let (width, height) = (self.width as i64, self.height as i64);
        let (cx, cy) = (cx as i64, cy as i64);
        (-r..=r).flat_map(move |dy| {
            (-r..=r).filter_map(move |dx| {
                let (x, y) = (cx + dx, cy + dy);
                (x >= 0 && x < width && y >= 0 && y < height)
                    .then_some((x as usize, y as usize, dx, dy))
            })
        })
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(
            self.contains(x, y),
            "grid index ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        &self.cells[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(
            self.contains(x, y),
            "grid index ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        &mut self.cells[y * self.width + x]
    }
}

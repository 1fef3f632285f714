//! Fixed-capacity open-addressed spatial hash grid (§4.5).
//!
//! Used for photon merging and reservoir spatial reuse. The grid is built
//! in three phases per frame — `insert`, `compute_indices`, `swizzle` — so
//! the GPU-side scatter into sorted buckets can run as a prefix sum
//! followed by a single scatter pass; `query` is read-only and safe to
//! call from many threads once the grid is built.

use glam::Vec3;
use xxhash_rust::xxh3::xxh3_64;

/// A cell coordinate, quantized from a world position by `cell_size`.
pub type CellCoord = (i32, i32, i32);

fn quantize(position: Vec3, cell_size: f32) -> CellCoord {
    (
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
        (position.z / cell_size).floor() as i32,
    )
}

fn hash_cell(cell: CellCoord) -> u64 {
    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&cell.0.to_le_bytes());
    bytes[4..8].copy_from_slice(&cell.1.to_le_bytes());
    bytes[8..12].copy_from_slice(&cell.2.to_le_bytes());
    xxh3_64(&bytes)
}

/// Derive `(bucket_hash, checksum)` from a cell coordinate: the bucket
/// index is the low hash bits modulo `cell_count`, the checksum is a
/// disjoint set of high bits, so a bucket collision (two distinct cells
/// hashing to the same bucket) is detected by checksum mismatch at query
/// time rather than silently aliased.
#[must_use]
pub fn cell_hash_and_checksum(cell: CellCoord, cell_count: u32) -> (u32, u32) {
    let h = hash_cell(cell);
    let bucket = (h % u64::from(cell_count)) as u32;
    let checksum = ((h >> 32) as u32) | 1; // never zero; zero marks an empty bucket.
    (bucket, checksum)
}

/// Per-camera distance scale so cell size tracks projected pixel
/// footprint: `distance_scale = tan(cell_pixel_radius * vertical_fov * 0.5)`
/// (radians), floored by `min_cell_size`.
#[must_use]
pub fn distance_scale(cell_pixel_radius: f32, vertical_fov: f32, image_height: f32) -> f32 {
    2.0 * (cell_pixel_radius / image_height * vertical_fov * 0.5).tan()
}

/// Cell size at a given distance from the camera, respecting the floor.
#[must_use]
pub fn cell_size_at(distance: f32, scale: f32, min_cell_size: f32) -> f32 {
    (distance * scale).max(min_cell_size)
}

#[derive(Clone, Copy, Debug, Default)]
struct Bucket {
    checksum: u32,
    cell_counter: u32,
    first_index: u32,
}

/// Insert/build/query statistics, surfaced to the host for diagnostics —
/// the GUI panel that originally displayed these is out of scope here.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashGridStats {
    pub failed_inserts: u32,
    pub buckets_used: u32,
}

/// A fixed-capacity spatial hash grid over `(CellCoord, T)` pairs.
pub struct HashGrid<T> {
    buckets: Vec<Bucket>,
    append_cells: Vec<CellCoord>,
    append_data: Vec<T>,
    data: Vec<Option<T>>,
    cell_count: u32,
    stats: HashGridStats,
}

impl<T: Clone> HashGrid<T> {
    /// Create an empty grid with `cell_count` buckets.
    #[must_use]
    pub fn new(cell_count: u32) -> Self {
        Self {
            buckets: vec![Bucket::default(); cell_count as usize],
            append_cells: Vec::new(),
            append_data: Vec::new(),
            data: Vec::new(),
            cell_count,
            stats: HashGridStats::default(),
        }
    }

    /// Clear all insertions, ready for the next frame's build.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = Bucket::default();
        }
        self.append_cells.clear();
        self.append_data.clear();
        self.data.clear();
        self.stats = HashGridStats::default();
    }

    /// Insert `value` at `cell`. Linearly probes from the cell's home
    /// bucket, claiming the first bucket whose checksum is unset (CAS in
    /// the GPU kernel; a simple compare-and-set here since this path is
    /// single-threaded on the host) or already matches this cell's
    /// checksum. Returns `false` (and increments the failed-insert
    /// counter) if the whole table is full.
    pub fn insert(&mut self, cell: CellCoord, value: T) -> bool {
        let (home, checksum) = cell_hash_and_checksum(cell, self.cell_count);
        for probe in 0..self.cell_count {
            let idx = ((home + probe) % self.cell_count) as usize;
            let bucket = &mut self.buckets[idx];
            if bucket.checksum == 0 {
                bucket.checksum = checksum;
                self.stats.buckets_used += 1;
            }
            if bucket.checksum == checksum {
                let append_index = self.append_data.len() as u32;
                bucket.cell_counter += 1;
                self.append_cells.push(cell);
                self.append_data.push(value);
                let _ = append_index;
                return true;
            }
        }
        self.stats.failed_inserts += 1;
        log::warn!(
            "hash grid insert failed for cell {cell:?}: table full at {} buckets, dropping entry",
            self.cell_count
        );
        false
    }

    /// Phase 2: prefix-sum `cell_counter` across buckets to assign each
    /// bucket a `first_index` into the final sorted `data` array.
    pub fn compute_indices(&mut self) {
        let mut running = 0u32;
        for bucket in &mut self.buckets {
            bucket.first_index = running;
            running += bucket.cell_counter;
        }
        self.data = vec![None; running as usize];
    }

    /// Phase 3: scatter every appended element into its bucket's sorted
    /// range. Must run after [`Self::compute_indices`].
    pub fn swizzle(&mut self) {
        let mut write_cursor = vec![0u32; self.buckets.len()];
        for (cell, value) in self.append_cells.drain(..).zip(self.append_data.drain(..)) {
            let (home, checksum) = cell_hash_and_checksum(cell, self.cell_count);
            for probe in 0..self.cell_count {
                let idx = ((home + probe) % self.cell_count) as usize;
                if self.buckets[idx].checksum == checksum {
                    let slot = self.buckets[idx].first_index + write_cursor[idx];
                    write_cursor[idx] += 1;
                    self.data[slot as usize] = Some(value);
                    break;
                }
            }
        }
    }

    /// Query all values stored in `cell`. Returns an empty slice if the
    /// cell was never inserted into (including a collision that caused
    /// the insert to land in, or be evicted from, a different bucket —
    /// checksum mismatch means "not this cell").
    #[must_use]
    pub fn query(&self, cell: CellCoord) -> Vec<&T> {
        let (home, checksum) = cell_hash_and_checksum(cell, self.cell_count);
        for probe in 0..self.cell_count {
            let idx = ((home + probe) % self.cell_count) as usize;
            let bucket = &self.buckets[idx];
            if bucket.checksum == 0 {
                return Vec::new();
            }
            if bucket.checksum == checksum {
                let range = bucket.first_index as usize
                    ..(bucket.first_index + bucket.cell_counter) as usize;
                return self.data[range].iter().filter_map(Option::as_ref).collect();
            }
        }
        Vec::new()
    }

    /// Query `cell` plus up to 8 neighbouring cells with a pseudo-random
    /// jitter offset, hiding grid-aligned bias in photon merging and
    /// reservoir reuse (`HashGridJitter`).
    #[must_use]
    pub fn query_jittered(&self, cell: CellCoord, jitter_seed: u32) -> Vec<&T> {
        let offsets: [(i32, i32, i32); 9] = [
            (0, 0, 0),
            (1, 0, 0),
            (-1, 0, 0),
            (0, 1, 0),
            (0, -1, 0),
            (0, 0, 1),
            (0, 0, -1),
            (1, 1, 0),
            (-1, -1, 0),
        ];
        let pick = (jitter_seed as usize) % offsets.len();
        let (dx, dy, dz) = offsets[pick];
        self.query((cell.0 + dx, cell.1 + dy, cell.2 + dz))
    }

    /// Current insert/build statistics.
    #[must_use]
    pub fn stats(&self) -> HashGridStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_appended_pair_is_found_after_build() {
        let mut grid: HashGrid<u32> = HashGrid::new(64);
        let cells: Vec<CellCoord> = (0..40).map(|i| (i, i * 2, -i)).collect();
        for (i, &cell) in cells.iter().enumerate() {
            assert!(grid.insert(cell, i as u32));
        }
        grid.compute_indices();
        grid.swizzle();
        for (i, &cell) in cells.iter().enumerate() {
            let found = grid.query(cell);
            assert!(found.contains(&&(i as u32)), "missing cell {cell:?}");
        }
    }

    #[test]
    fn overflow_increments_failed_insert_counter_exactly() {
        let cell_count = 16;
        let mut grid: HashGrid<u32> = HashGrid::new(cell_count);
        let mut failed = 0u32;
        for i in 0..(cell_count * 2) {
            let cell = (i as i32, 0, 0);
            if !grid.insert(cell, i) {
                failed += 1;
            }
        }
        assert_eq!(grid.stats().failed_inserts, failed);
    }

    #[test]
    fn empty_cell_returns_no_results() {
        let mut grid: HashGrid<u32> = HashGrid::new(32);
        grid.insert((0, 0, 0), 1);
        grid.compute_indices();
        grid.swizzle();
        assert!(grid.query((999, 999, 999)).is_empty());
    }

    #[test]
    fn distance_scale_grows_cell_size_with_distance() {
        let scale = distance_scale(2.0, 1.0_f32.to_radians() * 60.0, 1080.0);
        let near = cell_size_at(1.0, scale, 0.001);
        let far = cell_size_at(100.0, scale, 0.001);
        assert!(far > near);
    }
}

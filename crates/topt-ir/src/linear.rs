//! Reversible linear maps over GF(2).
//!
//! A [`LinearMap`] describes the action of a CNOT/SWAP network on
//! computational basis states: the output bit vector is `M · x` where `x` is
//! the input bit vector. Row `i` of `M` is the parity of input wires carried by
//! output wire `i`.
//!
//! CNOT synthesis uses the Patel–Markov–Hayes section-wise elimination
//! ("Optimal synthesis of linear reversible circuits", QIC 8.3, 2008).

use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut2, Axis, concatenate, s};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// An invertible square boolean matrix.
///
/// Deserialization goes through [`LinearMap::from_matrix`], so a singular or
/// non-square matrix is rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Array2<bool>", into = "Array2<bool>")]
pub struct LinearMap {
    matrix: Array2<bool>,
}

impl LinearMap {
    /// The identity map on `n` wires.
    pub fn identity(n: usize) -> Self {
        Self {
            matrix: Array2::from_shape_fn((n, n), |(i, j)| i == j),
        }
    }

    /// Wrap a matrix, rejecting non-square or singular input.
    pub fn from_matrix(matrix: Array2<bool>) -> IrResult<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(IrError::DimensionMismatch {
                expected: matrix.nrows(),
                got: matrix.ncols(),
            });
        }
        if compute_rank(matrix.view()) != matrix.nrows() {
            return Err(IrError::SingularLinearMap(matrix.nrows()));
        }
        Ok(Self { matrix })
    }

    /// Build from rows, where row `i` is the parity carried by output wire `i`.
    pub fn from_rows(rows: &[Vec<bool>]) -> IrResult<Self> {
        let n = rows.len();
        let mut matrix = Array2::from_elem((n, n), false);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(IrError::DimensionMismatch {
                    expected: n,
                    got: row.len(),
                });
            }
            for (j, &bit) in row.iter().enumerate() {
                matrix[[i, j]] = bit;
            }
        }
        Self::from_matrix(matrix)
    }

    /// Number of wires.
    #[inline]
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    /// Borrow the underlying matrix.
    pub fn matrix(&self) -> ArrayView2<'_, bool> {
        self.matrix.view()
    }

    /// Row `i` as an owned parity vector.
    pub fn row(&self, i: usize) -> Vec<bool> {
        self.matrix.row(i).to_vec()
    }

    /// Whether this is the identity map.
    pub fn is_identity(&self) -> bool {
        self.matrix
            .indexed_iter()
            .all(|((i, j), &bit)| bit == (i == j))
    }

    /// Apply the map to a bit vector.
    pub fn apply(&self, input: &[bool]) -> IrResult<Vec<bool>> {
        if input.len() != self.size() {
            return Err(IrError::DimensionMismatch {
                expected: self.size(),
                got: input.len(),
            });
        }
        Ok(self
            .matrix
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .zip(input)
                    .fold(false, |acc, (&m, &x)| acc ^ (m & x))
            })
            .collect())
    }

    /// Matrix product `self · other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &LinearMap) -> IrResult<LinearMap> {
        Ok(Self {
            matrix: binary_matmul(self.matrix.view(), other.matrix.view())?,
        })
    }

    /// The transposed map.
    pub fn transpose(&self) -> LinearMap {
        Self {
            matrix: self.matrix.t().to_owned(),
        }
    }

    /// The inverse map.
    pub fn inverse(&self) -> IrResult<LinearMap> {
        let n = self.size();
        let identity: Array2<bool> = Array2::from_shape_fn((n, n), |(i, j)| i == j);
        let mut augmented = concatenate(Axis(1), &[self.matrix.view(), identity.view()])
            .map_err(|_| IrError::DimensionMismatch {
                expected: n,
                got: self.matrix.ncols(),
            })?;

        gauss_elimination(augmented.view_mut(), Some(n), true);

        if compute_rank_after_elimination(augmented.slice(s![.., 0..n])) < n {
            return Err(IrError::SingularLinearMap(n));
        }
        Ok(Self {
            matrix: augmented.slice(s![.., n..2 * n]).to_owned(),
        })
    }

    /// Synthesise a CNOT network realising this map.
    ///
    /// Returns `(control, target)` pairs in application order.
    pub fn synthesise_cnots(&self, section_size: usize) -> Vec<(usize, usize)> {
        let section_size = section_size.max(1);
        let mut work = self.matrix.clone();
        let lower = lower_cnot_synth(work.view_mut(), section_size, false);
        let upper = lower_cnot_synth(work.view_mut(), section_size, true);

        upper
            .into_iter()
            .map(|(i, j)| (j, i))
            .chain(lower.into_iter().rev())
            .collect()
    }
}

impl TryFrom<Array2<bool>> for LinearMap {
    type Error = IrError;

    fn try_from(matrix: Array2<bool>) -> IrResult<Self> {
        Self::from_matrix(matrix)
    }
}

impl From<LinearMap> for Array2<bool> {
    fn from(map: LinearMap) -> Self {
        map.matrix
    }
}

/// Render a parity vector as a bit string, wire 0 first.
pub fn parity_string(parity: &[bool]) -> String {
    parity.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn binary_matmul(a: ArrayView2<bool>, b: ArrayView2<bool>) -> IrResult<Array2<bool>> {
    if a.ncols() != b.nrows() {
        return Err(IrError::DimensionMismatch {
            expected: a.ncols(),
            got: b.nrows(),
        });
    }
    Ok(Array2::from_shape_fn((a.nrows(), b.ncols()), |(i, j)| {
        (0..b.nrows())
            .map(|k| a[[i, k]] & b[[k, j]])
            .fold(false, |acc, v| acc ^ v)
    }))
}

/// Row-reduce `mat` in place over its first `ncols` columns.
fn gauss_elimination(mut mat: ArrayViewMut2<bool>, ncols: Option<usize>, full_elim: bool) {
    let m = mat.nrows();
    let n = ncols.map_or(mat.ncols(), |c| c.min(mat.ncols()));

    let mut rank = 0;
    let mut col = 0;
    while rank < m && col < n {
        let Some(pivot) = (rank..m).find(|&i| mat[[i, col]]) else {
            col += 1;
            continue;
        };
        if pivot != rank {
            let (mut a, mut b) = mat.multi_slice_mut((s![rank, ..], s![pivot, ..]));
            ndarray::Zip::from(&mut a)
                .and(&mut b)
                .for_each(std::mem::swap);
        }

        let pivot_row = mat.row(rank).to_owned();
        for (i, mut row) in mat.axis_iter_mut(Axis(0)).enumerate() {
            if i != rank && row[col] && (full_elim || i > rank) {
                row.zip_mut_with(&pivot_row, |x, &y| *x ^= y);
            }
        }
        rank += 1;
        col += 1;
    }
}

fn compute_rank_after_elimination(mat: ArrayView2<bool>) -> usize {
    mat.axis_iter(Axis(0))
        .filter(|row| row.iter().any(|&b| b))
        .count()
}

fn compute_rank(mat: ArrayView2<bool>) -> usize {
    let mut work = mat.to_owned();
    gauss_elimination(work.view_mut(), None, false);
    compute_rank_after_elimination(work.view())
}

/// Add the `ctrl` row (or column) into the `trgt` row (or column).
fn add_row_or_col(mut mat: ArrayViewMut2<bool>, add_cols: bool, ctrl: usize, trgt: usize) {
    let info = if add_cols {
        (s![.., ctrl], s![.., trgt])
    } else {
        (s![ctrl, ..], s![trgt, ..])
    };
    let (src, mut dst) = mat.multi_slice_mut(info);
    dst.zip_mut_with(&src, |x, &y| *x ^= y);
}

fn index(transpose: bool, i: usize, j: usize) -> [usize; 2] {
    if transpose { [j, i] } else { [i, j] }
}

/// Eliminate the lower triangle of `matrix`, recording row operations.
///
/// With `transpose` set, columns play the role of rows so the same routine
/// clears the upper triangle.
fn lower_cnot_synth(
    mut matrix: ArrayViewMut2<bool>,
    section_size: usize,
    transpose: bool,
) -> Vec<(usize, usize)> {
    let mut ops: Vec<(usize, usize)> = Vec::new();
    let cutoff = 1;
    let row_axis = if transpose { Axis(1) } else { Axis(0) };

    let n = matrix.nrows();
    let num_sections = n.div_ceil(section_size);

    for section in 0..num_sections {
        let start = section * section_size;
        let end = (start + section_size).min(n);

        // Clear sub-rows that repeat a pattern already seen in this section.
        let mut patterns: FxHashMap<Array1<bool>, usize> = FxHashMap::default();
        for row_idx in start..n {
            let pattern: Array1<bool> = matrix
                .index_axis(row_axis, row_idx)
                .slice(s![start..end])
                .to_owned();
            if !pattern.iter().any(|&b| b) {
                continue;
            }
            if let Some(&seen) = patterns.get(&pattern) {
                ops.push((seen, row_idx));
                add_row_or_col(matrix.view_mut(), transpose, seen, row_idx);
            } else {
                patterns.insert(pattern, row_idx);
            }
        }

        for col_idx in start..end {
            let mut diag = matrix[[col_idx, col_idx]];
            for r in col_idx + 1..n {
                if matrix[index(transpose, r, col_idx)] {
                    if !diag {
                        add_row_or_col(matrix.view_mut(), transpose, r, col_idx);
                        ops.push((r, col_idx));
                        diag = true;
                    }
                    add_row_or_col(matrix.view_mut(), transpose, col_idx, r);
                    ops.push((col_idx, r));
                }

                // Back-reduce heavily overlapping rows into the pivot.
                let overlap = matrix
                    .index_axis(row_axis, col_idx)
                    .iter()
                    .zip(matrix.index_axis(row_axis, r).iter())
                    .filter(|&(&a, &b)| a & b)
                    .count();
                if overlap > cutoff {
                    add_row_or_col(matrix.view_mut(), transpose, r, col_idx);
                    ops.push((r, col_idx));
                }
            }
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a CNOT list on the rows of the identity, tracking wire parities.
    fn simulate(n: usize, cnots: &[(usize, usize)]) -> Array2<bool> {
        let mut rows = Array2::from_shape_fn((n, n), |(i, j)| i == j);
        for &(c, t) in cnots {
            add_row_or_col(rows.view_mut(), false, c, t);
        }
        rows
    }

    fn map(rows: &[&[u8]]) -> LinearMap {
        let rows: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.iter().map(|&b| b == 1).collect())
            .collect();
        LinearMap::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_identity() {
        let id = LinearMap::identity(3);
        assert!(id.is_identity());
        assert!(id.synthesise_cnots(2).is_empty());
        assert_eq!(id.apply(&[true, false, true]).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_singular_rejected() {
        let rows = vec![vec![true, true], vec![true, true]];
        assert!(matches!(
            LinearMap::from_rows(&rows),
            Err(IrError::SingularLinearMap(2))
        ));
    }

    #[test]
    fn test_non_square_rejected() {
        let rows = vec![vec![true, false, false], vec![false, true, false]];
        assert!(LinearMap::from_rows(&rows).is_err());
    }

    #[test]
    fn test_deserialize_validates_matrix() {
        let json = serde_json::to_string(&LinearMap::identity(2)).unwrap();
        let back: LinearMap = serde_json::from_str(&json).unwrap();
        assert!(back.is_identity());

        let singular = r#"{"v":1,"dim":[2,2],"data":[true,true,true,true]}"#;
        let err = serde_json::from_str::<LinearMap>(singular).unwrap_err();
        assert!(err.to_string().contains("singular"), "{err}");

        let wide = r#"{"v":1,"dim":[2,3],"data":[true,false,false,false,true,false]}"#;
        let err = serde_json::from_str::<LinearMap>(wide).unwrap_err();
        assert!(err.to_string().contains("Dimension mismatch"), "{err}");
    }

    #[test]
    fn test_single_cnot_lower_and_upper() {
        let lower = map(&[&[1, 0], &[1, 1]]);
        assert_eq!(lower.synthesise_cnots(2), vec![(0, 1)]);

        let upper = map(&[&[1, 1], &[0, 1]]);
        assert_eq!(upper.synthesise_cnots(2), vec![(1, 0)]);
    }

    #[test]
    fn test_synthesis_realises_map() {
        let m = map(&[
            &[1, 1, 0, 1],
            &[0, 1, 1, 0],
            &[1, 0, 0, 1],
            &[0, 0, 1, 1],
        ]);
        for section in 1..=4 {
            let cnots = m.synthesise_cnots(section);
            assert_eq!(simulate(4, &cnots), m.matrix, "section size {section}");
        }
    }

    #[test]
    fn test_swap_permutation() {
        let m = map(&[&[0, 1, 0], &[0, 0, 1], &[1, 0, 0]]);
        let cnots = m.synthesise_cnots(2);
        assert_eq!(simulate(3, &cnots), m.matrix);
    }

    #[test]
    fn test_inverse_and_compose() {
        let m = map(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 1]]);
        let inv = m.inverse().unwrap();
        assert!(m.compose(&inv).unwrap().is_identity());
        assert!(inv.compose(&m).unwrap().is_identity());
    }

    #[test]
    fn test_apply_matches_rows() {
        let m = map(&[&[1, 1], &[0, 1]]);
        assert_eq!(m.apply(&[true, true]).unwrap(), vec![false, true]);
        assert_eq!(m.apply(&[false, true]).unwrap(), vec![true, true]);
        assert_eq!(parity_string(&m.row(0)), "11");
    }
}

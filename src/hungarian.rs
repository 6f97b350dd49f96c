use arrayvec::ArrayVec;

use crate::level::MAX_BOXES;

/// Square cost matrix stored inline, row-major.
pub struct CostMatrix {
    costs: ArrayVec<u16, { MAX_BOXES * MAX_BOXES }>,
    size: usize,
}

impl CostMatrix {
    /// Build an `n`×`n` matrix where entry `(row, col)` is `cost(row, col)`.
    pub fn from_fn(n: usize, mut cost: impl FnMut(usize, usize) -> u16) -> Self {
        assert!(n <= MAX_BOXES, "cost matrix larger than {}", MAX_BOXES);
        let mut costs = ArrayVec::new();
        for row in 0..n {
            for col in 0..n {
                costs.push(cost(row, col));
            }
        }
        CostMatrix { costs, size: n }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> u16 {
        debug_assert!(row < self.size && col < self.size);
        self.costs[row * self.size + col]
    }
}

// Reference: Andrey Lopatin (https://cp-algorithms.com/graph/hungarian-algorithm.html).
/// Cost of the cheapest perfect assignment of rows to columns, in O(n³).
pub fn min_cost_assignment(matrix: &CostMatrix) -> usize {
    const INF: i32 = i32::MAX / 2;

    let n = matrix.size();

    // Potentials and matching, 1-indexed with a dummy column 0
    let mut row_pot = buffer::<i32>(n, 0);
    let mut col_pot = buffer::<i32>(n, 0);
    let mut col_match = buffer::<usize>(n, 0);
    let mut prev_col = buffer::<usize>(n, 0);

    for row in 1..=n {
        col_match[0] = row;
        let mut col0 = 0;
        let mut min_slack = buffer::<i32>(n, INF);
        let mut visited = buffer::<bool>(n, false);

        loop {
            visited[col0] = true;
            let row0 = col_match[col0];
            let mut delta = INF;
            let mut col1 = 0;

            for col in 1..=n {
                if visited[col] {
                    continue;
                }
                let slack = matrix.get(row0 - 1, col - 1) as i32 - row_pot[row0] - col_pot[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    prev_col[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            for col in 0..=n {
                if visited[col] {
                    row_pot[col_match[col]] += delta;
                    col_pot[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if col_match[col0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        while col0 != 0 {
            let col1 = prev_col[col0];
            col_match[col0] = col_match[col1];
            col0 = col1;
        }
    }

    (1..=n)
        .map(|col| matrix.get(col_match[col] - 1, col - 1) as usize)
        .sum()
}

fn buffer<T: Copy>(n: usize, initial: T) -> ArrayVec<T, { MAX_BOXES + 1 }> {
    (0..=n).map(|_| initial).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[u16]]) -> CostMatrix {
        CostMatrix::from_fn(rows.len(), |row, col| rows[row][col])
    }

    #[test]
    fn test_min_cost_assignment() {
        let m = matrix(&[&[8, 4, 7], &[5, 2, 3], &[9, 4, 8]]);
        assert_eq!(min_cost_assignment(&m), 15);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(min_cost_assignment(&matrix(&[])), 0);
        assert_eq!(min_cost_assignment(&matrix(&[&[7]])), 7);
    }

    #[test]
    fn test_prefers_off_diagonal() {
        let m = matrix(&[&[10, 1], &[1, 10]]);
        assert_eq!(min_cost_assignment(&m), 2);
    }

    #[test]
    fn test_full_size() {
        // Column `(row + 1) % n` is free for each row, everything else costs 5
        let n = MAX_BOXES;
        let m = CostMatrix::from_fn(n, |row, col| if col == (row + 1) % n { 0 } else { 5 });
        assert_eq!(min_cost_assignment(&m), 0);
    }
}

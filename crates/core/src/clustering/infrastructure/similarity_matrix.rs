use ndarray::Array2;

use crate::clustering::infrastructure::math::cosine_similarity;

/// Pairwise cosine similarity of feature vectors, with a zero diagonal.
///
/// Rows are fanned out to `workers` scoped threads over a bounded channel.
/// Each row's values are written back by index, so the matrix is the same
/// for any worker count or scheduling.
pub fn similarity_matrix(vectors: &[Vec<f64>], workers: usize) -> Array2<f64> {
    let n = vectors.len();
    let mut matrix = Array2::<f64>::zeros((n, n));
    if n < 2 {
        return matrix;
    }

    let workers = workers.clamp(1, n);
    if workers == 1 {
        for i in 0..n {
            write_row(&mut matrix, i, &upper_row(vectors, i));
        }
        return matrix;
    }

    let (row_tx, row_rx) = crossbeam_channel::bounded::<usize>(workers * 2);
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Vec<f64>)>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let row_rx = row_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for i in row_rx {
                    if result_tx.send((i, upper_row(vectors, i))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(row_rx);
        drop(result_tx);

        for i in 0..n {
            if row_tx.send(i).is_err() {
                break;
            }
        }
        drop(row_tx);
    });

    for (i, row) in result_rx {
        write_row(&mut matrix, i, &row);
    }
    matrix
}

/// Similarities of row `i` against every `j > i`.
fn upper_row(vectors: &[Vec<f64>], i: usize) -> Vec<f64> {
    vectors[i + 1..]
        .iter()
        .map(|other| cosine_similarity(&vectors[i], other))
        .collect()
}

fn write_row(matrix: &mut Array2<f64>, i: usize, row: &[f64]) {
    for (offset, &value) in row.iter().enumerate() {
        let j = i + 1 + offset;
        matrix[[i, j]] = value;
        matrix[[j, i]] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn sample_vectors() -> Vec<Vec<f64>> {
        vec![
            vec![30.0, 40.0, 10.0, 20.0],
            vec![31.0, 39.0, 12.0, 19.0],
            vec![5.0, 80.0, 300.0, 2.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![60.0, 80.0, 20.0, 40.0],
        ]
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(similarity_matrix(&[], 4).shape(), &[0, 0]);
    }

    #[test]
    fn test_single_vector_has_zero_self_similarity() {
        let m = similarity_matrix(&[vec![1.0, 2.0, 3.0, 4.0]], 1);
        assert_eq!(m[[0, 0]], 0.0);
    }

    #[test]
    fn test_matrix_is_symmetric_with_zero_diagonal() {
        let m = similarity_matrix(&sample_vectors(), 1);
        for i in 0..5 {
            assert_eq!(m[[i, i]], 0.0);
            for j in 0..5 {
                assert_eq!(m[[i, j]], m[[j, i]]);
            }
        }
    }

    #[test]
    fn test_scaled_vectors_are_fully_similar() {
        let m = similarity_matrix(&sample_vectors(), 1);
        assert_relative_eq!(m[[0, 4]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_vector_row_is_zero() {
        let m = similarity_matrix(&sample_vectors(), 1);
        for j in 0..5 {
            assert_eq!(m[[3, j]], 0.0);
        }
    }

    #[test]
    fn test_narrowed_vectors_compare_over_remaining_columns() {
        let m = similarity_matrix(&[vec![3.0, 4.0], vec![6.0, 8.0], vec![4.0, -3.0]], 1);
        assert_relative_eq!(m[[0, 1]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(m[[0, 2]], 0.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case::two_workers(2)]
    #[case::four_workers(4)]
    #[case::more_workers_than_rows(16)]
    fn test_threaded_matches_inline(#[case] workers: usize) {
        let inline = similarity_matrix(&sample_vectors(), 1);
        let threaded = similarity_matrix(&sample_vectors(), workers);
        assert_eq!(inline, threaded);
    }
}

use crate::error::ValidationError;

/// Compute the broadcast shape of `lhs` and `rhs`.
///
/// Dimensions are aligned from the trailing axis; a missing leading axis counts
/// as size 1. Two aligned dimensions are compatible when they are equal or when
/// one of them is 1 and that side is allowed to stretch:
/// - bidirectional: either side may stretch, the output rank is the larger rank;
/// - unidirectional: only `lhs` may stretch into `rhs`, the output is `rhs`'s
///   rank, so `lhs` can never have more axes than `rhs`.
pub fn broadcast_shapes(
    lhs: &[u32],
    rhs: &[u32],
    bidirectional: bool,
) -> Result<Vec<u32>, ValidationError> {
    if !bidirectional && lhs.len() > rhs.len() {
        return Err(ValidationError::shape(format!(
            "Shape {:?} cannot be broadcast to lower-rank shape {:?}",
            lhs, rhs
        )));
    }

    let output_rank = lhs.len().max(rhs.len());
    let mut result = Vec::with_capacity(output_rank);

    // Iterate from right to left (least significant dimension first)
    for i in 0..output_rank {
        let dim_lhs = if i < lhs.len() {
            lhs[lhs.len() - 1 - i]
        } else {
            1
        };
        let dim_rhs = if i < rhs.len() {
            rhs[rhs.len() - 1 - i]
        } else {
            1
        };

        let dim = if dim_lhs == dim_rhs {
            dim_lhs
        } else if dim_lhs == 1 {
            dim_rhs
        } else if dim_rhs == 1 && bidirectional {
            dim_lhs
        } else {
            return Err(ValidationError::shape(format!(
                "Shape {:?} is not {} broadcastable with {:?} (axis -{} incompatible: {} vs {})",
                lhs,
                if bidirectional {
                    "bidirectionally"
                } else {
                    "unidirectionally"
                },
                rhs,
                i + 1,
                dim_lhs,
                dim_rhs
            )));
        };
        result.push(dim);
    }

    // Reverse to get back to original order
    result.reverse();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_broadcast_same_shape() {
        assert_eq!(broadcast_shapes(&[2, 3], &[2, 3], true).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[2, 3], &[2, 3], false).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_broadcast_with_ones() {
        assert_eq!(broadcast_shapes(&[2, 3], &[1, 3], true).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[1, 3], &[2, 3], true).unwrap(), vec![2, 3]);
        assert_eq!(
            broadcast_shapes(&[4, 1, 6], &[1, 5, 6], true).unwrap(),
            vec![4, 5, 6]
        );
    }

    #[test]
    fn test_broadcast_different_ranks() {
        assert_eq!(broadcast_shapes(&[5], &[3, 5], true).unwrap(), vec![3, 5]);
        assert_eq!(
            broadcast_shapes(&[2, 3, 4], &[3, 4], true).unwrap(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_broadcast_scalar() {
        assert_eq!(broadcast_shapes(&[], &[2, 3], true).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[], &[2, 3], false).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[], &[], true).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_broadcast_zero_sized_dimension() {
        assert_eq!(broadcast_shapes(&[1, 0], &[3, 1], true).unwrap(), vec![3, 0]);
        assert!(broadcast_shapes(&[2], &[0], true).is_err());
    }

    #[test]
    fn test_broadcast_incompatible() {
        assert!(broadcast_shapes(&[2, 3], &[2, 4], true).is_err());
        assert!(broadcast_shapes(&[2, 3, 4], &[2, 5, 4], true).is_err());
    }

    #[test]
    fn test_unidirectional_only_stretches_lhs() {
        assert_eq!(
            broadcast_shapes(&[1, 4], &[3, 4], false).unwrap(),
            vec![3, 4]
        );
        let err = broadcast_shapes(&[3, 4], &[1, 4], false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
    }

    #[test]
    fn test_unidirectional_trailing_mismatch() {
        let err = broadcast_shapes(&[5], &[3, 4], false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
        assert!(err.reason().contains("5 vs 4"));
    }

    #[test]
    fn test_unidirectional_rank_larger_than_target() {
        assert!(broadcast_shapes(&[1, 1, 4], &[3, 4], false).is_err());
    }
}

use crate::error::ValidationError;

/// Checks that every axis is below `rank` and that no axis repeats.
pub fn validate_axes(axes: &[u32], rank: usize, operator: &str) -> Result<(), ValidationError> {
    let mut seen = vec![false; rank];
    for &axis in axes {
        validate_axis(axis, rank, operator)?;
        if seen[axis as usize] {
            return Err(ValidationError::attribute(format!(
                "{} axes {:?} contain duplicate axis {}",
                operator, axes, axis
            )));
        }
        seen[axis as usize] = true;
    }
    Ok(())
}

/// Checks that `axis` addresses a dimension of a tensor of rank `rank`.
pub fn validate_axis(axis: u32, rank: usize, operator: &str) -> Result<(), ValidationError> {
    if axis as usize >= rank {
        return Err(ValidationError::attribute(format!(
            "{} axis {} out of bounds for rank {}",
            operator, axis, rank
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_valid_axes() {
        assert!(validate_axes(&[], 0, "reduce").is_ok());
        assert!(validate_axes(&[2, 0, 1], 3, "reduce").is_ok());
    }

    #[test]
    fn test_axis_out_of_range() {
        let err = validate_axes(&[0, 3], 3, "reduce").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttribute);
        assert!(err.reason().contains("axis 3 out of bounds"));
    }

    #[test]
    fn test_duplicate_axis() {
        let err = validate_axes(&[1, 0, 1], 3, "transpose").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAttribute);
        assert!(err.reason().contains("duplicate axis 1"));
    }

    #[test]
    fn test_huge_axis_does_not_index() {
        assert!(validate_axis(u32::MAX, 4, "gather").is_err());
    }
}

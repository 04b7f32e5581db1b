use crate::error::ValidationError;
use crate::operand::Operand;
use crate::shape_inference::broadcast::broadcast_shapes;
use crate::shape_inference::{check_rank, check_same_data_type};

/// Infer the output operand of matrix multiplication (matmul)
///
/// For 2D matrices: [M, K] @ [K, N] -> [M, N]
/// For batched matmul: broadcasting is applied to batch dimensions
pub fn infer_matmul(a: &Operand, b: &Operand) -> Result<Operand, ValidationError> {
    check_same_data_type(b, a.data_type, "Matmul second input")?;
    if a.rank() < 2 || b.rank() < 2 {
        return Err(ValidationError::rank(format!(
            "Matmul requires at least 2D tensors, got shapes {:?} and {:?}",
            a.shape, b.shape
        )));
    }

    let a_rows = a.shape[a.rank() - 2];
    let a_cols = a.shape[a.rank() - 1];
    let b_rows = b.shape[b.rank() - 2];
    let b_cols = b.shape[b.rank() - 1];

    if a_cols != b_rows {
        return Err(ValidationError::shape(format!(
            "Matmul columns of first input ({}) must equal rows of second input ({}), shapes {:?} and {:?}",
            a_cols, b_rows, a.shape, b.shape
        )));
    }

    let batch_a = &a.shape[..a.rank() - 2];
    let batch_b = &b.shape[..b.rank() - 2];
    let mut shape = broadcast_shapes(batch_a, batch_b, true).map_err(|err| {
        ValidationError::shape(format!(
            "Matmul batch dimensions are not broadcastable: {}",
            err.reason()
        ))
    })?;
    shape.push(a_rows);
    shape.push(b_cols);

    Operand::new(a.data_type, shape)
}

/// Attributes of gemm
#[derive(Debug, Clone, PartialEq)]
pub struct GemmAttributes {
    /// Optional addend, unidirectionally broadcast onto the [M, N] product.
    pub c: Option<Operand>,
    pub a_transpose: bool,
    pub b_transpose: bool,
}

/// Infer the output operand of gemm (general matrix multiplication)
///
/// GEMM computes: alpha * A' * B' + beta * C
/// where A' and B' are optionally transposed versions of A and B
///
/// - If a_transpose: A has shape [K, M], else [M, K]
/// - If b_transpose: B has shape [N, K], else [K, N]
/// - Output has shape [M, N]
pub fn infer_gemm(
    a: &Operand,
    b: &Operand,
    attributes: &GemmAttributes,
) -> Result<Operand, ValidationError> {
    check_same_data_type(b, a.data_type, "Gemm second input")?;
    check_rank(a, 2, "Gemm first input")?;
    check_rank(b, 2, "Gemm second input")?;

    // Get dimensions after optional transposition
    let (m, k_a) = if attributes.a_transpose {
        (a.shape[1], a.shape[0])
    } else {
        (a.shape[0], a.shape[1])
    };
    let (k_b, n) = if attributes.b_transpose {
        (b.shape[1], b.shape[0])
    } else {
        (b.shape[0], b.shape[1])
    };

    if k_a != k_b {
        return Err(ValidationError::shape(format!(
            "Gemm inner dimensions must match: A{}[M={}, K={}] x B{}[K={}, N={}]",
            if attributes.a_transpose { "^T" } else { "" },
            m,
            k_a,
            if attributes.b_transpose { "^T" } else { "" },
            k_b,
            n
        )));
    }

    let output_shape = vec![m, n];
    if let Some(c) = &attributes.c {
        check_same_data_type(c, a.data_type, "Gemm C operand")?;
        broadcast_shapes(&c.shape, &output_shape, false).map_err(|err| {
            ValidationError::shape(format!(
                "Gemm C operand is not unidirectionally broadcastable to the output: {}",
                err.reason()
            ))
        })?;
    }

    Operand::new(a.data_type, output_shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::operand::DataType;

    fn float32(shape: &[u32]) -> Operand {
        Operand::new(DataType::Float32, shape.to_vec()).unwrap()
    }

    fn gemm_attributes(c: Option<Operand>, a_transpose: bool, b_transpose: bool) -> GemmAttributes {
        GemmAttributes {
            c,
            a_transpose,
            b_transpose,
        }
    }

    #[test]
    fn test_matmul_2d() {
        assert_eq!(
            infer_matmul(&float32(&[2, 3]), &float32(&[3, 4])).unwrap(),
            float32(&[2, 4])
        );
    }

    #[test]
    fn test_matmul_inner_mismatch() {
        let err = infer_matmul(&float32(&[2, 3]), &float32(&[4, 4])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
        assert!(err.reason().contains("columns of first input (3)"));
        assert!(err.reason().contains("rows of second input (4)"));
    }

    #[test]
    fn test_matmul_batched() {
        assert_eq!(
            infer_matmul(&float32(&[5, 2, 3]), &float32(&[5, 3, 4]))
                .unwrap()
                .shape,
            vec![5, 2, 4]
        );
    }

    #[test]
    fn test_matmul_batch_broadcast() {
        assert_eq!(
            infer_matmul(&float32(&[2, 1, 2, 3]), &float32(&[7, 3, 4]))
                .unwrap()
                .shape,
            vec![2, 7, 2, 4]
        );
        assert_eq!(
            infer_matmul(&float32(&[2, 3]), &float32(&[6, 3, 4]))
                .unwrap()
                .shape,
            vec![6, 2, 4]
        );
        let err = infer_matmul(&float32(&[2, 2, 3]), &float32(&[3, 3, 4])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
    }

    #[test]
    fn test_matmul_rank_and_type() {
        let err = infer_matmul(&float32(&[3]), &float32(&[3, 4])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RankMismatch);

        let half = Operand::new(DataType::Float16, vec![3, 4]).unwrap();
        let err = infer_matmul(&float32(&[2, 3]), &half).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_gemm_basic() {
        let output = infer_gemm(
            &float32(&[2, 3]),
            &float32(&[3, 4]),
            &gemm_attributes(None, false, false),
        )
        .unwrap();
        assert_eq!(output.shape, vec![2, 4]);
    }

    #[test]
    fn test_gemm_transposes() {
        let output = infer_gemm(
            &float32(&[3, 2]),
            &float32(&[4, 3]),
            &gemm_attributes(None, true, true),
        )
        .unwrap();
        assert_eq!(output.shape, vec![2, 4]);

        let err = infer_gemm(
            &float32(&[3, 2]),
            &float32(&[3, 4]),
            &gemm_attributes(None, false, false),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
    }

    #[test]
    fn test_gemm_rank() {
        let err = infer_gemm(
            &float32(&[1, 2, 3]),
            &float32(&[3, 4]),
            &gemm_attributes(None, false, false),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RankMismatch);
    }

    #[test]
    fn test_gemm_c_operand() {
        let a = float32(&[2, 3]);
        let b = float32(&[3, 4]);
        for c_shape in [vec![], vec![4], vec![1, 4], vec![2, 1], vec![2, 4]] {
            let attrs = gemm_attributes(Some(float32(&c_shape)), false, false);
            assert_eq!(infer_gemm(&a, &b, &attrs).unwrap().shape, vec![2, 4]);
        }

        let attrs = gemm_attributes(Some(float32(&[3])), false, false);
        assert_eq!(
            infer_gemm(&a, &b, &attrs).unwrap_err().kind(),
            ErrorKind::IncompatibleShape
        );

        let attrs = gemm_attributes(Some(float32(&[1, 2, 4])), false, false);
        assert!(infer_gemm(&a, &b, &attrs).is_err());

        let attrs = gemm_attributes(
            Some(Operand::new(DataType::Int32, vec![2, 4]).unwrap()),
            false,
            false,
        );
        assert_eq!(
            infer_gemm(&a, &b, &attrs).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }
}

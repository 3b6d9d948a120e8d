use crate::tensor::DType;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MultinomialError {
    #[error("x and n must be of integer type; got x.dtype={x}, n.dtype={n}")]
    InvalidArgumentType { x: DType, n: DType },
    #[error("operands could not be broadcast together with shapes {lhs:?} and {rhs:?}")]
    IncompatibleShapes { lhs: Vec<usize>, rhs: Vec<usize> },
    #[error("x and p need at least one dimension to serve as the category axis")]
    MissingCategoryAxis,
}

pub type Result<T> = std::result::Result<T, MultinomialError>;

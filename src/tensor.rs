use derive_more::Display;
use ndarray::{Array, Array1, ArrayD, Dimension, arr0};
use serde::{Deserialize, Serialize};

/// Element type of a [`Tensor`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    #[display("bool")]
    Bool,
    #[display("int32")]
    Int32,
    #[display("int64")]
    Int64,
    #[display("uint32")]
    UInt32,
    #[display("uint64")]
    UInt64,
    #[display("float32")]
    Float32,
    #[display("float64")]
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Signed(u32),
    Unsigned(u32),
    Float(u32),
}

impl DType {
    fn kind(self) -> Kind {
        match self {
            DType::Bool => Kind::Bool,
            DType::Int32 => Kind::Signed(32),
            DType::Int64 => Kind::Signed(64),
            DType::UInt32 => Kind::Unsigned(32),
            DType::UInt64 => Kind::Unsigned(64),
            DType::Float32 => Kind::Float(32),
            DType::Float64 => Kind::Float(64),
        }
    }

    fn signed(bits: u32) -> Self {
        if bits <= 32 { DType::Int32 } else { DType::Int64 }
    }

    fn unsigned(bits: u32) -> Self {
        if bits <= 32 { DType::UInt32 } else { DType::UInt64 }
    }

    fn float(bits: u32) -> Self {
        if bits <= 32 { DType::Float32 } else { DType::Float64 }
    }

    pub fn is_integer(self) -> bool {
        matches!(self.kind(), Kind::Signed(_) | Kind::Unsigned(_))
    }

    pub fn is_inexact(self) -> bool {
        matches!(self.kind(), Kind::Float(_))
    }

    /// The smallest dtype both operands can be represented in.
    ///
    /// `bool` defers to the other operand, so `promote(Bool, Bool)` stays
    /// `Bool` and is therefore not an integer type. Mixing `uint64` with any
    /// signed integer has no integer home and lands on `float64`.
    pub fn promote(self, other: DType) -> DType {
        match (self.kind(), other.kind()) {
            (a, b) if a == b => self,
            (Kind::Bool, _) => other,
            (_, Kind::Bool) => self,
            (Kind::Signed(a), Kind::Signed(b)) => DType::signed(a.max(b)),
            (Kind::Unsigned(a), Kind::Unsigned(b)) => DType::unsigned(a.max(b)),
            (Kind::Signed(s), Kind::Unsigned(u)) | (Kind::Unsigned(u), Kind::Signed(s)) => {
                if u >= 64 {
                    DType::Float64
                } else if s > u {
                    DType::signed(s)
                } else {
                    DType::Int64
                }
            }
            (Kind::Float(a), Kind::Float(b)) => DType::float(a.max(b)),
            (Kind::Float(_), _) => self,
            (_, Kind::Float(_)) => other,
        }
    }

    /// [`DType::promote`] for arithmetic on counts: a `bool` result becomes
    /// `int64`, so two boolean operands still promote to an integer type.
    pub fn promote_numeric(self, other: DType) -> DType {
        match self.promote(other) {
            DType::Bool => DType::Int64,
            dtype => dtype,
        }
    }
}

/// A dynamically shaped array tagged with its element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tensor {
    Bool(ArrayD<bool>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt32(ArrayD<u32>),
    UInt64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

macro_rules! each_variant {
    ($tensor:expr, $arr:ident => $body:expr) => {
        match $tensor {
            Tensor::Bool($arr) => $body,
            Tensor::Int32($arr) => $body,
            Tensor::Int64($arr) => $body,
            Tensor::UInt32($arr) => $body,
            Tensor::UInt64($arr) => $body,
            Tensor::Float32($arr) => $body,
            Tensor::Float64($arr) => $body,
        }
    };
}

impl Tensor {
    pub fn dtype(&self) -> DType {
        match self {
            Tensor::Bool(_) => DType::Bool,
            Tensor::Int32(_) => DType::Int32,
            Tensor::Int64(_) => DType::Int64,
            Tensor::UInt32(_) => DType::UInt32,
            Tensor::UInt64(_) => DType::UInt64,
            Tensor::Float32(_) => DType::Float32,
            Tensor::Float64(_) => DType::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        each_variant!(self, arr => arr.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Casts every element to `f64`. `true` becomes 1.0.
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            Tensor::Bool(arr) => arr.mapv(|v| if v { 1.0 } else { 0.0 }),
            Tensor::Int32(arr) => arr.mapv(f64::from),
            Tensor::Int64(arr) => arr.mapv(|v| v as f64),
            Tensor::UInt32(arr) => arr.mapv(f64::from),
            Tensor::UInt64(arr) => arr.mapv(|v| v as f64),
            Tensor::Float32(arr) => arr.mapv(f64::from),
            Tensor::Float64(arr) => arr.clone(),
        }
    }

    /// Exact integer view of a `bool` or integer tensor; `None` for floats.
    pub fn to_i128(&self) -> Option<ArrayD<i128>> {
        match self {
            Tensor::Bool(arr) => Some(arr.mapv(i128::from)),
            Tensor::Int32(arr) => Some(arr.mapv(i128::from)),
            Tensor::Int64(arr) => Some(arr.mapv(i128::from)),
            Tensor::UInt32(arr) => Some(arr.mapv(i128::from)),
            Tensor::UInt64(arr) => Some(arr.mapv(i128::from)),
            Tensor::Float32(_) | Tensor::Float64(_) => None,
        }
    }
}

macro_rules! impl_tensor_from {
    ($($elem:ty => $variant:ident),* $(,)?) => {
        $(
            impl<D: Dimension> From<Array<$elem, D>> for Tensor {
                fn from(value: Array<$elem, D>) -> Self {
                    Tensor::$variant(value.into_dyn())
                }
            }

            impl From<Vec<$elem>> for Tensor {
                fn from(value: Vec<$elem>) -> Self {
                    Tensor::$variant(Array1::from(value).into_dyn())
                }
            }

            impl From<&[$elem]> for Tensor {
                fn from(value: &[$elem]) -> Self {
                    Tensor::$variant(Array1::from(value.to_vec()).into_dyn())
                }
            }

            impl<const N: usize> From<[$elem; N]> for Tensor {
                fn from(value: [$elem; N]) -> Self {
                    Tensor::$variant(Array1::from(value.to_vec()).into_dyn())
                }
            }

            impl From<$elem> for Tensor {
                fn from(value: $elem) -> Self {
                    Tensor::$variant(arr0(value).into_dyn())
                }
            }
        )*
    };
}

impl_tensor_from!(
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_promote() {
        assert_eq!(DType::Int32.promote(DType::Int32), DType::Int32);
        assert_eq!(DType::Int32.promote(DType::Int64), DType::Int64);
        assert_eq!(DType::UInt32.promote(DType::UInt64), DType::UInt64);
        assert_eq!(DType::UInt32.promote(DType::Int32), DType::Int64);
        assert_eq!(DType::UInt32.promote(DType::Int64), DType::Int64);
        assert_eq!(DType::Int64.promote(DType::UInt64), DType::Float64);
        assert_eq!(DType::Bool.promote(DType::UInt32), DType::UInt32);
        assert_eq!(DType::Bool.promote(DType::Bool), DType::Bool);
        assert_eq!(DType::Int64.promote(DType::Float32), DType::Float32);
        assert_eq!(DType::Float32.promote(DType::Float64), DType::Float64);
    }

    #[test]
    fn test_promote_numeric() {
        assert_eq!(DType::Bool.promote_numeric(DType::Bool), DType::Int64);
        assert!(DType::Bool.promote_numeric(DType::Bool).is_integer());
        assert_eq!(DType::Bool.promote_numeric(DType::UInt32), DType::UInt32);
        assert_eq!(DType::Int32.promote_numeric(DType::Int32), DType::Int32);
        assert_eq!(DType::Float32.promote_numeric(DType::Bool), DType::Float32);
    }

    #[test]
    fn test_promote_is_symmetric() {
        let all = [
            DType::Bool,
            DType::Int32,
            DType::Int64,
            DType::UInt32,
            DType::UInt64,
            DType::Float32,
            DType::Float64,
        ];
        for a in all {
            for b in all {
                assert_eq!(a.promote(b), b.promote(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_dtype_kinds() {
        assert!(DType::UInt64.is_integer());
        assert!(!DType::Bool.is_integer());
        assert!(!DType::Float32.is_integer());
        assert!(DType::Float32.is_inexact());
        assert!(!DType::Int32.is_inexact());
        assert_eq!(DType::UInt32.to_string(), "uint32");
    }

    #[test]
    fn test_tensor_from() {
        let t = Tensor::from(array![[1i32, 2], [3, 4]]);
        assert_eq!(t.dtype(), DType::Int32);
        assert_eq!(t.shape(), &[2, 2]);

        let t = Tensor::from(vec![0.5f64, 0.5]);
        assert_eq!(t.dtype(), DType::Float64);
        assert_eq!(t.ndim(), 1);

        let t = Tensor::from(4u64);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.to_f64().sum(), 4.0);

        let t = Tensor::from([true, false, true]);
        assert_eq!(t.to_f64(), array![1.0, 0.0, 1.0].into_dyn());
        assert_eq!(t.to_i128(), Some(array![1i128, 0, 1].into_dyn()));
    }

    #[test]
    fn test_to_i128_is_exact() {
        let big = (1u64 << 53) + 1;
        let t = Tensor::from(vec![big, u64::MAX]);
        assert_eq!(t.to_i128(), Some(array![big as i128, u64::MAX as i128].into_dyn()));
        assert_eq!(Tensor::from(vec![1.0f64]).to_i128(), None);
    }

    #[test]
    fn test_tensor_json() {
        let t = Tensor::from(vec![1i64, 2, 1]);
        let json = serde_json::to_string(&t).unwrap();
        let back: Tensor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.dtype(), DType::Int64);
    }
}

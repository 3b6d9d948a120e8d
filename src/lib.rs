pub mod broadcast;
pub mod error;
pub mod special;
pub mod statistics;
pub mod tensor;

pub mod prelude {
    pub use crate::{
        error::{MultinomialError, Result},
        statistics::pmf::{
            logpmf, logpmf_grad_p, multinomial_ln_probability, multinomial_probability, pmf,
        },
        tensor::{DType, Tensor},
    };
}

pub mod fixed_dim;
pub mod model;
pub mod tensor;

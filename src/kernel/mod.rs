//! Kernel functions and their parameter derivatives

pub mod config;
pub mod linear;
pub mod ops;
pub mod polynomial;
pub mod rbf;
pub mod state;
pub mod traits;

pub use self::config::*;
pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::state::*;
pub use self::traits::*;

pub mod ast;
pub mod error;
pub mod pos;
pub mod token;

pub use ast::*;
pub use error::*;
pub use pos::*;
pub use token::*;

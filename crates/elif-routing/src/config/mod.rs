pub mod router_options;
pub mod validation;
pub mod defaults;

pub use router_options::*;
pub use validation::*;
pub use defaults::*;

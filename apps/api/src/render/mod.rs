// Resume rendering: escape → section blocks → template composition → LaTeX compile.
// All subprocess work lives in `compiler`; handlers only decode input and shape responses.

pub mod compiler;
pub mod escape;
pub mod handlers;
pub mod pipeline;
pub mod sections;
pub mod template;

pub use compiler::{DocumentCompiler, LatexCompiler};

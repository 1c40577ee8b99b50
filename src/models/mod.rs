pub mod analyte;
pub mod compare;
pub mod enums;
pub mod report;

pub use analyte::*;
pub use compare::*;
pub use enums::*;
pub use report::*;

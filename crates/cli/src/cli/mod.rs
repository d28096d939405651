pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Delete, Download, Init, Stat, Upload, Url};

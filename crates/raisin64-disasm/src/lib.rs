pub mod model;

pub use model::{is_mapped, load_raw_bin, read_u64, read_u8, Image, Segment};

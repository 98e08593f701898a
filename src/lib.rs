pub mod combine;
pub mod sample;

pub use combine::{concat_tables, write_csv};
pub use sample::{sample_csv, SampleConfig};

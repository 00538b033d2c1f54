//! Reading channels from delimited tables and exporting results.

mod reader;
mod report;

pub use reader::ChannelReader;
pub use report::write_subject_results;

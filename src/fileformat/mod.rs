mod aligned_fasta;
mod component_table;
mod offset_list_file;

pub use aligned_fasta::read_aligned_fasta;
pub use aligned_fasta::read_aligned_fasta_of_length;

pub use component_table::ComponentRow;
pub use component_table::ComponentTableWriter;

pub use offset_list_file::parse_offset_list;
pub use offset_list_file::read_offset_list_file;

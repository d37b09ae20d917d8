use std::collections::BTreeSet;
use std::path::Path;

use bio::io::fasta;

use crate::common::AlignedRead;
use crate::runtime::Error;

///////////////////////////////
/// Load an aligned FASTA. All sequences are expected to span the whole
/// alignment; the first record decides its length and records of another
/// length are skipped
pub fn read_aligned_fasta(
    path: &Path,
    significant: &BTreeSet<usize>,
    trim: usize,
) -> Result<Vec<AlignedRead>, Error> {
    read_aligned_fasta_impl(path, significant, trim, None)
}

///////////////////////////////
/// Load a second alignment against an already known alignment length.
/// Records of any other length are skipped
pub fn read_aligned_fasta_of_length(
    path: &Path,
    significant: &BTreeSet<usize>,
    trim: usize,
    length: usize,
) -> Result<Vec<AlignedRead>, Error> {
    read_aligned_fasta_impl(path, significant, trim, Some(length))
}

fn read_aligned_fasta_impl(
    path: &Path,
    significant: &BTreeSet<usize>,
    trim: usize,
    mut alignment_length: Option<usize>,
) -> Result<Vec<AlignedRead>, Error> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let reader = fasta::Reader::from_file(path)
        .map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;

    let mut reads = Vec::new();
    let mut num_skipped = 0;

    for record in reader.records() {
        let record = record.map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;
        let length = *alignment_length.get_or_insert(record.seq().len());

        if record.seq().len() != length {
            log::warn!(
                "Skipping {}: length {} differs from alignment length {}",
                record.id(),
                record.seq().len(),
                length
            );
            num_skipped += 1;
            continue;
        }

        reads.push(
            AlignedRead::new(record.id(), record.seq()).with_significant_offsets(significant, trim),
        );
    }

    if let (Some(length), Some(&last)) = (alignment_length, significant.last()) {
        if last >= length {
            log::warn!(
                "Significant location {} is beyond the alignment length {}",
                last + 1,
                length
            );
        }
    }

    log::info!(
        "Read {} aligned reads from {:?} ({} skipped)",
        reads.len(),
        path,
        num_skipped
    );
    Ok(reads)
}

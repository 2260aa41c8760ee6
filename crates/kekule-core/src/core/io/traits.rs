use crate::core::models::graph::MolecularGraph;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface of the molecule file formats understood by kekule.
///
/// Implementors only provide the reader- and writer-based methods; the path-based
/// helpers open the file and delegate.
pub trait MolecularFile {
    /// Format-specific data that does not live on the graph (titles, comments).
    type Metadata;

    /// The error type for parsing and I/O failures.
    type Error: Error + From<io::Error>;

    /// Parses a molecular graph and its metadata from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or describes an invalid graph
    /// (for example, a bond that does not join exactly two atoms).
    fn read_from(reader: &mut impl BufRead)
    -> Result<(MolecularGraph, Self::Metadata), Self::Error>;

    /// Serialises a molecular graph together with its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    fn write_to(
        graph: &MolecularGraph,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(MolecularGraph, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(
        graph: &MolecularGraph,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(graph, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

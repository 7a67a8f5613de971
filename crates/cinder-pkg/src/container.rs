//! Chunked container codec shared by manifest and package files.
//!
//! A container is a big-endian `i32` header (version 5, optionally with the
//! compression flag) followed by chunks. The first chunk is four bytes
//! shorter than [`CHUNK_SIZE`] so that header and chunk together fill one
//! chunk's worth of bytes. Each chunk is a run of tagged entries terminated
//! by an end-of-chunk or end-of-file tag.
//!
//! Compressed containers prefix every chunk with a flag byte: `1` means an
//! `i32` length and LZF data follow, `0` means the chunk is stored raw.

use cinder_common::{BinaryReader, BinaryWriter};
use tracing::{debug, trace};

use crate::entries::{read_record, tag, Entry, Record};
use crate::{Error, FileKind, Result};

/// Maximum chunk size.
pub const CHUNK_SIZE: usize = 0x80_0000;
/// Header bit marking a compressed container.
pub const COMPRESSION_FLAG: i32 = 0x4000_0000;
/// The only supported header version.
pub const PACKAGE_VERSION: i32 = 5;

const HEADER_LEN: usize = 4;

/// Options for [`create_container`].
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// LZF-compress each chunk. Not allowed for manifests.
    pub compress: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Decode every entry of a container.
///
/// `file` is only used in error messages.
pub fn read_container(data: &[u8], kind: FileKind, file: &str) -> Result<Vec<Entry>> {
    read_chunks(data, kind, file, CHUNK_SIZE, &mut |_| {})
}

/// Decode a container with an explicit chunk size, reporting the number of
/// input bytes consumed after each chunk.
pub(crate) fn read_chunks(
    data: &[u8],
    kind: FileKind,
    file: &str,
    chunk_size: usize,
    on_chunk: &mut dyn FnMut(usize),
) -> Result<Vec<Entry>> {
    let mut reader = BinaryReader::new(data);
    let mut header = reader.read_i32()?;

    let compressed = header & COMPRESSION_FLAG != 0;
    if compressed {
        if kind == FileKind::Manifest {
            return Err(Error::CompressedManifest {
                file: file.to_string(),
            });
        }
        header &= !COMPRESSION_FLAG;
    }
    if header != PACKAGE_VERSION {
        return Err(Error::UnsupportedVersion {
            version: header,
            file: file.to_string(),
        });
    }

    let mut entries = Vec::new();
    let mut chunk_len = chunk_size - HEADER_LEN;
    let mut chunk_index = 0usize;
    let mut decompressed = Vec::new();

    loop {
        let chunk: &[u8] = if compressed && reader.read_u8()? != 0 {
            let compressed_len = reader.read_i32()?;
            if compressed_len < 0 {
                return Err(Error::NegativeSize {
                    entry: format!("compressed chunk {} of {}", chunk_index, file),
                    size: compressed_len,
                });
            }
            let input = reader.read_bytes(compressed_len as usize)?;
            decompressed = lzf::decompress(input, chunk_size)
                .map_err(|e| Error::Decompression(format!("chunk {}: {:?}", chunk_index, e)))?;
            &decompressed
        } else {
            reader.read_bytes(chunk_len.min(reader.remaining()))?
        };
        chunk_len = chunk_size;
        trace!(chunk = chunk_index, len = chunk.len(), %kind, "reading chunk");

        let mut chunk_reader = BinaryReader::new(chunk);
        let status = loop {
            match read_record(&mut chunk_reader, kind)? {
                Record::Entry(entry) => entries.push(entry),
                Record::EndOfChunk => break Record::EndOfChunk,
                Record::EndOfFile => break Record::EndOfFile,
            }
        };

        on_chunk(reader.position());
        chunk_index += 1;
        if matches!(status, Record::EndOfFile) {
            break;
        }
    }

    debug!(file, chunks = chunk_index, entries = entries.len(), "read container");
    Ok(entries)
}

/// Encode entries into a container.
pub fn create_container(entries: &[Entry], options: WriteOptions) -> Result<Vec<u8>> {
    let blobs = entries
        .iter()
        .map(Entry::to_blob)
        .collect::<Result<Vec<_>>>()?;
    let chunks = pack_chunks(&blobs, CHUNK_SIZE)?;
    assemble(&chunks, options, CHUNK_SIZE)
}

/// Greedily pack tagged blobs into chunks.
///
/// A chunk is closed with an end-of-chunk tag when the next blob plus one
/// marker byte no longer fits. The last chunk ends with an end-of-file tag and
/// is clipped to its used length. When the end-of-file tag would fill a chunk,
/// that chunk ends with end-of-chunk instead and a chunk holding only the
/// end-of-file tag follows.
pub(crate) fn pack_chunks(blobs: &[Vec<u8>], chunk_size: usize) -> Result<Vec<Vec<u8>>> {
    let mut chunks = Vec::new();
    let mut blobs = blobs.iter().peekable();

    loop {
        let capacity = if chunks.is_empty() {
            chunk_size - HEADER_LEN
        } else {
            chunk_size
        };
        let mut chunk = Vec::with_capacity(capacity);

        while let Some(blob) = blobs.peek() {
            if capacity - chunk.len() < blob.len() + 1 {
                if chunk.is_empty() {
                    return Err(Error::EntryTooLarge {
                        size: blob.len(),
                        capacity: capacity - 1,
                    });
                }
                chunk.push(tag::END_OF_CHUNK);
                break;
            }
            chunk.extend_from_slice(blob);
            blobs.next();
        }

        if blobs.peek().is_none() {
            if chunk.len() + 1 < chunk_size {
                chunk.push(tag::END_OF_FILE);
                chunks.push(chunk);
            } else {
                // The tag would make the last chunk full size.
                chunk.push(tag::END_OF_CHUNK);
                chunks.push(chunk);
                chunks.push(vec![tag::END_OF_FILE]);
            }
            break;
        }
        chunk.resize(capacity, 0);
        chunks.push(chunk);
    }

    check_chunks(&chunks, chunk_size)?;
    Ok(chunks)
}

/// Every chunk but the first and the last is exactly `chunk_size`, the first
/// is four bytes shorter and the last is shorter than `chunk_size`.
pub(crate) fn check_chunks(chunks: &[Vec<u8>], chunk_size: usize) -> Result<()> {
    let last = chunks.len().saturating_sub(1);
    for (index, chunk) in chunks.iter().enumerate() {
        let (ok, expected) = if index == last {
            (
                chunk.len() < chunk_size && chunk.last() == Some(&tag::END_OF_FILE),
                format!("< {} ending in end-of-file", chunk_size),
            )
        } else if index == 0 {
            (
                chunk.len() == chunk_size - HEADER_LEN,
                (chunk_size - HEADER_LEN).to_string(),
            )
        } else {
            (chunk.len() == chunk_size, chunk_size.to_string())
        };
        if !ok {
            return Err(Error::ChunkLayout {
                index,
                len: chunk.len(),
                expected,
            });
        }
    }
    Ok(())
}

/// Write the header and the chunks, compressing each chunk when that helps.
fn assemble(chunks: &[Vec<u8>], options: WriteOptions, chunk_size: usize) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::with_capacity(chunks.len() * chunk_size);
    let mut header = PACKAGE_VERSION;
    if options.compress {
        header |= COMPRESSION_FLAG;
    }
    writer.write_i32(header);

    for (index, chunk) in chunks.iter().enumerate() {
        if !options.compress {
            writer.write_bytes(chunk);
            continue;
        }
        match lzf::compress(chunk) {
            Ok(packed) if packed.len() < chunk.len() => {
                trace!(chunk = index, from = chunk.len(), to = packed.len(), "compressed chunk");
                writer.write_u8(1);
                writer.write_i32(crate::entries::length_field(packed.len())?);
                writer.write_bytes(&packed);
            }
            _ => {
                writer.write_u8(0);
                writer.write_bytes(chunk);
            }
        }
    }
    Ok(writer.into_inner())
}

/// Encode entries with an explicit chunk size.
#[cfg(test)]
pub(crate) fn create_container_with(
    entries: &[Entry],
    options: WriteOptions,
    chunk_size: usize,
) -> Result<Vec<u8>> {
    let blobs = entries
        .iter()
        .map(Entry::to_blob)
        .collect::<Result<Vec<_>>>()?;
    let chunks = pack_chunks(&blobs, chunk_size)?;
    assemble(&chunks, options, chunk_size)
}

#[cfg(test)]
mod tests {
    use cinder_texture::{SurfaceFormat, Texture};

    use super::*;
    use crate::entries::{BinkEntry, EntryType, IncludePackageEntry, TextureEntry};

    const SMALL_CHUNK: usize = 64;

    fn include(name: &str) -> Entry {
        Entry::IncludePackage(IncludePackageEntry::new(name))
    }

    fn names(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(Entry::display_name).collect()
    }

    #[test]
    fn test_single_include_package() {
        let data = create_container(&[include("Base")], WriteOptions { compress: false }).unwrap();
        let entries = read_container(&data, FileKind::Manifest, "Base.pkg_manifest").unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type(), EntryType::IncludePackage);
        assert_eq!(entries[0].display_name(), "Base");

        let again = create_container(&entries, WriteOptions { compress: false }).unwrap();
        assert_eq!(again, data);
        let entries = read_container(&again, FileKind::Manifest, "Base.pkg_manifest").unwrap();
        assert_eq!(names(&entries), ["Base"]);
    }

    #[test]
    fn test_chunk_layout() {
        // Each blob is 12 bytes: tag, length, ten name bytes.
        let blobs: Vec<Vec<u8>> = (0..20)
            .map(|i| include(&format!("package{:03}", i)).to_blob().unwrap())
            .collect();
        let chunks = pack_chunks(&blobs, SMALL_CHUNK).unwrap();

        assert!(chunks.len() > 2);
        assert_eq!(chunks[0].len(), SMALL_CHUNK - 4);
        for chunk in &chunks[1..chunks.len() - 1] {
            assert_eq!(chunk.len(), SMALL_CHUNK);
        }
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.contains(&tag::END_OF_CHUNK));
        }
        let last = chunks.last().unwrap();
        assert!(last.len() < SMALL_CHUNK);
        assert_eq!(last.last(), Some(&tag::END_OF_FILE));
    }

    #[test]
    fn test_exact_fit_leaves_room_for_marker() {
        // 59 bytes of blob plus the end-of-file tag fill the first chunk exactly.
        let blob = vec![0u8; SMALL_CHUNK - 4 - 1];
        let chunks = pack_chunks(&[blob.clone()], SMALL_CHUNK).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), SMALL_CHUNK - 4);

        let chunks = pack_chunks(&[blob.clone(), vec![1]], SMALL_CHUNK).unwrap();
        assert_eq!(chunks.len(), 2);

        let too_big = vec![0u8; SMALL_CHUNK];
        assert!(matches!(
            pack_chunks(&[too_big], SMALL_CHUNK),
            Err(Error::EntryTooLarge { .. })
        ));
    }

    #[test]
    fn test_last_blob_fills_middle_chunk() {
        let entries = [include(&"a".repeat(57)), include(&"b".repeat(61))];
        let blobs: Vec<_> = entries.iter().map(|e| e.to_blob().unwrap()).collect();
        assert_eq!(blobs.iter().map(Vec::len).collect::<Vec<_>>(), [59, 63]);

        let chunks = pack_chunks(&blobs, SMALL_CHUNK).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].len(), SMALL_CHUNK);
        assert_eq!(chunks[1].last(), Some(&tag::END_OF_CHUNK));
        assert_eq!(chunks[2], [tag::END_OF_FILE]);

        for compress in [false, true] {
            let data =
                create_container_with(&entries, WriteOptions { compress }, SMALL_CHUNK).unwrap();
            let decoded =
                read_chunks(&data, FileKind::Package, "full.pkg", SMALL_CHUNK, &mut |_| {})
                    .unwrap();
            assert_eq!(names(&decoded), names(&entries));
        }
    }

    #[test]
    fn test_empty_container() {
        let chunks = pack_chunks(&[], SMALL_CHUNK).unwrap();
        assert_eq!(chunks, vec![vec![tag::END_OF_FILE]]);

        let data = create_container(&[], WriteOptions { compress: false }).unwrap();
        assert_eq!(data, [0, 0, 0, 5, 0xFF]);
        assert!(read_container(&data, FileKind::Manifest, "empty").unwrap().is_empty());
    }

    #[test]
    fn test_check_chunks_rejects_short_middle() {
        let chunks = vec![vec![0; SMALL_CHUNK - 4], vec![0; 10], vec![tag::END_OF_FILE]];
        assert!(matches!(
            check_chunks(&chunks, SMALL_CHUNK),
            Err(Error::ChunkLayout { index: 1, len: 10, .. })
        ));
    }

    #[test]
    fn test_multi_chunk_roundtrip() {
        let entries: Vec<Entry> = (0..30)
            .map(|i| {
                if i % 3 == 0 {
                    Entry::Bink(BinkEntry {
                        is_alpha: i % 2 == 0,
                        file_name: format!("video{}", i),
                    })
                } else {
                    include(&format!("pkg{}", i))
                }
            })
            .collect();

        for compress in [false, true] {
            let data =
                create_container_with(&entries, WriteOptions { compress }, SMALL_CHUNK).unwrap();
            let decoded =
                read_chunks(&data, FileKind::Package, "test.pkg", SMALL_CHUNK, &mut |_| {})
                    .unwrap();
            assert_eq!(names(&decoded), names(&entries));
        }
    }

    #[test]
    fn test_compressed_chunks_shrink_repetitive_data() {
        let texture = Texture::new(SurfaceFormat::Color, 64, 64, vec![0x11; 64 * 64 * 4]);
        let entries = [Entry::Texture(TextureEntry {
            name: "flat".to_string(),
            texture,
        })];

        let raw = create_container(&entries, WriteOptions { compress: false }).unwrap();
        let packed = create_container(&entries, WriteOptions { compress: true }).unwrap();
        assert!(packed.len() < raw.len());
        assert_eq!(&packed[..4], &(PACKAGE_VERSION | COMPRESSION_FLAG).to_be_bytes());
        assert_eq!(packed[4], 1);

        let decoded = read_container(&packed, FileKind::Package, "flat.pkg").unwrap();
        assert_eq!(names(&decoded), ["flat"]);
    }

    #[test]
    fn test_compressed_manifest_rejected_before_entries() {
        // Header only; any entry read would fail differently.
        let data = (PACKAGE_VERSION | COMPRESSION_FLAG).to_be_bytes();
        let err = read_container(&data, FileKind::Manifest, "Base.pkg_manifest").unwrap_err();
        assert!(matches!(err, Error::CompressedManifest { file } if file == "Base.pkg_manifest"));
    }

    #[test]
    fn test_unsupported_version() {
        let data = [0, 0, 0, 4, 0xFF];
        let err = read_container(&data, FileKind::Package, "old.pkg").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { version: 4, .. }));
    }

    #[test]
    fn test_progress_reports_consumed_bytes() {
        let entries: Vec<Entry> = (0..10).map(|i| include(&format!("package{:03}", i))).collect();
        let data =
            create_container_with(&entries, WriteOptions { compress: false }, SMALL_CHUNK).unwrap();

        let mut seen = Vec::new();
        read_chunks(&data, FileKind::Manifest, "m", SMALL_CHUNK, &mut |n| seen.push(n)).unwrap();
        assert!(seen.len() > 1);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last(), Some(&data.len()));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // Names up to 57 bytes keep every blob small enough for the first chunk.
        fn package_names() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[a-z]{1,57}", 0..40)
        }

        proptest! {
            #[test]
            fn test_packed_chunks_keep_layout(names in package_names()) {
                let blobs: Vec<Vec<u8>> = names
                    .iter()
                    .map(|n| include(n).to_blob().unwrap())
                    .collect();
                let chunks = pack_chunks(&blobs, SMALL_CHUNK).unwrap();

                prop_assert!(check_chunks(&chunks, SMALL_CHUNK).is_ok());
                let last = chunks.last().unwrap();
                prop_assert!(last.len() < SMALL_CHUNK);
                prop_assert_eq!(last.last(), Some(&tag::END_OF_FILE));
                if chunks.len() > 1 {
                    prop_assert_eq!(chunks[0].len(), SMALL_CHUNK - 4);
                }
            }

            #[test]
            fn test_containers_read_back(names in package_names(), compress in any::<bool>()) {
                let entries: Vec<Entry> = names.iter().map(|n| include(n)).collect();
                let data =
                    create_container_with(&entries, WriteOptions { compress }, SMALL_CHUNK).unwrap();
                let decoded =
                    read_chunks(&data, FileKind::Package, "prop.pkg", SMALL_CHUNK, &mut |_| {})
                        .unwrap();
                prop_assert_eq!(super::names(&decoded), names);
            }
        }
    }
}

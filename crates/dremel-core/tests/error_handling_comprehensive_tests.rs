use dremel_core::encoding::encode_levels;
use dremel_core::thrift_ext::format::{physical_type, FileMetaData, KeyValue, PageHeader};
use dremel_core::thrift_ext::{deserialize, serialize};
use dremel_core::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

use test_helpers::*;

fn document_bytes() -> Vec<u8> {
    write_to_bytes(
        &[document_r1(), document_r2()],
        document_schema(),
        WriterBuilder::new(),
    )
    .unwrap()
}

/// Split a file into its body (everything before the footer) and footer
fn split_footer(bytes: &[u8]) -> (Vec<u8>, FileMetaData) {
    let len = bytes.len();
    let footer_len = u32::from_le_bytes(bytes[len - 8..len - 4].try_into().unwrap()) as usize;
    let footer_start = len - 8 - footer_len;
    let (footer, _) = deserialize::<FileMetaData>(&bytes[footer_start..len - 8]).unwrap();
    (bytes[..footer_start].to_vec(), footer)
}

fn join_footer(mut body: Vec<u8>, footer: &FileMetaData) -> Vec<u8> {
    let encoded = serialize(footer).unwrap();
    body.extend_from_slice(&encoded);
    body.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
    body.extend_from_slice(b"PAR1");
    body
}

fn open(bytes: Vec<u8>) -> Result<Reader<Cursor<Vec<u8>>>> {
    Reader::new(Cursor::new(bytes))
}

// =============================================================================
// Container errors
// =============================================================================

#[test]
fn test_not_a_parquet_file() {
    let err = open(b"this is certainly not a columnar file".to_vec()).err().unwrap();
    assert!(matches!(err, ParquetError::Corrupt(_)), "{err}");

    let err = open(Vec::new()).err().unwrap();
    assert!(matches!(err, ParquetError::Corrupt(_)), "{err}");
}

#[test]
fn test_bad_magic() {
    let mut bytes = document_bytes();
    bytes[..4].copy_from_slice(b"PAR0");
    assert!(matches!(open(bytes), Err(ParquetError::Corrupt(_))));

    let mut bytes = document_bytes();
    let len = bytes.len();
    bytes[len - 1] = b'0';
    assert!(matches!(open(bytes), Err(ParquetError::Corrupt(_))));
}

#[test]
fn test_truncated_file() {
    let bytes = document_bytes();
    for cut in [1, 4, 9, bytes.len() / 2] {
        let truncated = bytes[..bytes.len() - cut].to_vec();
        assert!(
            matches!(open(truncated), Err(ParquetError::Corrupt(_))),
            "cut {cut}"
        );
    }
}

#[test]
fn test_footer_length_out_of_range() {
    let mut bytes = document_bytes();
    let len = bytes.len();
    bytes[len - 8..len - 4].copy_from_slice(&(len as u32).to_le_bytes());
    assert!(matches!(open(bytes), Err(ParquetError::Corrupt(_))));
}

#[test]
fn test_garbage_footer() {
    let bytes = document_bytes();
    let (body, footer) = split_footer(&bytes);
    let footer_len = serialize(&footer).unwrap().len();

    let mut garbage = body;
    garbage.extend(std::iter::repeat(0xFF).take(footer_len));
    garbage.extend_from_slice(&(footer_len as u32).to_le_bytes());
    garbage.extend_from_slice(b"PAR1");
    assert!(open(garbage).is_err());
}

/// Wrap raw footer bytes into an otherwise empty file
fn file_with_footer(footer: &[u8]) -> Vec<u8> {
    let mut bytes = b"PAR1".to_vec();
    bytes.extend_from_slice(footer);
    bytes.extend_from_slice(&(footer.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"PAR1");
    bytes
}

#[test]
fn test_random_short_footers_fail_cleanly() {
    let mut rng = StdRng::seed_from_u64(0xf007);
    for _ in 0..5000 {
        let len = rng.random_range(0..=40);
        let footer: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let _ = deserialize::<FileMetaData>(&footer);
        if let Ok(reader) = open(file_with_footer(&footer)) {
            for row in reader.read_rows().take(8) {
                let _ = row;
            }
        }
    }
}

#[test]
fn test_mutated_footers_fail_cleanly() {
    let bytes = document_bytes();
    let (body, footer) = split_footer(&bytes);
    let encoded = serialize(&footer).unwrap();

    let mut rng = StdRng::seed_from_u64(0xbad);
    for _ in 0..2000 {
        let mut mutated = encoded.clone();
        for _ in 0..rng.random_range(1..4) {
            let pos = rng.random_range(0..mutated.len());
            mutated[pos] = rng.random();
        }
        mutated.truncate(rng.random_range(1..=mutated.len()));

        let mut file = body.clone();
        file.extend_from_slice(&mutated);
        file.extend_from_slice(&(mutated.len() as u32).to_le_bytes());
        file.extend_from_slice(b"PAR1");
        if let Ok(reader) = open(file) {
            for row in reader.read_rows().take(4) {
                let _ = row;
            }
        }
    }
}

#[test]
fn test_oversized_footer_counts_are_rejected() {
    // `schema` list of 2^31 - 1 structs with nothing behind it
    let huge_list = [0x29, 0xFC, 0xFF, 0xFF, 0xFF, 0xFF, 0x07];
    assert!(matches!(
        deserialize::<FileMetaData>(&huge_list),
        Err(ParquetError::Thrift(_))
    ));
    assert!(open(file_with_footer(&huge_list)).is_err());

    // `key` string of 4 GiB
    let huge_string = [0x18, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
    assert!(matches!(
        deserialize::<KeyValue>(&huge_string),
        Err(ParquetError::Thrift(_))
    ));
}

// =============================================================================
// Footer contents the reader does not support
// =============================================================================

#[test]
fn test_unknown_codec_is_unsupported() {
    let (body, mut footer) = split_footer(&document_bytes());
    // ZSTD
    footer.row_groups[0].columns[0]
        .meta_data
        .as_mut()
        .unwrap()
        .codec = 6;
    let err = open(join_footer(body, &footer)).err().unwrap();
    assert!(matches!(err, ParquetError::Unsupported(_)), "{err}");
}

#[test]
fn test_int96_column_is_unsupported() {
    let (body, mut footer) = split_footer(&document_bytes());
    footer.schema[1].physical_type = Some(physical_type::INT96);
    let err = open(join_footer(body, &footer)).err().unwrap();
    assert!(matches!(err, ParquetError::Unsupported(_)), "{err}");
}

#[test]
fn test_chunk_past_end_of_file() {
    let (body, mut footer) = split_footer(&document_bytes());
    let meta = footer.row_groups[0].columns[2].meta_data.as_mut().unwrap();
    meta.data_page_offset += 1_000_000;

    let mut reader = open(join_footer(body, &footer)).unwrap();
    assert!(matches!(reader.next_row(), Err(ParquetError::Corrupt(_))));
}

#[test]
fn test_huge_chunk_size_is_corrupt() {
    let (body, mut footer) = split_footer(&document_bytes());
    let meta = footer.row_groups[0].columns[0].meta_data.as_mut().unwrap();
    meta.total_compressed_size = 1 << 46;

    let first = open(join_footer(body, &footer))
        .unwrap()
        .read_rows()
        .next()
        .unwrap();
    let err = first.unwrap_err();
    assert!(matches!(err, ParquetError::Corrupt(_)), "{err}");
    assert!(err.to_string().contains("row group 0"), "{err}");
}

#[test]
fn test_page_larger_than_chunk_is_corrupt() {
    let (body, mut footer) = split_footer(&document_bytes());
    // docid holds two values in one page
    let meta = footer.row_groups[0].columns[0].meta_data.as_mut().unwrap();
    meta.num_values = 1;

    let mut reader = open(join_footer(body, &footer)).unwrap();
    assert!(matches!(reader.next_row(), Err(ParquetError::Corrupt(_))));
}

fn list_schema() -> Schema {
    SchemaBuilder::new()
        .with_root(SchemaNode::Struct {
            name: "root".to_string(),
            nullable: false,
            fields: vec![SchemaNode::repeated(
                "xs",
                SchemaNode::required("element", PrimitiveType::Int64),
            )],
        })
        .build()
        .unwrap()
}

/// A one-row file of `xs = [7, 8]` whose levels are replaced by `defs` and
/// `reps`
fn file_with_levels(defs: &[i16], reps: &[i16]) -> Vec<u8> {
    let bytes = write_to_bytes(
        &[ParquetValue::record([("xs", int64s(&[7, 8]))])],
        list_schema(),
        WriterBuilder::new().with_compression(Compression::Uncompressed),
    )
    .unwrap();
    let (body, mut footer) = split_footer(&bytes);
    let meta = footer.row_groups[0].columns[0].meta_data.as_mut().unwrap();
    let offset = meta.data_page_offset as usize;
    let (mut header, header_len) = deserialize::<PageHeader>(&body[offset..]).unwrap();
    let page = &body[offset + header_len..];

    // reps and defs are each prefixed with their length
    let reps_len = u32::from_le_bytes(page[..4].try_into().unwrap()) as usize;
    let defs_start = 4 + reps_len;
    let defs_len =
        u32::from_le_bytes(page[defs_start..defs_start + 4].try_into().unwrap()) as usize;
    let values = &page[defs_start + 4 + defs_len..];

    let mut levels = Vec::new();
    encode_levels(reps, 1, &mut levels);
    encode_levels(defs, 1, &mut levels);
    levels.extend_from_slice(values);

    header.uncompressed_page_size = levels.len() as i32;
    header.compressed_page_size = levels.len() as i32;
    let header_bytes = serialize(&header).unwrap();
    meta.total_compressed_size = (header_bytes.len() + levels.len()) as i64;
    meta.total_uncompressed_size = meta.total_compressed_size;

    let mut rebuilt = body[..offset].to_vec();
    rebuilt.extend_from_slice(&header_bytes);
    rebuilt.extend_from_slice(&levels);
    join_footer(rebuilt, &footer)
}

#[test]
fn test_rewritten_levels_still_read() {
    let rows = read_from_bytes(file_with_levels(&[1, 1], &[0, 1])).unwrap();
    assert_eq!(rows, vec![ParquetValue::record([("xs", int64s(&[7, 8]))])]);
}

#[test]
fn test_list_element_without_list_is_corrupt() {
    // second entry continues a list the first entry left empty
    let bytes = file_with_levels(&[0, 1], &[0, 1]);
    let mut reader = open(bytes).unwrap();
    assert!(matches!(reader.next_row(), Err(ParquetError::Corrupt(_))));

    // second entry continues a list but is itself undefined
    let bytes = file_with_levels(&[1, 0], &[0, 1]);
    let mut reader = open(bytes).unwrap();
    assert!(matches!(reader.next_row(), Err(ParquetError::Corrupt(_))));
}

#[test]
fn test_value_count_mismatch_is_corrupt() {
    let (body, mut footer) = split_footer(&document_bytes());
    let meta = footer.row_groups[0].columns[0].meta_data.as_mut().unwrap();
    meta.num_values += 1;

    let rows: Vec<Result<ParquetValue>> = open(join_footer(body, &footer))
        .unwrap()
        .read_rows()
        .collect();
    // The iterator stops after the first error
    assert_eq!(rows.len(), 1);
    assert!(matches!(rows[0], Err(ParquetError::Corrupt(_))));
}

#[test]
fn test_columns_out_of_order_are_corrupt() {
    let (body, mut footer) = split_footer(&document_bytes());
    footer.row_groups[0].columns.swap(0, 1);
    let err = open(join_footer(body, &footer)).err().unwrap();
    assert!(matches!(err, ParquetError::Corrupt(_)), "{err}");
}

// =============================================================================
// Error helpers
// =============================================================================

#[test]
fn test_error_context_wraps_message() {
    let err = open(Vec::new())
        .context("opening documents")
        .err()
        .unwrap();
    let message = err.to_string();
    assert!(message.contains("opening documents"), "{message}");
    assert!(message.contains("too small"), "{message}");
}

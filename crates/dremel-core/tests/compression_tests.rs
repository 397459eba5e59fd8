use dremel_core::*;
use std::io::Cursor;

use test_helpers::*;

fn repetitive_rows(count: usize) -> Vec<ParquetValue> {
    (0..count)
        .map(|i| {
            ParquetValue::record([
                ("id", ParquetValue::Int32(i as i32)),
                ("name", ParquetValue::string("A".repeat(100))),
                ("value", ParquetValue::Null),
                ("active", ParquetValue::Boolean(true)),
            ])
        })
        .collect()
}

#[test]
fn test_compression_effectiveness() {
    let rows = repetitive_rows(1000);

    let sizes: Vec<usize> = [Compression::Uncompressed, Compression::Snappy, Compression::Gzip]
        .into_iter()
        .map(|compression| {
            write_to_bytes(
                &rows,
                create_test_schema(),
                WriterBuilder::new().with_compression(compression),
            )
            .unwrap()
            .len()
        })
        .collect();

    assert!(
        sizes[1] * 4 < sizes[0],
        "snappy {} vs uncompressed {}",
        sizes[1],
        sizes[0]
    );
    assert!(
        sizes[2] * 4 < sizes[0],
        "gzip {} vs uncompressed {}",
        sizes[2],
        sizes[0]
    );
}

#[test]
fn test_compressed_sizes_in_metadata() {
    let bytes = write_to_bytes(
        &repetitive_rows(200),
        create_test_schema(),
        WriterBuilder::new().with_compression(Compression::Snappy),
    )
    .unwrap();
    let reader = Reader::new(Cursor::new(bytes)).unwrap();
    let name = &reader.metadata().row_groups[0].columns[1];
    assert_eq!(name.path, vec!["name".to_string()]);
    assert_eq!(name.compression, Compression::Snappy);
    assert!(name.total_compressed_size < name.total_uncompressed_size);
}

#[test]
fn test_every_codec_roundtrips() {
    for compression in [
        Compression::Uncompressed,
        Compression::Snappy,
        Compression::Gzip,
    ] {
        for row_group_size in [3, 1000] {
            test_roundtrip_with_options(
                generate_test_rows(10),
                create_test_schema(),
                compression,
                Some(row_group_size),
            )
            .unwrap();
            test_roundtrip_with_options(
                vec![document_r1(), document_r2()],
                document_schema(),
                compression,
                Some(row_group_size),
            )
            .unwrap();
        }
    }
}

#[test]
fn test_column_compression_overrides_default() {
    let rows = repetitive_rows(100);
    let bytes = write_to_bytes(
        &rows,
        create_test_schema(),
        WriterBuilder::new()
            .with_compression(Compression::Uncompressed)
            .with_column_compression("name", Compression::Gzip)
            .with_column_compression("active", Compression::Snappy),
    )
    .unwrap();

    let reader = Reader::new(Cursor::new(bytes.clone())).unwrap();
    let codecs: Vec<Compression> = reader.metadata().row_groups[0]
        .columns
        .iter()
        .map(|c| c.compression)
        .collect();
    assert_eq!(
        codecs,
        vec![
            Compression::Uncompressed,
            Compression::Gzip,
            Compression::Uncompressed,
            Compression::Snappy,
        ]
    );
    assert_eq!(read_from_bytes(bytes).unwrap(), rows);
}

#[test]
fn test_column_compression_for_unknown_column() {
    let err = write_to_bytes(
        &repetitive_rows(1),
        create_test_schema(),
        WriterBuilder::new().with_column_compression("nope", Compression::Gzip),
    )
    .unwrap_err();
    assert!(matches!(err, ParquetError::InvalidArgument(_)), "{err}");
}

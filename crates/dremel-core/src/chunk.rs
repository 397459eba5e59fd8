//! Page level storage of one leaf column.

use crate::column::{ColumnDescriptor, LeafColumn};
use crate::compression::Compression;
use crate::dremel::{assemble, shred, Levels};
use crate::encoding::{bit_width, decode_levels, decode_plain, encode_levels, encode_plain};
use crate::metadata::{column_meta, physical_type_of};
use crate::statistics::ColumnStatistics;
use crate::thrift_ext::format::{self, encoding, page_type};
use crate::thrift_ext::{deserialize, serialize};
use crate::traits::ColumnCodec;
use crate::writer::TrackedWrite;
use crate::{ParquetError, ParquetValue, Result};
use bytes::BytesMut;
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::trace;

/// Buffers, statistics and read cursors of one leaf column.
///
/// Every row group is written as a single PLAIN data page.
#[derive(Debug, Clone)]
pub struct ColumnChunk {
    column: LeafColumn,
    compression: Compression,
    levels: Levels,
    stats: ColumnStatistics,
    value_pos: usize,
    def_pos: usize,
    rep_pos: usize,
}

impl ColumnChunk {
    pub fn new(column: LeafColumn, compression: Compression) -> Self {
        Self {
            column,
            compression,
            levels: Levels::new(),
            stats: ColumnStatistics::new(),
            value_pos: 0,
            def_pos: 0,
            rep_pos: 0,
        }
    }

    pub fn column(&self) -> &LeafColumn {
        &self.column
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Statistics of the values added since the last write
    pub fn statistics(&self) -> &ColumnStatistics {
        &self.stats
    }

    /// Buffered values
    pub fn values(&self) -> &[ParquetValue] {
        &self.levels.values
    }

    fn reset(&mut self) {
        self.levels.clear();
        self.stats.clear();
        self.value_pos = 0;
        self.def_pos = 0;
        self.rep_pos = 0;
    }

    /// Level entries buffered, or values for a column without levels
    fn num_entries(&self) -> usize {
        if self.column.max_definition_level() > 0 {
            self.levels.defs.len()
        } else {
            self.levels.values.len()
        }
    }

    fn encode_page(&self) -> Result<BytesMut> {
        let mut body = BytesMut::new();
        let max_rep = self.column.max_repetition_level();
        let max_def = self.column.max_definition_level();
        if max_rep > 0 {
            encode_levels(&self.levels.reps, bit_width(max_rep), &mut body);
        }
        if max_def > 0 {
            encode_levels(&self.levels.defs, bit_width(max_def), &mut body);
        }
        encode_plain(self.column.primitive_type(), &self.levels.values, &mut body)?;
        Ok(body)
    }

    /// Decode one data page holding at most `limit` level entries
    fn decode_page(
        &mut self,
        header: &format::PageHeader,
        page: &[u8],
        limit: usize,
    ) -> Result<usize> {
        let data_header = header.data_page_header.as_ref().ok_or_else(|| {
            ParquetError::corrupt(format!(
                "data page of `{}` has no data page header",
                self.column.name()
            ))
        })?;
        if data_header.encoding != encoding::PLAIN {
            return Err(ParquetError::unsupported(format!(
                "value encoding {} in `{}`",
                data_header.encoding,
                self.column.name()
            )));
        }
        if data_header.definition_level_encoding != encoding::RLE
            || data_header.repetition_level_encoding != encoding::RLE
        {
            return Err(ParquetError::unsupported(format!(
                "level encoding other than RLE in `{}`",
                self.column.name()
            )));
        }
        let num_values = usize::try_from(data_header.num_values)
            .ok()
            .filter(|&n| n <= limit)
            .ok_or_else(|| {
                ParquetError::corrupt(format!(
                    "page of `{}` holds {} values, {} left in the chunk",
                    self.column.name(),
                    data_header.num_values,
                    limit
                ))
            })?;

        let body = self
            .compression
            .decompress(page, header.uncompressed_page_size.max(0) as usize)?;
        let max_rep = self.column.max_repetition_level();
        let max_def = self.column.max_definition_level();
        let mut pos = 0;

        let reps = if max_rep > 0 {
            let (reps, read) = decode_levels(&body, bit_width(max_rep), num_values)?;
            if self.levels.reps.is_empty() && reps.first().is_some_and(|&r| r != 0) {
                return Err(ParquetError::corrupt(format!(
                    "`{}` does not start at a record boundary",
                    self.column.name()
                )));
            }
            if reps.iter().any(|&r| r < 0 || r > max_rep) {
                return Err(ParquetError::corrupt(format!(
                    "repetition level out of range in `{}`",
                    self.column.name()
                )));
            }
            pos += read;
            reps
        } else {
            Vec::new()
        };

        let defs = if max_def > 0 {
            let (defs, read) = decode_levels(&body[pos..], bit_width(max_def), num_values)?;
            if defs.iter().any(|&d| d < 0 || d > max_def) {
                return Err(ParquetError::corrupt(format!(
                    "definition level out of range in `{}`",
                    self.column.name()
                )));
            }
            pos += read;
            defs
        } else {
            Vec::new()
        };
        if max_rep > 0 {
            self.check_nesting(&defs, &reps)?;
        }

        let present = if max_def > 0 {
            defs.iter().filter(|&&d| d == max_def).count()
        } else {
            num_values
        };
        let values = decode_plain(self.column.primitive_type(), &body[pos..], present)?;
        self.levels.reps.extend(reps);
        self.levels.defs.extend(defs);
        self.levels.values.extend(values);
        Ok(num_values)
    }

    /// An entry repeated at level `r` continues a list, so both it and the
    /// entry before it must define the repeated field at that level
    fn check_nesting(&self, defs: &[i16], reps: &[i16]) -> Result<()> {
        let list_defs = self.column.repeated_definition_levels();
        let mut previous = self.levels.defs.last().copied();
        for (&def, &rep) in defs.iter().zip(reps) {
            if rep > 0 {
                let needed = list_defs[rep as usize - 1];
                if !matches!(previous, Some(p) if p >= needed) || def < needed {
                    return Err(ParquetError::corrupt(format!(
                        "`{}` repeats a list at level {} that is not defined",
                        self.column.name(),
                        rep
                    )));
                }
            }
            previous = Some(def);
        }
        Ok(())
    }
}

impl ColumnCodec for ColumnChunk {
    fn descriptor(&self) -> ColumnDescriptor {
        self.column.descriptor()
    }

    fn add(&mut self, record: &ParquetValue) {
        let first_value = self.levels.values.len();
        let first_def = self.levels.defs.len();
        shred(&self.column, record, &mut self.levels);

        for value in &self.levels.values[first_value..] {
            self.stats.update(value);
        }
        let max_def = self.column.max_definition_level();
        let nulls = self.levels.defs[first_def..]
            .iter()
            .filter(|&&d| d < max_def)
            .count();
        self.stats.add_nulls(nulls as u64);
    }

    fn write<W: Write>(
        &mut self,
        sink: &mut TrackedWrite<W>,
        columns: &mut Vec<format::ColumnChunk>,
    ) -> Result<()> {
        let primitive_type = self.column.primitive_type();
        let body = self.encode_page()?;
        let compressed = self.compression.compress(&body)?;
        let num_values = self.num_entries();
        let statistics = self.stats.to_thrift(primitive_type)?;

        let header = format::PageHeader {
            page_type: page_type::DATA_PAGE,
            uncompressed_page_size: body.len() as i32,
            compressed_page_size: compressed.len() as i32,
            data_page_header: Some(format::DataPageHeader {
                num_values: num_values as i32,
                encoding: encoding::PLAIN,
                definition_level_encoding: encoding::RLE,
                repetition_level_encoding: encoding::RLE,
                statistics: Some(statistics.clone()),
            }),
        };
        let header_bytes = serialize(&header)?;

        let offset = sink.bytes_written() as i64;
        sink.write_all(&header_bytes)?;
        sink.write_all(&compressed)?;
        trace!(
            column = %self.column.name(),
            num_values,
            uncompressed = body.len(),
            compressed = compressed.len(),
            "wrote data page"
        );

        columns.push(format::ColumnChunk {
            file_offset: offset,
            meta_data: Some(format::ColumnMetaData {
                physical_type: physical_type_of(primitive_type),
                encodings: vec![encoding::PLAIN, encoding::RLE],
                path_in_schema: self.column.path().iter().map(|p| p.to_string()).collect(),
                codec: self.compression.codec(),
                num_values: num_values as i64,
                total_uncompressed_size: (header_bytes.len() + body.len()) as i64,
                total_compressed_size: (header_bytes.len() + compressed.len()) as i64,
                data_page_offset: offset,
                statistics: Some(statistics),
            }),
        });

        self.reset();
        Ok(())
    }

    fn read<R: Read + Seek>(&mut self, source: &mut R, chunk: &format::ColumnChunk) -> Result<()> {
        self.reset();
        let meta = column_meta(chunk, &self.column)?;
        self.compression = Compression::from_codec(meta.codec)?;

        let size = usize::try_from(meta.total_compressed_size).map_err(|_| {
            ParquetError::corrupt(format!("negative chunk size for `{}`", self.column.name()))
        })?;
        let offset = u64::try_from(meta.data_page_offset).map_err(|_| {
            ParquetError::corrupt(format!("negative offset for `{}`", self.column.name()))
        })?;
        source.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::new();
        source.by_ref().take(size as u64).read_to_end(&mut buf)?;
        if buf.len() != size {
            return Err(ParquetError::corrupt(format!(
                "`{}` runs {} bytes past the end of the file",
                self.column.name(),
                size - buf.len()
            )));
        }

        let expected = usize::try_from(meta.num_values).unwrap_or(0);
        let mut read = 0;
        let mut pos = 0;
        while read < expected {
            if pos >= buf.len() {
                return Err(ParquetError::corrupt(format!(
                    "`{}` ends after {} of {} values",
                    self.column.name(),
                    read,
                    expected
                )));
            }
            let (header, header_len) = deserialize::<format::PageHeader>(&buf[pos..])?;
            pos += header_len;
            let page_len = header.compressed_page_size.max(0) as usize;
            let page = buf.get(pos..pos + page_len).ok_or_else(|| {
                ParquetError::corrupt(format!(
                    "page of `{}` runs past the end of the chunk",
                    self.column.name()
                ))
            })?;
            pos += page_len;

            match header.page_type {
                page_type::DATA_PAGE => {
                    read += self.decode_page(&header, page, expected - read)?;
                    trace!(column = %self.column.name(), read, expected, "read data page");
                }
                page_type::DICTIONARY_PAGE => {
                    return Err(ParquetError::unsupported(format!(
                        "dictionary page in `{}`",
                        self.column.name()
                    )))
                }
                page_type::DATA_PAGE_V2 => {
                    return Err(ParquetError::unsupported(format!(
                        "data page v2 in `{}`",
                        self.column.name()
                    )))
                }
                other => trace!(column = %self.column.name(), page_type = other, "skipped page"),
            }
        }

        if read != expected {
            return Err(ParquetError::corrupt(format!(
                "`{}` holds {} values, metadata says {}",
                self.column.name(),
                read,
                expected
            )));
        }
        Ok(())
    }

    fn scan(&mut self, record: &mut ParquetValue) -> Result<()> {
        if self.num_entries() <= self.level_cursor() {
            return Err(ParquetError::corrupt(format!(
                "`{}` has fewer records than its row group",
                self.column.name()
            )));
        }
        let max_def = self.column.max_definition_level();
        let max_rep = self.column.max_repetition_level();
        let defs = if max_def > 0 {
            &self.levels.defs[self.def_pos..]
        } else {
            &[]
        };
        let reps = if max_rep > 0 {
            &self.levels.reps[self.rep_pos..]
        } else {
            &[]
        };
        let consumed = assemble(
            &self.column,
            record,
            &self.levels.values[self.value_pos..],
            defs,
            reps,
        )?;

        self.value_pos += consumed.values;
        if max_def > 0 {
            self.def_pos += consumed.levels;
        }
        if max_rep > 0 {
            self.rep_pos += consumed.levels;
        }
        Ok(())
    }

    fn levels(&self) -> (&[i16], &[i16]) {
        (&self.levels.defs, &self.levels.reps)
    }
}

impl ColumnChunk {
    fn level_cursor(&self) -> usize {
        if self.column.max_definition_level() > 0 {
            self.def_pos
        } else {
            self.value_pos
        }
    }
}

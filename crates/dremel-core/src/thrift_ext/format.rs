//! The subset of `parquet.thrift` the file container reads and writes.
//!
//! Field ids follow the upstream definitions; enums are kept as their raw
//! `i32` values, with the constants below naming the ones in use.

use super::{
    missing, read_list, read_struct, write_binary, write_i32, write_i32_list, write_i64,
    write_string, write_string_list, write_struct, write_struct_list, TSerializable,
};
use thrift::protocol::{TInputProtocol, TOutputProtocol, TStructIdentifier};

pub mod physical_type {
    pub const BOOLEAN: i32 = 0;
    pub const INT32: i32 = 1;
    pub const INT64: i32 = 2;
    pub const INT96: i32 = 3;
    pub const FLOAT: i32 = 4;
    pub const DOUBLE: i32 = 5;
    pub const BYTE_ARRAY: i32 = 6;
    pub const FIXED_LEN_BYTE_ARRAY: i32 = 7;
}

pub mod converted_type {
    pub const UTF8: i32 = 0;
    pub const UINT_32: i32 = 13;
    pub const UINT_64: i32 = 14;
}

pub mod field_repetition {
    pub const REQUIRED: i32 = 0;
    pub const OPTIONAL: i32 = 1;
    pub const REPEATED: i32 = 2;
}

pub mod encoding {
    pub const PLAIN: i32 = 0;
    pub const RLE: i32 = 3;
}

pub mod page_type {
    pub const DATA_PAGE: i32 = 0;
    pub const DICTIONARY_PAGE: i32 = 2;
    pub const DATA_PAGE_V2: i32 = 3;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub null_count: Option<i64>,
    pub max_value: Option<Vec<u8>>,
    pub min_value: Option<Vec<u8>>,
}

impl TSerializable for Statistics {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let mut stats = Statistics::default();
        read_struct(i_prot, |i_prot, id| {
            match id {
                3 => stats.null_count = Some(i_prot.read_i64()?),
                5 => stats.max_value = Some(i_prot.read_bytes()?),
                6 => stats.min_value = Some(i_prot.read_bytes()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(stats)
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Statistics"))?;
        if let Some(null_count) = self.null_count {
            write_i64(o_prot, "null_count", 3, null_count)?;
        }
        if let Some(max) = &self.max_value {
            write_binary(o_prot, "max_value", 5, max)?;
        }
        if let Some(min) = &self.min_value {
            write_binary(o_prot, "min_value", 6, min)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPageHeader {
    pub num_values: i32,
    pub encoding: i32,
    pub definition_level_encoding: i32,
    pub repetition_level_encoding: i32,
    pub statistics: Option<Statistics>,
}

impl TSerializable for DataPageHeader {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut num_values, mut encoding, mut def_encoding, mut rep_encoding) =
            (None, None, None, None);
        let mut statistics = None;
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => num_values = Some(i_prot.read_i32()?),
                2 => encoding = Some(i_prot.read_i32()?),
                3 => def_encoding = Some(i_prot.read_i32()?),
                4 => rep_encoding = Some(i_prot.read_i32()?),
                5 => statistics = Some(Statistics::read_from_in_protocol(i_prot)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(DataPageHeader {
            num_values: num_values.ok_or_else(|| missing("num_values"))?,
            encoding: encoding.ok_or_else(|| missing("encoding"))?,
            definition_level_encoding: def_encoding
                .ok_or_else(|| missing("definition_level_encoding"))?,
            repetition_level_encoding: rep_encoding
                .ok_or_else(|| missing("repetition_level_encoding"))?,
            statistics,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("DataPageHeader"))?;
        write_i32(o_prot, "num_values", 1, self.num_values)?;
        write_i32(o_prot, "encoding", 2, self.encoding)?;
        write_i32(o_prot, "definition_level_encoding", 3, self.definition_level_encoding)?;
        write_i32(o_prot, "repetition_level_encoding", 4, self.repetition_level_encoding)?;
        if let Some(stats) = &self.statistics {
            write_struct(o_prot, "statistics", 5, stats)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub page_type: i32,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
    pub data_page_header: Option<DataPageHeader>,
}

impl TSerializable for PageHeader {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut page_type, mut uncompressed, mut compressed) = (None, None, None);
        let mut data_page_header = None;
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => page_type = Some(i_prot.read_i32()?),
                2 => uncompressed = Some(i_prot.read_i32()?),
                3 => compressed = Some(i_prot.read_i32()?),
                5 => data_page_header = Some(DataPageHeader::read_from_in_protocol(i_prot)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(PageHeader {
            page_type: page_type.ok_or_else(|| missing("type"))?,
            uncompressed_page_size: uncompressed.ok_or_else(|| missing("uncompressed_page_size"))?,
            compressed_page_size: compressed.ok_or_else(|| missing("compressed_page_size"))?,
            data_page_header,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("PageHeader"))?;
        write_i32(o_prot, "type", 1, self.page_type)?;
        write_i32(o_prot, "uncompressed_page_size", 2, self.uncompressed_page_size)?;
        write_i32(o_prot, "compressed_page_size", 3, self.compressed_page_size)?;
        if let Some(header) = &self.data_page_header {
            write_struct(o_prot, "data_page_header", 5, header)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

impl TSerializable for KeyValue {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut key, mut value) = (None, None);
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => key = Some(i_prot.read_string()?),
                2 => value = Some(i_prot.read_string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(KeyValue {
            key: key.ok_or_else(|| missing("key"))?,
            value,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("KeyValue"))?;
        write_string(o_prot, "key", 1, &self.key)?;
        if let Some(value) = &self.value {
            write_string(o_prot, "value", 2, value)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaElement {
    pub physical_type: Option<i32>,
    pub type_length: Option<i32>,
    pub repetition_type: Option<i32>,
    pub name: String,
    pub num_children: Option<i32>,
    pub converted_type: Option<i32>,
}

impl TSerializable for SchemaElement {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let mut element = SchemaElement::default();
        let mut name = None;
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => element.physical_type = Some(i_prot.read_i32()?),
                2 => element.type_length = Some(i_prot.read_i32()?),
                3 => element.repetition_type = Some(i_prot.read_i32()?),
                4 => name = Some(i_prot.read_string()?),
                5 => element.num_children = Some(i_prot.read_i32()?),
                6 => element.converted_type = Some(i_prot.read_i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        element.name = name.ok_or_else(|| missing("name"))?;
        Ok(element)
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("SchemaElement"))?;
        if let Some(t) = self.physical_type {
            write_i32(o_prot, "type", 1, t)?;
        }
        if let Some(len) = self.type_length {
            write_i32(o_prot, "type_length", 2, len)?;
        }
        if let Some(rep) = self.repetition_type {
            write_i32(o_prot, "repetition_type", 3, rep)?;
        }
        write_string(o_prot, "name", 4, &self.name)?;
        if let Some(n) = self.num_children {
            write_i32(o_prot, "num_children", 5, n)?;
        }
        if let Some(c) = self.converted_type {
            write_i32(o_prot, "converted_type", 6, c)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetaData {
    pub physical_type: i32,
    pub encodings: Vec<i32>,
    pub path_in_schema: Vec<String>,
    pub codec: i32,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub data_page_offset: i64,
    pub statistics: Option<Statistics>,
}

impl TSerializable for ColumnMetaData {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut physical_type, mut encodings, mut path, mut codec) = (None, None, None, None);
        let (mut num_values, mut uncompressed, mut compressed, mut offset) =
            (None, None, None, None);
        let mut statistics = None;
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => physical_type = Some(i_prot.read_i32()?),
                2 => encodings = Some(read_list(i_prot, |p| p.read_i32())?),
                3 => path = Some(read_list(i_prot, |p| p.read_string())?),
                4 => codec = Some(i_prot.read_i32()?),
                5 => num_values = Some(i_prot.read_i64()?),
                6 => uncompressed = Some(i_prot.read_i64()?),
                7 => compressed = Some(i_prot.read_i64()?),
                9 => offset = Some(i_prot.read_i64()?),
                12 => statistics = Some(Statistics::read_from_in_protocol(i_prot)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(ColumnMetaData {
            physical_type: physical_type.ok_or_else(|| missing("type"))?,
            encodings: encodings.ok_or_else(|| missing("encodings"))?,
            path_in_schema: path.ok_or_else(|| missing("path_in_schema"))?,
            codec: codec.ok_or_else(|| missing("codec"))?,
            num_values: num_values.ok_or_else(|| missing("num_values"))?,
            total_uncompressed_size: uncompressed
                .ok_or_else(|| missing("total_uncompressed_size"))?,
            total_compressed_size: compressed.ok_or_else(|| missing("total_compressed_size"))?,
            data_page_offset: offset.ok_or_else(|| missing("data_page_offset"))?,
            statistics,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("ColumnMetaData"))?;
        write_i32(o_prot, "type", 1, self.physical_type)?;
        write_i32_list(o_prot, "encodings", 2, &self.encodings)?;
        write_string_list(o_prot, "path_in_schema", 3, &self.path_in_schema)?;
        write_i32(o_prot, "codec", 4, self.codec)?;
        write_i64(o_prot, "num_values", 5, self.num_values)?;
        write_i64(o_prot, "total_uncompressed_size", 6, self.total_uncompressed_size)?;
        write_i64(o_prot, "total_compressed_size", 7, self.total_compressed_size)?;
        write_i64(o_prot, "data_page_offset", 9, self.data_page_offset)?;
        if let Some(stats) = &self.statistics {
            write_struct(o_prot, "statistics", 12, stats)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunk {
    pub file_offset: i64,
    pub meta_data: Option<ColumnMetaData>,
}

impl TSerializable for ColumnChunk {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut file_offset, mut meta_data) = (None, None);
        read_struct(i_prot, |i_prot, id| {
            match id {
                2 => file_offset = Some(i_prot.read_i64()?),
                3 => meta_data = Some(ColumnMetaData::read_from_in_protocol(i_prot)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(ColumnChunk {
            file_offset: file_offset.ok_or_else(|| missing("file_offset"))?,
            meta_data,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("ColumnChunk"))?;
        write_i64(o_prot, "file_offset", 2, self.file_offset)?;
        if let Some(meta) = &self.meta_data {
            write_struct(o_prot, "meta_data", 3, meta)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub columns: Vec<ColumnChunk>,
    pub total_byte_size: i64,
    pub num_rows: i64,
}

impl TSerializable for RowGroup {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut columns, mut total_byte_size, mut num_rows) = (None, None, None);
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => columns = Some(read_list(i_prot, ColumnChunk::read_from_in_protocol)?),
                2 => total_byte_size = Some(i_prot.read_i64()?),
                3 => num_rows = Some(i_prot.read_i64()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(RowGroup {
            columns: columns.ok_or_else(|| missing("columns"))?,
            total_byte_size: total_byte_size.ok_or_else(|| missing("total_byte_size"))?,
            num_rows: num_rows.ok_or_else(|| missing("num_rows"))?,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("RowGroup"))?;
        write_struct_list(o_prot, "columns", 1, &self.columns)?;
        write_i64(o_prot, "total_byte_size", 2, self.total_byte_size)?;
        write_i64(o_prot, "num_rows", 3, self.num_rows)?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: Vec<SchemaElement>,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroup>,
    pub key_value_metadata: Option<Vec<KeyValue>>,
    pub created_by: Option<String>,
}

impl TSerializable for FileMetaData {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self> {
        let (mut version, mut schema, mut num_rows, mut row_groups) = (None, None, None, None);
        let (mut key_value_metadata, mut created_by) = (None, None);
        read_struct(i_prot, |i_prot, id| {
            match id {
                1 => version = Some(i_prot.read_i32()?),
                2 => schema = Some(read_list(i_prot, SchemaElement::read_from_in_protocol)?),
                3 => num_rows = Some(i_prot.read_i64()?),
                4 => row_groups = Some(read_list(i_prot, RowGroup::read_from_in_protocol)?),
                5 => key_value_metadata = Some(read_list(i_prot, KeyValue::read_from_in_protocol)?),
                6 => created_by = Some(i_prot.read_string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(FileMetaData {
            version: version.ok_or_else(|| missing("version"))?,
            schema: schema.ok_or_else(|| missing("schema"))?,
            num_rows: num_rows.ok_or_else(|| missing("num_rows"))?,
            row_groups: row_groups.ok_or_else(|| missing("row_groups"))?,
            key_value_metadata,
            created_by,
        })
    }

    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("FileMetaData"))?;
        write_i32(o_prot, "version", 1, self.version)?;
        write_struct_list(o_prot, "schema", 2, &self.schema)?;
        write_i64(o_prot, "num_rows", 3, self.num_rows)?;
        write_struct_list(o_prot, "row_groups", 4, &self.row_groups)?;
        if let Some(kv) = &self.key_value_metadata {
            write_struct_list(o_prot, "key_value_metadata", 5, kv)?;
        }
        if let Some(created_by) = &self.created_by {
            write_string(o_prot, "created_by", 6, created_by)?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

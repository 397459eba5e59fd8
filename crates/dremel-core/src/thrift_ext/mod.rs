//! Thrift compact protocol plumbing for footer and page header structs.

pub mod format;
mod protocol;

pub use protocol::TCompactSliceInputProtocol;

use crate::Result;
use thrift::protocol::{
    TCompactOutputProtocol, TFieldIdentifier, TInputProtocol, TListIdentifier, TOutputProtocol,
    TType,
};

/// Reads and writes the struct to Thrift protocols.
///
/// Unlike [`thrift::protocol::TSerializable`] this uses generics instead of trait objects
pub trait TSerializable: Sized {
    fn read_from_in_protocol<T: TInputProtocol>(i_prot: &mut T) -> thrift::Result<Self>;
    fn write_to_out_protocol<T: TOutputProtocol>(&self, o_prot: &mut T) -> thrift::Result<()>;
}

/// Serialize `value` with the compact protocol
pub fn serialize<S: TSerializable>(value: &S) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut o_prot = TCompactOutputProtocol::new(&mut buf);
        value.write_to_out_protocol(&mut o_prot)?;
        o_prot.flush()?;
    }
    Ok(buf)
}

/// Deserialize a value from the start of `buf`; returns it with the number
/// of bytes read
pub fn deserialize<S: TSerializable>(buf: &[u8]) -> Result<(S, usize)> {
    let mut i_prot = TCompactSliceInputProtocol::new(buf);
    let value = S::read_from_in_protocol(&mut i_prot)?;
    Ok((value, buf.len() - i_prot.as_slice().len()))
}

pub(crate) fn missing(field: &str) -> thrift::Error {
    thrift::Error::Protocol(thrift::ProtocolError::new(
        thrift::ProtocolErrorKind::InvalidData,
        format!("missing required field `{field}`"),
    ))
}

fn begin<T: TOutputProtocol>(o_prot: &mut T, name: &str, field_type: TType, id: i16) -> thrift::Result<()> {
    o_prot.write_field_begin(&TFieldIdentifier::new(name, field_type, id))
}

pub(crate) fn write_i32<T: TOutputProtocol>(o_prot: &mut T, name: &str, id: i16, v: i32) -> thrift::Result<()> {
    begin(o_prot, name, TType::I32, id)?;
    o_prot.write_i32(v)?;
    o_prot.write_field_end()
}

pub(crate) fn write_i64<T: TOutputProtocol>(o_prot: &mut T, name: &str, id: i16, v: i64) -> thrift::Result<()> {
    begin(o_prot, name, TType::I64, id)?;
    o_prot.write_i64(v)?;
    o_prot.write_field_end()
}

pub(crate) fn write_string<T: TOutputProtocol>(o_prot: &mut T, name: &str, id: i16, v: &str) -> thrift::Result<()> {
    begin(o_prot, name, TType::String, id)?;
    o_prot.write_string(v)?;
    o_prot.write_field_end()
}

pub(crate) fn write_binary<T: TOutputProtocol>(o_prot: &mut T, name: &str, id: i16, v: &[u8]) -> thrift::Result<()> {
    begin(o_prot, name, TType::String, id)?;
    o_prot.write_bytes(v)?;
    o_prot.write_field_end()
}

pub(crate) fn write_struct<T: TOutputProtocol, S: TSerializable>(
    o_prot: &mut T,
    name: &str,
    id: i16,
    v: &S,
) -> thrift::Result<()> {
    begin(o_prot, name, TType::Struct, id)?;
    v.write_to_out_protocol(o_prot)?;
    o_prot.write_field_end()
}

pub(crate) fn write_struct_list<T: TOutputProtocol, S: TSerializable>(
    o_prot: &mut T,
    name: &str,
    id: i16,
    items: &[S],
) -> thrift::Result<()> {
    begin(o_prot, name, TType::List, id)?;
    o_prot.write_list_begin(&TListIdentifier::new(TType::Struct, items.len() as i32))?;
    for item in items {
        item.write_to_out_protocol(o_prot)?;
    }
    o_prot.write_list_end()?;
    o_prot.write_field_end()
}

pub(crate) fn write_i32_list<T: TOutputProtocol>(o_prot: &mut T, name: &str, id: i16, items: &[i32]) -> thrift::Result<()> {
    begin(o_prot, name, TType::List, id)?;
    o_prot.write_list_begin(&TListIdentifier::new(TType::I32, items.len() as i32))?;
    for item in items {
        o_prot.write_i32(*item)?;
    }
    o_prot.write_list_end()?;
    o_prot.write_field_end()
}

pub(crate) fn write_string_list<T: TOutputProtocol>(
    o_prot: &mut T,
    name: &str,
    id: i16,
    items: &[String],
) -> thrift::Result<()> {
    begin(o_prot, name, TType::List, id)?;
    o_prot.write_list_begin(&TListIdentifier::new(TType::String, items.len() as i32))?;
    for item in items {
        o_prot.write_string(item)?;
    }
    o_prot.write_list_end()?;
    o_prot.write_field_end()
}

pub(crate) fn read_list<T: TInputProtocol, E>(
    i_prot: &mut T,
    mut read: impl FnMut(&mut T) -> thrift::Result<E>,
) -> thrift::Result<Vec<E>> {
    let list = i_prot.read_list_begin()?;
    let mut items = Vec::with_capacity(list.size.clamp(0, 1024) as usize);
    for _ in 0..list.size {
        items.push(read(i_prot)?);
    }
    i_prot.read_list_end()?;
    Ok(items)
}

/// Walk the fields of a struct, handing each `(id, type)` to `read_field`.
///
/// `read_field` returns `false` for ids it does not know; those are skipped.
pub(crate) fn read_struct<T: TInputProtocol>(
    i_prot: &mut T,
    mut read_field: impl FnMut(&mut T, i16) -> thrift::Result<bool>,
) -> thrift::Result<()> {
    i_prot.read_struct_begin()?;
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        let id = thrift::protocol::field_id(&field_ident)?;
        if !read_field(i_prot, id)? {
            i_prot.skip(field_ident.field_type)?;
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()
}

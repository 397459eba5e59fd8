//! Compact protocol reader over an in-memory slice.
//!
//! Every length and element count is checked against the bytes left before
//! anything is allocated, so a corrupt footer fails with an error instead of
//! a huge allocation.

use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TListIdentifier, TMapIdentifier, TMessageIdentifier,
    TSetIdentifier, TStructIdentifier, TType,
};
use thrift::{ProtocolError, ProtocolErrorKind, TransportError, TransportErrorKind};

/// A [`TInputProtocol`] reading the compact encoding from a byte slice
pub struct TCompactSliceInputProtocol<'a> {
    buf: &'a [u8],
    last_read_field_id: i16,
    read_field_id_stack: Vec<i16>,
    pending_read_bool: Option<bool>,
}

impl<'a> TCompactSliceInputProtocol<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            last_read_field_id: 0,
            read_field_id_stack: Vec::new(),
            pending_read_bool: None,
        }
    }

    /// Bytes not read yet
    pub fn as_slice(&self) -> &'a [u8] {
        self.buf
    }

    fn take(&mut self, len: usize) -> thrift::Result<&'a [u8]> {
        if len > self.buf.len() {
            return Err(eof());
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    fn read_vlq(&mut self) -> thrift::Result<u64> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let byte = self.read_byte()?;
            if shift >= 64 {
                return Err(invalid("varint is too long"));
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn read_zigzag(&mut self) -> thrift::Result<i64> {
        let n = self.read_vlq()?;
        Ok((n >> 1) as i64 ^ -((n & 1) as i64))
    }

    /// A collection size, which can never exceed the bytes left since every
    /// element takes at least one
    fn read_size(&mut self) -> thrift::Result<i32> {
        let size = self.read_vlq()?;
        if size > self.buf.len() as u64 {
            return Err(thrift::Error::Protocol(ProtocolError::new(
                ProtocolErrorKind::SizeLimit,
                format!("{size} elements declared with {} bytes left", self.buf.len()),
            )));
        }
        Ok(size as i32)
    }

    fn read_collection_begin(&mut self) -> thrift::Result<(TType, i32)> {
        let header = self.read_byte()?;
        let element_type = collection_type(header & 0x0F)?;
        let size = match header >> 4 {
            15 => self.read_size()?,
            n => i32::from(n),
        };
        Ok((element_type, size))
    }
}

fn eof() -> thrift::Error {
    thrift::Error::Transport(TransportError::new(
        TransportErrorKind::EndOfFile,
        "unexpected end of thrift data",
    ))
}

fn invalid(msg: impl Into<String>) -> thrift::Error {
    thrift::Error::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidData, msg))
}

fn field_type(nibble: u8) -> thrift::Result<TType> {
    match nibble {
        0x00 => Ok(TType::Stop),
        0x01 | 0x02 => Ok(TType::Bool),
        0x03 => Ok(TType::I08),
        0x04 => Ok(TType::I16),
        0x05 => Ok(TType::I32),
        0x06 => Ok(TType::I64),
        0x07 => Ok(TType::Double),
        0x08 => Ok(TType::String),
        0x09 => Ok(TType::List),
        0x0A => Ok(TType::Set),
        0x0B => Ok(TType::Map),
        0x0C => Ok(TType::Struct),
        other => Err(invalid(format!("unknown compact type {other:#x}"))),
    }
}

fn collection_type(nibble: u8) -> thrift::Result<TType> {
    match field_type(nibble)? {
        TType::Stop => Err(invalid("collection of stop fields")),
        t => Ok(t),
    }
}

impl TInputProtocol for TCompactSliceInputProtocol<'_> {
    fn read_message_begin(&mut self) -> thrift::Result<TMessageIdentifier> {
        Err(thrift::Error::Protocol(ProtocolError::new(
            ProtocolErrorKind::NotImplemented,
            "messages are not part of the file format",
        )))
    }

    fn read_message_end(&mut self) -> thrift::Result<()> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> thrift::Result<Option<TStructIdentifier>> {
        self.read_field_id_stack.push(self.last_read_field_id);
        self.last_read_field_id = 0;
        Ok(None)
    }

    fn read_struct_end(&mut self) -> thrift::Result<()> {
        self.last_read_field_id = self
            .read_field_id_stack
            .pop()
            .ok_or_else(|| invalid("struct end without a struct"))?;
        Ok(())
    }

    fn read_field_begin(&mut self) -> thrift::Result<TFieldIdentifier> {
        let header = self.read_byte()?;
        let delta = header >> 4;
        let field_type = match header & 0x0F {
            0x01 => {
                self.pending_read_bool = Some(true);
                TType::Bool
            }
            0x02 => {
                self.pending_read_bool = Some(false);
                TType::Bool
            }
            nibble => field_type(nibble)?,
        };
        if field_type == TType::Stop {
            return Ok(TFieldIdentifier {
                name: None,
                field_type,
                id: None,
            });
        }

        self.last_read_field_id = if delta != 0 {
            self.last_read_field_id
                .checked_add(i16::from(delta))
                .ok_or_else(|| invalid("field id overflows"))?
        } else {
            self.read_i16()?
        };
        Ok(TFieldIdentifier {
            name: None,
            field_type,
            id: Some(self.last_read_field_id),
        })
    }

    fn read_field_end(&mut self) -> thrift::Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> thrift::Result<bool> {
        if let Some(b) = self.pending_read_bool.take() {
            return Ok(b);
        }
        match self.read_byte()? {
            0x01 => Ok(true),
            0x02 => Ok(false),
            other => Err(invalid(format!("invalid bool {other:#x}"))),
        }
    }

    fn read_bytes(&mut self) -> thrift::Result<Vec<u8>> {
        let len = self.read_vlq()?;
        if len > self.buf.len() as u64 {
            return Err(eof());
        }
        Ok(self.take(len as usize)?.to_vec())
    }

    fn read_i8(&mut self) -> thrift::Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    fn read_i16(&mut self) -> thrift::Result<i16> {
        i16::try_from(self.read_zigzag()?).map_err(|_| invalid("i16 out of range"))
    }

    fn read_i32(&mut self) -> thrift::Result<i32> {
        i32::try_from(self.read_zigzag()?).map_err(|_| invalid("i32 out of range"))
    }

    fn read_i64(&mut self) -> thrift::Result<i64> {
        self.read_zigzag()
    }

    fn read_double(&mut self) -> thrift::Result<f64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(f64::from_le_bytes(bytes))
    }

    fn read_string(&mut self) -> thrift::Result<String> {
        String::from_utf8(self.read_bytes()?).map_err(|e| invalid(e.to_string()))
    }

    fn read_list_begin(&mut self) -> thrift::Result<TListIdentifier> {
        let (element_type, size) = self.read_collection_begin()?;
        Ok(TListIdentifier::new(element_type, size))
    }

    fn read_list_end(&mut self) -> thrift::Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> thrift::Result<TSetIdentifier> {
        let (element_type, size) = self.read_collection_begin()?;
        Ok(TSetIdentifier::new(element_type, size))
    }

    fn read_set_end(&mut self) -> thrift::Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> thrift::Result<TMapIdentifier> {
        let size = self.read_size()?;
        if size == 0 {
            return Ok(TMapIdentifier::new(None::<TType>, None::<TType>, 0));
        }
        let types = self.read_byte()?;
        let key_type = collection_type(types >> 4)?;
        let value_type = collection_type(types & 0x0F)?;
        Ok(TMapIdentifier::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> thrift::Result<()> {
        Ok(())
    }

    fn read_byte(&mut self) -> thrift::Result<u8> {
        let (&byte, tail) = self.buf.split_first().ok_or_else(eof)?;
        self.buf = tail;
        Ok(byte)
    }
}

//! Join and leave notices sent by the companion process over plugin messaging.
//!
//! A payload is three strings, each prefixed by its length in bytes as a big
//! endian `u16`: `[type][uuid][name]`. Strings use the modified UTF-8 of Java's
//! `DataOutput::writeUTF`: NUL is `C0 80` and characters outside the BMP are
//! written as two three byte surrogates.

use crate::utils::{HyphenatedUUID, InvalidUUID};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use thiserror::Error;

/// The plugin messaging channel the companion process sends on.
pub const PLUGIN_CHANNEL: &str = "LogChannel";

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated payload: {0}")]
    Io(#[from] io::Error),
    #[error("malformed string at byte {0}")]
    MalformedString(usize),
    #[error(transparent)]
    Uuid(#[from] InvalidUUID),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Join,
    Leave,
}

impl MessageKind {
    pub fn parse(message_type: &str) -> Option<MessageKind> {
        match message_type {
            "Join" => Some(MessageKind::Join),
            "Leave" => Some(MessageKind::Leave),
            _ => None,
        }
    }
}

fn decode_modified_utf8(bytes: &[u8]) -> DecodeResult<String> {
    let continuation = |idx: usize| match bytes.get(idx) {
        Some(&b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(DecodeError::MalformedString(idx)),
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx] as u16;
        match b >> 4 {
            0..=7 => {
                units.push(b);
                idx += 1;
            }
            12 | 13 => {
                units.push((b & 0x1F) << 6 | continuation(idx + 1)?);
                idx += 2;
            }
            14 => {
                units.push((b & 0x0F) << 12 | continuation(idx + 1)? << 6 | continuation(idx + 2)?);
                idx += 3;
            }
            _ => return Err(DecodeError::MalformedString(idx)),
        }
    }
    String::from_utf16(&units).map_err(|_| DecodeError::MalformedString(bytes.len()))
}

fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0xC0 | (unit >> 6) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                bytes.push(0xE0 | (unit >> 12) as u8);
                bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    bytes
}

pub trait MessageDecoderExt: Read + Sized {
    fn read_utf(&mut self) -> DecodeResult<String> {
        let len = self.read_u16::<BigEndian>()?;
        let mut bytes = vec![0; len as usize];
        self.read_exact(&mut bytes)?;
        decode_modified_utf8(&bytes)
    }
}

impl<T: Read> MessageDecoderExt for T {}

pub trait MessageEncoderExt: Write + Sized {
    fn write_utf(&mut self, value: &str) -> io::Result<()> {
        let bytes = encode_modified_utf8(value);
        let len = u16::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too long"))?;
        self.write_u16::<BigEndian>(len)?;
        self.write_all(&bytes)
    }
}

impl<T: Write> MessageEncoderExt for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChannelMessage {
    /// Kept as sent so unknown types can be reported.
    pub message_type: String,
    pub uuid: u128,
    pub name: String,
}

impl LogChannelMessage {
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::parse(&self.message_type)
    }

    pub fn decode(mut data: &[u8]) -> DecodeResult<LogChannelMessage> {
        let message_type = data.read_utf()?;
        let uuid: HyphenatedUUID = data.read_utf()?.parse()?;
        let name = data.read_utf()?;
        Ok(LogChannelMessage {
            message_type,
            uuid: uuid.0,
            name,
        })
    }

    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        data.write_utf(&self.message_type)?;
        data.write_utf(&HyphenatedUUID(self.uuid).to_string())?;
        data.write_utf(&self.name)?;
        Ok(data)
    }
}

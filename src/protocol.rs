//! Host ↔ widget wire protocol.
//!
//! Control values (opcodes, hashes, flags) are fixed-width little-endian.
//! Structured values travel as blobs: a `u64` little-endian length followed
//! by that many bytes of MessagePack.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::net::TcpStream;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::commands::LayoutCmd;
use crate::errors::{Error, Result};
use crate::id::NodeHash;
use crate::input::LayoutInput;
use crate::jobs::JobsReport;
use crate::math::RectPx;
use crate::render_commands::DrawPrim;

/// Largest blob either side accepts.
pub const MAX_FRAME: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Exit = 1,
    Save = 2,
    GetEnv = 3,
    SetEnv = 4,
    Refresh = 5,
    Input = 6,
    Redraw = 7,
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            1 => Opcode::Exit,
            2 => Opcode::Save,
            3 => Opcode::GetEnv,
            4 => Opcode::SetEnv,
            5 => Opcode::Refresh,
            6 => Opcode::Input,
            7 => Opcode::Redraw,
            other => return Err(Error::UnexpectedOpcode(other)),
        })
    }
}

/// Resolved rectangles of one node, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireRect {
    pub canvas: RectPx,
    pub crop: RectPx,
}

/// Rectangles the host resolved for one level, sent back during `REFRESH`
/// and with `REDRAW`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RectsMsg {
    pub cell: i32,
    pub rects: BTreeMap<NodeHash, WireRect>,
}

pub type Buffers = BTreeMap<NodeHash, Vec<DrawPrim>>;

/// Closing message of `REFRESH`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefreshTail {
    pub cmds: Vec<LayoutCmd>,
    pub jobs: JobsReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMsg {
    pub hash: NodeHash,
    pub input: LayoutInput,
}

/// Framed reader/writer pair over an ordered byte stream.
pub struct Wire<R, W> {
    reader: R,
    writer: W,
}

impl Wire<BufReader<TcpStream>, BufWriter<TcpStream>> {
    /// Wraps both halves of a TCP connection.
    pub fn tcp(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let read_half = stream.try_clone()?;
        Ok(Wire::new(BufReader::new(read_half), BufWriter::new(stream)))
    }
}

impl<R: Read, W: Write> Wire<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.writer.write_all(&[v])?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(u8::from(v))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::Protocol(format!("invalid bool byte {other}"))),
        }
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.writer.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    pub fn write_op(&mut self, op: Opcode) -> Result<()> {
        self.write_u8(op as u8)
    }

    pub fn read_op(&mut self) -> Result<Opcode> {
        Opcode::try_from(self.read_u8()?)
    }

    pub fn write_blob<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(value)?;
        if bytes.len() as u64 > MAX_FRAME {
            return Err(Error::FrameTooLarge(bytes.len() as u64));
        }
        self.write_u64(bytes.len() as u64)?;
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    pub fn read_blob<T: DeserializeOwned>(&mut self) -> Result<T> {
        let len = self.read_u64()?;
        if len > MAX_FRAME {
            return Err(Error::FrameTooLarge(len));
        }
        let mut bytes = vec![0u8; len as usize];
        self.reader.read_exact(&mut bytes)?;
        Ok(rmp_serde::from_slice(&bytes)?)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

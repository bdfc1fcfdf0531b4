// SPDX-License-Identifier: MIT

//! RouterOS wire protocol length encoding
//!
//! Word lengths below 0x80 take a single byte; larger lengths use 2-5 bytes
//! with marker bits (0x80/0xC0/0xE0/0xF0) in the leading byte.

use tokio::io::{AsyncRead, AsyncReadExt};

// Intentional truncation is part of the wire format
#[allow(clippy::cast_possible_truncation)]
pub fn encode_length(len: usize) -> Vec<u8> {
    match len {
        0..0x80 => vec![len as u8],
        0x80..0x4000 => vec![(len >> 8) as u8 | 0x80, len as u8],
        0x4000..0x0020_0000 => vec![(len >> 16) as u8 | 0xC0, (len >> 8) as u8, len as u8],
        0x0020_0000..0x1000_0000 => vec![
            (len >> 24) as u8 | 0xE0,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ],
        _ => vec![
            (len >> 32) as u8 | 0xF0,
            (len >> 24) as u8,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ],
    }
}

pub(super) async fn read_length<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let first = reader.read_u8().await?;
    let len = if first & 0x80 == 0 {
        first as usize
    } else if first & 0xC0 == 0x80 {
        let second = reader.read_u8().await?;
        (((first & 0x3F) as usize) << 8) | second as usize
    } else if first & 0xE0 == 0xC0 {
        let second = reader.read_u8().await?;
        let third = reader.read_u8().await?;
        (((first & 0x1F) as usize) << 16) | ((second as usize) << 8) | third as usize
    } else if first & 0xF0 == 0xE0 {
        let second = reader.read_u8().await?;
        let third = reader.read_u8().await?;
        let fourth = reader.read_u8().await?;
        (((first & 0x0F) as usize) << 24)
            | ((second as usize) << 16)
            | ((third as usize) << 8)
            | fourth as usize
    } else {
        let b2 = reader.read_u8().await?;
        let b3 = reader.read_u8().await?;
        let b4 = reader.read_u8().await?;
        let b5 = reader.read_u8().await?;
        ((first & 0x07) as usize) << 32
            | (b2 as usize) << 24
            | (b3 as usize) << 16
            | (b4 as usize) << 8
            | b5 as usize
    };
    Ok(len)
}

use byteorder::{ByteOrder, LittleEndian};
use memchr::memchr;

use crate::error::{protocol_err, Error};

/// Read-side primitive decoding over a byte slice, advancing it as bytes are
/// consumed. All accessors are little-endian, matching the wire format.
pub trait MySqlBufExt<'a> {
    fn get_u8(&mut self) -> Result<u8, Error>;
    fn get_i8(&mut self) -> Result<i8, Error>;
    fn get_u16_le(&mut self) -> Result<u16, Error>;
    fn get_i16_le(&mut self) -> Result<i16, Error>;
    fn get_u24_le(&mut self) -> Result<u32, Error>;
    fn get_u32_le(&mut self) -> Result<u32, Error>;
    fn get_i32_le(&mut self) -> Result<i32, Error>;
    fn get_u64_le(&mut self) -> Result<u64, Error>;
    fn get_i64_le(&mut self) -> Result<i64, Error>;
    fn get_f32_le(&mut self) -> Result<f32, Error>;
    fn get_f64_le(&mut self) -> Result<f64, Error>;

    fn get_bytes(&mut self, len: usize) -> Result<&'a [u8], Error>;
    fn get_str(&mut self, len: usize) -> Result<&'a str, Error>;
    fn get_str_nul(&mut self) -> Result<&'a str, Error>;

    /// A length-encoded integer. `None` denotes SQL NULL (lead byte `0xFB`).
    fn get_uint_lenenc(&mut self) -> Result<Option<u64>, Error>;
    fn get_str_lenenc(&mut self) -> Result<Option<&'a str>, Error>;
    fn get_bytes_lenenc(&mut self) -> Result<Option<&'a [u8]>, Error>;
}

impl<'a> MySqlBufExt<'a> for &'a [u8] {
    fn get_u8(&mut self) -> Result<u8, Error> {
        let (&first, rest) = self
            .split_first()
            .ok_or_else(|| protocol_err!("unexpected end of packet reading u8"))?;
        *self = rest;
        Ok(first)
    }

    fn get_i8(&mut self) -> Result<i8, Error> {
        Ok(self.get_u8()? as i8)
    }

    fn get_u16_le(&mut self) -> Result<u16, Error> {
        let bytes = self.get_bytes(2)?;
        Ok(LittleEndian::read_u16(bytes))
    }

    fn get_i16_le(&mut self) -> Result<i16, Error> {
        let bytes = self.get_bytes(2)?;
        Ok(LittleEndian::read_i16(bytes))
    }

    fn get_u24_le(&mut self) -> Result<u32, Error> {
        let bytes = self.get_bytes(3)?;
        Ok(LittleEndian::read_u24(bytes))
    }

    fn get_u32_le(&mut self) -> Result<u32, Error> {
        let bytes = self.get_bytes(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    fn get_i32_le(&mut self) -> Result<i32, Error> {
        let bytes = self.get_bytes(4)?;
        Ok(LittleEndian::read_i32(bytes))
    }

    fn get_u64_le(&mut self) -> Result<u64, Error> {
        let bytes = self.get_bytes(8)?;
        Ok(LittleEndian::read_u64(bytes))
    }

    fn get_i64_le(&mut self) -> Result<i64, Error> {
        let bytes = self.get_bytes(8)?;
        Ok(LittleEndian::read_i64(bytes))
    }

    fn get_f32_le(&mut self) -> Result<f32, Error> {
        let bytes = self.get_bytes(4)?;
        Ok(LittleEndian::read_f32(bytes))
    }

    fn get_f64_le(&mut self) -> Result<f64, Error> {
        let bytes = self.get_bytes(8)?;
        Ok(LittleEndian::read_f64(bytes))
    }

    fn get_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.len() < len {
            return Err(protocol_err!(
                "unexpected end of packet: wanted {} bytes, have {}",
                len,
                self.len()
            ));
        }

        let (value, rest) = self.split_at(len);
        *self = rest;
        Ok(value)
    }

    fn get_str(&mut self, len: usize) -> Result<&'a str, Error> {
        let bytes = self.get_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|e| protocol_err!("invalid utf-8: {}", e))
    }

    fn get_str_nul(&mut self) -> Result<&'a str, Error> {
        let nul = memchr(b'\0', self).ok_or_else(|| protocol_err!("missing NUL terminator"))?;
        let s = self.get_str(nul)?;
        self.get_u8()?; // consume the NUL
        Ok(s)
    }

    fn get_uint_lenenc(&mut self) -> Result<Option<u64>, Error> {
        Ok(match self.get_u8()? {
            0xFB => None,
            0xFC => Some(u64::from(self.get_u16_le()?)),
            0xFD => Some(u64::from(self.get_u24_le()?)),
            0xFE => Some(self.get_u64_le()?),
            0xFF => return Err(protocol_err!("0xFF is a reserved lenenc-int lead byte")),
            small => Some(u64::from(small)),
        })
    }

    fn get_str_lenenc(&mut self) -> Result<Option<&'a str>, Error> {
        match self.get_uint_lenenc()? {
            None => Ok(None),
            Some(len) => Ok(Some(self.get_str(len as usize)?)),
        }
    }

    fn get_bytes_lenenc(&mut self) -> Result<Option<&'a [u8]>, Error> {
        match self.get_uint_lenenc()? {
            None => Ok(None),
            Some(len) => Ok(Some(self.get_bytes(len as usize)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenenc_boundaries_round_trip() {
        use crate::io::MySqlBufMutExt;

        let samples: &[u64] = &[
            0,
            1,
            250,
            0xFA,
            0xFB - 1,
            0xFC,
            0xFFFF,
            0x1_0000,
            0xFF_FFFF,
            0x100_0000,
            u32::MAX as u64,
            u32::MAX as u64 + 1,
            u64::MAX,
        ];

        for &n in samples {
            let mut buf = Vec::new();
            buf.put_uint_lenenc(n);

            let mut slice = &buf[..];
            assert_eq!(slice.get_uint_lenenc().unwrap(), Some(n), "round trip of {n}");
            assert!(slice.is_empty(), "lenenc encoding of {n} left trailing bytes");
        }
    }

    #[test]
    fn lenenc_null_round_trips() {
        let buf = [0xFBu8];
        let mut slice = &buf[..];
        assert_eq!(slice.get_uint_lenenc().unwrap(), None);
    }

    #[test]
    fn lenenc_rejects_reserved_ff() {
        let buf = [0xFFu8, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut slice = &buf[..];
        assert!(slice.get_uint_lenenc().is_err());
    }

    #[test]
    fn short_read_does_not_panic() {
        let buf = [0xFEu8, 1, 2, 3];
        let mut slice = &buf[..];
        assert!(slice.get_uint_lenenc().is_err());
    }

    #[test]
    fn str_nul_stops_before_terminator() {
        let buf = b"hello\0world";
        let mut slice = &buf[..];
        assert_eq!(slice.get_str_nul().unwrap(), "hello");
        assert_eq!(slice, b"world");
    }
}

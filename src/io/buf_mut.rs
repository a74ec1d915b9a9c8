use byteorder::{ByteOrder, LittleEndian};

/// Write-side primitive encoding into a `Vec<u8>`. Writers are infallible
/// modulo allocation; the length-encoded forms choose the smallest encoding
/// that fits the value.
pub trait MySqlBufMutExt {
    fn put_u8(&mut self, value: u8);
    fn put_i8(&mut self, value: i8);
    fn put_u16_le(&mut self, value: u16);
    fn put_i16_le(&mut self, value: i16);
    fn put_u24_le(&mut self, value: u32);
    fn put_u32_le(&mut self, value: u32);
    fn put_i32_le(&mut self, value: i32);
    fn put_u64_le(&mut self, value: u64);
    fn put_i64_le(&mut self, value: i64);
    fn put_f32_le(&mut self, value: f32);
    fn put_f64_le(&mut self, value: f64);

    fn put_bytes(&mut self, bytes: &[u8]);
    fn put_str(&mut self, value: &str);
    fn put_str_nul(&mut self, value: &str);

    fn put_uint_lenenc(&mut self, value: u64);
    fn put_str_lenenc(&mut self, value: &str);
    fn put_bytes_lenenc(&mut self, value: &[u8]);
}

impl MySqlBufMutExt for Vec<u8> {
    fn put_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn put_i8(&mut self, value: i8) {
        self.push(value as u8);
    }

    fn put_u16_le(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_i16_le(&mut self, value: i16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_i16(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_u24_le(&mut self, value: u32) {
        let mut buf = [0u8; 3];
        LittleEndian::write_u24(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_u32_le(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_i32_le(&mut self, value: i32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_i32(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_u64_le(&mut self, value: u64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_i64_le(&mut self, value: i64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_i64(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_f32_le(&mut self, value: f32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_f32(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_f64_le(&mut self, value: f64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, value);
        self.extend_from_slice(&buf);
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn put_str(&mut self, value: &str) {
        self.extend_from_slice(value.as_bytes());
    }

    fn put_str_nul(&mut self, value: &str) {
        self.extend_from_slice(value.as_bytes());
        self.push(0);
    }

    fn put_uint_lenenc(&mut self, value: u64) {
        if value < 0xFB {
            self.put_u8(value as u8);
        } else if value <= 0xFFFF {
            self.put_u8(0xFC);
            self.put_u16_le(value as u16);
        } else if value <= 0xFF_FFFF {
            self.put_u8(0xFD);
            self.put_u24_le(value as u32);
        } else {
            self.put_u8(0xFE);
            self.put_u64_le(value);
        }
    }

    fn put_str_lenenc(&mut self, value: &str) {
        self.put_uint_lenenc(value.len() as u64);
        self.put_str(value);
    }

    fn put_bytes_lenenc(&mut self, value: &[u8]) {
        self.put_uint_lenenc(value.len() as u64);
        self.put_bytes(value);
    }
}

use crc::{Crc, CRC_16_XMODEM};

/// CRC-16/CCITT with polynomial 0x1021, initial value 0, no reflection.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Size of the trailing CRC on the wire.
pub const CRC_SIZE: usize = 2;

/// Compute the frame checksum over header + payload.
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

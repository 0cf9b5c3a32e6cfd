use std::convert::TryFrom;

use byteorder::{ReadBytesExt, WriteBytesExt};
use num::traits::{FromPrimitive, ToPrimitive};
use rega_util::Endian;
use thiserror::Error;

use crate::constants::{HEADER_BYTES, MAGIC, RECORD_BYTES};
use crate::dictionary::{Mnemonic, OperandMode};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("operand payload {0} does not fit in the 32-bit signed wire format")]
    BadOperationSize(i64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognized opcode {0}")]
    BadOpcode(i16),
    #[error("unrecognized operand mode {0}")]
    BadOperandMode(i8),
}

/// An operand as produced by the parser: a wire mode tag plus a payload
/// wide enough to catch out-of-range literals before encoding truncates them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ParsedOperand {
    pub mode: OperandMode,
    pub payload: i64,
}

impl ParsedOperand {
    pub const NOP: ParsedOperand = ParsedOperand {
        mode: OperandMode::Nop,
        payload: 0,
    };
}

/// One parsed instruction: a mnemonic and its (always two) operand slots.
/// Unary and nop-arity operations carry [`ParsedOperand::NOP`] in the slots
/// they don't use, per the wire format's fixed two-operand shape.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ParsedOperation {
    pub mnemonic: Mnemonic,
    pub operand1: ParsedOperand,
    pub operand2: ParsedOperand,
}

/// A decoded 12-byte record, as read back out of a bytecode buffer at
/// execution time.
#[derive(Clone, Copy, Debug)]
pub struct DecodedRecord {
    pub mnemonic: Mnemonic,
    pub mode1: OperandMode,
    pub payload1: i32,
    pub mode2: OperandMode,
    pub payload2: i32,
}

/// Serializes the 8-byte file header: magic, two padding bytes, checksum.
pub fn encode_header(checksum: u32) -> [u8; HEADER_BYTES] {
    let mut buf = [0u8; HEADER_BYTES];
    {
        let mut w = &mut buf[..];
        w.write_i16::<Endian>(MAGIC).unwrap();
        w.write_i16::<Endian>(0).unwrap();
        w.write_u32::<Endian>(checksum).unwrap();
    }
    buf
}

/// The 8-byte file header: magic number plus the stored source checksum.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Header {
    pub magic: i16,
    pub checksum: u32,
}

pub fn decode_header(buf: &[u8]) -> Header {
    let mut r = &buf[..HEADER_BYTES];
    let magic = r.read_i16::<Endian>().unwrap();
    let _padding = r.read_i16::<Endian>().unwrap();
    let checksum = r.read_u32::<Endian>().unwrap();
    Header { magic, checksum }
}

/// Serializes a checksum and operation list into a complete bytecode file.
pub fn encode(checksum: u32, operations: &[ParsedOperation]) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(HEADER_BYTES + operations.len() * RECORD_BYTES);
    buf.extend_from_slice(&encode_header(checksum));
    for operation in operations {
        encode_record(&mut buf, operation)?;
    }
    Ok(buf)
}

fn encode_record(buf: &mut Vec<u8>, operation: &ParsedOperation) -> Result<(), EncodeError> {
    let start = buf.len();
    buf.write_i16::<Endian>(operation.mnemonic.opcode()).unwrap();
    write_operand(buf, &operation.operand1)?;
    write_operand(buf, &operation.operand2)?;
    debug_assert_eq!(buf.len() - start, RECORD_BYTES);
    Ok(())
}

fn write_operand(buf: &mut Vec<u8>, operand: &ParsedOperand) -> Result<(), EncodeError> {
    let payload = i32::try_from(operand.payload)
        .map_err(|_| EncodeError::BadOperationSize(operand.payload))?;
    buf.write_i8(operand.mode.to_i8().unwrap()).unwrap();
    buf.write_i32::<Endian>(payload).unwrap();
    Ok(())
}

/// Reads the 12-byte record at `offset` in the code region (the bytecode
/// buffer with the 8-byte header already stripped).
pub fn decode_record(code: &[u8], offset: usize) -> Result<DecodedRecord, DecodeError> {
    let mut r = &code[offset..offset + RECORD_BYTES];
    let opcode = r.read_i16::<Endian>().unwrap();
    let mode1 = r.read_i8().unwrap();
    let payload1 = r.read_i32::<Endian>().unwrap();
    let mode2 = r.read_i8().unwrap();
    let payload2 = r.read_i32::<Endian>().unwrap();

    let mnemonic = Mnemonic::from_opcode(opcode).ok_or(DecodeError::BadOpcode(opcode))?;
    let mode1 = OperandMode::from_i8(mode1).ok_or(DecodeError::BadOperandMode(mode1))?;
    let mode2 = OperandMode::from_i8(mode2).ok_or(DecodeError::BadOperandMode(mode2))?;

    Ok(DecodedRecord {
        mnemonic,
        mode1,
        payload1,
        mode2,
        payload2,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn op(mnemonic: Mnemonic, operand1: ParsedOperand, operand2: ParsedOperand) -> ParsedOperation {
        ParsedOperation {
            mnemonic,
            operand1,
            operand2,
        }
    }

    #[test]
    fn record_round_trips_through_encode_and_decode() {
        let operation = op(
            Mnemonic::MOV,
            ParsedOperand {
                mode: OperandMode::Register,
                payload: 0,
            },
            ParsedOperand {
                mode: OperandMode::InPlaceValue,
                payload: 3,
            },
        );

        let bytes = encode(0, &[operation]).unwrap();
        assert_eq!(bytes.len(), HEADER_BYTES + RECORD_BYTES);

        let decoded = decode_record(&bytes[HEADER_BYTES..], 0).unwrap();
        assert_eq!(decoded.mnemonic, Mnemonic::MOV);
        assert_eq!(decoded.mode2, OperandMode::InPlaceValue);
        assert_eq!(decoded.payload2, 3);
    }

    #[test]
    fn header_packs_magic_padding_and_checksum() {
        let header = encode_header(1234);
        assert_eq!(header.len(), HEADER_BYTES);
        assert_eq!(&header[0..2], &(0x1235i16).to_le_bytes());
        assert_eq!(&header[4..8], &1234u32.to_le_bytes());

        let decoded = decode_header(&header);
        assert_eq!(decoded.magic, MAGIC);
        assert_eq!(decoded.checksum, 1234);
    }

    #[test]
    fn oversize_payload_is_rejected() {
        let operation = op(Mnemonic::MOV, ParsedOperand::NOP, ParsedOperand {
            mode: OperandMode::InPlaceValue,
            payload: i64::from(i32::MAX) + 1,
        });

        let err = encode(0, &[operation]).unwrap_err();
        assert!(matches!(err, EncodeError::BadOperationSize(_)));
    }
}

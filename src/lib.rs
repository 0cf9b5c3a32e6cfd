extern crate num;
#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod dictionary;
pub mod encoder;
pub mod parser;
pub mod vm;

pub use dictionary::{Mnemonic, OpType, OperandMode, RegisterId};
pub use encoder::{decode_header, decode_record, encode, DecodeError, EncodeError, Header};
pub use parser::{parse, ParseError, ParsingError};
pub use vm::{execute, RuntimeError, VmState};

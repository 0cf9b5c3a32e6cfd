/// Number of addressable integer cells in VM-owned linear memory.
pub const VM_MEM_SIZE: usize = 1024;

/// Number of named registers (`r1 r2 r3 r4 A EQ LT GT NE`).
pub const REGISTER_COUNT: usize = 9;

/// Size in bytes of a single bytecode record: `opcode:i16, mode1:i8,
/// payload1:i32, mode2:i8, payload2:i32`.
pub const RECORD_BYTES: usize = 12;

/// Size in bytes of the bytecode file header: 2 magic, 2 padding, 4 checksum.
pub const HEADER_BYTES: usize = 8;

/// Magic number identifying a bytecode file, stored little-endian at offset 0.
pub const MAGIC: i16 = 0x1235;

/// Label index 0 is reserved; the first label name encountered during
/// parsing is assigned index 1.
pub const FIRST_LABEL_INDEX: i32 = 1;

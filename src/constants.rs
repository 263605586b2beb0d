//! Magic numbers pulled straight out of the object-record format: ids the
//! host engine treats specially, plus the float-precision boundary that
//! drives bit-packing.

/// Default register counter id (`MEMREG`). One below `DEFAULT_PTRPOS_ID`.
pub const DEFAULT_MEMREG_ID: u32 = 9998;

/// Default pointer-tracking counter id (`PTRPOS`). Configurable ceiling.
pub const DEFAULT_PTRPOS_ID: u32 = 9999;

/// `--mem-ptr-pos` may not exceed this.
pub const MAX_PTRPOS_ID: u32 = 9999;

/// Above this magnitude a host float can no longer represent an integer
/// exactly; triggers the bit-packing warning/decomposition.
pub const FLOAT_PRECISION_BOUNDARY: f64 = 16_777_216.0;

/// Divisor used by the big/small bit-packing decomposition.
pub const BIT_PACK_DIVISOR: i64 = 65536;

/// One engine frame at 240 Hz; the helper-spawn-trigger delay.
pub const ONE_FRAME_DELAY: f64 = 0.0042;

/// Collision block id used by the memory machine's padding block on the
/// left end of the tape.
pub const LEFT_PAD_BLOCK_ID: u32 = 9997;

/// Collision block id used by the padding block on the right end of the
/// tape. Numerically coincides with `DEFAULT_MEMREG_ID` but lives in the
/// separate block-id namespace, not the item/counter namespace.
pub const RIGHT_PAD_BLOCK_ID: u32 = 9998;

/// Collision block id of the movable memory pointer.
pub const POINTER_BLOCK_ID: u32 = 9999;

/// World position the memory machine is anchored at before the
/// per-subroutine-count vertical offset is applied.
pub const MEMORY_BLOCK_POS: (f64, f64) = (45.0, 165.0);

/// Minimum and maximum valid item id (`C<n>` / `T<n>`).
pub const MIN_ITEM_ID: i64 = 1;
pub const MAX_ITEM_ID: i64 = 65535;

pub const I32_MIN: i64 = i32::MIN as i64;
pub const I32_MAX_EXCLUSIVE: i64 = 1i64 << 31;

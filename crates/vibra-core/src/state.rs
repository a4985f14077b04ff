//! Binary persistence of parameter values.
//!
//! The layout is the concatenation of every parameter's current value as a
//! 4-byte little-endian IEEE-754 float, in declaration order. There is no
//! header, length prefix, version or tag: a delay with `[gain, delay,
//! feedback, mix]` persists as exactly 16 bytes.
//!
//! Decoding is positional. Extra trailing bytes are ignored; a short buffer
//! leaves the missing trailing parameters reading `0.0` (then clamped).
//! Neither case is reported here; callers that care compare
//! [`StateCodec::encoded_len`] with the byte count themselves.
//!
//! ```rust
//! use vibra_core::{ParamDescriptor, ParameterStore, StateCodec};
//!
//! const PARAMS: &[ParamDescriptor] = &[
//!     ParamDescriptor::unit_interval("gain", "Gain", 0.5),
//!     ParamDescriptor::unit_interval("mix", "Mix", 0.5),
//! ];
//!
//! let a = ParameterStore::new(PARAMS);
//! a.set("mix", 0.9);
//! let bytes = StateCodec::encode(&a);
//! assert_eq!(bytes.len(), 8);
//!
//! let b = ParameterStore::new(PARAMS);
//! StateCodec::decode(&bytes, &b);
//! assert_eq!(b.get("mix"), Some(0.9));
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use crate::store::ParameterStore;
use alloc::vec::Vec;

/// Size of one persisted value.
pub const VALUE_SIZE: usize = 4;

/// Fixed-order float codec for [`ParameterStore`] contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateCodec;

impl StateCodec {
    /// Bytes produced by [`encode`](Self::encode) for this store.
    pub fn encoded_len(store: &ParameterStore) -> usize {
        store.len() * VALUE_SIZE
    }

    /// Serializes every current value in declaration order.
    pub fn encode(store: &ParameterStore) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::encoded_len(store));
        Self::encode_into(store, &mut bytes);
        bytes
    }

    /// Appends the serialized values to `out`.
    pub fn encode_into(store: &ParameterStore, out: &mut Vec<u8>) {
        for param in store.params() {
            out.extend_from_slice(&param.get().to_le_bytes());
        }
    }

    /// Reads values positionally and applies each through the parameter's
    /// setter, so clamping and observers run as for any other write.
    ///
    /// Returns the number of complete values present in `bytes`.
    pub fn decode(bytes: &[u8], store: &ParameterStore) -> usize {
        let mut chunks = bytes.chunks_exact(VALUE_SIZE);
        let mut complete = 0;
        for param in store.params() {
            let value = match chunks.next() {
                Some(chunk) => {
                    complete += 1;
                    f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
                }
                None => 0.0,
            };
            param.set(value);
        }
        complete
    }
}

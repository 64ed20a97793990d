use byteorder::{ByteOrder, LittleEndian};
use zeroize::Zeroize;

/// Width of the permutation state in bytes.
pub const WIDTH: usize = 48;

/// Bytes absorbed into or squeezed out of the state per duplex call.
pub const RATE: usize = 16;

/// The Xoodoo\[12\] permutation state: twelve 32-bit lanes arranged as three
/// planes of four.
#[derive(Clone, Debug, Zeroize)]
pub struct Xoodoo([u32; 12]);

impl Xoodoo {
    /// Returns a state loaded from its 48-byte little-endian serialization.
    pub fn from_bytes(bytes: &[u8; WIDTH]) -> Xoodoo {
        let mut lanes = [0u32; 12];
        LittleEndian::read_u32_into(bytes, &mut lanes);
        Xoodoo(lanes)
    }

    /// Serializes the rate portion of the state (the first four lanes).
    #[inline(always)]
    pub fn extract_rate(&self, out: &mut [u8; RATE]) {
        LittleEndian::write_u32_into(&self.0[..4], out);
    }

    /// Overwrites the rate portion of the state with the given block.
    #[inline(always)]
    pub fn replace_rate(&mut self, block: &[u8; RATE]) {
        LittleEndian::read_u32_into(block, &mut self.0[..4]);
    }

    /// XORs a domain separation constant into the last lane.
    #[inline(always)]
    pub fn add_domain(&mut self, bits: u32) {
        self.0[11] ^= bits;
    }

    /// Applies the full 12-round permutation to the state.
    pub fn permute(&mut self) {
        for &round_key in &ROUND_KEYS {
            round(&mut self.0, round_key);
        }
    }
}

#[inline(always)]
fn round(st: &mut [u32; 12], round_key: u32) {
    let mut e = [0u32; 4];
    for i in 0..4 {
        let p = st[i] ^ st[i + 4] ^ st[i + 8];
        e[i] = p.rotate_left(14);
        e[i] ^= e[i].rotate_left(23);
    }
    for (i, lane) in st.iter_mut().enumerate() {
        *lane ^= e[(i + 3) & 3];
    }

    st[4..8].rotate_right(1);
    st[0] ^= round_key;

    for i in 0..4 {
        let a = st[i];
        let b = st[i + 4];
        let c = st[i + 8].rotate_left(11);
        st[i + 8] = ((b & !a) ^ c).rotate_left(8);
        st[i + 4] = ((a & !c) ^ b).rotate_left(1);
        st[i] ^= c & !b;
    }

    st.swap(8, 10);
    st.swap(9, 11);
}

const ROUND_KEYS: [u32; 12] = [
    0x058, 0x038, 0x3c0, 0x0d0, 0x120, 0x014, 0x060, 0x02c, 0x380, 0x0f0, 0x1a0, 0x012,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permute_zero_state() {
        let mut st = Xoodoo::from_bytes(&[0u8; WIDTH]);
        st.permute();
        assert_eq!(
            st.0,
            [
                0x89d5d88d, 0xa963fcbf, 0x1b232d19, 0xffa5a014, 0x36b18106, 0xafc7c1fe,
                0xaee57cbe, 0xa77540bd, 0x2e86e870, 0xfef5b7c9, 0x8b4fadf2, 0x5e4f4062,
            ]
        );
    }

    #[test]
    fn permute_counter_state() {
        let mut bytes = [0u8; WIDTH];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut st = Xoodoo::from_bytes(&bytes);
        st.permute();
        assert_eq!(
            st.0,
            [
                0xb5ae3376, 0x60bfcc5d, 0xd7dfa6d4, 0xbf066d50, 0xae97acb2, 0xd38a0d97,
                0x7b118513, 0x41a775b7, 0x0b54b1b3, 0x6fe93bb5, 0xaf8f2b3b, 0xb6a376a6,
            ]
        );
    }

    #[test]
    fn rate_round_trip() {
        let mut st = Xoodoo::from_bytes(&[0u8; WIDTH]);
        let block = [0xa5u8; RATE];
        st.replace_rate(&block);
        let mut out = [0u8; RATE];
        st.extract_rate(&mut out);
        assert_eq!(out, block);
    }
}

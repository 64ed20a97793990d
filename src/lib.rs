#![cfg_attr(not(feature = "std"), no_std)]

//! An authenticated session cipher and hash built on the Xoodoo\[12\]
//! permutation.
//!
//! A [`Charm`] session is seeded with a 256-bit key and an optional 128-bit
//! nonce, then drives a 128-bit-rate duplex over a single message:
//! [`encrypt`](Charm::encrypt) and [`decrypt`](Charm::decrypt) work in place
//! on the caller's buffer and produce or verify a 16-byte tag, while
//! [`hash`](Charm::hash) produces a 32-byte digest. A session is consumed by
//! one message operation; create a fresh session with the same key and nonce
//! to process another.
//!
//! ```
//! use charm::Charm;
//!
//! let key = [0x42u8; 32];
//! let nonce = [0x24u8; 16];
//!
//! let mut session = Charm::new(&key, Some(&nonce))?;
//! let mut msg = *b"attack at dawn";
//! let tag = session.encrypt(&mut msg);
//!
//! let mut session = Charm::new(&key, Some(&nonce))?;
//! session.decrypt(&mut msg, &tag)?;
//! assert_eq!(&msg, b"attack at dawn");
//! # Ok::<(), charm::Error>(())
//! ```

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

mod fuzzing;
mod xoodoo;

use crate::xoodoo::{Xoodoo, RATE, WIDTH};

/// The length of a key, in bytes.
pub const KEY_LEN: usize = 32;

/// The length of a nonce, in bytes.
pub const NONCE_LEN: usize = 16;

/// The length of an authentication tag, in bytes.
pub const TAG_LEN: usize = 16;

/// The length of a hash output, in bytes.
pub const HASH_LEN: usize = 32;

/// The ways a session operation can fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The key was not exactly [`KEY_LEN`] bytes.
    InvalidKeyLen,
    /// A nonce was supplied but was not exactly [`NONCE_LEN`] bytes.
    InvalidNonceLen,
    /// The expected tag was not exactly [`TAG_LEN`] bytes.
    InvalidTagLen,
    /// The computed tag did not match the expected tag. The message buffer
    /// has been zeroed.
    TagVerifyFail,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Error::InvalidKeyLen => "invalid key length",
            Error::InvalidNonceLen => "invalid nonce length",
            Error::InvalidTagLen => "invalid tag length",
            Error::TagVerifyFail => "tag verification failed",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A single-message cipher/hash session over the Xoodoo permutation.
///
/// A session owns only its 48-byte state, which is wiped on drop. Operations
/// take `&mut self`, so a session cannot be shared across threads; independent
/// sessions are fine to use in parallel.
#[derive(Clone, Debug, ZeroizeOnDrop)]
pub struct Charm {
    state: Xoodoo,
}

impl Charm {
    /// Creates a new session from a 32-byte key and an optional 16-byte
    /// nonce. An absent nonce is equivalent to 16 zero bytes.
    pub fn new(key: &[u8], nonce: Option<&[u8]>) -> Result<Charm, Error> {
        if key.len() != KEY_LEN {
            return Err(Error::InvalidKeyLen);
        }
        if let Some(nonce) = nonce {
            if nonce.len() != NONCE_LEN {
                return Err(Error::InvalidNonceLen);
            }
        }

        let mut header = Zeroizing::new([0u8; WIDTH]);
        if let Some(nonce) = nonce {
            header[..NONCE_LEN].copy_from_slice(nonce);
        }
        header[NONCE_LEN..].copy_from_slice(key);

        let mut state = Xoodoo::from_bytes(&header);
        state.permute();
        Ok(Charm { state })
    }

    /// Encrypts the given message in place and returns its authentication
    /// tag.
    pub fn encrypt(&mut self, msg: &mut [u8]) -> [u8; TAG_LEN] {
        let mut buf = Zeroizing::new([0u8; RATE]);
        let mut squeezed = Zeroizing::new([0u8; RATE]);
        let mut padded = Zeroizing::new([0u8; RATE + 1]);

        let mut blocks = msg.chunks_exact_mut(RATE);
        for block in blocks.by_ref() {
            self.state.extract_rate(&mut buf);
            squeezed.copy_from_slice(&buf[..]);
            xor_block(&mut buf[..], block);
            xor_block(block, &squeezed[..]);
            self.state.replace_rate(&buf);
            self.state.permute();
        }

        let rest = blocks.into_remainder();
        let leftover = rest.len();
        padded[..leftover].copy_from_slice(rest);
        padded[leftover] = 0x80;
        self.state.extract_rate(&mut buf);
        squeezed.copy_from_slice(&buf[..]);
        xor_block(&mut buf[..], &padded[..RATE]);
        self.state.replace_rate(&buf);
        self.state
            .add_domain((1 << 24) | (((leftover as u32) >> 4) << 25) | (1 << 26));
        xor_block(&mut padded[..RATE], &squeezed[..]);
        rest.copy_from_slice(&padded[..leftover]);
        self.state.permute();

        self.squeeze_permute()
    }

    /// Decrypts the given message in place and verifies its authentication
    /// tag in constant time.
    ///
    /// On verification failure the message buffer is zeroed before
    /// [`Error::TagVerifyFail`] is returned, so unauthenticated plaintext is
    /// never left for the caller to act on.
    pub fn decrypt(&mut self, msg: &mut [u8], expected_tag: &[u8]) -> Result<(), Error> {
        if expected_tag.len() != TAG_LEN {
            return Err(Error::InvalidTagLen);
        }

        let mut buf = Zeroizing::new([0u8; RATE]);
        let mut squeezed = Zeroizing::new([0u8; RATE]);
        let mut padded = Zeroizing::new([0u8; RATE + 1]);

        let mut blocks = msg.chunks_exact_mut(RATE);
        for block in blocks.by_ref() {
            self.state.extract_rate(&mut buf);
            squeezed.copy_from_slice(&buf[..]);
            xor_block(block, &squeezed[..]);
            xor_block(&mut buf[..], block);
            self.state.replace_rate(&buf);
            self.state.permute();
        }

        let rest = blocks.into_remainder();
        let leftover = rest.len();
        padded[..leftover].copy_from_slice(rest);
        self.state.extract_rate(&mut buf);
        squeezed[..leftover].copy_from_slice(&buf[..leftover]);
        squeezed[leftover..].fill(0);
        xor_block(&mut padded[..RATE], &squeezed[..]);
        padded[leftover] = 0x80;
        xor_block(&mut buf[..], &padded[..RATE]);
        self.state.replace_rate(&buf);
        self.state
            .add_domain((1 << 24) | (((leftover as u32) >> 4) << 25) | (1 << 26));
        rest.copy_from_slice(&padded[..leftover]);
        self.state.permute();

        let tag = self.squeeze_permute();
        if bool::from(tag.ct_eq(expected_tag)) {
            Ok(())
        } else {
            msg.zeroize();
            Err(Error::TagVerifyFail)
        }
    }

    /// Hashes the given message, producing a 32-byte digest.
    ///
    /// The digest is deterministic for a given key, nonce, and message, and
    /// is domain-separated from the cipher's tags.
    pub fn hash(&mut self, msg: &[u8]) -> [u8; HASH_LEN] {
        let mut buf = Zeroizing::new([0u8; RATE]);
        let mut padded = Zeroizing::new([0u8; RATE + 1]);

        let mut blocks = msg.chunks_exact(RATE);
        for block in blocks.by_ref() {
            self.state.extract_rate(&mut buf);
            xor_block(&mut buf[..], block);
            self.state.replace_rate(&buf);
            self.state.permute();
        }

        let rest = blocks.remainder();
        let leftover = rest.len();
        padded[..leftover].copy_from_slice(rest);
        padded[leftover] = 0x80;
        self.state.extract_rate(&mut buf);
        xor_block(&mut buf[..], &padded[..RATE]);
        self.state.replace_rate(&buf);
        self.state
            .add_domain((1 << 24) | (((leftover as u32) >> 4) << 25));
        self.state.permute();

        let mut digest = [0u8; HASH_LEN];
        let (head, tail) = digest.split_at_mut(RATE);
        head.copy_from_slice(&self.squeeze_permute());
        tail.copy_from_slice(&self.squeeze_permute());
        digest
    }

    /// Returns the encrypted message with the tag appended.
    #[cfg(feature = "std")]
    pub fn seal(&mut self, msg: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; msg.len() + TAG_LEN];
        let (body, tag) = out.split_at_mut(msg.len());
        body.copy_from_slice(msg);
        let computed = self.encrypt(body);
        tag.copy_from_slice(&computed);
        out
    }

    /// Decrypts a sealed message, returning the plaintext if the trailing
    /// tag verifies.
    #[cfg(feature = "std")]
    pub fn open(&mut self, sealed: &[u8]) -> Result<Vec<u8>, Error> {
        if sealed.len() < TAG_LEN {
            return Err(Error::InvalidTagLen);
        }
        let (body, tag) = sealed.split_at(sealed.len() - TAG_LEN);
        let mut msg = body.to_vec();
        self.decrypt(&mut msg, tag)?;
        Ok(msg)
    }

    /// Serializes the 16-byte rate block, then permutes the state.
    #[inline(always)]
    fn squeeze_permute(&mut self) -> [u8; RATE] {
        let mut block = [0u8; RATE];
        self.state.extract_rate(&mut block);
        self.state.permute();
        block
    }
}

/// XORs `src` into `dst`, byte by byte, up to the shorter of the two.
#[inline(always)]
fn xor_block(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [0x01; KEY_LEN];
    const NONCE: [u8; NONCE_LEN] = [0x02; NONCE_LEN];
    const MSG: &[u8] = b"Hello, World!";

    fn session() -> Charm {
        Charm::new(&KEY, Some(&NONCE)).expect("session init")
    }

    #[test]
    fn encrypt_test_vector() {
        let mut msg = MSG.to_vec();
        let tag = session().encrypt(&mut msg);
        assert_eq!(
            msg,
            [96, 143, 101, 48, 198, 205, 191, 107, 212, 58, 31, 244, 233]
        );
        assert_eq!(
            tag,
            [119, 71, 201, 112, 158, 16, 75, 33, 104, 81, 122, 91, 175, 163, 43, 137]
        );
    }

    #[test]
    fn decrypt_test_vector() {
        let mut msg = MSG.to_vec();
        let tag = session().encrypt(&mut msg);
        session().decrypt(&mut msg, &tag).expect("tag should verify");
        assert_eq!(msg, MSG);
    }

    #[test]
    fn reject_wrong_tag() {
        let mut msg = MSG.to_vec();
        session().encrypt(&mut msg);
        let err = session().decrypt(&mut msg, &[0u8; TAG_LEN]).unwrap_err();
        assert_eq!(err, Error::TagVerifyFail);
        assert_eq!(msg, vec![0u8; MSG.len()]);
    }

    #[test]
    fn hash_test_vector() {
        let digest = session().hash(MSG);
        assert_eq!(
            digest,
            [
                75, 243, 222, 79, 160, 145, 149, 163, 29, 125, 64, 229, 153, 21, 109, 171, 184,
                31, 196, 155, 227, 123, 135, 110, 35, 84, 26, 194, 52, 63, 166, 104
            ]
        );
        assert_eq!(session().hash(MSG), digest);
    }

    #[test]
    fn empty_message() {
        let mut msg = [0u8; 0];
        let tag = session().encrypt(&mut msg);
        assert_eq!(
            tag,
            [192, 146, 65, 133, 118, 16, 25, 221, 182, 243, 54, 133, 227, 236, 253, 252]
        );
        session().decrypt(&mut msg, &tag).expect("tag should verify");
    }

    #[test]
    fn boundary_lengths_round_trip() {
        for n in [0usize, 1, 15, 16, 17, 31, 32, 33] {
            let msg: Vec<u8> = (0..n as u8).collect();
            let mut buf = msg.clone();
            let tag = session().encrypt(&mut buf);
            session().decrypt(&mut buf, &tag).expect("tag should verify");
            assert_eq!(buf, msg);
        }
    }

    #[test]
    fn absent_nonce() {
        let mut msg = MSG.to_vec();
        let tag = Charm::new(&KEY, None).unwrap().encrypt(&mut msg);
        assert_eq!(
            msg,
            [141, 158, 11, 188, 140, 238, 138, 119, 250, 228, 156, 33, 187]
        );
        assert_eq!(
            tag,
            [133, 150, 56, 146, 14, 192, 252, 190, 50, 156, 249, 86, 130, 2, 53, 8]
        );
        Charm::new(&KEY, None)
            .unwrap()
            .decrypt(&mut msg, &tag)
            .expect("tag should verify");
        assert_eq!(msg, MSG);
    }

    #[test]
    fn length_errors() {
        assert_eq!(
            Charm::new(&KEY[..31], Some(&NONCE)).unwrap_err(),
            Error::InvalidKeyLen
        );
        assert_eq!(
            Charm::new(&KEY, Some(&NONCE[..15])).unwrap_err(),
            Error::InvalidNonceLen
        );

        let mut msg = MSG.to_vec();
        let tag = session().encrypt(&mut msg);
        assert_eq!(
            session().decrypt(&mut msg, &tag[..15]).unwrap_err(),
            Error::InvalidTagLen
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn seal_and_open() {
        let sealed = session().seal(MSG);
        assert_eq!(sealed.len(), MSG.len() + TAG_LEN);

        let opened = session().open(&sealed).expect("tag should verify");
        assert_eq!(opened, MSG);

        assert_eq!(
            session().open(&sealed[..TAG_LEN - 1]).unwrap_err(),
            Error::InvalidTagLen
        );
    }
}

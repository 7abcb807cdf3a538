// trust-crypto/src/canonical.rs

//! Canonical byte encoding for digest inputs.
//!
//! Every fingerprint and commitment digest is computed over a canonical
//! encoding with fixed rules:
//! - fields appear in declared order, each prefixed by its tag name
//! - map entries are written sorted by key
//! - strings are Unicode NFC, length-prefixed
//! - floats are rounded to 6 decimal places and written as decimal text
//! - integers are big-endian
//! - byte arrays are length-prefixed
//!
//! Two equal values always produce identical bytes, so equal records hash
//! to equal digests regardless of construction order.

use crate::digest::{Digest, HashAlgorithm};
use unicode_normalization::UnicodeNormalization;

/// Accumulates the canonical encoding of a value
#[derive(Debug, Default)]
pub struct CanonicalBuffer {
    buf: Vec<u8>,
}

impl CanonicalBuffer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Write a field tag; every struct field writes its tag before its value
    pub fn tag(&mut self, name: &str) -> &mut Self {
        self.write_raw_str(name);
        self
    }

    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.buf.push(if v { 1 } else { 0 });
        self
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn write_u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn write_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Floats are rounded to 6 decimals and encoded as fixed-format text,
    /// so platform float-formatting differences cannot leak into digests.
    pub fn write_f64(&mut self, v: f64) -> &mut Self {
        let mut rounded = (v * 1_000_000.0).round() / 1_000_000.0;
        if rounded == 0.0 {
            // Negative zero must not encode differently
            rounded = 0.0;
        }
        self.write_raw_str(&format!("{:.6}", rounded));
        self
    }

    /// NFC-normalized, length-prefixed string
    pub fn write_str(&mut self, s: &str) -> &mut Self {
        let normalized: String = s.nfc().collect();
        self.write_raw_str(&normalized);
        self
    }

    /// Length-prefixed byte array
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Map entries sorted by key; the caller supplies pre-sorted pairs
    /// (a `BTreeMap` iteration satisfies this).
    pub fn write_map<'a, I>(&mut self, entries: I) -> &mut Self
    where
        I: ExactSizeIterator<Item = (&'a str, &'a [u8])>,
    {
        self.write_u64(entries.len() as u64);
        for (key, value) in entries {
            self.write_str(key);
            self.write_bytes(value);
        }
        self
    }

    /// Presence marker followed by the value when `Some`
    pub fn write_option<T, F>(&mut self, value: Option<&T>, mut write: F) -> &mut Self
    where
        F: FnMut(&mut Self, &T),
    {
        match value {
            Some(v) => {
                self.write_bool(true);
                write(self, v);
            }
            None => {
                self.write_bool(false);
            }
        }
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Digest the accumulated bytes
    pub fn digest(&self, algorithm: HashAlgorithm) -> Digest {
        algorithm.digest(&self.buf)
    }

    fn write_raw_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        self.buf.extend_from_slice(bytes);
    }
}

/// Trait for types with a canonical digest form
pub trait Canonicalize {
    /// Append this value's canonical encoding to the buffer
    fn canonicalize(&self, out: &mut CanonicalBuffer);

    /// Canonical encoding as owned bytes
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = CanonicalBuffer::new();
        self.canonicalize(&mut buf);
        buf.into_bytes()
    }

    /// Digest of the canonical encoding
    fn canonical_digest(&self, algorithm: HashAlgorithm) -> Digest {
        algorithm.digest(&self.canonical_bytes())
    }
}

//! Digest factories: one fresh, reusable [`DigestInstance`] per worker, chosen by algorithm name.
//!
//! Instances are not shared between threads. A [`DigestFactory`] is shared (behind an `Arc`) and
//! only ever asked for new instances, so it must be `Send + Sync`; instances only need `Send`.

mod fnv;
mod keyed;

pub use fnv::{Fnv, FnvWidth};
pub use keyed::{KeyedFactory, create_keyed};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use digest::DynDigest;

use crate::error::DigestError;

/// A running digest computation. Reset and reused across files by a single worker.
pub trait DigestInstance: Send {
    /// Return to the initial state (keeps any key).
    fn reset(&mut self);
    /// Feed more content.
    fn write(&mut self, data: &[u8]);
    /// Digest of everything written since the last reset. Does not change the state.
    fn sum(&self) -> Vec<u8>;
    /// Digest length in bytes.
    fn size(&self) -> usize;
}

/// Produces independent digest instances. Called once per worker.
pub trait DigestFactory: Send + Sync {
    fn create(&self) -> Box<dyn DigestInstance>;
    /// Display name (e.g. `sha256`, `hmac-sha256`).
    fn name(&self) -> String;
}

/// Supported algorithms. Names match the registry strings accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Fnv32,
    Fnv32a,
    Fnv64,
    Fnv64a,
    Fnv128,
    Fnv128a,
    Blake3,
}

impl Algorithm {
    pub const DEFAULT: Algorithm = Algorithm::Sha256;

    pub const ALL: [Algorithm; 15] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha512_224,
        Algorithm::Sha512_256,
        Algorithm::Fnv32,
        Algorithm::Fnv32a,
        Algorithm::Fnv64,
        Algorithm::Fnv64a,
        Algorithm::Fnv128,
        Algorithm::Fnv128a,
        Algorithm::Blake3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
            Algorithm::Sha512_224 => "sha512/224",
            Algorithm::Sha512_256 => "sha512/256",
            Algorithm::Fnv32 => "fnv32",
            Algorithm::Fnv32a => "fnv32a",
            Algorithm::Fnv64 => "fnv64",
            Algorithm::Fnv64a => "fnv64a",
            Algorithm::Fnv128 => "fnv128",
            Algorithm::Fnv128a => "fnv128a",
            Algorithm::Blake3 => "blake3",
        }
    }

    /// FNV parameters, or `None` for non-FNV algorithms.
    fn fnv(&self) -> Option<(FnvWidth, bool)> {
        match self {
            Algorithm::Fnv32 => Some((FnvWidth::W32, false)),
            Algorithm::Fnv32a => Some((FnvWidth::W32, true)),
            Algorithm::Fnv64 => Some((FnvWidth::W64, false)),
            Algorithm::Fnv64a => Some((FnvWidth::W64, true)),
            Algorithm::Fnv128 => Some((FnvWidth::W128, false)),
            Algorithm::Fnv128a => Some((FnvWidth::W128, true)),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| DigestError::UnknownAlgorithm(s.to_string()))
    }
}

impl DigestFactory for Algorithm {
    fn create(&self) -> Box<dyn DigestInstance> {
        if let Some((width, alternate)) = self.fnv() {
            return Box::new(Fnv::new(width, alternate));
        }
        match self {
            Algorithm::Md5 => dyn_instance(md5::Md5::default()),
            Algorithm::Sha1 => dyn_instance(sha1::Sha1::default()),
            Algorithm::Sha224 => dyn_instance(sha2::Sha224::default()),
            Algorithm::Sha256 => dyn_instance(sha2::Sha256::default()),
            Algorithm::Sha384 => dyn_instance(sha2::Sha384::default()),
            Algorithm::Sha512 => dyn_instance(sha2::Sha512::default()),
            Algorithm::Sha512_224 => dyn_instance(sha2::Sha512_224::default()),
            Algorithm::Sha512_256 => dyn_instance(sha2::Sha512_256::default()),
            _ => Box::new(blake3::Hasher::new()),
        }
    }

    fn name(&self) -> String {
        Algorithm::name(self).to_string()
    }
}

/// Resolve `algorithm` and, when a key is given, wrap it in its keyed variant.
pub fn factory_for(
    algorithm: Algorithm,
    key: Option<&[u8]>,
) -> Result<Arc<dyn DigestFactory>, DigestError> {
    match key {
        None => Ok(Arc::new(algorithm)),
        Some(key) => Ok(Arc::new(create_keyed(algorithm, key)?)),
    }
}

/// RustCrypto hashers behind the object-safe `DynDigest`.
struct DynInstance(Box<dyn DynDigest + Send>);

fn dyn_instance<D>(hasher: D) -> Box<dyn DigestInstance>
where
    D: DynDigest + Send + 'static,
{
    Box::new(DynInstance(Box::new(hasher)))
}

impl DigestInstance for DynInstance {
    fn reset(&mut self) {
        self.0.reset();
    }

    fn write(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.box_clone().finalize().into_vec()
    }

    fn size(&self) -> usize {
        self.0.output_size()
    }
}

impl DigestInstance for blake3::Hasher {
    fn reset(&mut self) {
        blake3::Hasher::reset(self);
    }

    fn write(&mut self, data: &[u8]) {
        blake3::Hasher::update(self, data);
    }

    fn sum(&self) -> Vec<u8> {
        blake3::Hasher::finalize(self).as_bytes().to_vec()
    }

    fn size(&self) -> usize {
        blake3::OUT_LEN
    }
}

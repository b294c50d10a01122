//! Keyed digests: HMAC over the RustCrypto algorithms, native keyed mode for blake3.

use digest::Digest;
use digest::core_api::BlockSizeUser;
use hmac::{Mac, SimpleHmac};

use super::{Algorithm, DigestFactory, DigestInstance};
use crate::error::DigestError;

type HmacCtor = fn(&[u8]) -> Box<dyn DigestInstance>;

enum Keying {
    Hmac(HmacCtor),
    Blake3([u8; blake3::KEY_LEN]),
}

/// Factory for the keyed variant of a base algorithm. Built with [`create_keyed`].
pub struct KeyedFactory {
    base: Algorithm,
    key: Vec<u8>,
    keying: Keying,
}

impl KeyedFactory {
    pub fn base(&self) -> Algorithm {
        self.base
    }
}

/// Wrap `base` with `key`. Fails for algorithms without a keyed variant (FNV) and for blake3
/// keys that are not exactly 32 bytes.
pub fn create_keyed(base: Algorithm, key: &[u8]) -> Result<KeyedFactory, DigestError> {
    let keying = match base {
        Algorithm::Md5 => Keying::Hmac(hmac_instance::<md5::Md5>),
        Algorithm::Sha1 => Keying::Hmac(hmac_instance::<sha1::Sha1>),
        Algorithm::Sha224 => Keying::Hmac(hmac_instance::<sha2::Sha224>),
        Algorithm::Sha256 => Keying::Hmac(hmac_instance::<sha2::Sha256>),
        Algorithm::Sha384 => Keying::Hmac(hmac_instance::<sha2::Sha384>),
        Algorithm::Sha512 => Keying::Hmac(hmac_instance::<sha2::Sha512>),
        Algorithm::Sha512_224 => Keying::Hmac(hmac_instance::<sha2::Sha512_224>),
        Algorithm::Sha512_256 => Keying::Hmac(hmac_instance::<sha2::Sha512_256>),
        Algorithm::Blake3 => {
            let key: [u8; blake3::KEY_LEN] =
                key.try_into().map_err(|_| DigestError::KeyLength {
                    algorithm: base,
                    expected: blake3::KEY_LEN,
                    actual: key.len(),
                })?;
            Keying::Blake3(key)
        }
        Algorithm::Fnv32
        | Algorithm::Fnv32a
        | Algorithm::Fnv64
        | Algorithm::Fnv64a
        | Algorithm::Fnv128
        | Algorithm::Fnv128a => return Err(DigestError::KeyedUnsupported(base)),
    };
    Ok(KeyedFactory {
        base,
        key: key.to_vec(),
        keying,
    })
}

impl DigestFactory for KeyedFactory {
    fn create(&self) -> Box<dyn DigestInstance> {
        match &self.keying {
            Keying::Hmac(ctor) => ctor(&self.key),
            Keying::Blake3(key) => Box::new(blake3::Hasher::new_keyed(key)),
        }
    }

    fn name(&self) -> String {
        match self.keying {
            Keying::Hmac(_) => format!("hmac-{}", self.base),
            Keying::Blake3(_) => format!("{}-keyed", self.base),
        }
    }
}

/// HMAC state plus the freshly keyed state it resets to.
struct HmacInstance<D: Digest + BlockSizeUser> {
    keyed: SimpleHmac<D>,
    mac: SimpleHmac<D>,
}

fn hmac_instance<D>(key: &[u8]) -> Box<dyn DigestInstance>
where
    D: Digest + BlockSizeUser + Clone + Send + 'static,
{
    // HMAC hashes or pads the key to the block size, so any length is accepted.
    let keyed = <SimpleHmac<D> as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    Box::new(HmacInstance {
        mac: keyed.clone(),
        keyed,
    })
}

impl<D> DigestInstance for HmacInstance<D>
where
    D: Digest + BlockSizeUser + Clone + Send,
{
    fn reset(&mut self) {
        self.mac = self.keyed.clone();
    }

    fn write(&mut self, data: &[u8]) {
        Mac::update(&mut self.mac, data);
    }

    fn sum(&self) -> Vec<u8> {
        self.mac.clone().finalize().into_bytes().to_vec()
    }

    fn size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

//! Feeding file and stdin content into a digest instance.

use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::digest::DigestInstance;
use crate::utils::config::HashingConsts;

/// Reset `digest`, feed the whole of `reader` in chunks, and return the sum.
pub fn digest_reader<R: Read>(mut reader: R, digest: &mut dyn DigestInstance) -> io::Result<Vec<u8>> {
    digest.reset();
    let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        digest.write(&buffer[..n]);
    }
    Ok(digest.sum())
}

/// Digest a file. Uses memory-mapped I/O above the mmap threshold, chunked reading otherwise.
/// `size` is the stat size; it only picks the strategy.
pub fn digest_file(path: &Path, size: u64, digest: &mut dyn DigestInstance) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // SAFETY: read-only map. Truncation by another process while mapped can fault.
        let mmap = unsafe { Mmap::map(&file)? };
        digest.reset();
        digest.write(&mmap);
        return Ok(digest.sum());
    }
    let reader = BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
    digest_reader(reader, digest)
}

/// Digest everything on standard input.
pub fn digest_stdin(digest: &mut dyn DigestInstance) -> io::Result<Vec<u8>> {
    digest_reader(io::stdin().lock(), digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{Algorithm, DigestFactory};

    fn direct(a: Algorithm, data: &[u8]) -> Vec<u8> {
        let mut d = a.create();
        d.write(data);
        d.sum()
    }

    #[test]
    fn test_digest_file_matches_direct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        let data = vec![42u8; HashingConsts::HASH_READ_CHUNK_SIZE * 2 + 17];
        std::fs::write(&path, &data).unwrap();
        let mut d = Algorithm::Sha256.create();
        let got = digest_file(&path, data.len() as u64, d.as_mut()).unwrap();
        assert_eq!(got, direct(Algorithm::Sha256, &data));
    }

    #[test]
    fn test_instance_reused_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"alpha").unwrap();
        std::fs::write(&b, b"beta").unwrap();
        let mut d = Algorithm::Md5.create();
        digest_file(&a, 5, d.as_mut()).unwrap();
        let got = digest_file(&b, 4, d.as_mut()).unwrap();
        assert_eq!(got, direct(Algorithm::Md5, b"beta"));
    }

    #[test]
    fn test_digest_reader_empty() {
        let mut d = Algorithm::Fnv32a.create();
        let got = digest_reader(io::empty(), d.as_mut()).unwrap();
        assert_eq!(hex::encode(got), "811c9dc5");
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut d = Algorithm::Sha1.create();
        assert!(digest_file(Path::new("/no/such/file"), 0, d.as_mut()).is_err());
    }
}

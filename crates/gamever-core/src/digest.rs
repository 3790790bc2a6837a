use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{io_error, GameverError, Result};

pub fn sha256_file_hex(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(io_error("open file for hashing", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(io_error("read file for hashing", path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn verify_sha256_file(path: &Path, expected_hex: &str) -> Result<()> {
    let actual = sha256_file_hex(path)?;
    if actual.eq_ignore_ascii_case(expected_hex.trim()) {
        return Ok(());
    }
    Err(GameverError::Integrity {
        target: path.display().to_string(),
        expected: expected_hex.trim().to_ascii_lowercase(),
        actual,
    })
}

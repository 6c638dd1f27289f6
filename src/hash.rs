//! MD5 content digests for media files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, file_read_error};

/// Calculate the MD5 digest of a byte slice as lower-case hex
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Calculate the MD5 digest of a file as lower-case hex
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| file_read_error(path, e))?;

    let mut reader = BufReader::new(file);
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| file_read_error(path, e))?;

        if bytes_read == 0 {
            break;
        }

        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

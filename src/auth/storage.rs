use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::auth::token::TokenData;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to parse token file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid token file {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: &'static str },
    #[error("failed to access token file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

pub trait TokenStorage {
    fn load(&self) -> Result<TokenData, StorageError>;
    fn save(&self, data: &TokenData) -> Result<(), StorageError>;
}

#[derive(Debug)]
pub struct JsonTokenStorage {
    filename: PathBuf,
}

impl JsonTokenStorage {
    pub fn new(filename: PathBuf) -> Self {
        Self { filename }
    }

    pub fn path(&self) -> &Path {
        &self.filename
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.filename.clone(),
            source,
        }
    }
}

impl TokenStorage for JsonTokenStorage {
    fn load(&self) -> Result<TokenData, StorageError> {
        let file = File::open(&self.filename).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(self.filename.clone()),
            _ => self.io_error(e),
        })?;

        let reader = BufReader::new(file);
        let token_data: TokenData =
            serde_json::from_reader(reader).map_err(|source| StorageError::Parse {
                path: self.filename.clone(),
                source,
            })?;

        if token_data.access_token.is_empty() || token_data.refresh_token.is_empty() {
            return Err(StorageError::Invalid {
                path: self.filename.clone(),
                reason: "missing access_token or refresh_token",
            });
        }

        Ok(token_data)
    }

    fn save(&self, token: &TokenData) -> Result<(), StorageError> {
        log::debug!(
            "saving token expiring at {} to {:?}",
            token.expires_at,
            self.filename
        );

        // Write next to the target and rename so a crash never leaves a
        // truncated token file behind.
        let mut tmp_name = self.filename.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, token).map_err(|source| {
            StorageError::Parse {
                path: tmp_path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(|e| self.io_error(e))?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.filename).map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

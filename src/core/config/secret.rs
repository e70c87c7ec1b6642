use std::{fs, io, path::Path, path::PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub(super) const ACCESS_SECRET_FILE: &str = ".access_token_secret";
pub(super) const REFRESH_SECRET_FILE: &str = ".refresh_token_secret";

/// Returns the signing secret stored in `file_name`, generating and persisting a
/// fresh one (mode 0600) on first use.
pub(super) fn load_or_create_token_secret(file_name: &str) -> String {
    let path = secret_file_path(file_name);

    if let Some(existing) = read_secret(&path) {
        return existing;
    }

    let new_secret = generate_secret();

    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            tracing::warn!(
                error = %err,
                path = %parent.display(),
                "Failed to create token secret directory"
            );
        }
    }

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(
                        error = %err,
                        path = %path.display(),
                        "Failed to restrict token secret file permissions"
                    );
                }
            }

            if let Err(err) = io::Write::write_all(&mut file, new_secret.as_bytes()) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to persist token secret");
            }
            new_secret
        }
        // Another process won the race; use whatever it wrote.
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            read_secret(&path).unwrap_or(new_secret)
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to create token secret file");
            new_secret
        }
    }
}

fn read_secret(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn secret_file_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_long_and_distinct() {
        let first = generate_secret();
        let second = generate_secret();
        assert!(first.len() >= 80);
        assert_ne!(first, second);
    }
}

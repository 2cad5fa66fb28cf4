//! BIOS archive download.
//!
//! Archives are stored as `<download_path>/<mobo name>-<version>.zip`, so
//! the local name never depends on how the vendor lays out its CDN.  The
//! directory itself is never created here.

use std::path::{Path, PathBuf};

use colored::Colorize;
use log::info;

use crate::api::Bios;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::mobo::Mobo;

/// Where the archive for `bios` on `mobo` lives.
pub fn file_path(download_path: &Path, mobo: &Mobo, bios: &Bios) -> PathBuf {
    download_path.join(format!(
        "{}-{}.zip",
        path_safe(&mobo.name),
        path_safe(&bios.version)
    ))
}

// Keep names from escaping the download directory.
fn path_safe(s: &str) -> String {
    s.replace(['/', '\\'], "_")
}

pub fn already_downloaded(path: &Path) -> bool {
    path.exists()
}

/// Fetch `bios` into `path` unless a file is already there.
///
/// Returns `true` if the archive was downloaded by this call.  A failed
/// write may leave a partial file behind, which a later run treats as
/// downloaded.
pub async fn download_if_missing(fetcher: &dyn Fetcher, path: &Path, bios: &Bios) -> Result<bool> {
    if already_downloaded(path) {
        println!("{}", "Already Downloaded".yellow());
        info!("{} already downloaded", path.display());
        return Ok(false);
    }

    println!("Downloading {} ({})", path.display(), bios.file_size);
    info!("downloading {} from {}", path.display(), bios.download_url);

    let body = fetcher.get_bytes(&bios.download_url).await?;
    tokio::fs::write(path, &body).await?;

    println!("Downloaded");
    info!("downloaded {} ({} bytes)", path.display(), body.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::FakeFetcher;

    fn mobo(name: &str) -> Mobo {
        Mobo { name: name.into(), current_version: 1105, api_end_point: "http://api".into() }
    }

    fn bios(version: &str) -> Bios {
        Bios {
            version:      version.into(),
            file_size:    "9.4 MBytes".into(),
            title:        "BIOS".into(),
            release_date: "2020/05/12".into(),
            description:  String::new(),
            download_url: "http://cdn/bios.zip".into(),
        }
    }

    #[test]
    fn path_is_name_and_version() {
        let dir = Path::new("/srv/bios");
        let a = file_path(dir, &mobo("X570"), &bios("1203"));
        let b = file_path(dir, &mobo("X570"), &bios("1203"));
        assert_eq!(a, PathBuf::from("/srv/bios/X570-1203.zip"));
        assert_eq!(a, b);
    }

    #[test]
    fn separators_in_names_stay_in_directory() {
        let p = file_path(Path::new("/srv/bios"), &mobo("B450/B550"), &bios("..\\1"));
        assert_eq!(p, PathBuf::from("/srv/bios/B450_B550-.._1.zip"));
    }

    #[tokio::test]
    async fn second_download_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with_bytes("http://cdn/bios.zip", b"PK\x03\x04firmware");
        let bios = bios("1203");
        let path = file_path(dir.path(), &mobo("X570"), &bios);

        assert!(download_if_missing(&fetcher, &path, &bios).await.unwrap());
        assert!(!download_if_missing(&fetcher, &path, &bios).await.unwrap());

        assert_eq!(fetcher.download_count(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04firmware");
    }

    #[tokio::test]
    async fn fetch_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let bios = bios("1203");
        let path = file_path(dir.path(), &mobo("X570"), &bios);

        assert!(download_if_missing(&fetcher, &path, &bios).await.is_err());
        assert!(!already_downloaded(&path));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with_bytes("http://cdn/bios.zip", b"data");
        let bios = bios("1203");
        let path = file_path(&dir.path().join("absent"), &mobo("X570"), &bios);

        assert!(download_if_missing(&fetcher, &path, &bios).await.is_err());
    }
}
